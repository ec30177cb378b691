use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tracing::warn;

use fund_valuation_core::growth;

use super::common::{EngineOpts, PortfolioOpts};

/// Arguments for per-company growth analysis
#[derive(Args)]
pub struct GrowthArgs {
    #[command(flatten)]
    pub portfolio: PortfolioOpts,

    /// Annual excess rate over the index, in percent
    #[arg(long, default_value_t = dec!(6.0))]
    pub rate: Decimal,

    #[command(flatten)]
    pub engine: EngineOpts,
}

pub fn run_growth(args: GrowthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let engine = args.engine.build_engine()?;
    let state = args.portfolio.load_state(&engine)?;

    let result = growth::analyze_growth(state.positions(), &engine, args.rate)?;
    for warning in &result.warnings {
        warn!("{}", warning);
    }
    Ok(serde_json::to_value(result)?)
}
