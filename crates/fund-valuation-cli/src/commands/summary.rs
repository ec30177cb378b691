use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tracing::warn;

use fund_valuation_core::{growth, summary};

use super::common::{EngineOpts, PortfolioOpts};

/// Arguments for the fund-level portfolio summary
#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub portfolio: PortfolioOpts,

    /// Annual excess rate over the index, in percent
    #[arg(long, default_value_t = dec!(6.0))]
    pub rate: Decimal,

    /// Nominal hurdle rate, in percent
    #[arg(long, default_value_t = dec!(6.0))]
    pub hurdle: Decimal,

    #[command(flatten)]
    pub engine: EngineOpts,
}

pub fn run_summary(args: SummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let engine = args.engine.build_engine()?;
    let state = args.portfolio.load_state(&engine)?;

    let growth_output = growth::analyze_growth(state.positions(), &engine, args.rate)?;
    let result = summary::summarize_portfolio(
        state.positions(),
        &growth_output.result,
        args.rate,
        args.hurdle,
        &engine,
    )?;
    for warning in &result.warnings {
        warn!("{}", warning);
    }
    Ok(serde_json::to_value(result)?)
}
