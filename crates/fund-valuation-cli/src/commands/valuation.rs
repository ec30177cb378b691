use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use fund_valuation_core::valuation::{self, DEFAULT_EXCESS_RATE_PCT};

use super::common::EngineOpts;
use crate::input;

/// Arguments for single-amount index correction
#[derive(Args)]
pub struct CorrectArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Principal amount (thousands)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Origin date (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long)]
    pub origin_date: Option<String>,

    /// Annual excess rate over the index, in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    #[command(flatten)]
    pub engine: EngineOpts,
}

#[derive(Debug, Deserialize)]
struct CorrectRequest {
    principal: Decimal,
    origin_date: String,
    #[serde(default)]
    annual_excess_rate_pct: Option<Decimal>,
}

pub fn run_correct(args: CorrectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: CorrectRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let principal = args
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let origin_date = args
            .origin_date
            .clone()
            .ok_or("--origin-date is required (or provide --input)")?;
        CorrectRequest {
            principal,
            origin_date,
            annual_excess_rate_pct: args.rate,
        }
    };

    let engine = args.engine.build_engine()?;
    let rate = request
        .annual_excess_rate_pct
        .unwrap_or(DEFAULT_EXCESS_RATE_PCT);
    let origin = input::csv::parse_date(&request.origin_date)?;

    let result = valuation::correct_amount(&engine, request.principal, origin, rate)?;
    for warning in &result.warnings {
        warn!("{}", warning);
    }
    Ok(serde_json::to_value(result)?)
}
