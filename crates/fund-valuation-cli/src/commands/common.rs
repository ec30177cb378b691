//! Flags and loading steps shared by the portfolio commands.

use chrono::Local;
use clap::Args;
use rust_decimal::Decimal;
use tracing::warn;

use fund_valuation_core::index_series::remote::RemoteIndexClient;
use fund_valuation_core::positions::PortfolioState;
use fund_valuation_core::scenario::ScenarioStore;
use fund_valuation_core::valuation::ValuationEngine;

use crate::input;

/// Engine-level flags common to every valuation command.
#[derive(Args)]
pub struct EngineOpts {
    /// Valuation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<String>,

    /// Skip the remote index fetch and compound the fixed fallback rate
    #[arg(long)]
    pub offline: bool,

    /// Override the index series endpoint
    #[arg(long)]
    pub index_url: Option<String>,

    /// Override the fallback annual rate, in percent (default 4.5)
    #[arg(long)]
    pub fallback_rate: Option<Decimal>,
}

impl EngineOpts {
    /// Resolve the index series (at most one fetch per run) and build the
    /// engine for the requested valuation date.
    pub fn build_engine(&self) -> Result<ValuationEngine, Box<dyn std::error::Error>> {
        let as_of = match &self.as_of {
            Some(raw) => input::csv::parse_date(raw)?,
            None => Local::now().date_naive(),
        };

        let series = if self.offline {
            None
        } else {
            let mut client = RemoteIndexClient::new();
            if let Some(url) = &self.index_url {
                client = client.with_endpoint(url);
            }
            client.series().cloned()
        };

        let mut engine = ValuationEngine::new(series, as_of);
        if let Some(rate_pct) = self.fallback_rate {
            engine = engine.with_fallback_rate(rate_pct / Decimal::ONE_HUNDRED);
        }
        Ok(engine)
    }
}

/// Table and scenario flags common to the growth and summary commands.
#[derive(Args)]
pub struct PortfolioOpts {
    /// Path to the investments CSV
    #[arg(long)]
    pub investments: String,

    /// Path to the fair-value CSV
    #[arg(long)]
    pub fair_values: Option<String>,

    /// Apply a stored scenario before computing
    #[arg(long)]
    pub scenario: Option<String>,

    /// Scenario store path
    #[arg(long, default_value = "scenarios.json")]
    pub store: String,
}

impl PortfolioOpts {
    /// Load the position table, join fair values, and apply the requested
    /// scenario, in that order.
    pub fn load_state(
        &self,
        engine: &ValuationEngine,
    ) -> Result<PortfolioState, Box<dyn std::error::Error>> {
        let rows = input::csv::read_investments(&self.investments)?;
        let mut state = PortfolioState::new(rows, engine.as_of())?;

        if let Some(path) = &self.fair_values {
            let records = input::csv::read_fair_values(path)?;
            state.join_fair_values(&records);
        }

        if let Some(name) = &self.scenario {
            let store = ScenarioStore::load(&self.store)?;
            let entry = store
                .get(name)
                .ok_or_else(|| format!("Scenario '{}' not found in '{}'", name, self.store))?;
            let skipped = state.apply_scenario(entry)?;
            if skipped > 0 {
                warn!(skipped, scenario = %name, "scenario referenced companies not in the portfolio");
            }
        }

        Ok(state)
    }
}
