use chrono::Local;
use clap::Args;
use serde_json::Value;

use fund_valuation_core::positions::PortfolioState;
use fund_valuation_core::scenario::{ScenarioEntry, ScenarioStore};

use crate::input;

/// Arguments for saving a scenario snapshot
#[derive(Args)]
pub struct ScenarioSaveArgs {
    /// Scenario name
    #[arg(long)]
    pub name: String,

    /// Path to the investments CSV whose settings to snapshot
    #[arg(long)]
    pub investments: String,

    /// Scenario store path
    #[arg(long, default_value = "scenarios.json")]
    pub store: String,
}

/// Arguments for listing stored scenarios
#[derive(Args)]
pub struct ScenarioListArgs {
    /// Scenario store path
    #[arg(long, default_value = "scenarios.json")]
    pub store: String,
}

/// Arguments for deleting a stored scenario
#[derive(Args)]
pub struct ScenarioDeleteArgs {
    /// Scenario name
    #[arg(long)]
    pub name: String,

    /// Scenario store path
    #[arg(long, default_value = "scenarios.json")]
    pub store: String,
}

pub fn run_save(args: ScenarioSaveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.name.trim().is_empty() {
        return Err("Scenario name must not be empty".into());
    }

    let rows = input::csv::read_investments(&args.investments)?;
    let state = PortfolioState::new(rows, Local::now().date_naive())?;

    let mut store = ScenarioStore::load(&args.store)?;
    store.save_entry(ScenarioEntry::snapshot(args.name.trim(), state.positions()));
    store.persist()?;

    Ok(serde_json::json!({
        "saved": args.name.trim(),
        "scenarios": store.names(),
    }))
}

pub fn run_list(args: ScenarioListArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let store = ScenarioStore::load(&args.store)?;
    let entries: Vec<Value> = store
        .entries()
        .iter()
        .map(|e| {
            serde_json::json!({
                "name": e.name,
                "companies": e.companies.len(),
            })
        })
        .collect();
    Ok(Value::Array(entries))
}

pub fn run_delete(args: ScenarioDeleteArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut store = ScenarioStore::load(&args.store)?;
    if !store.delete(&args.name) {
        return Err(format!("Scenario '{}' not found in '{}'", args.name, args.store).into());
    }
    store.persist()?;

    Ok(serde_json::json!({
        "deleted": args.name,
        "scenarios": store.names(),
    }))
}
