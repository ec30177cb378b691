use chrono::NaiveDate;
use fund_valuation_core::positions::PortfolioState;
use fund_valuation_core::scenario::{ScenarioEntry, ScenarioStore, MAX_SCENARIOS};
use fund_valuation_core::types::{CompanyPosition, PositionStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fs;
use std::path::PathBuf;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn position(name: &str, multiple: Decimal) -> CompanyPosition {
    CompanyPosition {
        name: name.to_string(),
        invested_amount: dec!(500),
        fund_share_pct: dec!(15),
        first_investment_date: date(2020, 1, 1),
        exit_multiple: multiple,
        status: PositionStatus::Active,
        fair_value_total: None,
        approved_amount: None,
    }
}

fn temp_store_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "fund-valuation-test-{}-{}.json",
        tag,
        std::process::id()
    ))
}

// ===========================================================================
// Scenario store — snapshot, capacity, persistence, application
// ===========================================================================

#[test]
fn test_snapshot_save_reload_apply() {
    let path = temp_store_path("round-trip");
    let _ = fs::remove_file(&path);

    // Shape a scenario on one state and snapshot it
    let mut state = PortfolioState::new(
        vec![position("Acme", dec!(1.0)), position("Globex", dec!(1.0))],
        date(2025, 1, 1),
    )
    .unwrap();
    state.set_multiple("Acme", dec!(3.0)).unwrap();
    state.set_writeoff("Globex", true).unwrap();

    let mut store = ScenarioStore::load(&path).unwrap();
    store.save_entry(ScenarioEntry::snapshot("downside", state.positions()));
    store.persist().unwrap();

    // Apply the reloaded scenario to a fresh state
    let store = ScenarioStore::load(&path).unwrap();
    let entry = store.get("downside").unwrap();

    let mut fresh = PortfolioState::new(
        vec![position("Acme", dec!(1.0)), position("Globex", dec!(1.0))],
        date(2025, 1, 1),
    )
    .unwrap();
    let skipped = fresh.apply_scenario(entry).unwrap();

    assert_eq!(skipped, 0);
    assert_eq!(fresh.get("Acme").unwrap().exit_multiple, dec!(3.0));
    assert!(fresh.get("Globex").unwrap().is_writeoff());
    assert_eq!(fresh.get("Globex").unwrap().exit_multiple, Decimal::ZERO);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_store_never_exceeds_capacity() {
    let path = temp_store_path("capacity");
    let _ = fs::remove_file(&path);

    let state =
        PortfolioState::new(vec![position("Acme", dec!(1.0))], date(2025, 1, 1)).unwrap();

    let mut store = ScenarioStore::load(&path).unwrap();
    for i in 1..=MAX_SCENARIOS + 1 {
        store.save_entry(ScenarioEntry::snapshot(
            format!("scenario-{}", i),
            state.positions(),
        ));
    }
    store.persist().unwrap();

    let reloaded = ScenarioStore::load(&path).unwrap();
    assert_eq!(reloaded.entries().len(), MAX_SCENARIOS);
    // Oldest by insertion order was evicted
    assert!(reloaded.get("scenario-1").is_none());
    assert!(reloaded.get("scenario-6").is_some());

    let _ = fs::remove_file(&path);
}

#[test]
fn test_scenario_application_is_invariant_safe() {
    // A scenario that marks a write-off must leave the position with a zero
    // multiple regardless of what multiple the snapshot carried alongside.
    let mut state =
        PortfolioState::new(vec![position("Acme", dec!(2.5))], date(2025, 1, 1)).unwrap();
    let mut snapshot = ScenarioEntry::snapshot("odd", state.positions());
    if let Some(setting) = snapshot.companies.get_mut("Acme") {
        setting.write_off = true;
        setting.exit_multiple = dec!(2.5); // stale multiple in the snapshot
    }

    state.apply_scenario(&snapshot).unwrap();
    let acme = state.get("Acme").unwrap();
    assert!(acme.is_writeoff());
    assert_eq!(acme.exit_multiple, Decimal::ZERO);
}
