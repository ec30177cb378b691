//! Editable position table.
//!
//! All mutation is funneled through a small set of named transitions so the
//! multiple/write-off invariant holds in exactly one place: a write-off
//! forces the exit multiple to zero, reverting a write-off restores the
//! documented reset multiple, and a positive multiple always means the
//! position is active again.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValuationError;
use crate::scenario::ScenarioEntry;
use crate::types::{CompanyPosition, FairValueRecord, Multiple, PositionStatus};
use crate::ValuationResult;

/// Multiple restored when a write-off is reverted.
pub const RESET_MULTIPLE: Multiple = Decimal::ONE;

/// Case-insensitive, trimmed match key used across input sources.
fn match_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// The in-memory position table, single-writer, recomputed-from on demand.
#[derive(Debug, Clone)]
pub struct PortfolioState {
    positions: Vec<CompanyPosition>,
}

impl PortfolioState {
    /// Validate and normalize a loaded position set. Duplicate names (case
    /// insensitive), negative amounts, out-of-range shares, and future
    /// first-investment dates are rejected. Status and multiple are
    /// reconciled once here; afterwards only the transitions below touch
    /// them.
    pub fn new(mut positions: Vec<CompanyPosition>, as_of: NaiveDate) -> ValuationResult<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        for position in &mut positions {
            let key = match_key(&position.name);
            if key.is_empty() {
                return Err(ValuationError::InvalidInput {
                    field: "name".into(),
                    reason: "Company name must not be empty".into(),
                });
            }
            if !seen.insert(key) {
                return Err(ValuationError::InvalidInput {
                    field: "name".into(),
                    reason: format!("Duplicate company '{}'", position.name.trim()),
                });
            }
            if position.invested_amount < Decimal::ZERO {
                return Err(ValuationError::InvalidInput {
                    field: "invested_amount".into(),
                    reason: format!("'{}': invested amount must be non-negative", position.name),
                });
            }
            if position.fund_share_pct < Decimal::ZERO
                || position.fund_share_pct > Decimal::ONE_HUNDRED
            {
                return Err(ValuationError::InvalidInput {
                    field: "fund_share_pct".into(),
                    reason: format!("'{}': fund share must be within 0–100", position.name),
                });
            }
            if position.exit_multiple < Decimal::ZERO {
                return Err(ValuationError::InvalidInput {
                    field: "exit_multiple".into(),
                    reason: format!("'{}': exit multiple must be non-negative", position.name),
                });
            }
            if position.first_investment_date > as_of {
                return Err(ValuationError::InvalidInput {
                    field: "first_investment_date".into(),
                    reason: format!(
                        "'{}': first investment date {} is in the future",
                        position.name, position.first_investment_date
                    ),
                });
            }

            // Reconcile status with the loaded multiple: an explicit
            // write-off wins and zeroes the multiple; a zero multiple
            // without the marker is merely unresolved.
            if position.status == PositionStatus::WrittenOff {
                position.exit_multiple = Decimal::ZERO;
            } else if position.exit_multiple.is_zero() {
                position.status = PositionStatus::NotYetExited;
            } else {
                position.status = PositionStatus::Active;
            }
        }

        Ok(PortfolioState { positions })
    }

    pub fn positions(&self) -> &[CompanyPosition] {
        &self.positions
    }

    pub fn get(&self, name: &str) -> Option<&CompanyPosition> {
        let key = match_key(name);
        self.positions.iter().find(|p| match_key(&p.name) == key)
    }

    fn get_mut(&mut self, name: &str) -> ValuationResult<&mut CompanyPosition> {
        let key = match_key(name);
        self.positions
            .iter_mut()
            .find(|p| match_key(&p.name) == key)
            .ok_or_else(|| ValuationError::InvalidInput {
                field: "name".into(),
                reason: format!("Unknown company '{}'", name.trim()),
            })
    }

    /// Set a company's exit multiple. Zero marks the position as not yet
    /// exited (unless it is already written off); any positive multiple
    /// makes it active again.
    pub fn set_multiple(&mut self, name: &str, multiple: Multiple) -> ValuationResult<()> {
        if multiple < Decimal::ZERO {
            return Err(ValuationError::InvalidInput {
                field: "exit_multiple".into(),
                reason: "Exit multiple must be non-negative".into(),
            });
        }
        let position = self.get_mut(name)?;
        position.exit_multiple = multiple;
        if multiple.is_zero() {
            if position.status != PositionStatus::WrittenOff {
                position.status = PositionStatus::NotYetExited;
            }
        } else {
            position.status = PositionStatus::Active;
        }
        Ok(())
    }

    /// Toggle a company's write-off flag. Marking a write-off zeroes the
    /// multiple; reverting restores [`RESET_MULTIPLE`], not the prior value.
    pub fn set_writeoff(&mut self, name: &str, write_off: bool) -> ValuationResult<()> {
        let position = self.get_mut(name)?;
        if write_off {
            position.status = PositionStatus::WrittenOff;
            position.exit_multiple = Decimal::ZERO;
        } else {
            position.status = PositionStatus::Active;
            position.exit_multiple = RESET_MULTIPLE;
        }
        Ok(())
    }

    /// Apply a stored scenario through the same transitions. Companies in
    /// the scenario but not in the portfolio are skipped; returns how many
    /// were skipped.
    pub fn apply_scenario(&mut self, entry: &ScenarioEntry) -> ValuationResult<usize> {
        let mut skipped = 0usize;
        for (company, setting) in &entry.companies {
            if self.get(company).is_none() {
                skipped += 1;
                continue;
            }
            if setting.write_off {
                self.set_writeoff(company, true)?;
            } else {
                self.set_multiple(company, setting.exit_multiple)?;
            }
        }
        Ok(skipped)
    }

    /// One-time join of the external fair-value table, by case-insensitive,
    /// trimmed company name. Positions without a match keep `None`.
    pub fn join_fair_values(&mut self, records: &[FairValueRecord]) {
        let by_key: HashMap<String, Decimal> = records
            .iter()
            .map(|r| (match_key(&r.company), r.fair_value))
            .collect();
        for position in &mut self.positions {
            position.fair_value_total = by_key.get(&match_key(&position.name)).copied();
        }
    }
}
