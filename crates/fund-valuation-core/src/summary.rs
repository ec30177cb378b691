//! Fund-level aggregation.
//!
//! Rolls the position table and its growth records into portfolio totals:
//! invested, realized, written off, corrected at the rates of interest, and
//! the growth still needed to reach the nominal hurdle.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::growth::GrowthRecord;
use crate::types::{with_metadata, CompanyPosition, ComputationOutput, Money, Rate};
use crate::valuation::ValuationEngine;
use crate::ValuationResult;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PositionCounts {
    pub active: usize,
    pub not_yet_exited: usize,
    pub written_off: usize,
}

/// Corrected totals over all non-written-off positions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CorrectedTotals {
    /// Pure index correction (excess rate 0)
    pub index_only: Money,
    /// At the requested excess rate
    pub at_excess_rate: Money,
    /// At the nominal hurdle rate
    pub at_hurdle: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Invested across every position, written off or not
    pub total_invested: Money,
    /// Committee-approved total, when the source carries approved amounts
    pub total_approved: Option<Money>,
    /// Sale proceeds over non-write-off growth records
    pub total_realized_sale: Money,
    /// Invested amount lost to write-offs
    pub total_writeoff: Money,
    /// Invested amount over non-written-off positions; the hurdle base
    pub active_invested: Money,
    pub corrected: CorrectedTotals,
    /// `active_invested` grown by the nominal hurdle
    pub hurdle_target: Money,
    /// Growth needed to reach the hurdle target; `None` when there is no
    /// active base (e.g. everything written off)
    pub growth_needed_pct: Option<Rate>,
    pub counts: PositionCounts,
    pub degraded_index: bool,
}

/// Aggregate positions and growth records into a fund-level summary.
pub fn summarize_portfolio(
    positions: &[CompanyPosition],
    growth_records: &[GrowthRecord],
    excess_rate_pct: Rate,
    nominal_hurdle_pct: Rate,
    engine: &ValuationEngine,
) -> ValuationResult<ComputationOutput<PortfolioSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if positions.is_empty() {
        return Err(ValuationError::InsufficientData(
            "At least one position required".into(),
        ));
    }

    if engine.is_degraded() {
        warnings.push(format!(
            "Index series unavailable; compounding fixed fallback rate of {}%/yr",
            engine.fallback_annual_rate() * Decimal::ONE_HUNDRED
        ));
    }

    let total_invested: Money = positions.iter().map(|p| p.invested_amount).sum();

    let approved: Vec<Money> = positions.iter().filter_map(|p| p.approved_amount).collect();
    let total_approved = if approved.is_empty() {
        None
    } else {
        Some(approved.iter().copied().sum())
    };

    let total_realized_sale: Money = growth_records
        .iter()
        .filter(|r| !r.write_off)
        .map(|r| r.sale_value)
        .sum();

    let total_writeoff: Money = positions
        .iter()
        .filter(|p| p.is_writeoff())
        .map(|p| p.invested_amount)
        .sum();

    let counts = PositionCounts {
        active: positions.iter().filter(|p| p.is_active()).count(),
        not_yet_exited: positions
            .iter()
            .filter(|p| p.status == crate::types::PositionStatus::NotYetExited)
            .count(),
        written_off: positions.iter().filter(|p| p.is_writeoff()).count(),
    };

    // Corrected totals cover everything still held: active and unresolved
    // positions alike, excluding only write-offs.
    let mut index_only = Decimal::ZERO;
    let mut at_excess_rate = Decimal::ZERO;
    let mut at_hurdle = Decimal::ZERO;
    let mut active_invested = Decimal::ZERO;
    for position in positions.iter().filter(|p| !p.is_writeoff()) {
        index_only += engine.correct(
            position.invested_amount,
            position.first_investment_date,
            Decimal::ZERO,
        )?;
        at_excess_rate += engine.correct(
            position.invested_amount,
            position.first_investment_date,
            excess_rate_pct,
        )?;
        at_hurdle += engine.correct(
            position.invested_amount,
            position.first_investment_date,
            nominal_hurdle_pct,
        )?;
        active_invested += position.invested_amount;
    }

    let hurdle_target = active_invested * (Decimal::ONE + nominal_hurdle_pct / Decimal::ONE_HUNDRED);
    let growth_needed_pct = if active_invested.is_zero() {
        warnings.push(
            "No active holdings; growth needed to reach the hurdle is undefined".to_string(),
        );
        None
    } else {
        Some((hurdle_target - active_invested) / active_invested * Decimal::ONE_HUNDRED)
    };

    let summary = PortfolioSummary {
        total_invested,
        total_approved,
        total_realized_sale,
        total_writeoff,
        active_invested,
        corrected: CorrectedTotals {
            index_only,
            at_excess_rate,
            at_hurdle,
        },
        hurdle_target,
        growth_needed_pct,
        counts,
        degraded_index: engine.is_degraded(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio aggregation: invested, realized, written off, index-corrected totals",
        &serde_json::json!({
            "excess_rate_pct": excess_rate_pct.to_string(),
            "nominal_hurdle_pct": nominal_hurdle_pct.to_string(),
            "as_of": engine.as_of().to_string(),
        }),
        warnings,
        elapsed,
        summary,
    ))
}
