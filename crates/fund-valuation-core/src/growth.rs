//! Per-company growth/uplift analysis.
//!
//! For each active holding: how far is the fund's fair-value share from the
//! index-corrected target, what would a sale at the current multiple return,
//! and how much of the portfolio does the position represent. Records are
//! rebuilt in full on every call; missing fair-value data stays missing
//! rather than becoming zero.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{with_metadata, CompanyPosition, ComputationOutput, Money, Rate};
use crate::valuation::ValuationEngine;
use crate::ValuationResult;

/// Derived growth figures for one active company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub company: String,
    pub invested_amount: Money,
    /// Fund's claim on the company's fair value; `None` when no match
    pub fair_value_share: Option<Money>,
    /// Index-corrected target at the requested excess rate
    pub target_value: Money,
    /// Gap between target and fair-value share; `None` without fair value
    pub uplift_pct: Option<Rate>,
    /// Share of the summed fair-value shares; `None` without fair value
    pub weight_pct: Option<Rate>,
    /// Realized proceeds at the current exit multiple
    pub sale_value: Money,
    pub write_off: bool,
}

/// Build growth records for every active position (write-offs and
/// not-yet-exited holdings are excluded).
pub fn analyze_growth(
    positions: &[CompanyPosition],
    engine: &ValuationEngine,
    excess_rate_pct: Rate,
) -> ValuationResult<ComputationOutput<Vec<GrowthRecord>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if engine.is_degraded() {
        warnings.push(format!(
            "Index series unavailable; compounding fixed fallback rate of {}%/yr",
            engine.fallback_annual_rate() * Decimal::ONE_HUNDRED
        ));
    }

    let mut records: Vec<GrowthRecord> = Vec::new();
    for position in positions.iter().filter(|p| p.is_active()) {
        let target_value = engine.correct(
            position.invested_amount,
            position.first_investment_date,
            excess_rate_pct,
        )?;

        let fair_value_share = position.fair_value_share();
        if fair_value_share.is_none() {
            warnings.push(format!(
                "No fair value match for '{}'; uplift and weight are undefined",
                position.name
            ));
        }

        let uplift_pct = match fair_value_share {
            Some(share) if !share.is_zero() => {
                Some((target_value - share) / share * Decimal::ONE_HUNDRED)
            }
            _ => None,
        };

        records.push(GrowthRecord {
            company: position.name.clone(),
            invested_amount: position.invested_amount,
            fair_value_share,
            target_value,
            uplift_pct,
            weight_pct: None,
            sale_value: position.invested_amount * position.exit_multiple,
            write_off: position.is_writeoff(),
        });
    }

    if records.is_empty() {
        warnings.push("No active holdings".to_string());
    }

    // Second pass: portfolio weights over the summed fair-value shares.
    // Missing shares contribute nothing to the denominator and keep their
    // weight undefined.
    let total_share: Decimal = records
        .iter()
        .filter_map(|r| r.fair_value_share)
        .sum();
    if total_share.is_zero() {
        if records.iter().any(|r| r.fair_value_share.is_some()) {
            warnings.push(
                "Total fair-value share is zero; portfolio weights are undefined".to_string(),
            );
        }
    } else {
        for record in &mut records {
            record.weight_pct = record
                .fair_value_share
                .map(|share| share / total_share * Decimal::ONE_HUNDRED);
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Per-company growth analysis: index-corrected target vs. fair-value share",
        &serde_json::json!({
            "excess_rate_pct": excess_rate_pct.to_string(),
            "as_of": engine.as_of().to_string(),
            "fallback_rate_active": engine.is_degraded(),
        }),
        warnings,
        elapsed,
        records,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> ValuationEngine {
        // No series: deterministic fallback compounding
        ValuationEngine::new(None, date(2025, 6, 15))
    }

    fn position(name: &str, invested: Decimal, share_pct: Decimal) -> CompanyPosition {
        CompanyPosition {
            name: name.to_string(),
            invested_amount: invested,
            fund_share_pct: share_pct,
            first_investment_date: date(2023, 6, 15),
            exit_multiple: dec!(1.0),
            status: PositionStatus::Active,
            fair_value_total: None,
            approved_amount: None,
        }
    }

    #[test]
    fn test_fair_value_share_is_ownership_fraction() {
        let mut p = position("Acme", dec!(100), dec!(25));
        p.fair_value_total = Some(dec!(4000));
        let output = analyze_growth(&[p], &engine(), dec!(6)).unwrap();
        assert_eq!(output.result[0].fair_value_share, Some(dec!(1000)));
    }

    #[test]
    fn test_missing_fair_value_stays_missing() {
        let p = position("Acme", dec!(100), dec!(25));
        let output = analyze_growth(&[p], &engine(), dec!(6)).unwrap();
        let record = &output.result[0];
        assert_eq!(record.fair_value_share, None);
        assert_eq!(record.uplift_pct, None);
        assert_eq!(record.weight_pct, None);
        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("No fair value match")));
    }

    #[test]
    fn test_weights_exclude_missing_shares_from_denominator() {
        let mut with_fv = position("Acme", dec!(100), dec!(50));
        with_fv.fair_value_total = Some(dec!(100)); // share = 50
        let without_fv = position("Globex", dec!(200), dec!(30));

        let output = analyze_growth(&[with_fv, without_fv], &engine(), dec!(6)).unwrap();
        assert_eq!(output.result[0].weight_pct, Some(dec!(100)));
        assert_eq!(output.result[1].weight_pct, None);
    }

    #[test]
    fn test_weights_sum_to_100_across_present_shares() {
        let mut a = position("A", dec!(100), dec!(100));
        a.fair_value_total = Some(dec!(300));
        let mut b = position("B", dec!(100), dec!(100));
        b.fair_value_total = Some(dec!(100));

        let output = analyze_growth(&[a, b], &engine(), dec!(6)).unwrap();
        assert_eq!(output.result[0].weight_pct, Some(dec!(75)));
        assert_eq!(output.result[1].weight_pct, Some(dec!(25)));
    }

    #[test]
    fn test_non_active_positions_excluded() {
        let mut written_off = position("Gone", dec!(100), dec!(10));
        written_off.status = PositionStatus::WrittenOff;
        written_off.exit_multiple = dec!(0);
        let mut unresolved = position("Waiting", dec!(100), dec!(10));
        unresolved.status = PositionStatus::NotYetExited;
        unresolved.exit_multiple = dec!(0);
        let active = position("Acme", dec!(100), dec!(10));

        let output =
            analyze_growth(&[written_off, unresolved, active], &engine(), dec!(6)).unwrap();
        assert_eq!(output.result.len(), 1);
        assert_eq!(output.result[0].company, "Acme");
    }

    #[test]
    fn test_sale_value_uses_exit_multiple() {
        let mut p = position("Acme", dec!(100), dec!(10));
        p.exit_multiple = dec!(2.5);
        let output = analyze_growth(&[p], &engine(), dec!(6)).unwrap();
        assert_eq!(output.result[0].sale_value, dec!(250));
    }

    #[test]
    fn test_degraded_mode_is_flagged() {
        let p = position("Acme", dec!(100), dec!(10));
        let output = analyze_growth(&[p], &engine(), dec!(6)).unwrap();
        assert!(output
            .warnings
            .iter()
            .any(|w| w.contains("fallback rate")));
    }

    #[test]
    fn test_empty_active_set_reported() {
        let mut p = position("Gone", dec!(100), dec!(10));
        p.status = PositionStatus::WrittenOff;
        let output = analyze_growth(&[p], &engine(), dec!(6)).unwrap();
        assert!(output.result.is_empty());
        assert!(output.warnings.iter().any(|w| w.contains("No active holdings")));
    }

    #[test]
    fn test_zero_fair_value_share_keeps_uplift_undefined() {
        let mut p = position("Acme", dec!(100), dec!(25));
        p.fair_value_total = Some(dec!(0));
        let output = analyze_growth(&[p], &engine(), dec!(6)).unwrap();
        assert_eq!(output.result[0].fair_value_share, Some(dec!(0)));
        assert_eq!(output.result[0].uplift_pct, None);
    }
}
