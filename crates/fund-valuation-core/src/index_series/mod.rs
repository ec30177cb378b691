//! Monthly price-index series and cumulative compounding.
//!
//! The series is fetched once per process (see [`remote`]) and treated as
//! immutable. Wire payloads are JSON arrays of
//! `{ "date": "DD/MM/YYYY", "value": <string-or-number> }` where values are
//! percentage points; rows that fail to parse are dropped.

#[cfg(feature = "remote-index")]
pub mod remote;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

const WIRE_DATE_FORMAT: &str = "%d/%m/%Y";

/// One monthly observation of the price index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexObservation {
    pub date: NaiveDate,
    /// Monthly variation as a decimal fraction (0.005 = 0.5% for the month)
    pub monthly_rate: Decimal,
}

/// An immutable, date-ordered monthly index series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSeries {
    observations: Vec<IndexObservation>,
}

impl IndexSeries {
    pub fn new(mut observations: Vec<IndexObservation>) -> Self {
        observations.sort_by_key(|o| o.date);
        IndexSeries { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[IndexObservation] {
        &self.observations
    }

    /// Cumulative compounding factor over all observations dated on or after
    /// `from_date`: the product of `(1 + monthly_rate)`. Returns 1.0 when no
    /// observation qualifies (no correction).
    pub fn cumulative_factor(&self, from_date: NaiveDate) -> Decimal {
        self.observations
            .iter()
            .filter(|o| o.date >= from_date)
            .fold(Decimal::ONE, |acc, o| acc * (Decimal::ONE + o.monthly_rate))
    }
}

#[derive(Debug, Deserialize)]
struct WireObservation {
    date: String,
    value: serde_json::Value,
}

fn parse_wire_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        _ => None,
    }
}

/// Parse a wire payload into a series. Returns `None` when the payload is not
/// a JSON array of observations or no row survives parsing — callers treat
/// that as "series unavailable", not as an error.
pub fn parse_wire_series(body: &str) -> Option<IndexSeries> {
    let rows: Vec<WireObservation> = serde_json::from_str(body).ok()?;
    let total = rows.len();

    let observations: Vec<IndexObservation> = rows
        .iter()
        .filter_map(|row| {
            let date = NaiveDate::parse_from_str(row.date.trim(), WIRE_DATE_FORMAT).ok()?;
            // Values arrive as percentage points
            let monthly_rate = parse_wire_value(&row.value)? / Decimal::ONE_HUNDRED;
            Some(IndexObservation { date, monthly_rate })
        })
        .collect();

    if observations.len() < total {
        debug!(
            dropped = total - observations.len(),
            total, "dropped unparsable index observations"
        );
    }

    if observations.is_empty() {
        return None;
    }
    Some(IndexSeries::new(observations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn obs(y: i32, m: u32, rate: Decimal) -> IndexObservation {
        IndexObservation {
            date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
            monthly_rate: rate,
        }
    }

    #[test]
    fn test_cumulative_factor_product() {
        let series = IndexSeries::new(vec![
            obs(2024, 1, dec!(0.01)),
            obs(2024, 2, dec!(0.02)),
            obs(2024, 3, dec!(0.005)),
        ]);
        let factor = series.cumulative_factor(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        // 1.01 * 1.02 * 1.005
        assert_eq!(factor, dec!(1.01) * dec!(1.02) * dec!(1.005));
    }

    #[test]
    fn test_cumulative_factor_respects_from_date() {
        let series = IndexSeries::new(vec![
            obs(2024, 1, dec!(0.01)),
            obs(2024, 2, dec!(0.02)),
        ]);
        let factor = series.cumulative_factor(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(factor, dec!(1.02));
    }

    #[test]
    fn test_cumulative_factor_no_qualifying_observations() {
        let series = IndexSeries::new(vec![obs(2024, 1, dec!(0.01))]);
        let factor = series.cumulative_factor(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(factor, Decimal::ONE);
    }

    #[test]
    fn test_parse_wire_series_string_and_number_values() {
        let body = r#"[
            {"date": "01/01/2024", "value": "0.53"},
            {"date": "01/02/2024", "value": 0.42}
        ]"#;
        let series = parse_wire_series(body).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.observations()[0].monthly_rate, dec!(0.0053));
    }

    #[test]
    fn test_parse_wire_series_drops_bad_rows() {
        let body = r#"[
            {"date": "01/01/2024", "value": "0.53"},
            {"date": "not-a-date", "value": "0.10"},
            {"date": "01/03/2024", "value": "n/a"}
        ]"#;
        let series = parse_wire_series(body).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_parse_wire_series_unavailable_on_garbage() {
        assert!(parse_wire_series("not json").is_none());
        assert!(parse_wire_series("[]").is_none());
        assert!(parse_wire_series(r#"[{"date": "bad", "value": "x"}]"#).is_none());
    }

    #[test]
    fn test_observations_sorted_on_construction() {
        let series = IndexSeries::new(vec![
            obs(2024, 3, dec!(0.03)),
            obs(2024, 1, dec!(0.01)),
        ]);
        assert!(series.observations()[0].date < series.observations()[1].date);
    }
}
