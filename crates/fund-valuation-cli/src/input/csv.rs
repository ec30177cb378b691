//! Tabular ingestion: the investments and fair-value tables.
//!
//! Optional columns (`exit_multiple`, `write_off`, `approved_amount`) are
//! resolved to concrete values once here; nothing downstream probes for
//! their presence.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use fund_valuation_core::types::{CompanyPosition, FairValueRecord, PositionStatus};

/// Multiple assumed when the investments table has no `exit_multiple` column.
const DEFAULT_EXIT_MULTIPLE: Decimal = dec!(1.0);

#[derive(Debug, Deserialize)]
struct InvestmentRow {
    company: String,
    invested_amount: Decimal,
    fund_share_pct: Decimal,
    first_investment_date: String,
    #[serde(default)]
    exit_multiple: Option<Decimal>,
    #[serde(default)]
    write_off: Option<String>,
    #[serde(default)]
    approved_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct FairValueRow {
    company: String,
    fair_value: Decimal,
}

/// Accepts ISO (`YYYY-MM-DD`) and day-first (`DD/MM/YYYY`) dates.
pub fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| format!("Unparsable date '{}'; expected YYYY-MM-DD or DD/MM/YYYY", raw).into())
}

fn parse_write_off(raw: Option<&str>) -> bool {
    matches!(
        raw.map(str::trim),
        Some("1") | Some("true") | Some("True")
    )
}

/// Load the investments table. A missing or unreadable file is fatal to the
/// run; the caller reports it once and stops.
pub fn read_investments(path: &str) -> Result<Vec<CompanyPosition>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to read investments table '{}': {}", path, e))?;

    let mut positions = Vec::new();
    for row in reader.deserialize() {
        let row: InvestmentRow =
            row.map_err(|e| format!("Malformed row in '{}': {}", path, e))?;

        let exit_multiple = row.exit_multiple.unwrap_or(DEFAULT_EXIT_MULTIPLE);
        let status = if parse_write_off(row.write_off.as_deref()) {
            PositionStatus::WrittenOff
        } else {
            PositionStatus::Active
        };

        positions.push(CompanyPosition {
            name: row.company,
            invested_amount: row.invested_amount,
            fund_share_pct: row.fund_share_pct,
            first_investment_date: parse_date(&row.first_investment_date)?,
            exit_multiple,
            status,
            fair_value_total: None,
            approved_amount: row.approved_amount,
        });
    }

    if positions.is_empty() {
        return Err(format!("Investments table '{}' has no rows", path).into());
    }
    Ok(positions)
}

/// Load the fair-value table.
pub fn read_fair_values(path: &str) -> Result<Vec<FairValueRecord>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| format!("Failed to read fair-value table '{}': {}", path, e))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let row: FairValueRow = row.map_err(|e| format!("Malformed row in '{}': {}", path, e))?;
        records.push(FairValueRecord {
            company: row.company,
            fair_value: row.fair_value,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(tag: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fva-csv-test-{}-{}.csv",
            tag,
            std::process::id()
        ));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_optional_columns_get_documented_defaults() {
        let path = write_temp(
            "defaults",
            "company,invested_amount,fund_share_pct,first_investment_date\n\
             Acme,1000,25,2021-03-01\n",
        );
        let positions = read_investments(path.to_str().unwrap()).unwrap();
        assert_eq!(positions[0].exit_multiple, dec!(1.0));
        assert_eq!(positions[0].status, PositionStatus::Active);
        assert_eq!(positions[0].approved_amount, None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_write_off_column_accepts_spreadsheet_booleans() {
        let path = write_temp(
            "writeoff",
            "company,invested_amount,fund_share_pct,first_investment_date,exit_multiple,write_off\n\
             Acme,1000,25,2021-03-01,0,1\n\
             Globex,500,10,2020-06-15,2.0,false\n",
        );
        let positions = read_investments(path.to_str().unwrap()).unwrap();
        assert_eq!(positions[0].status, PositionStatus::WrittenOff);
        assert_eq!(positions[1].status, PositionStatus::Active);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_day_first_dates_accepted() {
        let path = write_temp(
            "dates",
            "company,invested_amount,fund_share_pct,first_investment_date\n\
             Acme,1000,25,01/03/2021\n",
        );
        let positions = read_investments(path.to_str().unwrap()).unwrap();
        assert_eq!(
            positions[0].first_investment_date,
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        assert!(read_investments("/nonexistent/investments.csv").is_err());
    }

    #[test]
    fn test_empty_table_is_fatal() {
        let path = write_temp(
            "empty",
            "company,invested_amount,fund_share_pct,first_investment_date\n",
        );
        assert!(read_investments(path.to_str().unwrap()).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
