use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values, in thousands. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as percentage points (6.0 = 6%/yr) unless noted otherwise.
pub type Rate = Decimal;

/// Exit multiples (e.g., 2.5x invested capital)
pub type Multiple = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Lifecycle of a holding. A zero exit multiple alone does not mean the
/// position is lost: `NotYetExited` marks unresolved holdings, `WrittenOff`
/// marks an explicit, permanent total loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    #[default]
    Active,
    NotYetExited,
    WrittenOff,
}

/// One portfolio holding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyPosition {
    /// Company name; case-insensitive unique key across input sources
    pub name: String,
    /// Amount invested to date (thousands)
    pub invested_amount: Money,
    /// Fund ownership of the company, 0–100
    pub fund_share_pct: Decimal,
    /// Date of the first investment; must not be in the future
    pub first_investment_date: NaiveDate,
    /// Realized proceeds as a multiple of invested amount; 0 when unresolved
    pub exit_multiple: Multiple,
    pub status: PositionStatus,
    /// Company-level fair value (thousands), joined from the fair-value table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fair_value_total: Option<Money>,
    /// Committee-approved amount (thousands), when the source provides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<Money>,
}

impl CompanyPosition {
    pub fn is_writeoff(&self) -> bool {
        self.status == PositionStatus::WrittenOff
    }

    pub fn is_active(&self) -> bool {
        self.status == PositionStatus::Active
    }

    /// The fund's proportional claim on the company's fair value.
    /// `None` when no fair value was matched or the fund holds no share —
    /// missing data, not zero.
    pub fn fair_value_share(&self) -> Option<Money> {
        match self.fair_value_total {
            Some(total) if self.fund_share_pct > Decimal::ZERO => {
                Some(total * self.fund_share_pct / Decimal::ONE_HUNDRED)
            }
            _ => None,
        }
    }
}

/// One row of the external fair-value table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairValueRecord {
    pub company: String,
    pub fair_value: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
