pub mod error;
pub mod growth;
pub mod index_series;
pub mod positions;
pub mod scenario;
pub mod summary;
pub mod types;
pub mod valuation;

pub use error::ValuationError;
pub use types::*;

/// Standard result type for all fund-valuation operations
pub type ValuationResult<T> = Result<T, ValuationError>;
