use thiserror::Error;

/// Inputs the engine refuses to reconcile.
///
/// Both areas must be finite and strictly positive, and every scaled parcel must
/// round to an `i64`. Without the area check a zero calculated area would turn
/// every adjusted area into `inf`/`NaN`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("registered area must be a positive number, got {0}")]
    InvalidRegisteredArea(f64),

    #[error("calculated area must be a positive number, got {0}")]
    InvalidCalculatedArea(f64),

    /// A scaled parcel area that no longer rounds to a whole number of m².
    #[error("adjusted area of parcel '{label}' is out of range: {area}")]
    AreaOutOfRange { label: String, area: f64 },

    #[error("total rounded area overflows")]
    TotalOutOfRange,
}

/// Reconciliation job file errors.
#[derive(Error, Debug)]
pub enum JobError {
    /// TOML parse / deserialization error.
    #[error("job parse error: {0}")]
    Parse(String),

    /// Job validation error (bad parcel entry, empty file reference, etc.).
    #[error("job validation error: {0}")]
    Validation(String),
}
