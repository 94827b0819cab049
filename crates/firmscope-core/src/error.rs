use thiserror::Error;

/// Validation and contract errors exposed by `firmscope-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("company name cannot be empty")]
    EmptyCompanyName,

    #[error("invalid source '{value}', expected one of crunchbase, linkedin, websearch, directweb")]
    InvalidSource { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("founded year {year} must be a 4-digit year after 1900 and no later than {max}")]
    FoundedYearOutOfRange { year: i32, max: i32 },

    #[error("'{field}' entries cannot be empty or whitespace-only")]
    BlankEntry { field: &'static str },

    #[error("successful source count {successful} exceeds total source count {total}")]
    SourceCountExceedsTotal { successful: u32, total: u32 },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
