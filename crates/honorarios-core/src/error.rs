use rust_decimal::Decimal;
use thiserror::Error;

/// Problems with the runtime configuration. Reported once at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: set the {0} environment variable")]
    MissingCredential(&'static str),

    #[error("contingency factor must be between 0 and 1, got {0}")]
    InvalidContingencyFactor(Decimal),

    #[error("retry count must be 0 or 1, got {0}")]
    InvalidRetryCount(u8),

    #[error("floor table {}: {source}", .path.display())]
    FloorTableIo {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("floor table JSON error: {0}")]
    FloorTableJson(#[from] serde_json::Error),

    #[error("floor table lists unknown case type {0:?}")]
    UnknownFloorCaseType(String),

    #[error("floor table lists {0:?} more than once")]
    DuplicateFloorCaseType(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,

    #[error("negative floor amount {amount} for case type {case_type:?}")]
    NegativeFloor { case_type: String, amount: Decimal },
}

/// User input rejected before any calculation or network call.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("case value must be positive, got {0}")]
    NonPositiveCaseValue(Decimal),

    #[error("unknown case type: {0:?}")]
    UnknownCaseType(String),

    #[error("unknown complexity: {0:?}")]
    UnknownComplexity(String),

    #[error("unknown procedural phase: {0:?}")]
    UnknownPhase(String),
}

/// A monetary amount that could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("not a number: {0:?}")]
    Invalid(String),
}
