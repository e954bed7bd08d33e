use honorarios_core::{ConfigError, InputError};
use thiserror::Error;

/// Failure of the generative text service.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model returned no text (finish reason: {})", .finish_reason.as_deref().unwrap_or("unknown"))]
    EmptyResponse { finish_reason: Option<String> },
}

impl GenerationError {
    /// Worth one more attempt: timeouts, connection failures, rate limits
    /// and server-side errors.
    pub fn is_transient(&self) -> bool {
        match self {
            GenerationError::Timeout => true,
            GenerationError::Http(e) => e.is_timeout() || e.is_connect(),
            GenerationError::Server { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Http(err)
        }
    }
}

/// Failure of a whole calculation. No estimate is produced.
#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("generative service error: {0}")]
    Upstream(#[from] GenerationError),
}
