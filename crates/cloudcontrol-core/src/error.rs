//! Error types for CloudControl operations.
//!
//! Every CloudControl crate shares the [`Error`] type defined here. Failures raised while waiting
//! for an asynchronous operation are kept distinct from one another so callers can tell an
//! intentional abort ([`Error::Cancelled`]) apart from a genuine failure.

use thiserror::Error;

/// Error raised when a wait is aborted through the client's cancellation flag.
///
/// Cancellation is never retried. Callers that want to treat an abort as expected can match on
/// [`Error::Cancelled`] or use [`Error::is_cancelled`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("operation cancelled: {description}")]
pub struct OperationCancelledError {
    /// Description of the operation that was cancelled.
    pub description: String,
}

impl OperationCancelledError {
    /// Create a cancellation error for the given operation description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Main error type for CloudControl operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Deadline elapsed while waiting for a resource to settle
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Wait aborted through the cancellation flag
    #[error(transparent)]
    Cancelled(#[from] OperationCancelledError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource reported a state outside the known pending/terminal set
    #[error("{action} failed for {kind} '{name}' ({id}): encountered unexpected state '{state}'")]
    UnexpectedState {
        /// Action being waited on (e.g. "Deploy")
        action: String,
        /// Human-readable resource kind
        kind: String,
        /// Resource name
        name: String,
        /// Resource id
        id: String,
        /// Offending state reported by the server
        state: String,
    },

    /// Transport retry budget consumed without a successful send
    #[error("{description} failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        /// Description of the request that was being sent
        description: String,
        /// Number of send attempts made
        attempts: u32,
        /// Last transport error observed
        #[source]
        last: Box<Error>,
    },

    /// Connection-level failure while sending a request
    #[error("Transport error: {0}")]
    Transport(String),

    /// CloudControl returned a non-success response
    #[error("CloudControl API error {status} ({response_code}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// CloudControl response code (e.g. `INVALID_INPUT_DATA`)
        response_code: String,
        /// Message supplied by the API
        message: String,
    },

    /// Failed to parse a CloudControl response
    #[error("Failed to parse CloudControl response: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid UUID format
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Specialized result type for CloudControl operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "TIMEOUT",
            Self::Cancelled(_) => "CANCELLED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UnexpectedState { .. } => "UNEXPECTED_STATE",
            Self::RetriesExhausted { .. } => "RETRIES_EXHAUSTED",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Api { .. } => "API_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidUuid(_) => "INVALID_UUID",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if this error is an intentional abort rather than a failure.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns true if the transport retry loop should retry after this error.
    ///
    /// Only connection-level failures qualify. A request reqwest refused to build is not.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::InternalError(_) | Self::ConfigError(_) | Self::RetriesExhausted { .. }
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Self::InvalidUuid(err.to_string())
    }
}
