//! Error types shared across the application.

use std::fmt::{Display, Formatter};

use crate::models::request::RequestStatus;

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Transport-level failure talking to the request API (connect, timeout, TLS).
    Http(String),
    /// The request API answered with a failure status or a failure envelope.
    Api(ApiFailure),
    /// Payload from the request API did not match any accepted shape.
    Decode(String),
    /// Client-side guard rejected the action before any network call.
    Validation(ValidationError),
    /// Requested entity does not exist.
    NotFound(String),
    /// Caller is not authorized to perform the requested action.
    Unauthorized(String),
    /// File-system or I/O operation failure.
    Io(String),
}

/// Failure reported by the request API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// HTTP status code, when the failure came with one.
    pub status: Option<u16>,
    /// Backend error code (e.g. `RESOURCE_UNAVAILABLE`), if supplied.
    pub code: Option<String>,
    /// Backend message, verbatim. Never shown to reviewers without mapping.
    pub message: String,
}

impl Display for ApiFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(status) = self.status {
            write!(f, "status {status}: ")?;
        }
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Client-side guard failures for reviewer decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The request is not in a decidable state.
    NotDecidable(RequestStatus),
    /// Trimmed rejection reason is shorter than the configured minimum.
    ReasonTooShort {
        /// Required minimum number of characters.
        min: usize,
        /// Characters supplied after trimming.
        actual: usize,
    },
    /// Swap approval needs a replacement teacher.
    ReplacementTeacherRequired,
    /// Eligible resources exist but none was selected.
    ResourceSelectionRequired,
    /// Approval options are still loading, so the resource guard cannot run.
    OptionsLoading,
    /// No request is open in the review panel.
    NoOpenRequest,
    /// The open request's detail has not loaded yet.
    DetailNotLoaded,
    /// The reviewer's roles do not permit deciding requests.
    ForbiddenRole,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotDecidable(status) => {
                write!(f, "request is {status} and can no longer be decided")
            }
            Self::ReasonTooShort { min, actual } => write!(
                f,
                "rejection reason must be at least {min} characters (got {actual})"
            ),
            Self::ReplacementTeacherRequired => {
                write!(f, "select a replacement teacher before approving")
            }
            Self::ResourceSelectionRequired => {
                write!(f, "select a resource before approving")
            }
            Self::OptionsLoading => write!(f, "approval options are still loading"),
            Self::NoOpenRequest => write!(f, "no request is open"),
            Self::DetailNotLoaded => write!(f, "request detail is still loading"),
            Self::ForbiddenRole => write!(f, "your role cannot decide teacher requests"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Http(msg) => write!(f, "http: {msg}"),
            Self::Api(failure) => write!(f, "api: {failure}"),
            Self::Decode(msg) => write!(f, "decode: {msg}"),
            Self::Validation(err) => write!(f, "validation: {err}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}
