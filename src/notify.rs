//! Reviewer notices (success and failure toasts).
//!
//! The workflow reports outcomes through the [`Notifier`] trait so that
//! front ends decide how to show them. [`TracingNotifier`] records them as
//! structured log events.

use std::fmt::{Display, Formatter};

use tracing::{info, warn};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// A decision went through.
    Success,
    /// Input was rejected before submission.
    Validation,
    /// The backend or network failed.
    Error,
}

impl Display for NoticeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Validation => f.write_str("validation"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A message for the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Reviewer-facing sentence.
    pub message: String,
    /// Request the notice concerns.
    pub request_id: Option<i64>,
}

impl Notice {
    /// Construct a notice for `request_id`.
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>, request_id: Option<i64>) -> Self {
        Self {
            level,
            message: message.into(),
            request_id,
        }
    }
}

/// Sink for reviewer notices.
pub trait Notifier: Send + Sync {
    /// Deliver a notice. Must not block.
    fn notify(&self, notice: Notice);
}

/// Notifier that emits notices as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => {
                info!(request_id = ?notice.request_id, message = %notice.message, "decision saved");
            }
            NoticeLevel::Validation | NoticeLevel::Error => {
                warn!(
                    request_id = ?notice.request_id,
                    level = %notice.level,
                    message = %notice.message,
                    "decision not saved"
                );
            }
        }
    }
}
