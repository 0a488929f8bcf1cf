//! Reviewer-facing messages for workflow failures.
//!
//! Backend messages and codes are matched against known failure phrases
//! and translated into a sentence telling the reviewer what to do next.
//! Raw backend text is only ever passed through after stripping a leading
//! technical code, and only when what remains reads as prose.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{ApiFailure, ValidationError};
use crate::AppError;

/// What the reviewer was doing when the failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fetching the request list.
    LoadList,
    /// Fetching one request's detail.
    LoadRequest,
    /// Fetching eligible resources or swap candidates.
    LoadOptions,
    /// Submitting an approval or rejection.
    SaveDecision,
}

impl Operation {
    /// Sentence used when nothing more specific applies.
    #[must_use]
    pub const fn fallback(self) -> &'static str {
        match self {
            Self::LoadList => "Could not load the request list. Please try again.",
            Self::LoadRequest => "Could not load this request. Please try again.",
            Self::LoadOptions => {
                "Could not load the available rooms or replacement teachers. Retry to load them again."
            }
            Self::SaveDecision => "Something went wrong while saving the decision. Please try again.",
        }
    }
}

/// Known backend failures, matched on normalized code and message text.
const KNOWN_FAILURES: &[(&[&str], &str)] = &[
    (
        &[
            "outside allowed window",
            "outside the allowed window",
            "outside window",
            "session outside",
        ],
        "This session is outside the window in which changes are allowed. Only upcoming sessions inside the permitted period can be changed.",
    ),
    (
        &[
            "no available resource",
            "no resources available",
            "no resource available",
            "no available room",
        ],
        "No rooms or online resources are free for this slot. Ask the teacher to choose another time.",
    ),
    (
        &[
            "resource unavailable",
            "resource not available",
            "resource is not available",
            "resource already booked",
            "resource conflict",
        ],
        "The selected resource is no longer available. Reload the options and pick another one.",
    ),
    (
        &["teacher not found", "replacement teacher not found"],
        "The selected teacher could not be found. Reload the candidates and pick another one.",
    ),
    (
        &[
            "teacher not available",
            "teacher unavailable",
            "teacher schedule conflict",
            "teacher conflict",
        ],
        "The replacement teacher already teaches at that time. Pick another candidate.",
    ),
    (
        &[
            "already processed",
            "already approved",
            "already rejected",
            "not pending",
            "invalid request status",
        ],
        "This request has already been decided. Refresh the list to see its current status.",
    ),
    (
        &["session not found"],
        "The session for this request no longer exists. Refresh the list.",
    ),
    (
        &["reason too short", "reason must be at least", "reason is required"],
        "Please give a more detailed rejection reason.",
    ),
];

/// A leading technical code such as `ERR_RESOURCE:` or
/// `java.lang.IllegalStateException:`.
static TECHNICAL_PREFIX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(?:[\w$]+\.)*[\w$]*(?:Exception|Error)|[A-Z][A-Z0-9_]{2,}|[A-Z]+-\d+)\s*:\s*")
        .ok()
});

/// Identifiers that must not reach the reviewer.
static INTERNAL_TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}|exception|\bat [\w.$]+\(|\bselect\b|\bconstraint\b|[{}<>]")
        .ok()
});

/// Reviewer-facing sentence for a workflow error raised during `operation`.
#[must_use]
pub fn user_message(err: &AppError, operation: Operation) -> String {
    match err {
        AppError::Validation(validation) => validation_message(validation),
        AppError::Api(failure) => api_message(failure, operation),
        AppError::Http(_) => {
            "Could not reach the server. Check your connection and try again.".to_owned()
        }
        AppError::NotFound(message) => known_failure(message)
            .unwrap_or("This request no longer exists. Refresh the list.")
            .to_owned(),
        AppError::Unauthorized(_) => {
            "You are not allowed to do this. Sign in again or contact an administrator.".to_owned()
        }
        AppError::Decode(_) => {
            "The server sent an unexpected response. Please try again.".to_owned()
        }
        AppError::Config(_) | AppError::Io(_) => operation.fallback().to_owned(),
    }
}

/// Reviewer-facing sentence for a guard failure.
#[must_use]
pub fn validation_message(err: &ValidationError) -> String {
    match err {
        ValidationError::NotDecidable(status) => {
            format!("This request is {status} and can no longer be approved or rejected.")
        }
        ValidationError::ReasonTooShort { min, .. } => {
            format!("Please enter a rejection reason of at least {min} characters.")
        }
        ValidationError::ReplacementTeacherRequired => {
            "Please choose a replacement teacher before approving.".to_owned()
        }
        ValidationError::ResourceSelectionRequired => {
            "Please choose a room or online resource before approving.".to_owned()
        }
        ValidationError::OptionsLoading => {
            "Rooms and online resources are still loading. Approve once they appear.".to_owned()
        }
        ValidationError::NoOpenRequest => "Open a request before deciding.".to_owned(),
        ValidationError::DetailNotLoaded => {
            "The request is still loading. Please wait a moment.".to_owned()
        }
        ValidationError::ForbiddenRole => {
            "Your role cannot approve or reject teacher requests.".to_owned()
        }
    }
}

/// Reviewer-facing sentence for a backend failure.
#[must_use]
pub fn api_message(failure: &ApiFailure, operation: Operation) -> String {
    let haystack = match &failure.code {
        Some(code) => format!("{code} {}", failure.message),
        None => failure.message.clone(),
    };
    if let Some(known) = known_failure(&haystack) {
        return known.to_owned();
    }
    readable_suffix(&failure.message).unwrap_or_else(|| operation.fallback().to_owned())
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['_', '-'], " ")
}

fn known_failure(text: &str) -> Option<&'static str> {
    let text = normalize(text);
    KNOWN_FAILURES
        .iter()
        .find(|(needles, _)| needles.iter().any(|needle| text.contains(needle)))
        .map(|(_, message)| *message)
}

/// Strip leading technical codes from the first line and keep the rest if
/// it reads as a sentence.
fn readable_suffix(message: &str) -> Option<String> {
    let first_line = message.lines().next()?.trim();
    if !first_line.contains(':') {
        return None;
    }
    let prefix = TECHNICAL_PREFIX.as_ref()?;
    let mut rest = first_line;
    while let Some(found) = prefix.find(rest) {
        if found.end() == 0 {
            break;
        }
        rest = &rest[found.end()..];
    }
    let rest = rest.trim();
    if rest == first_line || !is_readable(rest) {
        return None;
    }

    let mut chars = rest.chars();
    let mut sentence: String = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    if !sentence.ends_with(['.', '!', '?']) {
        sentence.push('.');
    }
    Some(sentence)
}

fn is_readable(text: &str) -> bool {
    (3..=200).contains(&text.chars().count())
        && text.contains(' ')
        && text.chars().any(char::is_alphabetic)
        && INTERNAL_TOKEN
            .as_ref()
            .is_some_and(|internal| !internal.is_match(text))
}
