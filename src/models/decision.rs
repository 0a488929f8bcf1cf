//! Reviewer decision payloads sent to the request API.

use serde::Serialize;

/// Decision a reviewer can take on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    /// Approve, optionally choosing a resource or replacement teacher.
    Approve,
    /// Reject with a reason.
    Reject,
}

/// Body of an approve call. Absent fields are omitted from the JSON.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovePayload {
    /// Optional reviewer note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Replacement teacher (swap requests only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_teacher_id: Option<i64>,
    /// Chosen resource (modality change and reschedule only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_resource_id: Option<i64>,
}

/// Body of a reject call.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RejectPayload {
    /// Trimmed rejection reason.
    pub reason: String,
}

/// Validated decision ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Approve with the assembled payload.
    Approve(ApprovePayload),
    /// Reject with the assembled payload.
    Reject(RejectPayload),
}

impl Decision {
    /// The action this decision carries out.
    #[must_use]
    pub const fn action(&self) -> DecisionAction {
        match self {
            Self::Approve(_) => DecisionAction::Approve,
            Self::Reject(_) => DecisionAction::Reject,
        }
    }
}
