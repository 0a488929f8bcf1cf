//! Request lifecycle and decision guards.
//!
//! `PENDING` is the only decidable state. `APPROVED` and `REJECTED` are
//! terminal; `WAITING_CONFIRM` belongs to a confirmation flow outside the
//! reviewer's reach and is treated as closed here.
//!
//! Guards run before any repository call. The backend validates again on
//! its side; both checks are needed.

use crate::errors::ValidationError;
use crate::models::decision::{ApprovePayload, Decision, DecisionAction, RejectPayload};
use crate::models::request::{RequestStatus, RequestType, TeacherRequest};

impl RequestStatus {
    /// Whether a reviewer may approve or reject in this state.
    #[must_use]
    pub const fn can_decide(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the request can never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Checks if a reviewer-driven transition is valid.
    ///
    /// Valid transitions are:
    /// - Pending → Approved
    /// - Pending → Rejected
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!((self, target), (Self::Pending, Self::Approved | Self::Rejected))
    }
}

impl DecisionAction {
    /// Status a successful decision moves the request into.
    #[must_use]
    pub const fn target_status(self) -> RequestStatus {
        match self {
            Self::Approve => RequestStatus::Approved,
            Self::Reject => RequestStatus::Rejected,
        }
    }
}

/// Reviewer input collected in the decision form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Chosen resource (modality change and reschedule).
    pub resource_id: Option<i64>,
    /// Chosen replacement teacher (swap).
    pub candidate_id: Option<i64>,
    /// Free text: approval note, or rejection reason when rejecting.
    pub note: String,
}

/// Check the guards for `action` and assemble the payload to submit.
///
/// `eligible_resources` is the number of eligible resources currently
/// loaded for the request; zero when they are not loaded.
///
/// # Errors
///
/// Returns the first [`ValidationError`] whose guard fails.
pub fn validate(
    request: &TeacherRequest,
    action: DecisionAction,
    selection: &Selection,
    eligible_resources: usize,
    min_reason_len: usize,
) -> Result<Decision, ValidationError> {
    if !request.status.can_transition_to(action.target_status()) {
        return Err(ValidationError::NotDecidable(request.status));
    }
    match action {
        DecisionAction::Approve => {
            validate_approve(request, selection, eligible_resources).map(Decision::Approve)
        }
        DecisionAction::Reject => {
            validate_reject(&selection.note, min_reason_len).map(Decision::Reject)
        }
    }
}

/// Approval guards.
///
/// # Errors
///
/// `ReplacementTeacherRequired` for a swap with neither a selected nor an
/// existing replacement; `ResourceSelectionRequired` for a modality change
/// or reschedule with eligible resources but no selection.
pub fn validate_approve(
    request: &TeacherRequest,
    selection: &Selection,
    eligible_resources: usize,
) -> Result<ApprovePayload, ValidationError> {
    let note = Some(selection.note.trim().to_owned()).filter(|n| !n.is_empty());

    match request.request_type {
        RequestType::Swap => {
            let replacement = selection
                .candidate_id
                .or_else(|| request.existing_replacement_teacher_id())
                .ok_or(ValidationError::ReplacementTeacherRequired)?;
            Ok(ApprovePayload {
                note,
                replacement_teacher_id: Some(replacement),
                new_resource_id: None,
            })
        }
        RequestType::ModalityChange | RequestType::Reschedule => {
            if eligible_resources > 0 && selection.resource_id.is_none() {
                return Err(ValidationError::ResourceSelectionRequired);
            }
            Ok(ApprovePayload {
                note,
                replacement_teacher_id: None,
                new_resource_id: selection.resource_id,
            })
        }
    }
}

/// Rejection guard: the trimmed reason must have at least `min_len` characters.
///
/// # Errors
///
/// Returns `ReasonTooShort` when the reason is shorter.
pub fn validate_reject(reason: &str, min_len: usize) -> Result<RejectPayload, ValidationError> {
    let reason = reason.trim();
    let actual = reason.chars().count();
    if actual < min_len {
        return Err(ValidationError::ReasonTooShort {
            min: min_len,
            actual,
        });
    }
    Ok(RejectPayload {
        reason: reason.to_owned(),
    })
}
