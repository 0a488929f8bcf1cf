//! Request type registry.
//!
//! Declares, per request type, its label, which side data a reviewer must
//! see before deciding, and where each payload field may live in upstream
//! JSON. [`describe`] is total over [`RequestType`]; adding a variant fails
//! to compile here until it is described.

use crate::models::request::{RequestPayload, RequestType, TeacherRequest};

/// A payload field a request summary reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryField {
    /// Current modality.
    CurrentModality,
    /// Current resource name.
    CurrentResourceName,
    /// Requested modality.
    NewModality,
    /// Proposed resource name.
    NewResourceName,
    /// Proposed date.
    NewDate,
    /// Proposed time slot id.
    NewTimeSlotId,
    /// Proposed time slot label.
    NewTimeSlotLabel,
    /// Replacement teacher id.
    ReplacementTeacherId,
    /// Replacement teacher name.
    ReplacementTeacherName,
}

impl SummaryField {
    /// Upstream JSON paths the field is decoded from.
    #[must_use]
    pub const fn paths(self) -> &'static [&'static str] {
        match self {
            Self::CurrentModality => paths::CURRENT_MODALITY,
            Self::CurrentResourceName => paths::CURRENT_RESOURCE_NAME,
            Self::NewModality => paths::NEW_MODALITY,
            Self::NewResourceName => paths::NEW_RESOURCE_NAME,
            Self::NewDate => paths::NEW_DATE,
            Self::NewTimeSlotId => paths::NEW_TIME_SLOT_ID,
            Self::NewTimeSlotLabel => paths::NEW_TIME_SLOT_LABEL,
            Self::ReplacementTeacherId => paths::REPLACEMENT_TEACHER_ID,
            Self::ReplacementTeacherName => paths::REPLACEMENT_TEACHER_NAME,
        }
    }

    /// Whether the decoded payload carries this field.
    #[must_use]
    pub fn is_present(self, payload: &RequestPayload) -> bool {
        match (self, payload) {
            (Self::CurrentModality, RequestPayload::ModalityChange { current_modality, .. }) => {
                current_modality.is_some()
            }
            (
                Self::CurrentResourceName,
                RequestPayload::ModalityChange {
                    current_resource_name,
                    ..
                },
            ) => current_resource_name.is_some(),
            (Self::NewModality, RequestPayload::ModalityChange { new_modality, .. }) => {
                new_modality.is_some()
            }
            (Self::NewResourceName, RequestPayload::ModalityChange { new_resource_name, .. }) => {
                new_resource_name.is_some()
            }
            (Self::NewDate, RequestPayload::Reschedule { new_date, .. }) => new_date.is_some(),
            (Self::NewTimeSlotId, RequestPayload::Reschedule { new_time_slot_id, .. }) => {
                new_time_slot_id.is_some()
            }
            (Self::NewTimeSlotLabel, RequestPayload::Reschedule { new_time_slot_label, .. }) => {
                new_time_slot_label.is_some()
            }
            (
                Self::ReplacementTeacherId,
                RequestPayload::Swap {
                    replacement_teacher_id,
                    ..
                },
            ) => replacement_teacher_id.is_some(),
            (
                Self::ReplacementTeacherName,
                RequestPayload::Swap {
                    replacement_teacher_name,
                    ..
                },
            ) => replacement_teacher_name.is_some(),
            _ => false,
        }
    }
}

/// Static description of a request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTypeDescriptor {
    /// Human label.
    pub label: &'static str,
    /// Eligible resources must be offered before approval.
    pub requires_resource_selection: bool,
    /// Swap candidates must be offered before approval.
    pub requires_candidate_selection: bool,
    /// Payload fields a display summary is built from.
    pub summary_fields: &'static [SummaryField],
    /// Groups of which at least one field must be present for the summary
    /// to be complete.
    pub summary_requires: &'static [&'static [SummaryField]],
}

const MODALITY_CHANGE: RequestTypeDescriptor = RequestTypeDescriptor {
    label: "Modality change",
    requires_resource_selection: true,
    requires_candidate_selection: false,
    summary_fields: &[
        SummaryField::CurrentModality,
        SummaryField::CurrentResourceName,
        SummaryField::NewModality,
        SummaryField::NewResourceName,
    ],
    summary_requires: &[],
};

const RESCHEDULE: RequestTypeDescriptor = RequestTypeDescriptor {
    label: "Reschedule",
    requires_resource_selection: true,
    requires_candidate_selection: false,
    summary_fields: &[
        SummaryField::NewDate,
        SummaryField::NewTimeSlotLabel,
        SummaryField::NewTimeSlotId,
    ],
    summary_requires: &[
        &[SummaryField::NewDate],
        &[SummaryField::NewTimeSlotLabel, SummaryField::NewTimeSlotId],
    ],
};

const SWAP: RequestTypeDescriptor = RequestTypeDescriptor {
    label: "Teacher swap",
    requires_resource_selection: false,
    requires_candidate_selection: true,
    summary_fields: &[
        SummaryField::ReplacementTeacherName,
        SummaryField::ReplacementTeacherId,
    ],
    summary_requires: &[],
};

/// Describe a request type.
#[must_use]
pub const fn describe(request_type: RequestType) -> RequestTypeDescriptor {
    match request_type {
        RequestType::ModalityChange => MODALITY_CHANGE,
        RequestType::Reschedule => RESCHEDULE,
        RequestType::Swap => SWAP,
    }
}

/// Fields from every unsatisfied requirement group of the request's type.
/// Empty when the summary can be built in full.
#[must_use]
pub fn missing_summary_fields(request: &TeacherRequest) -> Vec<SummaryField> {
    describe(request.request_type)
        .summary_requires
        .iter()
        .filter(|group| !group.iter().any(|field| field.is_present(&request.payload)))
        .flat_map(|group| group.iter().copied())
        .collect()
}

/// One-line, type-specific summary of what the request asks for.
#[must_use]
pub fn summarize(request: &TeacherRequest) -> String {
    if !missing_summary_fields(request).is_empty() {
        return match request.request_type {
            RequestType::Reschedule => "missing new date/time".to_owned(),
            RequestType::ModalityChange | RequestType::Swap => "incomplete request".to_owned(),
        };
    }
    match &request.payload {
        RequestPayload::ModalityChange {
            current_modality,
            current_resource_name,
            new_modality,
            new_resource_name,
            ..
        } => {
            let from = current_resource_name
                .as_deref()
                .or(current_modality.as_deref())
                .unwrap_or("current setup");
            let to = new_resource_name
                .as_deref()
                .or(new_modality.as_deref())
                .unwrap_or("unspecified");
            format!("{from} \u{2192} {to}")
        }
        RequestPayload::Reschedule {
            new_date,
            new_time_slot_id,
            new_time_slot_label,
        } => {
            let date = new_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            let slot = new_time_slot_label
                .clone()
                .or_else(|| new_time_slot_id.map(|id| format!("slot #{id}")))
                .unwrap_or_default();
            format!("{date} \u{b7} {slot}")
        }
        RequestPayload::Swap {
            replacement_teacher_id,
            replacement_teacher_name,
        } => match (replacement_teacher_name, replacement_teacher_id) {
            (Some(name), _) => format!("replacement: {name}"),
            (None, Some(id)) => format!("replacement: teacher #{id}"),
            (None, None) => "replacement not chosen".to_owned(),
        },
    }
}

/// Ordered field paths probed when decoding request records.
///
/// Flat spellings come first; nested spellings follow in the order the
/// backend has been seen to use them.
pub mod paths {
    /// Request id.
    pub const ID: &[&str] = &["id", "requestId"];
    /// Request type.
    pub const REQUEST_TYPE: &[&str] = &["requestType", "type"];
    /// Request status.
    pub const STATUS: &[&str] = &["status", "requestStatus"];
    /// Session being changed.
    pub const SESSION_ID: &[&str] = &[
        "sessionId",
        "session.id",
        "session.sessionId",
        "originalSession.id",
    ];
    /// Date of the session being changed.
    pub const SESSION_DATE: &[&str] = &["sessionDate", "session.date", "originalSession.date"];
    /// Time slot of the session being changed.
    pub const TIME_SLOT_LABEL: &[&str] = &[
        "timeSlotName",
        "session.timeSlot.name",
        "session.timeSlotName",
        "session.timeSlot",
    ];
    /// Submitting teacher id.
    pub const TEACHER_ID: &[&str] = &["teacherId", "teacher.id", "submittedBy.id"];
    /// Submitting teacher name.
    pub const TEACHER_NAME: &[&str] = &[
        "teacherName",
        "teacher.fullName",
        "teacher.name",
        "submittedBy.fullName",
    ];
    /// Class id.
    pub const CLASS_ID: &[&str] = &["classId", "classEntity.id", "class.id", "session.classId"];
    /// Class name.
    pub const CLASS_NAME: &[&str] = &[
        "className",
        "classEntity.name",
        "class.name",
        "session.className",
    ];
    /// Class code or info line.
    pub const CLASS_CODE: &[&str] = &[
        "classCode",
        "classInfo",
        "classEntity.code",
        "class.code",
        "session.classCode",
    ];
    /// Course name.
    pub const COURSE_NAME: &[&str] = &[
        "courseName",
        "course.name",
        "classEntity.course.name",
        "session.courseName",
    ];
    /// Teacher's stated reason.
    pub const REQUEST_REASON: &[&str] = &["requestReason", "reason"];
    /// Submission timestamp.
    pub const SUBMITTED_AT: &[&str] = &["submittedAt", "createdAt"];
    /// Deciding staff member.
    pub const DECIDED_BY: &[&str] = &["decidedByName", "decidedBy.fullName", "decidedBy.name"];
    /// Decision timestamp.
    pub const DECIDED_AT: &[&str] = &["decidedAt", "approvedAt", "rejectedAt"];
    /// Decision note or rejection reason.
    pub const DECISION_NOTE: &[&str] = &["note", "decisionNote", "rejectionReason", "staffNote"];

    /// Proposed date of a reschedule.
    pub const NEW_DATE: &[&str] = &[
        "newDate",
        "newSessionDate",
        "rescheduleDate",
        "newSession.date",
        "rescheduleInfo.newDate",
        "payload.newDate",
    ];
    /// Proposed time slot id of a reschedule.
    pub const NEW_TIME_SLOT_ID: &[&str] = &[
        "newTimeSlotId",
        "newTimeSlot.id",
        "newSession.timeSlotId",
        "newSession.timeSlot.id",
        "rescheduleInfo.newTimeSlotId",
        "payload.newTimeSlotId",
    ];
    /// Proposed time slot label of a reschedule.
    pub const NEW_TIME_SLOT_LABEL: &[&str] = &[
        "newTimeSlotName",
        "newTimeSlotLabel",
        "newTimeSlot.name",
        "newSession.timeSlot.name",
        "newSession.timeSlotName",
    ];

    /// Current modality of a modality change.
    pub const CURRENT_MODALITY: &[&str] = &[
        "currentModality",
        "session.modality",
        "currentResource.resourceType",
        "session.resource.resourceType",
    ];
    /// Current resource id.
    pub const CURRENT_RESOURCE_ID: &[&str] = &[
        "currentResourceId",
        "currentResource.id",
        "session.resourceId",
        "session.resource.id",
    ];
    /// Current resource name.
    pub const CURRENT_RESOURCE_NAME: &[&str] = &[
        "currentResourceName",
        "currentResource.name",
        "session.resourceName",
        "session.resource.name",
    ];
    /// Requested modality.
    pub const NEW_MODALITY: &[&str] = &[
        "newModality",
        "requestedModality",
        "proposedModality",
        "newResource.resourceType",
    ];
    /// Proposed resource id.
    pub const NEW_RESOURCE_ID: &[&str] = &["newResourceId", "newResource.id", "proposedResourceId"];
    /// Proposed resource name.
    pub const NEW_RESOURCE_NAME: &[&str] = &["newResourceName", "newResource.name"];

    /// Replacement teacher id of a swap.
    pub const REPLACEMENT_TEACHER_ID: &[&str] = &[
        "replacementTeacherId",
        "replacementTeacher.id",
        "replacementTeacher.teacherId",
    ];
    /// Replacement teacher name of a swap.
    pub const REPLACEMENT_TEACHER_NAME: &[&str] = &[
        "replacementTeacherName",
        "replacementTeacher.fullName",
        "replacementTeacher.name",
    ];
}
