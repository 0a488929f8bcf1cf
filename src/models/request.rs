//! Teacher request model: reschedule, swap and modality-change requests.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lookup::{first_i64, first_string};
use crate::registry::paths;
use crate::{AppError, Result};

/// Kind of change a teacher asked for. Closed set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    /// Move a session between offline and online delivery, or to another room.
    ModalityChange,
    /// Move a session to another date and time slot.
    Reschedule,
    /// Hand a session to a substitute teacher.
    Swap,
}

impl RequestType {
    /// Every request type, in display order.
    pub const ALL: [Self; 3] = [Self::ModalityChange, Self::Reschedule, Self::Swap];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ModalityChange => "MODALITY_CHANGE",
            Self::Reschedule => "RESCHEDULE",
            Self::Swap => "SWAP",
        }
    }
}

impl Display for RequestType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MODALITY_CHANGE" => Ok(Self::ModalityChange),
            "RESCHEDULE" => Ok(Self::Reschedule),
            "SWAP" => Ok(Self::Swap),
            other => Err(AppError::Decode(format!("unknown request type: {other}"))),
        }
    }
}

/// Lifecycle status for a teacher request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting a staff decision.
    Pending,
    /// Waiting on confirmation from another party; not decidable by staff.
    WaitingConfirm,
    /// Staff approved the request. Terminal.
    Approved,
    /// Staff rejected the request. Terminal.
    Rejected,
}

impl RequestStatus {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::WaitingConfirm => "WAITING_CONFIRM",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "WAITING_CONFIRM" => Ok(Self::WaitingConfirm),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(AppError::Decode(format!("unknown request status: {other}"))),
        }
    }
}

/// Type-specific part of a request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestPayload {
    /// Modality change: current and proposed delivery resource.
    #[serde(rename_all = "camelCase")]
    ModalityChange {
        /// Current modality (`OFFLINE`, `ONLINE`, ...).
        current_modality: Option<String>,
        /// Resource currently booked for the session.
        current_resource_id: Option<i64>,
        /// Display name of the current resource.
        current_resource_name: Option<String>,
        /// Modality the teacher asked for.
        new_modality: Option<String>,
        /// Resource the teacher proposed, if any.
        new_resource_id: Option<i64>,
        /// Display name of the proposed resource.
        new_resource_name: Option<String>,
    },
    /// Reschedule: proposed date and slot.
    #[serde(rename_all = "camelCase")]
    Reschedule {
        /// Proposed session date.
        new_date: Option<NaiveDate>,
        /// Proposed time slot id.
        new_time_slot_id: Option<i64>,
        /// Display label of the proposed time slot.
        new_time_slot_label: Option<String>,
    },
    /// Swap: replacement teacher, optional at submission.
    #[serde(rename_all = "camelCase")]
    Swap {
        /// Replacement teacher already attached to the request.
        replacement_teacher_id: Option<i64>,
        /// Display name of the replacement teacher.
        replacement_teacher_name: Option<String>,
    },
}

impl RequestPayload {
    /// Request type this payload belongs to.
    #[must_use]
    pub const fn request_type(&self) -> RequestType {
        match self {
            Self::ModalityChange { .. } => RequestType::ModalityChange,
            Self::Reschedule { .. } => RequestType::Reschedule,
            Self::Swap { .. } => RequestType::Swap,
        }
    }

    fn decode(request_type: RequestType, raw: &Value) -> Self {
        match request_type {
            RequestType::ModalityChange => Self::ModalityChange {
                current_modality: first_string(raw, paths::CURRENT_MODALITY),
                current_resource_id: first_i64(raw, paths::CURRENT_RESOURCE_ID),
                current_resource_name: first_string(raw, paths::CURRENT_RESOURCE_NAME),
                new_modality: first_string(raw, paths::NEW_MODALITY),
                new_resource_id: first_i64(raw, paths::NEW_RESOURCE_ID),
                new_resource_name: first_string(raw, paths::NEW_RESOURCE_NAME),
            },
            RequestType::Reschedule => Self::Reschedule {
                new_date: first_string(raw, paths::NEW_DATE).and_then(|s| parse_date(&s)),
                new_time_slot_id: first_i64(raw, paths::NEW_TIME_SLOT_ID),
                new_time_slot_label: first_string(raw, paths::NEW_TIME_SLOT_LABEL),
            },
            RequestType::Swap => Self::Swap {
                replacement_teacher_id: first_i64(raw, paths::REPLACEMENT_TEACHER_ID),
                replacement_teacher_name: first_string(raw, paths::REPLACEMENT_TEACHER_NAME),
            },
        }
    }
}

/// A teacher request as seen by staff reviewers.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRequest {
    /// Unique record identifier.
    pub id: i64,
    /// Kind of change requested.
    pub request_type: RequestType,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// Session being changed.
    pub session_id: Option<i64>,
    /// Date of the session being changed.
    pub session_date: Option<NaiveDate>,
    /// Time slot label of the session being changed.
    pub time_slot_label: Option<String>,
    /// Submitting teacher.
    pub teacher_id: Option<i64>,
    /// Submitting teacher's display name.
    pub teacher_name: Option<String>,
    /// Owning class.
    pub class_id: Option<i64>,
    /// Class display name.
    pub class_name: Option<String>,
    /// Class code or short info line.
    pub class_code: Option<String>,
    /// Course the class belongs to.
    pub course_name: Option<String>,
    /// Teacher's stated reason for the request.
    pub request_reason: Option<String>,
    /// Type-specific details.
    pub payload: RequestPayload,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Staff member who decided the request.
    pub decided_by: Option<String>,
    /// Decision timestamp.
    pub decided_at: Option<DateTime<Utc>>,
    /// Decision note or rejection reason.
    pub decision_note: Option<String>,
}

impl TeacherRequest {
    /// Decode a request record from a JSON object of any accepted shape.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Decode` if the id, type or status is missing, or the
    /// type or status is not one of the known values.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let id = first_i64(raw, paths::ID)
            .ok_or_else(|| AppError::Decode("request record has no id".into()))?;
        let request_type: RequestType = first_string(raw, paths::REQUEST_TYPE)
            .ok_or_else(|| AppError::Decode(format!("request {id} has no type")))?
            .parse()?;
        let status: RequestStatus = first_string(raw, paths::STATUS)
            .ok_or_else(|| AppError::Decode(format!("request {id} has no status")))?
            .parse()?;

        Ok(Self {
            id,
            request_type,
            status,
            session_id: first_i64(raw, paths::SESSION_ID),
            session_date: first_string(raw, paths::SESSION_DATE).and_then(|s| parse_date(&s)),
            time_slot_label: first_string(raw, paths::TIME_SLOT_LABEL),
            teacher_id: first_i64(raw, paths::TEACHER_ID),
            teacher_name: first_string(raw, paths::TEACHER_NAME),
            class_id: first_i64(raw, paths::CLASS_ID),
            class_name: first_string(raw, paths::CLASS_NAME),
            class_code: first_string(raw, paths::CLASS_CODE),
            course_name: first_string(raw, paths::COURSE_NAME),
            request_reason: first_string(raw, paths::REQUEST_REASON),
            payload: RequestPayload::decode(request_type, raw),
            submitted_at: first_string(raw, paths::SUBMITTED_AT).and_then(|s| parse_timestamp(&s)),
            decided_by: first_string(raw, paths::DECIDED_BY),
            decided_at: first_string(raw, paths::DECIDED_AT).and_then(|s| parse_timestamp(&s)),
            decision_note: first_string(raw, paths::DECISION_NOTE),
        })
    }

    /// Whether a staff decision may still be made.
    #[must_use]
    pub const fn can_decide(&self) -> bool {
        self.status.can_decide()
    }

    /// Replacement teacher already attached to a swap request.
    #[must_use]
    pub fn existing_replacement_teacher_id(&self) -> Option<i64> {
        match self.payload {
            RequestPayload::Swap {
                replacement_teacher_id,
                ..
            } => replacement_teacher_id,
            _ => None,
        }
    }
}

/// Parse a calendar date, accepting a date-time and keeping its date part.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok()
}

/// Parse an RFC 3339 timestamp, or a zone-less one taken as UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
