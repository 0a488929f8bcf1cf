//! Client-side filtering and ordering of the staff request list.

use crate::models::request::{RequestStatus, RequestType, TeacherRequest};

/// Filters applied to the request list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Server-side status filter.
    pub status: Option<RequestStatus>,
    /// Client-side request type filter.
    pub request_type: Option<RequestType>,
    /// Case-insensitive match on class, course or teacher name.
    pub search: Option<String>,
}

impl ListQuery {
    /// Whether `request` passes the client-side filters.
    #[must_use]
    pub fn matches(&self, request: &TeacherRequest) -> bool {
        if self.status.is_some_and(|status| status != request.status) {
            return false;
        }
        if self
            .request_type
            .is_some_and(|request_type| request_type != request.request_type)
        {
            return false;
        }
        let Some(needle) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return true;
        };
        let needle = needle.to_lowercase();
        [
            request.class_name.as_deref(),
            request.class_code.as_deref(),
            request.course_name.as_deref(),
            request.teacher_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Filter `requests` and order them newest submission first.
    #[must_use]
    pub fn apply(&self, requests: &[TeacherRequest]) -> Vec<TeacherRequest> {
        let mut visible: Vec<TeacherRequest> = requests
            .iter()
            .filter(|request| self.matches(request))
            .cloned()
            .collect();
        visible.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        visible
    }
}
