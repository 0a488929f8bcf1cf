//! Reconciliation of list summaries with detail payloads.
//!
//! The list endpoint is the reliable source for the denormalized class and
//! course fields; the detail endpoint is authoritative for everything else.

use crate::models::request::TeacherRequest;

/// Merge a list summary into a detail record.
///
/// Class name, class code and course name come from `summary` whenever it
/// carries them; every other field comes from `detail`.
#[must_use]
pub fn reconcile(summary: &TeacherRequest, detail: &TeacherRequest) -> TeacherRequest {
    let mut merged = detail.clone();
    prefer(&mut merged.class_name, summary.class_name.as_ref());
    prefer(&mut merged.class_code, summary.class_code.as_ref());
    prefer(&mut merged.course_name, summary.course_name.as_ref());
    merged
}

fn prefer(target: &mut Option<String>, listed: Option<&String>) {
    if let Some(value) = listed {
        *target = Some(value.clone());
    }
}
