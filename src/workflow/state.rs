//! Review console state observed by front ends.
//!
//! List, detail, eligibility and submission each carry their own progress
//! so a reviewer can keep reading one request while the list refreshes in
//! the background.

use tokio_util::sync::CancellationToken;

use super::eligibility::{BlockedReason, EligibilityQuery, EligibilitySet};
use super::list::ListQuery;
use super::state_machine::Selection;
use crate::errors::ValidationError;
use crate::models::request::TeacherRequest;

/// Progress of a single fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    /// Not requested.
    Idle,
    /// In flight.
    Loading,
    /// Arrived.
    Loaded(T),
    /// Failed, with a reviewer-facing message.
    Failed(String),
}

impl<T> Loadable<T> {
    /// The loaded value, if any.
    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Whether the fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Eligibility section of the decision form.
///
/// Loading, an empty result and a failure are distinct states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityState {
    /// Detail has not loaded yet, so nothing is planned.
    Unplanned,
    /// No choice to make for this request.
    NotRequired,
    /// A query is needed but its inputs are incomplete.
    Blocked(BlockedReason),
    /// Query in flight.
    Loading(EligibilityQuery),
    /// Options arrived (possibly none).
    Ready(EligibilitySet),
    /// Query failed; the reviewer may retry.
    Failed {
        /// Query to re-issue on retry.
        query: EligibilityQuery,
        /// Reviewer-facing message.
        message: String,
    },
}

impl EligibilityState {
    /// Number of eligible resources currently loaded, zero otherwise.
    #[must_use]
    pub fn eligible_resource_count(&self) -> usize {
        match self {
            Self::Ready(EligibilitySet::Resources(resources)) => resources.len(),
            _ => 0,
        }
    }
}

/// The request currently open for review.
#[derive(Debug, Clone)]
pub struct ReviewPanel {
    /// Open request id.
    pub request_id: i64,
    /// List summary for the request, when the list had it.
    pub summary: Option<TeacherRequest>,
    /// Detail reconciled with the list summary.
    pub detail: Loadable<TeacherRequest>,
    /// Options for the decision form.
    pub eligibility: EligibilityState,
    /// Reviewer input.
    pub selection: Selection,
    /// A decision call is in flight.
    pub submitting: bool,
    /// Last guard failure, cleared when input changes.
    pub validation_error: Option<ValidationError>,
    /// Last submission failure, reviewer-facing, cleared when input changes.
    pub submit_error: Option<String>,
    /// A decision succeeded; closing refreshes the list.
    pub decided: bool,
    pub(crate) generation: u64,
    pub(crate) cancel: CancellationToken,
}

impl ReviewPanel {
    pub(crate) fn new(request_id: i64, summary: Option<TeacherRequest>, generation: u64) -> Self {
        Self {
            request_id,
            summary,
            detail: Loadable::Loading,
            eligibility: EligibilityState::Unplanned,
            selection: Selection::default(),
            submitting: false,
            validation_error: None,
            submit_error: None,
            decided: false,
            generation,
            cancel: CancellationToken::new(),
        }
    }

    /// Whether the open request can still be decided.
    #[must_use]
    pub fn can_decide(&self) -> bool {
        self.detail
            .loaded()
            .is_some_and(TeacherRequest::can_decide)
    }

    pub(crate) fn clear_feedback(&mut self) {
        self.validation_error = None;
        self.submit_error = None;
    }
}

/// The cached staff request list.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Requests as last fetched, unfiltered client-side.
    pub requests: Vec<TeacherRequest>,
    /// Active filters.
    pub query: ListQuery,
    /// A refresh is in flight.
    pub loading: bool,
    /// Last refresh failure, reviewer-facing.
    pub error: Option<String>,
    /// Completed refreshes.
    pub refreshes: u64,
    pub(crate) generation: u64,
}

impl ListState {
    /// Requests passing the active filters, newest first.
    #[must_use]
    pub fn visible(&self) -> Vec<TeacherRequest> {
        self.query.apply(&self.requests)
    }
}

/// Whole review console state.
#[derive(Debug, Clone, Default)]
pub struct ReviewState {
    /// Request list.
    pub list: ListState,
    /// Open request, if any.
    pub panel: Option<ReviewPanel>,
    pub(crate) next_generation: u64,
}
