//! Request API boundary.
//!
//! [`RequestRepository`] is the seam between the review workflow and the
//! backend that owns canonical request state. [`http::HttpRequestRepository`]
//! talks to the REST API; tests substitute in-memory doubles.

pub mod envelope;
pub mod http;

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;

use crate::models::candidate::SwapCandidate;
use crate::models::decision::{ApprovePayload, RejectPayload};
use crate::models::request::{RequestStatus, TeacherRequest};
use crate::models::resource::EligibleResource;
use crate::Result;

/// Boxed future returned by repository calls.
pub type RepoFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Reads and decisions against the request store.
///
/// Every read is idempotent and safe to re-issue. Implementations return
/// records already normalized out of their response envelopes.
pub trait RequestRepository: Send + Sync {
    /// Staff-visible requests, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http`, `AppError::Api` or `AppError::Decode`.
    fn list_requests(&self, status: Option<RequestStatus>) -> RepoFuture<'_, Vec<TeacherRequest>>;

    /// A single request by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the id is unknown, otherwise as
    /// [`list_requests`](Self::list_requests).
    fn get_request(&self, request_id: i64) -> RepoFuture<'_, TeacherRequest>;

    /// Substitute teachers for a swap request.
    ///
    /// # Errors
    ///
    /// As [`list_requests`](Self::list_requests).
    fn swap_candidates(&self, request_id: i64) -> RepoFuture<'_, Vec<SwapCandidate>>;

    /// Resources valid for a modality-change request.
    ///
    /// # Errors
    ///
    /// As [`list_requests`](Self::list_requests).
    fn modality_resources(&self, request_id: i64) -> RepoFuture<'_, Vec<EligibleResource>>;

    /// Resources valid for moving `session_id` to `date` and `time_slot_id`.
    ///
    /// # Errors
    ///
    /// As [`list_requests`](Self::list_requests).
    fn reschedule_resources(
        &self,
        session_id: i64,
        date: NaiveDate,
        time_slot_id: i64,
    ) -> RepoFuture<'_, Vec<EligibleResource>>;

    /// Approve a request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` when the backend refuses the decision.
    fn approve(&self, request_id: i64, payload: ApprovePayload) -> RepoFuture<'_, ()>;

    /// Reject a request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Api` when the backend refuses the decision.
    fn reject(&self, request_id: i64, payload: RejectPayload) -> RepoFuture<'_, ()>;
}
