//! Eligibility resolver: which resources or substitute teachers a reviewer
//! may choose from when approving a request.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info_span, Instrument};

use crate::api::RequestRepository;
use crate::models::candidate::{self, SwapCandidate};
use crate::models::request::{RequestPayload, TeacherRequest};
use crate::models::resource::EligibleResource;
use crate::registry;
use crate::Result;

/// A fully specified eligibility query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityQuery {
    /// Resources for a modality-change request.
    ModalityResources {
        /// Request being decided.
        request_id: i64,
    },
    /// Resources free at the proposed date and slot of a reschedule.
    RescheduleResources {
        /// Request being decided.
        request_id: i64,
        /// Session to move.
        session_id: i64,
        /// Proposed date.
        date: NaiveDate,
        /// Proposed time slot.
        time_slot_id: i64,
    },
    /// Substitute teachers for a swap request.
    SwapCandidates {
        /// Request being decided.
        request_id: i64,
    },
}

impl EligibilityQuery {
    /// Request the query was planned for.
    #[must_use]
    pub const fn request_id(&self) -> i64 {
        match *self {
            Self::ModalityResources { request_id }
            | Self::RescheduleResources { request_id, .. }
            | Self::SwapCandidates { request_id } => request_id,
        }
    }
}

/// Why a needed query cannot be issued yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockedReason {
    /// Reschedule lacks its session, new date or new time slot.
    MissingSessionInfo,
}

impl Display for BlockedReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSessionInfo => f.write_str("missing session information"),
        }
    }
}

/// What the resolver should do for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityPlan {
    /// Nothing to fetch: the request is not decidable or needs no choice.
    NotRequired,
    /// A query is needed but its inputs are incomplete; do not issue it.
    Blocked(BlockedReason),
    /// Issue this query.
    Query(EligibilityQuery),
}

/// Resolved options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilitySet {
    /// Rooms or online resources.
    Resources(Vec<EligibleResource>),
    /// Substitute teachers, best match first.
    Candidates(Vec<SwapCandidate>),
}

impl EligibilitySet {
    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Resources(items) => items.len(),
            Self::Candidates(items) => items.len(),
        }
    }

    /// Whether no option was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decide which query, if any, a request needs.
///
/// Only decidable requests are planned. A reschedule is planned only once
/// its session id, new date and new time slot are all known.
#[must_use]
pub fn plan(request: &TeacherRequest) -> EligibilityPlan {
    if !request.can_decide() {
        return EligibilityPlan::NotRequired;
    }
    let descriptor = registry::describe(request.request_type);
    if !descriptor.requires_resource_selection && !descriptor.requires_candidate_selection {
        return EligibilityPlan::NotRequired;
    }

    match &request.payload {
        RequestPayload::ModalityChange { .. } => {
            EligibilityPlan::Query(EligibilityQuery::ModalityResources {
                request_id: request.id,
            })
        }
        RequestPayload::Reschedule {
            new_date,
            new_time_slot_id,
            ..
        } => match (request.session_id, *new_date, *new_time_slot_id) {
            (Some(session_id), Some(date), Some(time_slot_id)) => {
                EligibilityPlan::Query(EligibilityQuery::RescheduleResources {
                    request_id: request.id,
                    session_id,
                    date,
                    time_slot_id,
                })
            }
            _ => EligibilityPlan::Blocked(BlockedReason::MissingSessionInfo),
        },
        RequestPayload::Swap { .. } => EligibilityPlan::Query(EligibilityQuery::SwapCandidates {
            request_id: request.id,
        }),
    }
}

/// Runs eligibility queries against the repository. Read-only.
#[derive(Clone)]
pub struct EligibilityResolver {
    repo: Arc<dyn RequestRepository>,
}

impl EligibilityResolver {
    /// Create a resolver over `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn RequestRepository>) -> Self {
        Self { repo }
    }

    /// Run `query`.
    ///
    /// # Errors
    ///
    /// Propagates repository failures unchanged; callers keep them distinct
    /// from an empty result.
    pub async fn resolve(&self, query: EligibilityQuery) -> Result<EligibilitySet> {
        let span = info_span!("eligibility_resolve", request_id = query.request_id());
        async move {
            let set = match query {
                EligibilityQuery::ModalityResources { request_id } => {
                    EligibilitySet::Resources(self.repo.modality_resources(request_id).await?)
                }
                EligibilityQuery::RescheduleResources {
                    session_id,
                    date,
                    time_slot_id,
                    ..
                } => EligibilitySet::Resources(
                    self.repo
                        .reschedule_resources(session_id, date, time_slot_id)
                        .await?,
                ),
                EligibilityQuery::SwapCandidates { request_id } => {
                    let mut candidates = self.repo.swap_candidates(request_id).await?;
                    candidate::rank(&mut candidates);
                    EligibilitySet::Candidates(candidates)
                }
            };
            debug!(options = set.len(), "eligibility resolved");
            Ok(set)
        }
        .instrument(span)
        .await
    }
}
