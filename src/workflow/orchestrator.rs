//! Decision orchestrator: the reviewer's open → choose → decide → close loop.
//!
//! Each opened request gets a generation number and a cancellation token.
//! Every response is applied only if the panel that asked for it is still
//! the open one; responses for a request the reviewer has moved away from
//! are dropped without surfacing anything.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};

use super::eligibility::{self, EligibilityPlan, EligibilityQuery, EligibilityResolver};
use super::error_map::{user_message, validation_message, Operation};
use super::list::ListQuery;
use super::merge;
use super::state::{EligibilityState, ListState, Loadable, ReviewPanel, ReviewState};
use super::state_machine;
use crate::api::RequestRepository;
use crate::config::ReviewConfig;
use crate::errors::ValidationError;
use crate::models::decision::{Decision, DecisionAction};
use crate::models::request::RequestStatus;
use crate::models::reviewer::ReviewerContext;
use crate::notify::{Notice, NoticeLevel, Notifier};
use crate::{AppError, Result};

/// Whether a response was applied to the open panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Applied to the panel that requested it.
    Applied,
    /// The panel changed while the call was in flight; the response was dropped.
    Stale,
}

/// Result of a [`DecisionOrchestrator::decide`] call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The repository accepted the decision.
    Submitted {
        /// Decided request.
        request_id: i64,
        /// Status the request moved into.
        status: RequestStatus,
    },
    /// The request is not decidable; nothing was sent.
    NotDecidable {
        /// Current status.
        status: RequestStatus,
    },
    /// A decision for this panel is already in flight; nothing was sent.
    AlreadySubmitting,
}

/// Drives the review workflow over a [`RequestRepository`].
pub struct DecisionOrchestrator {
    repo: Arc<dyn RequestRepository>,
    resolver: EligibilityResolver,
    reviewer: ReviewerContext,
    rules: ReviewConfig,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<ReviewState>>,
}

impl DecisionOrchestrator {
    /// Create an orchestrator for `reviewer`.
    #[must_use]
    pub fn new(
        repo: Arc<dyn RequestRepository>,
        reviewer: ReviewerContext,
        rules: ReviewConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut state = ReviewState::default();
        state.list.query.status = rules.default_status_filter;
        Self {
            resolver: EligibilityResolver::new(Arc::clone(&repo)),
            repo,
            reviewer,
            rules,
            notifier,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Snapshot of the whole console state.
    pub async fn snapshot(&self) -> ReviewState {
        self.state.lock().await.clone()
    }

    /// Snapshot of the open panel.
    pub async fn panel(&self) -> Option<ReviewPanel> {
        self.state.lock().await.panel.clone()
    }

    /// Snapshot of the request list.
    pub async fn list(&self) -> ListState {
        self.state.lock().await.list.clone()
    }

    /// Replace the list filters. Returns `true` when the status filter
    /// changed, in which case the caller should refresh.
    pub async fn set_list_query(&self, query: ListQuery) -> bool {
        let mut state = self.state.lock().await;
        let status_changed = state.list.query.status != query.status;
        state.list.query = query;
        status_changed
    }

    /// Refetch the request list for the current status filter.
    ///
    /// Overlapping refreshes are resolved in favour of the latest one.
    ///
    /// # Errors
    ///
    /// Propagates repository failures after recording them on the list.
    pub async fn refresh_list(&self) -> Result<()> {
        let (generation, status) = {
            let mut state = self.state.lock().await;
            state.list.generation += 1;
            state.list.loading = true;
            (state.list.generation, state.list.query.status)
        };

        let result = self.repo.list_requests(status).await;

        let mut state = self.state.lock().await;
        if state.list.generation != generation {
            debug!(generation, "dropping superseded list response");
            return Ok(());
        }
        state.list.loading = false;
        match result {
            Ok(requests) => {
                debug!(count = requests.len(), "request list refreshed");
                state.list.requests = requests;
                state.list.error = None;
                state.list.refreshes += 1;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "request list refresh failed");
                state.list.error = Some(user_message(&err, Operation::LoadList));
                Err(err)
            }
        }
    }

    /// Open `request_id`: reset the decision form, load the detail, then
    /// load the options the request type needs.
    ///
    /// Eligibility failures are recorded on the panel and do not fail the
    /// call.
    ///
    /// # Errors
    ///
    /// Propagates a detail fetch failure after recording it on the panel.
    pub async fn open(&self, request_id: i64) -> Result<LoadOutcome> {
        let span = info_span!("review_open", request_id);
        async move {
            let (generation, cancel) = {
                let mut state = self.state.lock().await;
                if let Some(previous) = state.panel.take() {
                    previous.cancel.cancel();
                }
                state.next_generation += 1;
                let generation = state.next_generation;
                let summary = state
                    .list
                    .requests
                    .iter()
                    .find(|request| request.id == request_id)
                    .cloned();
                let panel = ReviewPanel::new(request_id, summary, generation);
                let cancel = panel.cancel.clone();
                state.panel = Some(panel);
                (generation, cancel)
            };

            let fetched = tokio::select! {
                () = cancel.cancelled() => {
                    debug!(generation, "detail load abandoned");
                    return Ok(LoadOutcome::Stale);
                }
                result = self.repo.get_request(request_id) => result,
            };

            let plan = {
                let mut state = self.state.lock().await;
                let Some(panel) = current_panel(&mut state, generation) else {
                    debug!(generation, "dropping stale detail response");
                    return Ok(LoadOutcome::Stale);
                };
                match fetched {
                    Ok(detail) => {
                        let merged = match &panel.summary {
                            Some(summary) => merge::reconcile(summary, &detail),
                            None => detail,
                        };
                        let plan = eligibility::plan(&merged);
                        info!(
                            request_type = %merged.request_type,
                            status = %merged.status,
                            "request detail loaded"
                        );
                        panel.detail = Loadable::Loaded(merged);
                        panel.eligibility = planned_state(plan);
                        plan
                    }
                    Err(err) => {
                        warn!(%err, "request detail load failed");
                        panel.detail = Loadable::Failed(user_message(&err, Operation::LoadRequest));
                        return Err(err);
                    }
                }
            };

            if let EligibilityPlan::Query(query) = plan {
                return Ok(self.run_eligibility(generation, query).await);
            }
            Ok(LoadOutcome::Applied)
        }
        .instrument(span)
        .await
    }

    /// Re-plan and re-issue the eligibility query for the open request.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoOpenRequest` or `DetailNotLoaded`.
    pub async fn retry_eligibility(&self) -> Result<LoadOutcome> {
        let (generation, plan) = {
            let mut state = self.state.lock().await;
            let panel = state.panel.as_mut().ok_or(ValidationError::NoOpenRequest)?;
            let request = panel.detail.loaded().ok_or(ValidationError::DetailNotLoaded)?;
            let plan = eligibility::plan(request);
            panel.eligibility = planned_state(plan);
            (panel.generation, plan)
        };
        match plan {
            EligibilityPlan::Query(query) => Ok(self.run_eligibility(generation, query).await),
            EligibilityPlan::NotRequired | EligibilityPlan::Blocked(_) => Ok(LoadOutcome::Applied),
        }
    }

    async fn run_eligibility(&self, generation: u64, query: EligibilityQuery) -> LoadOutcome {
        let cancel = {
            let state = self.state.lock().await;
            match state.panel.as_ref().filter(|p| p.generation == generation) {
                Some(panel) => panel.cancel.clone(),
                None => return LoadOutcome::Stale,
            }
        };

        let result = tokio::select! {
            () = cancel.cancelled() => {
                debug!(generation, "eligibility load abandoned");
                return LoadOutcome::Stale;
            }
            result = self.resolver.resolve(query) => result,
        };

        let mut state = self.state.lock().await;
        let Some(panel) = current_panel(&mut state, generation) else {
            debug!(generation, "dropping stale eligibility response");
            return LoadOutcome::Stale;
        };
        panel.eligibility = match result {
            Ok(set) => EligibilityState::Ready(set),
            Err(err) => {
                warn!(%err, request_id = query.request_id(), "eligibility load failed");
                EligibilityState::Failed {
                    query,
                    message: user_message(&err, Operation::LoadOptions),
                }
            }
        };
        LoadOutcome::Applied
    }

    /// Choose a resource for a modality change or reschedule.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoOpenRequest` when nothing is open.
    pub async fn select_resource(&self, resource_id: Option<i64>) -> Result<()> {
        self.edit_selection(|panel| panel.selection.resource_id = resource_id)
            .await
    }

    /// Choose a replacement teacher for a swap.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoOpenRequest` when nothing is open.
    pub async fn select_candidate(&self, teacher_id: Option<i64>) -> Result<()> {
        self.edit_selection(|panel| panel.selection.candidate_id = teacher_id)
            .await
    }

    /// Set the approval note or rejection reason.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoOpenRequest` when nothing is open.
    pub async fn set_note(&self, note: impl Into<String>) -> Result<()> {
        let note = note.into();
        self.edit_selection(move |panel| panel.selection.note = note)
            .await
    }

    async fn edit_selection(&self, edit: impl FnOnce(&mut ReviewPanel)) -> Result<()> {
        let mut state = self.state.lock().await;
        let panel = state.panel.as_mut().ok_or(ValidationError::NoOpenRequest)?;
        edit(panel);
        panel.clear_feedback();
        Ok(())
    }

    /// Approve or reject the open request.
    ///
    /// Guards run first and never touch the network. A non-decidable
    /// request is a no-op. On success the panel closes and the list
    /// refreshes; on failure the panel stays open with its input intact.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for guard failures and propagates
    /// repository failures.
    pub async fn decide(&self, action: DecisionAction) -> Result<DecisionOutcome> {
        let span = info_span!("review_decide", ?action);
        async move {
            let (request_id, generation, decision) = {
                let mut state = self.state.lock().await;
                let Some(panel) = state.panel.as_mut() else {
                    return Err(self.invalid(None, ValidationError::NoOpenRequest));
                };
                let request_id = panel.request_id;
                let Some(request) = panel.detail.loaded() else {
                    return Err(self.invalid(Some(request_id), ValidationError::DetailNotLoaded));
                };
                if !request.can_decide() {
                    debug!(request_id, status = %request.status, "request not decidable");
                    return Ok(DecisionOutcome::NotDecidable {
                        status: request.status,
                    });
                }
                if panel.submitting {
                    return Ok(DecisionOutcome::AlreadySubmitting);
                }
                if !self.reviewer.can_decide_requests() {
                    let err = ValidationError::ForbiddenRole;
                    panel.validation_error = Some(err.clone());
                    return Err(self.invalid(Some(request_id), err));
                }
                if action == DecisionAction::Approve
                    && matches!(panel.eligibility, EligibilityState::Loading(_))
                {
                    let err = ValidationError::OptionsLoading;
                    panel.validation_error = Some(err.clone());
                    return Err(self.invalid(Some(request_id), err));
                }

                let checked = state_machine::validate(
                    request,
                    action,
                    &panel.selection,
                    panel.eligibility.eligible_resource_count(),
                    self.rules.min_rejection_reason_len,
                );
                let decision = match checked {
                    Ok(decision) => decision,
                    Err(err) => {
                        panel.validation_error = Some(err.clone());
                        return Err(self.invalid(Some(request_id), err));
                    }
                };
                panel.clear_feedback();
                panel.submitting = true;
                (request_id, panel.generation, decision)
            };

            info!(request_id, reviewer = self.reviewer.user_id, "submitting decision");
            let result = match decision {
                Decision::Approve(payload) => self.repo.approve(request_id, payload).await,
                Decision::Reject(payload) => self.repo.reject(request_id, payload).await,
            };

            match result {
                Ok(()) => {
                    let status = action.target_status();
                    info!(request_id, %status, "decision saved");
                    self.notifier.notify(Notice::new(
                        NoticeLevel::Success,
                        success_message(action, request_id),
                        Some(request_id),
                    ));
                    {
                        let mut state = self.state.lock().await;
                        if let Some(panel) = current_panel(&mut state, generation) {
                            panel.submitting = false;
                            panel.decided = true;
                        }
                    }
                    if !self.close_panel(Some(generation)).await {
                        self.refresh_after_decision().await;
                    }
                    Ok(DecisionOutcome::Submitted { request_id, status })
                }
                Err(err) => {
                    let message = user_message(&err, Operation::SaveDecision);
                    warn!(request_id, %err, "decision refused");
                    {
                        let mut state = self.state.lock().await;
                        if let Some(panel) = current_panel(&mut state, generation) {
                            panel.submitting = false;
                            panel.submit_error = Some(message.clone());
                        }
                    }
                    self.notifier
                        .notify(Notice::new(NoticeLevel::Error, message, Some(request_id)));
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Close the open panel, abandoning its in-flight loads.
    ///
    /// Returns `true` when the panel had a successful decision, in which
    /// case the list has been refreshed.
    pub async fn close(&self) -> bool {
        self.close_panel(None).await
    }

    /// Close the panel (only the one with `generation`, when given).
    async fn close_panel(&self, generation: Option<u64>) -> bool {
        let panel = {
            let mut state = self.state.lock().await;
            let matches = match generation {
                Some(generation) => state
                    .panel
                    .as_ref()
                    .is_some_and(|p| p.generation == generation),
                None => true,
            };
            if matches {
                state.panel.take()
            } else {
                None
            }
        };
        let Some(panel) = panel else {
            return false;
        };
        panel.cancel.cancel();
        debug!(request_id = panel.request_id, decided = panel.decided, "panel closed");
        if panel.decided {
            self.refresh_after_decision().await;
        }
        panel.decided
    }

    async fn refresh_after_decision(&self) {
        if let Err(err) = self.refresh_list().await {
            warn!(%err, "list refresh after decision failed");
        }
    }

    fn invalid(&self, request_id: Option<i64>, err: ValidationError) -> AppError {
        self.notifier.notify(Notice::new(
            NoticeLevel::Validation,
            validation_message(&err),
            request_id,
        ));
        AppError::Validation(err)
    }
}

fn current_panel(state: &mut ReviewState, generation: u64) -> Option<&mut ReviewPanel> {
    state.panel.as_mut().filter(|p| p.generation == generation)
}

fn planned_state(plan: EligibilityPlan) -> EligibilityState {
    match plan {
        EligibilityPlan::NotRequired => EligibilityState::NotRequired,
        EligibilityPlan::Blocked(reason) => EligibilityState::Blocked(reason),
        EligibilityPlan::Query(query) => EligibilityState::Loading(query),
    }
}

fn success_message(action: DecisionAction, request_id: i64) -> String {
    match action {
        DecisionAction::Approve => format!("Request #{request_id} approved."),
        DecisionAction::Reject => format!("Request #{request_id} rejected."),
    }
}
