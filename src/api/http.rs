//! REST implementation of [`RequestRepository`] over `reqwest`.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::{self, failure_from_body};
use super::{RepoFuture, RequestRepository};
use crate::config::ApiConfig;
use crate::models::candidate::SwapCandidate;
use crate::models::decision::{ApprovePayload, RejectPayload};
use crate::models::request::{RequestStatus, TeacherRequest};
use crate::models::resource::EligibleResource;
use crate::{AppError, Result};

const RESOURCE_ROOT: &str = "/api/v1/teacher-requests";

/// Request repository backed by the center's REST API.
#[derive(Clone)]
pub struct HttpRequestRepository {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRequestRepository {
    /// Build a repository for the configured API.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| AppError::Http(format!("failed to build http client: {err}")))?;
        let token = Some(config.token.clone()).filter(|t| !t.is_empty());
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{RESOURCE_ROOT}{path}", self.base_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .authorize(self.client.get(&url).query(query))
            .send()
            .await?;
        read_body(response).await
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .authorize(self.client.post(&url).json(body))
            .send()
            .await?;
        read_body(response).await
    }

    async fn get_resources(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<EligibleResource>> {
        envelope::into_list(self.get(path, query).await?)?
            .iter()
            .map(EligibleResource::from_value)
            .collect()
    }
}

/// Turn a response into its JSON body, mapping failure statuses to errors.
async fn read_body(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({ "message": text }))
    };

    if status.is_success() {
        return Ok(body);
    }

    let failure = failure_from_body(Some(status.as_u16()), &body);
    warn!(status = status.as_u16(), code = ?failure.code, "request api returned failure");
    match status {
        StatusCode::NOT_FOUND => Err(AppError::NotFound(failure.message)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(AppError::Unauthorized(failure.message))
        }
        _ => Err(AppError::Api(failure)),
    }
}

impl RequestRepository for HttpRequestRepository {
    fn list_requests(&self, status: Option<RequestStatus>) -> RepoFuture<'_, Vec<TeacherRequest>> {
        Box::pin(async move {
            let query: Vec<(&str, String)> = status
                .map(|s| vec![("status", s.as_str().to_owned())])
                .unwrap_or_default();
            let records = envelope::into_list(self.get("/staff", &query).await?)?;
            records.iter().map(TeacherRequest::from_value).collect()
        })
    }

    fn get_request(&self, request_id: i64) -> RepoFuture<'_, TeacherRequest> {
        Box::pin(async move {
            let body = self.get(&format!("/{request_id}"), &[]).await?;
            TeacherRequest::from_value(&envelope::into_object(body)?)
        })
    }

    fn swap_candidates(&self, request_id: i64) -> RepoFuture<'_, Vec<SwapCandidate>> {
        Box::pin(async move {
            let body = self.get(&format!("/{request_id}/swap/candidates"), &[]).await?;
            envelope::into_list(body)?
                .iter()
                .map(SwapCandidate::from_value)
                .collect()
        })
    }

    fn modality_resources(&self, request_id: i64) -> RepoFuture<'_, Vec<EligibleResource>> {
        Box::pin(async move {
            self.get_resources(&format!("/{request_id}/modality/resources"), &[])
                .await
        })
    }

    fn reschedule_resources(
        &self,
        session_id: i64,
        date: NaiveDate,
        time_slot_id: i64,
    ) -> RepoFuture<'_, Vec<EligibleResource>> {
        Box::pin(async move {
            let query = [
                ("sessionId", session_id.to_string()),
                ("date", date.format("%Y-%m-%d").to_string()),
                ("timeSlotId", time_slot_id.to_string()),
            ];
            self.get_resources("/reschedule/resources", &query).await
        })
    }

    fn approve(&self, request_id: i64, payload: ApprovePayload) -> RepoFuture<'_, ()> {
        Box::pin(async move {
            let body = self.post(&format!("/{request_id}/approve"), &payload).await?;
            ensure_accepted(body)
        })
    }

    fn reject(&self, request_id: i64, payload: RejectPayload) -> RepoFuture<'_, ()> {
        Box::pin(async move {
            let body = self.post(&format!("/{request_id}/reject"), &payload).await?;
            ensure_accepted(body)
        })
    }
}

/// Decision endpoints may answer with an empty body or an envelope.
fn ensure_accepted(body: Value) -> Result<()> {
    if body.is_object() {
        envelope::into_object(body).map(|_| ()).or_else(|err| match err {
            AppError::Decode(_) => Ok(()),
            other => Err(other),
        })
    } else {
        Ok(())
    }
}
