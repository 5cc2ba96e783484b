//! HTTP implementation of the provisioning API
//!
//! Bearer-authenticated JSON calls with a fixed per-request timeout. Any
//! non-2xx status is a transport failure; empty 2xx bodies are accepted
//! (some transition endpoints respond with no content).

use async_trait::async_trait;
use pkcheck_core::{
    AcceptRequest, BaselineDraft, HandoffRequest, ProjectDraft, ProjectId, ProvisioningApi,
    ValidatorConfig, ValidatorError,
};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Fixed per-call request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const BODY_SNIPPET_LEN: usize = 200;

/// Bearer-authenticated client for the create/transition endpoints
#[derive(Clone)]
pub struct HttpProvisioningApi {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

// The credential must never leak through debug/trace output.
impl std::fmt::Debug for HttpProvisioningApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvisioningApi")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl HttpProvisioningApi {
    /// Build a client from the resolved configuration
    pub fn new(config: &ValidatorConfig) -> Result<Self, ValidatorError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ValidatorError::transport("<client setup>", e.to_string()))?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            token: config.bearer_token().to_string(),
        })
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Value, ValidatorError> {
        let request = self
            .client
            .post(format!("{}{path}", self.api_base))
            .bearer_auth(&self.token)
            .json(body);
        self.execute(path, request).await
    }

    async fn patch(&self, path: &str, body: &impl Serialize) -> Result<Value, ValidatorError> {
        let request = self
            .client
            .patch(format!("{}{path}", self.api_base))
            .bearer_auth(&self.token)
            .json(body);
        self.execute(path, request).await
    }

    async fn execute(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, ValidatorError> {
        let response = request
            .send()
            .await
            .map_err(|e| ValidatorError::transport(endpoint, e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ValidatorError::transport(endpoint, e.to_string()))?;

        if !status.is_success() {
            return Err(ValidatorError::transport(
                endpoint,
                format!("status {status}: {}", snippet(&text)),
            ));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            ValidatorError::transport(endpoint, format!("unparseable 2xx body: {e}"))
        })
    }
}

#[async_trait]
impl ProvisioningApi for HttpProvisioningApi {
    async fn create_project(&self, draft: &ProjectDraft) -> Result<Value, ValidatorError> {
        tracing::debug!(code = %draft.code, "POST /projects");
        self.post("/projects", draft).await
    }

    async fn create_baseline(&self, draft: &BaselineDraft) -> Result<Value, ValidatorError> {
        tracing::debug!(project = %draft.project_id, "POST /baseline");
        self.post("/baseline", draft).await
    }

    async fn handoff_baseline(
        &self,
        project: &ProjectId,
        request: &HandoffRequest,
    ) -> Result<(), ValidatorError> {
        let path = format!("/projects/{project}/handoff");
        tracing::debug!(%path, "POST");
        self.post(&path, request).await.map(|_| ())
    }

    async fn accept_baseline(
        &self,
        project: &ProjectId,
        request: &AcceptRequest,
    ) -> Result<(), ValidatorError> {
        let path = format!("/projects/{project}/accept-baseline");
        tracing::debug!(%path, "PATCH");
        self.patch(&path, request).await.map(|_| ())
    }
}

fn snippet(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}
