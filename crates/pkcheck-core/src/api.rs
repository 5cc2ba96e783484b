//! Provisioning API contract: payloads, responses, and the identifier shim
//!
//! The create API's response shape is not strictly pinned, so identifier
//! extraction is a tolerant-parsing compatibility shim: an ordered list of
//! candidate field names tried in sequence, first present-and-non-empty
//! wins. Pinning the contract upstream would make the shim unnecessary.

use crate::error::ValidatorError;
use crate::keys::{BaselineId, ProjectId};
use async_trait::async_trait;
use chrono::{Days, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Accepted project identifier aliases, in order
pub const PROJECT_ID_ALIASES: &[&str] = &["projectId", "project_id", "id"];

/// Accepted baseline identifier aliases, in order
pub const BASELINE_ID_ALIASES: &[&str] = &["baselineId", "baseline_id"];

/// Remote create/transition operations the validator drives
///
/// Implementations are synchronous from the workflow's point of view: the
/// validator awaits every call before issuing the next one, because later
/// steps depend on identifiers returned by earlier ones.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// `POST /projects`
    async fn create_project(&self, draft: &ProjectDraft) -> Result<Value, ValidatorError>;

    /// `POST /baseline`
    async fn create_baseline(&self, draft: &BaselineDraft) -> Result<Value, ValidatorError>;

    /// `POST /projects/{project_id}/handoff`; any 2xx is success
    async fn handoff_baseline(
        &self,
        project: &ProjectId,
        request: &HandoffRequest,
    ) -> Result<(), ValidatorError>;

    /// `PATCH /projects/{project_id}/accept-baseline`; any 2xx is success
    async fn accept_baseline(
        &self,
        project: &ProjectId,
        request: &AcceptRequest,
    ) -> Result<(), ValidatorError>;
}

/// Extract an identifier from a create-API response body
///
/// Tries `aliases` in order; the first present, non-empty value wins.
/// String and numeric values are both accepted. Absence of every alias is
/// a contract violation naming the endpoint and the list that was tried.
pub fn extract_identifier(
    body: &Value,
    aliases: &'static [&'static str],
    endpoint: &str,
) -> Result<String, ValidatorError> {
    aliases
        .iter()
        .find_map(|alias| match body.get(alias) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| ValidatorError::Contract {
            endpoint: endpoint.to_string(),
            aliases,
        })
}

/// Project creation payload
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDraft {
    /// Display name
    pub name: String,
    /// Unique generated code, `VAL-xxxxxxxx` style
    pub code: String,
    /// Client name
    pub client: String,
    /// ISO start date
    pub start_date: String,
    /// ISO end date
    pub end_date: String,
    /// Currency code
    pub currency: String,
    /// Budget total
    pub mod_total: u64,
    /// Free-form description
    pub description: String,
}

impl ProjectDraft {
    /// Build the payload for batch index `idx` (1-based)
    ///
    /// The code carries a random suffix so repeated runs never reuse codes.
    #[must_use]
    pub fn validation_sample(idx: usize) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            name: format!("PK-SK Validation Project {idx}"),
            code: format!("VAL-{}", &suffix[..8]),
            client: "QA Validator".to_string(),
            start_date: iso_date(0),
            end_date: iso_date(30),
            currency: "USD".to_string(),
            mod_total: budget_for(idx),
            description: "Automated PK/SK uniqueness validation".to_string(),
        }
    }
}

/// Baseline creation payload
#[derive(Debug, Clone, Serialize)]
pub struct BaselineDraft {
    /// Owning project
    pub project_id: String,
    /// Project display name
    pub project_name: String,
    /// Project description
    pub project_description: String,
    /// Client name
    pub client_name: String,
    /// Currency code
    pub currency: String,
    /// ISO start date
    pub start_date: String,
    /// Contract duration
    pub duration_months: u32,
    /// Contract value, matches the project budget
    pub contract_value: u64,
    /// Labor estimate lines (empty stub for validation runs)
    pub labor_estimates: Vec<LaborLine>,
    /// Non-labor estimate lines (empty stub for validation runs)
    pub non_labor_estimates: Vec<NonLaborLine>,
    /// Assumption strings
    pub assumptions: Vec<String>,
    /// Signing actor
    pub signed_by: String,
    /// Signing role
    pub signed_role: String,
    /// Signing timestamp, RFC 3339
    pub signed_at: String,
}

impl BaselineDraft {
    /// Build the payload for a freshly created project
    #[must_use]
    pub fn for_project(project: &ProjectId, idx: usize, actor: &str) -> Self {
        Self {
            project_id: project.as_str().to_string(),
            project_name: format!("PK-SK Validation Project {idx}"),
            project_description: "PK/SK guardrail regression".to_string(),
            client_name: "QA Validator".to_string(),
            currency: "USD".to_string(),
            start_date: iso_date(0),
            duration_months: 12,
            contract_value: budget_for(idx),
            labor_estimates: Vec::new(),
            non_labor_estimates: Vec::new(),
            assumptions: vec!["automated validation".to_string()],
            signed_by: actor.to_string(),
            signed_role: "PMO".to_string(),
            signed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Labor estimate line item
#[derive(Debug, Clone, Serialize)]
pub struct LaborLine {
    /// Role name
    pub role: String,
    /// Estimated hours
    pub hours: u32,
    /// Hourly rate
    pub rate: f64,
}

/// Non-labor estimate line item
#[derive(Debug, Clone, Serialize)]
pub struct NonLaborLine {
    /// Cost category
    pub category: String,
    /// Estimated amount
    pub amount: f64,
}

/// Handoff transition payload
#[derive(Debug, Clone, Serialize)]
pub struct HandoffRequest {
    /// Baseline being handed off
    pub baseline_id: String,
    /// Budget total
    pub mod_total: u64,
    /// Engineering share, percent
    pub pct_ingenieros: u8,
    /// Service delivery share, percent
    pub pct_sdm: u8,
    /// Project display name
    pub project_name: String,
    /// Client name
    pub client_name: String,
}

impl HandoffRequest {
    /// Build the handoff payload for a baseline
    #[must_use]
    pub fn new(baseline: &BaselineId) -> Self {
        Self {
            baseline_id: baseline.as_str().to_string(),
            mod_total: 100_000,
            pct_ingenieros: 70,
            pct_sdm: 30,
            project_name: format!("Handoff {baseline}"),
            client_name: "QA Validator".to_string(),
        }
    }
}

/// Acceptance transition payload
#[derive(Debug, Clone, Serialize)]
pub struct AcceptRequest {
    /// Baseline being accepted
    pub baseline_id: String,
    /// Accepting actor identity
    pub accepted_by: String,
}

impl AcceptRequest {
    /// Build the acceptance payload for a baseline
    #[must_use]
    pub fn new(baseline: &BaselineId, actor: &str) -> Self {
        Self {
            baseline_id: baseline.as_str().to_string(),
            accepted_by: actor.to_string(),
        }
    }
}

fn budget_for(idx: usize) -> u64 {
    100_000 + (idx as u64) * 1_000
}

fn iso_date(days_ahead: u64) -> String {
    Utc::now()
        .date_naive()
        .checked_add_days(Days::new(days_ahead))
        .unwrap_or_else(|| Utc::now().date_naive())
        .to_string()
}
