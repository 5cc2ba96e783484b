//! Process configuration resolved from prioritized external inputs
//!
//! Every setting has an ordered list of accepted variable names; the first
//! non-empty value wins. Resolution happens exactly once, before any remote
//! side effect, and a missing API base URL or bearer credential aborts the
//! run with a configuration error.

use crate::error::ValidatorError;
use std::collections::HashMap;

/// Accepted API base URL variables, in priority order
pub const API_BASE_KEYS: &[&str] = &[
    "FINZ_API_BASE",
    "VITE_API_BASE_URL",
    "DEV_API_URL",
    "API_BASE_URL",
];

/// Accepted bearer token variables, in priority order
pub const TOKEN_KEYS: &[&str] = &[
    "FINZ_JWT",
    "FINZ_ID_TOKEN",
    "ID_TOKEN",
    "COGNITO_ID_TOKEN",
    "COGNITO_ACCESS_TOKEN",
    "ACCESS_TOKEN",
    "AUTH_TOKEN",
];

const ACTOR_KEY: &str = "COGNITO_TEST_USER";
const REGION_KEY: &str = "AWS_REGION";
const PROJECTS_TABLE_KEY: &str = "TABLE_PROJECTS";
const PREFACTURAS_TABLE_KEY: &str = "TABLE_PREFACTURAS";

const DEFAULT_ACTOR: &str = "pmo-automation@example.com";
const DEFAULT_REGION: &str = "us-east-2";
const DEFAULT_PROJECTS_TABLE: &str = "finz_projects";
const DEFAULT_PREFACTURAS_TABLE: &str = "finz_prefacturas";

/// Number of project/baseline pairs provisioned per run
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Source of named external inputs
///
/// The process environment in production; a plain map in tests.
pub trait ConfigSource {
    /// Raw value for a variable name, if set
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Immutable configuration for a validation run
#[derive(Clone)]
pub struct ValidatorConfig {
    /// API base URL, trailing slash stripped
    pub api_base: String,
    /// Bearer credential; access via [`ValidatorConfig::bearer_token`]
    token: String,
    /// Variable name that supplied the token, kept for audit logging
    pub token_source: &'static str,
    /// Actor identity used for `signed_by` / `accepted_by` fields
    pub actor: String,
    /// Projects table name
    pub projects_table: String,
    /// Prefacturas (baselines) table name
    pub prefacturas_table: String,
    /// Target store region
    pub region: String,
    /// Number of project/baseline pairs to provision
    pub batch_size: usize,
}

impl ValidatorConfig {
    /// Resolve configuration from a source, failing fast on missing inputs
    pub fn resolve(source: &impl ConfigSource) -> Result<Self, ValidatorError> {
        let (api_base, _) = first_non_empty(source, API_BASE_KEYS).ok_or_else(|| {
            ValidatorError::configuration(format!(
                "API base URL is not configured; set one of {}",
                API_BASE_KEYS.join(", ")
            ))
        })?;
        let (token, token_source) = first_non_empty(source, TOKEN_KEYS).ok_or_else(|| {
            ValidatorError::configuration(format!(
                "bearer token not found; provide one of {}",
                TOKEN_KEYS.join(", ")
            ))
        })?;

        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            token_source,
            actor: non_empty(source, ACTOR_KEY).unwrap_or_else(|| DEFAULT_ACTOR.to_string()),
            projects_table: non_empty(source, PROJECTS_TABLE_KEY)
                .unwrap_or_else(|| DEFAULT_PROJECTS_TABLE.to_string()),
            prefacturas_table: non_empty(source, PREFACTURAS_TABLE_KEY)
                .unwrap_or_else(|| DEFAULT_PREFACTURAS_TABLE.to_string()),
            region: non_empty(source, REGION_KEY).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Bearer credential for the Authorization header
    #[inline]
    #[must_use]
    pub fn bearer_token(&self) -> &str {
        &self.token
    }

    /// Override the batch size
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

// The credential must never leak through debug/trace output.
impl std::fmt::Debug for ValidatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorConfig")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("token_source", &self.token_source)
            .field("actor", &self.actor)
            .field("projects_table", &self.projects_table)
            .field("prefacturas_table", &self.prefacturas_table)
            .field("region", &self.region)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

fn first_non_empty(
    source: &impl ConfigSource,
    keys: &'static [&'static str],
) -> Option<(String, &'static str)> {
    keys.iter().find_map(|key| {
        let value = source.var(key)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some((trimmed.to_string(), *key))
        }
    })
}

fn non_empty(source: &impl ConfigSource, key: &str) -> Option<String> {
    source
        .var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
