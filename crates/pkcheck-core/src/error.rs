//! Error types for the uniqueness validation workflow
//!
//! Two distinct families:
//! - [`ValidatorError`]: fatal conditions that abort the run before the
//!   batch reaches a comparable state
//! - [`IntegrityWarning`]: verification-time findings, accumulated per
//!   record and surfaced in the report, never fatal
//!
//! Collisions are not errors. They travel through the report and flip the
//! process exit code after the full report has been printed.

/// Fatal workflow errors
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// Required external input missing; raised before any side effect
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Create-API response carried none of the accepted identifier aliases
    #[error("contract violation from {endpoint}: response contains no identifier under any of {aliases:?}")]
    Contract {
        /// Endpoint whose response violated the contract
        endpoint: String,
        /// Alias list that was tried, in order
        aliases: &'static [&'static str],
    },

    /// Request failure or non-2xx status on a create/transition call
    #[error("transport failure on {endpoint}: {detail}")]
    Transport {
        /// Endpoint the call targeted
        endpoint: String,
        /// Status line or client error description
        detail: String,
    },

    /// Key-value store read failed
    #[error("store read failed on table {table}: {detail}")]
    Store {
        /// Table the read targeted
        table: String,
        /// Underlying SDK error description
        detail: String,
    },
}

impl ValidatorError {
    /// Create a configuration error
    #[inline]
    pub fn configuration(detail: impl Into<String>) -> Self {
        Self::Configuration(detail.into())
    }

    /// Create a transport error
    #[inline]
    pub fn transport(endpoint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            detail: detail.into(),
        }
    }

    /// Create a store read error
    #[inline]
    pub fn store(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Store {
            table: table.into(),
            detail: detail.into(),
        }
    }

    /// Check whether the error occurred before any remote side effect
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Process exit code for this error
    ///
    /// `0` is reserved for a passing run and `1` for detected collisions,
    /// neither of which is modeled as an error.
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::Contract { .. } => 3,
            Self::Transport { .. } | Self::Store { .. } => 4,
        }
    }
}

/// Verification-time consistency findings
///
/// Reported per record, never raised. A warning must not hide or be
/// confused with a collision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityWarning {
    /// Project metadata record absent under its designed key
    #[error("project metadata not found for {project_id}")]
    MissingProjectMetadata {
        /// Project whose metadata record is missing
        project_id: String,
    },

    /// Project metadata record persisted under an unexpected sort key
    #[error("unexpected project sk: {found}")]
    UnexpectedProjectSortKey {
        /// Sort key observed in storage
        found: String,
    },

    /// Baseline linkage record references a different project
    #[error("baseline link references project {found} instead of {expected}")]
    LinkProjectMismatch {
        /// Project id embedded in the linkage record
        found: String,
        /// Project id that created the baseline
        expected: String,
    },

    /// Baseline metadata embeds a different project id than its owner
    #[error("baseline metadata project_id {found} mismatches {expected}")]
    MetadataProjectMismatch {
        /// Project id embedded in the metadata record
        found: String,
        /// Project id that created the baseline
        expected: String,
    },

    /// Baseline metadata record absent; diagnostic fallback query ran
    ///
    /// The closest match is best-effort diagnostics only, never proof of
    /// correctness.
    #[error("baseline metadata not found under {partition}; {}", closest_description(.closest))]
    MissingBaselineMetadata {
        /// Partition key the fallback query scanned
        partition: String,
        /// First record found under the partition, if any, as `(pk, sk)`
        closest: Option<(String, String)>,
    },
}

fn closest_description(closest: &Option<(String, String)>) -> String {
    match closest {
        Some((pk, sk)) => format!("closest match pk={pk} sk={sk}"),
        None => "no records under partition".to_string(),
    }
}
