//! Designed key scheme for the projects and prefacturas tables
//!
//! Every record the validator reads back lives under a composite
//! `(pk, sk)` key with one of three shapes:
//! - project metadata: `PROJECT#<project_id>` / `METADATA`
//! - baseline metadata: `BASELINE#<baseline_id>` / `METADATA`
//! - baseline linkage: `PROJECT#<project_id>` / `BASELINE#<baseline_id>`

use serde::{Deserialize, Serialize};

/// Sort key shared by both metadata record shapes
pub const METADATA_SK: &str = "METADATA";

/// Opaque project identifier assigned by the create API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    /// Borrow the raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProjectId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque baseline identifier assigned by the create API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaselineId(String);

impl BaselineId {
    /// Borrow the raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BaselineId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for BaselineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite lookup key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    /// Primary (partition) key
    pub pk: String,
    /// Secondary (sort) key
    pub sk: String,
}

impl RecordKey {
    /// Key of a project's metadata record
    #[inline]
    #[must_use]
    pub fn project_metadata(project: &ProjectId) -> Self {
        Self {
            pk: format!("PROJECT#{project}"),
            sk: METADATA_SK.to_string(),
        }
    }

    /// Key of a baseline's metadata record
    #[inline]
    #[must_use]
    pub fn baseline_metadata(baseline: &BaselineId) -> Self {
        Self {
            pk: format!("BASELINE#{baseline}"),
            sk: METADATA_SK.to_string(),
        }
    }

    /// Key of the optional linkage record tying a baseline to its project
    #[inline]
    #[must_use]
    pub fn baseline_link(project: &ProjectId, baseline: &BaselineId) -> Self {
        Self {
            pk: format!("PROJECT#{project}"),
            sk: format!("BASELINE#{baseline}"),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pk={} sk={}", self.pk, self.sk)
    }
}
