//! Final uniqueness report
//!
//! The report is always rendered in full, even when collisions were found,
//! so operators get complete diagnostics before the process exits.

use crate::collision::CollisionSummary;
use crate::error::IntegrityWarning;
use crate::keys::{BaselineId, ProjectId, RecordKey};
use std::fmt;

/// Verification outcome for one created project/baseline pair
///
/// Validator-owned and in-memory only; discarded at process exit.
#[derive(Debug, Clone)]
pub struct ValidationRecord {
    /// Project identifier returned by the create API
    pub project_id: ProjectId,
    /// Baseline identifier returned by the create API
    pub baseline_id: BaselineId,
    /// Project key as observed in storage, if the record was found
    pub project_key: Option<RecordKey>,
    /// Baseline key as observed in storage, if any record was found
    pub baseline_key: Option<RecordKey>,
    /// Consistency findings, reported but never fatal
    pub warnings: Vec<IntegrityWarning>,
}

/// Full report for a validation run
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Per-record outcomes, in creation order
    pub records: Vec<ValidationRecord>,
    /// Duplicate key material found across the batch
    pub collisions: CollisionSummary,
}

impl ValidationReport {
    /// Assemble the report
    #[inline]
    #[must_use]
    pub fn new(records: Vec<ValidationRecord>, collisions: CollisionSummary) -> Self {
        Self {
            records,
            collisions,
        }
    }

    /// True when no collisions were found; warnings alone still pass
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.collisions.is_empty()
    }

    /// Total warnings across all records
    #[inline]
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.records.iter().map(|r| r.warnings.len()).sum()
    }

    /// Render the full report text
    #[inline]
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== PK/SK Uniqueness Report ===")?;
        for record in &self.records {
            writeln!(
                f,
                "Project {}: {} | Baseline {}: {}",
                record.project_id,
                fmt_key(&record.project_key),
                record.baseline_id,
                fmt_key(&record.baseline_key),
            )?;
            for warning in &record.warnings {
                writeln!(f, "  warning: {warning}")?;
            }
        }

        writeln!(f)?;
        if self.collisions.is_empty() {
            writeln!(f, "No PK/SK collisions detected among created projects.")?;
        } else {
            for (pk, count) in &self.collisions.duplicate_pks {
                writeln!(f, "Duplicate project PK detected: {pk} ({count} occurrences)")?;
            }
            for (key, count) in &self.collisions.duplicate_pairs {
                writeln!(
                    f,
                    "Duplicate project PK/SK pair detected: {key} ({count} occurrences)"
                )?;
            }
        }
        Ok(())
    }
}

fn fmt_key(key: &Option<RecordKey>) -> String {
    match key {
        Some(key) => key.to_string(),
        None => "pk=<absent> sk=<absent>".to_string(),
    }
}
