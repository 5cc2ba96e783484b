//! Collision scan over the keys observed during a run
//!
//! A collision is two distinct created records sharing key material in
//! storage: either the same project primary key, or the same full
//! `(pk, sk)` pair. Either indicates an identifier-generation defect.

use crate::keys::RecordKey;
use crate::report::ValidationRecord;

/// Duplicate key material found among the created records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionSummary {
    /// Project primary keys observed more than once, with counts
    pub duplicate_pks: Vec<(String, usize)>,
    /// Full `(pk, sk)` pairs observed more than once, with counts
    pub duplicate_pairs: Vec<(RecordKey, usize)>,
}

impl CollisionSummary {
    /// True when no duplicate key material was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.duplicate_pks.is_empty() && self.duplicate_pairs.is_empty()
    }
}

/// Frequency-count scan of the observed project keys
///
/// Records whose project metadata was never found contribute nothing;
/// their absence is already surfaced as an integrity warning. Output
/// ordering is first-seen, so reports are stable across runs.
#[must_use]
pub fn scan(records: &[ValidationRecord]) -> CollisionSummary {
    let mut pk_counts: Vec<(String, usize)> = Vec::new();
    let mut pair_counts: Vec<(RecordKey, usize)> = Vec::new();

    for record in records {
        let Some(key) = &record.project_key else {
            continue;
        };
        match pk_counts.iter_mut().find(|(pk, _)| *pk == key.pk) {
            Some(entry) => entry.1 += 1,
            None => pk_counts.push((key.pk.clone(), 1)),
        }
        match pair_counts.iter_mut().find(|(seen, _)| seen == key) {
            Some(entry) => entry.1 += 1,
            None => pair_counts.push((key.clone(), 1)),
        }
    }

    CollisionSummary {
        duplicate_pks: pk_counts.into_iter().filter(|(_, n)| *n > 1).collect(),
        duplicate_pairs: pair_counts.into_iter().filter(|(_, n)| *n > 1).collect(),
    }
}
