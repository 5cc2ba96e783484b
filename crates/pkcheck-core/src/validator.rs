//! The uniqueness validation workflow
//!
//! Three phases, strictly sequential:
//! 1. Provision a fixed-size batch of project/baseline pairs through the
//!    create API, driving each baseline through handoff and acceptance.
//! 2. Read the persisted records back by their designed keys and collect
//!    field-level consistency warnings.
//! 3. Scan the observed keys for collisions and assemble the report.
//!
//! Any provisioning failure aborts the whole run: uniqueness checks are
//! meaningless on partial state. Resources created before the failure are
//! not rolled back and remain in the remote system for manual cleanup.

use crate::api::{
    extract_identifier, AcceptRequest, BaselineDraft, HandoffRequest, ProjectDraft,
    ProvisioningApi, BASELINE_ID_ALIASES, PROJECT_ID_ALIASES,
};
use crate::collision;
use crate::config::ValidatorConfig;
use crate::error::{IntegrityWarning, ValidatorError};
use crate::keys::{BaselineId, ProjectId, RecordKey, METADATA_SK};
use crate::report::{ValidationRecord, ValidationReport};
use crate::store::{RecordStore, FALLBACK_QUERY_LIMIT};

/// A project/baseline pair created during the provisioning phase
#[derive(Debug, Clone)]
pub struct CreatedPair {
    /// Project assigned by the create API
    pub project_id: ProjectId,
    /// Baseline assigned by the create API
    pub baseline_id: BaselineId,
}

/// Orchestrates provisioning, verification, and the collision scan
#[derive(Debug)]
pub struct UniquenessValidator<A, S> {
    config: ValidatorConfig,
    api: A,
    store: S,
}

impl<A: ProvisioningApi, S: RecordStore> UniquenessValidator<A, S> {
    /// Create a validator over the given API and store
    #[inline]
    #[must_use]
    pub fn new(config: ValidatorConfig, api: A, store: S) -> Self {
        Self { config, api, store }
    }

    /// Run the full workflow and produce the report
    ///
    /// Errors abort the run; collisions do not — they are carried in the
    /// report so the caller can print it in full before deciding the exit
    /// code.
    pub async fn run(&self) -> Result<ValidationReport, ValidatorError> {
        let created = self.provision_batch().await?;
        let records = self.verify(&created).await?;
        let collisions = collision::scan(&records);
        if !collisions.is_empty() {
            tracing::error!(
                duplicate_pks = collisions.duplicate_pks.len(),
                duplicate_pairs = collisions.duplicate_pairs.len(),
                "key collisions detected among created records"
            );
        }
        Ok(ValidationReport::new(records, collisions))
    }

    /// Phase 1: create N projects, each with one baseline handed off and
    /// accepted, in order
    async fn provision_batch(&self) -> Result<Vec<CreatedPair>, ValidatorError> {
        let mut created = Vec::with_capacity(self.config.batch_size);

        for idx in 1..=self.config.batch_size {
            let draft = ProjectDraft::validation_sample(idx);
            tracing::info!(idx, code = %draft.code, "creating project");
            let body = self.api.create_project(&draft).await?;
            let project_id =
                ProjectId::from(extract_identifier(&body, PROJECT_ID_ALIASES, "/projects")?);

            let baseline_draft = BaselineDraft::for_project(&project_id, idx, &self.config.actor);
            tracing::info!(idx, project = %project_id, "creating baseline");
            let body = self.api.create_baseline(&baseline_draft).await?;
            let baseline_id =
                BaselineId::from(extract_identifier(&body, BASELINE_ID_ALIASES, "/baseline")?);

            tracing::info!(project = %project_id, baseline = %baseline_id, "handing off baseline");
            self.api
                .handoff_baseline(&project_id, &HandoffRequest::new(&baseline_id))
                .await?;

            tracing::info!(project = %project_id, baseline = %baseline_id, "accepting baseline");
            self.api
                .accept_baseline(&project_id, &AcceptRequest::new(&baseline_id, &self.config.actor))
                .await?;

            created.push(CreatedPair {
                project_id,
                baseline_id,
            });
        }

        tracing::info!(count = created.len(), "provisioning complete");
        Ok(created)
    }

    /// Phase 2: read every created pair back by its designed keys
    async fn verify(&self, created: &[CreatedPair]) -> Result<Vec<ValidationRecord>, ValidatorError> {
        let mut records = Vec::with_capacity(created.len());
        for pair in created {
            records.push(self.verify_pair(pair).await?);
        }
        Ok(records)
    }

    async fn verify_pair(&self, pair: &CreatedPair) -> Result<ValidationRecord, ValidatorError> {
        let mut warnings = Vec::new();

        let project_key = RecordKey::project_metadata(&pair.project_id);
        let project_item = self
            .store
            .get(&self.config.projects_table, &project_key)
            .await?;

        match &project_item {
            None => warnings.push(IntegrityWarning::MissingProjectMetadata {
                project_id: pair.project_id.to_string(),
            }),
            Some(item) => {
                if let Some(sk) = item.sk() {
                    if sk != METADATA_SK {
                        warnings.push(IntegrityWarning::UnexpectedProjectSortKey {
                            found: sk.to_string(),
                        });
                    }
                }
            }
        }

        let link_key = RecordKey::baseline_link(&pair.project_id, &pair.baseline_id);
        let link = self
            .store
            .get(&self.config.prefacturas_table, &link_key)
            .await?;
        if let Some(link) = &link {
            if let Some(found) = link.str_field("project_id") {
                if found != pair.project_id.as_str() {
                    warnings.push(IntegrityWarning::LinkProjectMismatch {
                        found: found.to_string(),
                        expected: pair.project_id.to_string(),
                    });
                }
            }
        }

        let metadata_key = RecordKey::baseline_metadata(&pair.baseline_id);
        let metadata = self
            .store
            .get(&self.config.prefacturas_table, &metadata_key)
            .await?;
        match &metadata {
            None => {
                // Best-effort diagnostics: surface the closest record in the
                // project's partition, without treating it as the real one.
                tracing::warn!(
                    baseline = %pair.baseline_id,
                    "baseline metadata missing, running fallback partition query"
                );
                let candidates = self
                    .store
                    .query_partition(
                        &self.config.prefacturas_table,
                        &link_key.pk,
                        FALLBACK_QUERY_LIMIT,
                    )
                    .await?;
                let closest = candidates
                    .first()
                    .and_then(|r| r.key())
                    .map(|k| (k.pk, k.sk));
                warnings.push(IntegrityWarning::MissingBaselineMetadata {
                    partition: link_key.pk.clone(),
                    closest,
                });
            }
            Some(metadata) => {
                if let Some(found) = metadata.str_field("project_id") {
                    if found != pair.project_id.as_str() {
                        warnings.push(IntegrityWarning::MetadataProjectMismatch {
                            found: found.to_string(),
                            expected: pair.project_id.to_string(),
                        });
                    }
                }
            }
        }

        for warning in &warnings {
            tracing::warn!(project = %pair.project_id, %warning, "integrity warning");
        }

        let baseline_key = metadata
            .as_ref()
            .and_then(|m| m.key())
            .or_else(|| link.as_ref().and_then(|l| l.key()));

        Ok(ValidationRecord {
            project_id: pair.project_id.clone(),
            baseline_id: pair.baseline_id.clone(),
            project_key: project_item.as_ref().and_then(|p| p.key()),
            baseline_key,
            warnings,
        })
    }
}
