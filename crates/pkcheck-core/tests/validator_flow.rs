//! End-to-end workflow tests over in-memory fakes
//!
//! A shared backend state stands in for both the create API and the
//! key-value store, so provisioning writes are visible to the verification
//! reads exactly as they would be against the real system.

use async_trait::async_trait;
use pkcheck_core::{
    AcceptRequest, BaselineDraft, HandoffRequest, ProjectDraft, ProjectId, ProvisioningApi,
    RecordKey, RecordStore, StoredRecord, UniquenessValidator, ValidatorConfig, ValidatorError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const PROJECTS_TABLE: &str = "finz_projects";
const PREFACTURAS_TABLE: &str = "finz_prefacturas";

#[derive(Default)]
struct BackendState {
    records: HashMap<(String, String, String), Map<String, Value>>,
    projects_created: usize,
    baselines_created: usize,
    handoffs: usize,
    accepts: usize,
    partition_queries: usize,
}

impl BackendState {
    fn put(&mut self, table: &str, attributes: Value) {
        let Value::Object(map) = attributes else {
            unreachable!("test records are objects");
        };
        let pk = map["pk"].as_str().expect("pk").to_string();
        let sk = map["sk"].as_str().expect("sk").to_string();
        self.records.insert((table.to_string(), pk, sk), map);
    }
}

/// Behavior switches simulating specific backend defects
#[derive(Debug, Clone, Copy, Default)]
struct Behavior {
    /// Every project create returns the same identifier
    duplicate_project_ids: bool,
    /// Project create responses carry no identifier alias at all
    omit_project_identifier: bool,
    /// Handoff calls fail with a non-2xx status
    fail_handoff: bool,
    /// Baseline metadata records are never persisted
    skip_baseline_metadata: bool,
    /// Baseline metadata embeds a foreign project id
    corrupt_metadata_project: bool,
}

#[derive(Clone)]
struct FakeApi {
    state: Arc<Mutex<BackendState>>,
    behavior: Behavior,
}

#[derive(Clone)]
struct FakeStore {
    state: Arc<Mutex<BackendState>>,
}

fn fixture(behavior: Behavior) -> (FakeApi, FakeStore) {
    let state = Arc::new(Mutex::new(BackendState::default()));
    (
        FakeApi {
            state: Arc::clone(&state),
            behavior,
        },
        FakeStore { state },
    )
}

fn test_config() -> ValidatorConfig {
    let mut source = HashMap::new();
    source.insert("API_BASE_URL".to_string(), "https://api.test".to_string());
    source.insert("AUTH_TOKEN".to_string(), "test-token".to_string());
    ValidatorConfig::resolve(&source).expect("test config resolves")
}

#[async_trait]
impl ProvisioningApi for FakeApi {
    async fn create_project(&self, draft: &ProjectDraft) -> Result<Value, ValidatorError> {
        let mut state = self.state.lock().unwrap();
        state.projects_created += 1;
        if self.behavior.omit_project_identifier {
            return Ok(json!({"status": "created"}));
        }
        let id = if self.behavior.duplicate_project_ids {
            "p-dup".to_string()
        } else {
            format!("p-{}", state.projects_created)
        };
        state.put(
            PROJECTS_TABLE,
            json!({
                "pk": format!("PROJECT#{id}"),
                "sk": "METADATA",
                "project_id": id,
                "name": draft.name,
                "code": draft.code,
            }),
        );
        Ok(json!({"projectId": id}))
    }

    async fn create_baseline(&self, draft: &BaselineDraft) -> Result<Value, ValidatorError> {
        let mut state = self.state.lock().unwrap();
        state.baselines_created += 1;
        let id = format!("b-{}", state.baselines_created);
        state.put(
            PREFACTURAS_TABLE,
            json!({
                "pk": format!("PROJECT#{}", draft.project_id),
                "sk": format!("BASELINE#{id}"),
                "project_id": draft.project_id,
                "baseline_id": id,
            }),
        );
        if !self.behavior.skip_baseline_metadata {
            let embedded = if self.behavior.corrupt_metadata_project {
                "p-intruder".to_string()
            } else {
                draft.project_id.clone()
            };
            state.put(
                PREFACTURAS_TABLE,
                json!({
                    "pk": format!("BASELINE#{id}"),
                    "sk": "METADATA",
                    "project_id": embedded,
                    "signed_by": draft.signed_by,
                }),
            );
        }
        Ok(json!({"baselineId": id}))
    }

    async fn handoff_baseline(
        &self,
        project: &ProjectId,
        _request: &HandoffRequest,
    ) -> Result<(), ValidatorError> {
        if self.behavior.fail_handoff {
            return Err(ValidatorError::transport(
                format!("/projects/{project}/handoff"),
                "status 500 Internal Server Error",
            ));
        }
        self.state.lock().unwrap().handoffs += 1;
        Ok(())
    }

    async fn accept_baseline(
        &self,
        _project: &ProjectId,
        _request: &AcceptRequest,
    ) -> Result<(), ValidatorError> {
        self.state.lock().unwrap().accepts += 1;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn get(
        &self,
        table: &str,
        key: &RecordKey,
    ) -> Result<Option<StoredRecord>, ValidatorError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .get(&(table.to_string(), key.pk.clone(), key.sk.clone()))
            .cloned()
            .map(StoredRecord::new))
    }

    async fn query_partition(
        &self,
        table: &str,
        pk: &str,
        limit: u32,
    ) -> Result<Vec<StoredRecord>, ValidatorError> {
        let mut state = self.state.lock().unwrap();
        state.partition_queries += 1;
        let mut matches: Vec<(String, Map<String, Value>)> = state
            .records
            .iter()
            .filter(|((t, p, _), _)| t == table && p == pk)
            .map(|((_, _, sk), attrs)| (sk.clone(), attrs.clone()))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(matches
            .into_iter()
            .take(limit as usize)
            .map(|(_, attrs)| StoredRecord::new(attrs))
            .collect())
    }
}

#[tokio::test]
async fn clean_batch_passes_with_distinct_keys() {
    let (api, store) = fixture(Behavior::default());
    let validator = UniquenessValidator::new(test_config(), api.clone(), store);

    let report = validator.run().await.expect("run succeeds");

    assert!(report.passed());
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.warning_count(), 0);

    let pks: Vec<&str> = report
        .records
        .iter()
        .map(|r| r.project_key.as_ref().expect("project key observed").pk.as_str())
        .collect();
    assert_eq!(pks, vec!["PROJECT#p-1", "PROJECT#p-2", "PROJECT#p-3"]);
    for record in &report.records {
        assert_eq!(record.project_key.as_ref().unwrap().sk, "METADATA");
    }

    let text = report.render();
    assert!(text.contains("No PK/SK collisions detected among created projects."));

    let state = api.state.lock().unwrap();
    assert_eq!(state.projects_created, 3);
    assert_eq!(state.baselines_created, 3);
    assert_eq!(state.handoffs, 3);
    assert_eq!(state.accepts, 3);
    assert_eq!(state.partition_queries, 0);
}

#[tokio::test]
async fn duplicate_identifiers_are_reported_as_collisions() {
    let (api, store) = fixture(Behavior {
        duplicate_project_ids: true,
        ..Behavior::default()
    });
    let validator = UniquenessValidator::new(test_config(), api, store);

    let report = validator.run().await.expect("run completes despite collisions");

    assert!(!report.passed());
    // The full report is still assembled before the caller exits non-zero.
    assert_eq!(report.records.len(), 3);
    assert_eq!(
        report.collisions.duplicate_pks,
        vec![("PROJECT#p-dup".to_string(), 3)]
    );
    assert_eq!(report.collisions.duplicate_pairs.len(), 1);
    assert!(report.render().contains("Duplicate project PK detected: PROJECT#p-dup"));
}

#[tokio::test]
async fn missing_identifier_aliases_abort_before_baseline_creation() {
    let (api, store) = fixture(Behavior {
        omit_project_identifier: true,
        ..Behavior::default()
    });
    let validator = UniquenessValidator::new(test_config(), api.clone(), store);

    let err = validator.run().await.expect_err("contract violation is fatal");

    assert!(matches!(err, ValidatorError::Contract { .. }));
    assert_eq!(err.exit_code(), 3);
    let state = api.state.lock().unwrap();
    assert_eq!(state.projects_created, 1);
    assert_eq!(state.baselines_created, 0);
}

#[tokio::test]
async fn metadata_project_mismatch_warns_without_failing() {
    let (api, store) = fixture(Behavior {
        corrupt_metadata_project: true,
        ..Behavior::default()
    });
    let validator = UniquenessValidator::new(test_config(), api, store);

    let report = validator.run().await.expect("run succeeds");

    assert!(report.passed(), "a mismatch is a warning, not a collision");
    for record in &report.records {
        assert_eq!(record.warnings.len(), 1);
        let text = record.warnings[0].to_string();
        assert!(text.contains("p-intruder"));
        assert!(text.contains(record.project_id.as_str()));
    }
}

#[tokio::test]
async fn missing_baseline_metadata_triggers_fallback_query() {
    let (api, store) = fixture(Behavior {
        skip_baseline_metadata: true,
        ..Behavior::default()
    });
    let validator = UniquenessValidator::new(test_config(), api.clone(), store);

    let report = validator.run().await.expect("missing metadata is not fatal");

    assert!(report.passed());
    assert_eq!(report.warning_count(), 3);
    let first = &report.records[0];
    let warning = first.warnings[0].to_string();
    assert!(warning.contains("baseline metadata not found"));
    assert!(warning.contains("closest match pk=PROJECT#p-1 sk=BASELINE#b-1"));
    // The linkage record still supplies the observed baseline key.
    assert_eq!(
        first.baseline_key.as_ref().map(|k| k.sk.as_str()),
        Some("BASELINE#b-1")
    );

    let state = api.state.lock().unwrap();
    assert_eq!(state.partition_queries, 3);
}

#[tokio::test]
async fn transition_failure_aborts_the_whole_run() {
    let (api, store) = fixture(Behavior {
        fail_handoff: true,
        ..Behavior::default()
    });
    let validator = UniquenessValidator::new(test_config(), api.clone(), store);

    let err = validator.run().await.expect_err("handoff failure is fatal");

    assert!(matches!(err, ValidatorError::Transport { .. }));
    assert_eq!(err.exit_code(), 4);
    let state = api.state.lock().unwrap();
    // The first pair got as far as handoff; nothing else was attempted.
    assert_eq!(state.projects_created, 1);
    assert_eq!(state.baselines_created, 1);
    assert_eq!(state.accepts, 0);
}

#[tokio::test]
async fn single_pair_batch_is_supported() {
    let (api, store) = fixture(Behavior::default());
    let validator = UniquenessValidator::new(test_config().with_batch_size(1), api, store);

    let report = validator.run().await.expect("run succeeds");

    assert!(report.passed());
    assert_eq!(report.records.len(), 1);
}
