//! pkcheck-core - PK/SK uniqueness validation workflow
//!
//! Provisions a fixed-size batch of test projects (each with one baseline
//! driven through handoff and acceptance) against the Finanzas create API,
//! then reads the persisted records back by their designed keys and checks
//! storage-layer invariants:
//! - every created project's `(pk, sk)` pair is unique across the batch
//! - every created project's `pk` alone is unique across the batch
//! - the baseline linkage record references the project that created it
//! - the baseline metadata embeds the owning project's id
//!
//! The API and the key-value store are trait seams ([`ProvisioningApi`],
//! [`RecordStore`]); the `pkcheck-cli` crate provides the HTTP and
//! DynamoDB implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use pkcheck_core::{ProcessEnv, UniquenessValidator, ValidatorConfig};
//!
//! # async fn example(api: impl pkcheck_core::ProvisioningApi, store: impl pkcheck_core::RecordStore) -> Result<(), pkcheck_core::ValidatorError> {
//! let config = ValidatorConfig::resolve(&ProcessEnv)?;
//! let report = UniquenessValidator::new(config, api, store).run().await?;
//! print!("{report}");
//! assert!(report.passed());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api;
pub mod collision;
pub mod config;
pub mod error;
pub mod keys;
pub mod report;
pub mod store;
pub mod validator;

// Re-exports for convenience
pub use api::{
    extract_identifier, AcceptRequest, BaselineDraft, HandoffRequest, LaborLine, NonLaborLine,
    ProjectDraft, ProvisioningApi, BASELINE_ID_ALIASES, PROJECT_ID_ALIASES,
};
pub use collision::{scan, CollisionSummary};
pub use config::{ConfigSource, ProcessEnv, ValidatorConfig, API_BASE_KEYS, TOKEN_KEYS};
pub use error::{IntegrityWarning, ValidatorError};
pub use keys::{BaselineId, ProjectId, RecordKey, METADATA_SK};
pub use report::{ValidationRecord, ValidationReport};
pub use store::{RecordStore, StoredRecord, FALLBACK_QUERY_LIMIT};
pub use validator::{CreatedPair, UniquenessValidator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the validation workflow
    pub use crate::{
        ProvisioningApi, RecordStore, UniquenessValidator, ValidationReport, ValidatorConfig,
        ValidatorError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
