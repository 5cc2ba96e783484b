//! pkcheck - PK/SK uniqueness validator
//!
//! Provisions three validation projects (each with a handed-off, accepted
//! baseline) against the Finanzas API, reads the persisted records back
//! from DynamoDB, and reports key collisions and linkage mismatches.
//!
//! All configuration comes from the environment; there are no flags.
//! Exit codes: `0` pass, `1` collisions detected, `2` configuration error,
//! `3` contract violation, `4` transport/store failure. The report is
//! always printed in full before the process exits.

mod dynamo;
mod http;

use dynamo::DynamoRecordStore;
use http::HttpProvisioningApi;
use pkcheck_core::{ProcessEnv, UniquenessValidator, ValidatorConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    std::process::exit(run().await);
}

async fn run() -> i32 {
    let config = match ValidatorConfig::resolve(&ProcessEnv) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return err.exit_code();
        }
    };
    tracing::info!(
        api_base = %config.api_base,
        token_source = config.token_source,
        projects_table = %config.projects_table,
        prefacturas_table = %config.prefacturas_table,
        region = %config.region,
        "configuration resolved"
    );

    let api = match HttpProvisioningApi::new(&config) {
        Ok(api) => api,
        Err(err) => {
            eprintln!("{err}");
            return err.exit_code();
        }
    };
    let store = DynamoRecordStore::connect(&config.region).await;

    let validator = UniquenessValidator::new(config, api, store);
    match validator.run().await {
        Ok(report) => {
            print!("{report}");
            if report.passed() {
                0
            } else {
                1
            }
        }
        Err(err) => {
            // Partial resources created before the failure are not rolled
            // back; they remain in the remote system for manual cleanup.
            eprintln!("validation aborted: {err}");
            err.exit_code()
        }
    }
}
