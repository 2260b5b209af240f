//! Deploy readiness command

use anyhow::Result;
use colored::Colorize;
use evaluator_lib::{
    duplicate_positions, supports_scalable_replicas, BlockReason, DeployContext, DeployReadiness,
    QuotaEvaluator,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;
use tracing::{debug, info};

use super::compute_headroom;
use crate::output::{
    print_error, print_json, print_success, print_table, print_warning, OutputFormat,
};
use crate::snapshot::Snapshot;

/// Row for the duplicate key table
#[derive(Tabled)]
struct DuplicateRow {
    #[tabled(rename = "Section")]
    section: &'static str,
    #[tabled(rename = "Row")]
    row: usize,
    #[tabled(rename = "Key")]
    key: String,
}

#[derive(Serialize)]
struct ValidationReport {
    deploy_disabled: bool,
    blocking_reasons: Vec<BlockReason>,
    readiness: DeployReadiness,
    /// More than one replica on storage that cannot be shared between them
    replicas_exceed_storage: bool,
    duplicate_configuration_keys: BTreeMap<String, usize>,
}

/// Check whether the deploy/update action is allowed.
///
/// Returns `false` when something blocks it, so the caller can exit
/// non-zero.
pub fn validate_form(
    snapshot: &Snapshot,
    evaluator: &QuotaEvaluator,
    format: OutputFormat,
) -> Result<bool> {
    let form = snapshot.application_form()?;
    let saved = snapshot.saved_form()?;
    let headroom = compute_headroom(snapshot, evaluator)?;

    let readiness = DeployReadiness::evaluate(&DeployContext {
        form: &form,
        saved: saved.as_ref(),
        headroom: &headroom,
        existing_applications: &snapshot.existing_applications,
        editing_id: snapshot.editing_id.as_deref(),
    });
    let blocking_reasons = readiness.blocking_reasons();

    let configuration = snapshot.configuration.clone().unwrap_or_default();
    let duplicate_configuration_keys = configuration.duplicate_keys();

    let replicas_exceed_storage = form.deployment.replica_count() > 1
        && !supports_scalable_replicas(
            &form.persisted_folders,
            form.deployment.data_access_policy(),
        );

    let deploy_disabled = !blocking_reasons.is_empty() || !configuration.is_valid();
    debug!(reasons = ?blocking_reasons, "Evaluated deploy readiness");
    info!(application = %form.name, deploy_disabled, "Validation finished");

    let env_names: Vec<&str> = form
        .environment_variables
        .iter()
        .map(|env| env.name.as_str())
        .collect();
    let folder_paths: Vec<&str> = form
        .persisted_folders
        .iter()
        .map(|folder| folder.container_path.as_str())
        .collect();
    let config_keys: Vec<&str> = configuration
        .entries
        .iter()
        .map(|entry| entry.key.as_str())
        .collect();

    let report = ValidationReport {
        deploy_disabled,
        blocking_reasons,
        readiness,
        replicas_exceed_storage,
        duplicate_configuration_keys,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            println!("{}", "Deploy Readiness".bold());

            let mut rows = Vec::new();
            for (section, keys) in [
                ("Environment", &env_names),
                ("Persisted folders", &folder_paths),
                ("Configuration", &config_keys),
            ] {
                rows.extend(duplicate_positions(keys).into_iter().map(|(index, key)| DuplicateRow {
                    section,
                    row: index + 1,
                    key,
                }));
            }
            if !rows.is_empty() {
                print_table(&rows);
            }

            if report.readiness.capacity_exhausted {
                print_warning("No capacity left to reserve under the namespace quota");
            }
            if report.replicas_exceed_storage {
                print_warning(
                    "ReadWriteOnce-only storage cannot be shared by several replicas; \
                     use isolated data access or a single replica",
                );
            }
            for reason in &report.blocking_reasons {
                print_error(&reason.to_string());
            }
            if !report.duplicate_configuration_keys.is_empty() {
                print_error("configuration keys are duplicated");
            }
            if !report.deploy_disabled {
                print_success("Ready to deploy");
            }
        }
    }

    Ok(!report.deploy_disabled)
}
