//! Storage compatibility command

use anyhow::Result;
use colored::Colorize;
use evaluator_lib::{
    is_edit_and_stateful_set, non_scalable_storage_classes, show_data_access_policy,
    supports_global_deployment, supports_scalable_replicas, DataAccessPolicy, WorkloadKind,
};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{color_flag, print_info, print_json, print_table, print_warning, OutputFormat};
use crate::snapshot::Snapshot;

/// Row for the compatibility table
#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Check")]
    check: &'static str,
    #[tabled(rename = "Answer")]
    answer: String,
}

#[derive(Serialize)]
struct CompatibilityReport {
    data_access_policy: DataAccessPolicy,
    workload_kind: WorkloadKind,
    supports_global_deployment: bool,
    supports_scalable_replicas: bool,
    show_data_access_policy: bool,
    data_access_policy_locked: bool,
    non_scalable_storage_classes: Vec<String>,
}

/// Show what the persisted storage allows for the application
pub fn show_compatibility(snapshot: &Snapshot, format: OutputFormat) -> Result<()> {
    let form = snapshot.application_form()?;
    let folders = &form.persisted_folders;
    let policy = form.deployment.data_access_policy();

    let report = CompatibilityReport {
        data_access_policy: policy,
        workload_kind: form.deployment.workload_kind(),
        supports_global_deployment: supports_global_deployment(folders, policy),
        supports_scalable_replicas: supports_scalable_replicas(folders, policy),
        show_data_access_policy: show_data_access_policy(folders),
        data_access_policy_locked: is_edit_and_stateful_set(snapshot.is_edit(), policy),
        non_scalable_storage_classes: non_scalable_storage_classes(folders),
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &CompatibilityReport) {
    println!("{}", "Storage Compatibility".bold());
    print_info(&format!("Realized as a {}", report.workload_kind));

    let rows = vec![
        CheckRow {
            check: "Global deployment",
            answer: color_flag(report.supports_global_deployment, true),
        },
        CheckRow {
            check: "Scalable replicas",
            answer: color_flag(report.supports_scalable_replicas, true),
        },
        CheckRow {
            check: "Data access policy shown",
            answer: color_flag(report.show_data_access_policy, true),
        },
        CheckRow {
            check: "Data access policy locked",
            answer: color_flag(report.data_access_policy_locked, false),
        },
    ];
    print_table(&rows);

    if !report.non_scalable_storage_classes.is_empty() {
        print_warning(&format!(
            "ReadWriteOnce-only storage classes: {}",
            report.non_scalable_storage_classes.join(", ")
        ));
    }
}
