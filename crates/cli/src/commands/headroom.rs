//! Headroom command

use anyhow::{Context, Result};
use colored::Colorize;
use evaluator_lib::{DeploymentRequest, Headroom, QuotaEvaluator, SliderState};
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use super::saved_reservation;
use crate::output::{
    format_cpu, format_megabytes, print_info, print_json, print_success, print_table,
    print_warning, OutputFormat,
};
use crate::snapshot::Snapshot;

/// Row for the headroom table
#[derive(Tabled)]
struct HeadroomRow {
    #[tabled(rename = "Resource")]
    resource: &'static str,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Requested")]
    requested: String,
    #[tabled(rename = "Suggested")]
    suggested: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Serialize)]
struct HeadroomReport {
    headroom: Headroom,
    requested: DeploymentRequest,
    suggested: DeploymentRequest,
    total_cpu: f64,
    total_memory_mb: u64,
    exceeds_headroom: bool,
    capacity_exhausted: bool,
}

/// Show the allowable per-replica range and check the request against it
pub fn show_headroom(
    snapshot: &Snapshot,
    evaluator: &QuotaEvaluator,
    format: OutputFormat,
) -> Result<()> {
    let listings = snapshot.node_listings()?;
    let quota = snapshot.namespace_quota()?;
    let saved = saved_reservation(snapshot)?;

    let mut form = snapshot.application_form()?;
    let requested = form.deployment.clone();

    let mut sliders = SliderState::new();
    let headroom = sliders
        .refresh_form(evaluator, &listings, quota.as_ref(), saved.as_ref(), &mut form)
        .context("Invalid node listing")?;
    debug!(
        cpu_max = headroom.cpu.max,
        memory_max_mb = headroom.memory_mb.max,
        "Sliders refreshed"
    );

    let replicas = u64::from(requested.replica_count());
    let report = HeadroomReport {
        headroom,
        total_cpu: requested.cpu_limit_per_replica() * replicas as f64,
        total_memory_mb: requested.memory_limit_per_replica_mb().saturating_mul(replicas),
        exceeds_headroom: headroom.is_exceeded_by(&requested),
        capacity_exhausted: headroom.is_capacity_exhausted(),
        suggested: form.deployment,
        requested,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &HeadroomReport) {
    let headroom = &report.headroom;
    let requested = &report.requested;
    let suggested = &report.suggested;

    println!("{}", "Resource Headroom".bold());
    if headroom.quota_applied {
        print_info("Namespace quota applied");
    } else {
        print_info("No namespace quota, bounded by cluster capacity");
    }

    let rows = vec![
        HeadroomRow {
            resource: "CPU (cores)",
            min: format_cpu(headroom.cpu.min),
            max: format_cpu(headroom.cpu.max),
            requested: format_cpu(requested.cpu_limit_per_replica()),
            suggested: format_cpu(suggested.cpu_limit_per_replica()),
            total: format_cpu(report.total_cpu),
        },
        HeadroomRow {
            resource: "Memory",
            min: format_megabytes(headroom.memory_mb.min),
            max: format_megabytes(headroom.memory_mb.max),
            requested: format_megabytes(requested.memory_limit_per_replica_mb()),
            suggested: format_megabytes(suggested.memory_limit_per_replica_mb()),
            total: format_megabytes(report.total_memory_mb),
        },
    ];
    print_table(&rows);

    println!("Replicas: {}", requested.replica_count());
    if report.capacity_exhausted {
        print_warning("No capacity left to reserve under the namespace quota");
    }
    if report.exceeds_headroom {
        print_warning("Requested resources exceed the available headroom");
    } else {
        print_success("Requested resources fit within the available headroom");
    }
}
