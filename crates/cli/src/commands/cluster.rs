//! Cluster capacity command

use anyhow::{Context, Result};
use colored::Colorize;
use evaluator_lib::ClusterReservation;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{color_usage, format_cpu, format_megabytes, print_json, print_table, OutputFormat};
use crate::snapshot::Snapshot;

/// Row for the cluster capacity table
#[derive(Tabled)]
struct CapacityRow {
    #[tabled(rename = "Resource")]
    resource: &'static str,
    #[tabled(rename = "Capacity")]
    capacity: String,
    #[tabled(rename = "Reserved")]
    reserved: String,
    #[tabled(rename = "Usage")]
    usage: String,
}

#[derive(Serialize)]
struct ClusterReport {
    #[serde(flatten)]
    reservation: ClusterReservation,
    cpu_usage_percent: f64,
    memory_usage_percent: f64,
}

/// Show cluster capacity against the requests of scheduled pods
pub fn show_cluster(snapshot: &Snapshot, format: OutputFormat) -> Result<()> {
    let nodes = snapshot.node_capacities()?;
    let reservation = ClusterReservation::compute(&nodes, &snapshot.pods)
        .context("Invalid pod resource request")?;

    let report = ClusterReport {
        cpu_usage_percent: reservation.cpu_usage_percent(),
        memory_usage_percent: reservation.memory_usage_percent(),
        reservation,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            println!("{}", "Cluster Capacity".bold());
            println!("Nodes: {}", report.reservation.node_count);
            if let Some(captured_at) = snapshot.captured_at {
                println!("Captured: {}", captured_at.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed());
            }

            let rows = vec![
                CapacityRow {
                    resource: "CPU (cores)",
                    capacity: format_cpu(report.reservation.cpu_capacity),
                    reserved: format_cpu(report.reservation.cpu_reserved),
                    usage: color_usage(report.cpu_usage_percent),
                },
                CapacityRow {
                    resource: "Memory",
                    capacity: format_megabytes(report.reservation.memory_capacity_mb),
                    reserved: format_megabytes(report.reservation.memory_reserved_mb),
                    usage: color_usage(report.memory_usage_percent),
                },
            ];
            print_table(&rows);
        }
    }

    Ok(())
}
