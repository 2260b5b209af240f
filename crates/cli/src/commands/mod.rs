//! CLI subcommands

pub mod cluster;
pub mod compat;
pub mod headroom;
pub mod validate;

use crate::snapshot::Snapshot;
use anyhow::Result;
use evaluator_lib::{Headroom, QuotaEvaluator, SavedReservation};
use tracing::debug;

/// Reservation credited back when editing
fn saved_reservation(snapshot: &Snapshot) -> Result<Option<SavedReservation>> {
    Ok(snapshot.saved_form()?.map(|form| form.reservation()))
}

/// Headroom for the snapshot's cluster, quota and saved reservation
fn compute_headroom(snapshot: &Snapshot, evaluator: &QuotaEvaluator) -> Result<Headroom> {
    let nodes = snapshot.node_capacities()?;
    let quota = snapshot.namespace_quota()?;
    let saved = saved_reservation(snapshot)?;

    let headroom = evaluator.compute_headroom(&nodes, quota.as_ref(), saved.as_ref());
    debug!(
        nodes = nodes.len(),
        quota_applied = headroom.quota_applied,
        cpu_max = headroom.cpu.max,
        memory_max_mb = headroom.memory_mb.max,
        "Computed headroom"
    );
    Ok(headroom)
}
