//! Cluster-wide resource reservation
//!
//! Sums the container resource requests of every pod scheduled on a known
//! node and sets them against the aggregate node capacity. Pods that are
//! not scheduled, or scheduled on nodes outside the given set, are left
//! out.

use crate::error::Result;
use crate::models::NodeCapacity;
use crate::quantity::{megabytes, parse_cpu, parse_memory};
use k8s_openapi::api::core::v1::Pod;
use serde::Serialize;
use std::collections::HashSet;

/// Requested CPU (cores) and memory (bytes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ResourceReservation {
    pub cpu_cores: f64,
    pub memory_bytes: u64,
}

impl ResourceReservation {
    /// Sum the container requests of the given pods
    pub fn from_pods<'a>(pods: impl IntoIterator<Item = &'a Pod>) -> Result<Self> {
        let mut total = Self::default();

        let requests = pods
            .into_iter()
            .filter_map(|pod| pod.spec.as_ref())
            .flat_map(|spec| spec.containers.iter())
            .filter_map(|container| container.resources.as_ref())
            .filter_map(|resources| resources.requests.as_ref());

        for request in requests {
            if let Some(cpu) = request.get("cpu") {
                total.cpu_cores += parse_cpu(&cpu.0)?;
            }
            if let Some(memory) = request.get("memory") {
                total.memory_bytes = total.memory_bytes.saturating_add(parse_memory(&memory.0)?);
            }
        }

        Ok(total)
    }
}

/// Capacity and reservation across the cluster; memory in whole megabytes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReservation {
    pub node_count: usize,
    pub cpu_capacity: f64,
    pub memory_capacity_mb: u64,
    pub cpu_reserved: f64,
    pub memory_reserved_mb: u64,
}

impl ClusterReservation {
    pub fn compute(nodes: &[NodeCapacity], pods: &[Pod]) -> Result<Self> {
        let node_names: HashSet<&str> = nodes.iter().map(|node| node.name()).collect();

        let scheduled = pods.iter().filter(|pod| {
            pod.spec
                .as_ref()
                .and_then(|spec| spec.node_name.as_deref())
                .is_some_and(|name| node_names.contains(name))
        });
        let reservation = ResourceReservation::from_pods(scheduled)?;

        Ok(Self {
            node_count: nodes.len(),
            cpu_capacity: nodes.iter().map(|node| node.cpu_cores()).sum(),
            // Floored per node before summing
            memory_capacity_mb: nodes.iter().map(|node| megabytes(node.memory_bytes())).sum(),
            cpu_reserved: reservation.cpu_cores,
            memory_reserved_mb: megabytes(reservation.memory_bytes),
        })
    }

    pub fn cpu_usage_percent(&self) -> f64 {
        percentage(self.cpu_reserved, self.cpu_capacity)
    }

    pub fn memory_usage_percent(&self) -> f64 {
        percentage(self.memory_reserved_mb as f64, self.memory_capacity_mb as f64)
    }
}

fn percentage(used: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    used / total * 100.0
}
