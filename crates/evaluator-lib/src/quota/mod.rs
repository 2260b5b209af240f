//! Resource quota evaluation
//!
//! This module computes the CPU and memory range a deployment may reserve
//! per replica, given the cluster nodes, an optional namespace quota and,
//! when editing, the application's own saved reservation.

mod headroom;

#[cfg(test)]
mod tests;

pub use headroom::{
    reservation_exceeds_headroom, ClusterTotals, Headroom, QuotaEvaluator, QuotaPolicy,
    ResourceRange, DEFAULT_CPU_FLOOR, DEFAULT_MEMORY_FLOOR_MB,
};
