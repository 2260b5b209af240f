//! Headroom computation for per-replica CPU and memory limits
//!
//! Headroom is bounded by aggregate node capacity, narrowed by the
//! namespace quota when one defines a limit, and widened again by the
//! reservation of the application being edited so it does not count
//! against itself.

use crate::models::{DeploymentRequest, NamespaceQuota, NodeCapacity, SavedReservation};
use crate::quantity::{bytes_from_megabytes, megabytes, round_cpu};
use serde::{Deserialize, Serialize};

/// Minimum CPU limit (cores) for a container under a quota
pub const DEFAULT_CPU_FLOOR: f64 = 0.1;

/// Minimum memory limit (MB) for a container under a quota
pub const DEFAULT_MEMORY_FLOOR_MB: u64 = 64;

/// Floors applied when a namespace quota constrains a resource
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuotaPolicy {
    pub cpu_floor: f64,
    pub memory_floor_mb: u64,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            cpu_floor: DEFAULT_CPU_FLOOR,
            memory_floor_mb: DEFAULT_MEMORY_FLOOR_MB,
        }
    }
}

/// Inclusive range for a slider
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> ResourceRange<T> {
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Allowable range for per-replica limits
///
/// CPU is in cores with two decimals, memory in whole megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Headroom {
    pub cpu: ResourceRange<f64>,
    pub memory_mb: ResourceRange<u64>,
    /// Whether a namespace quota was part of the computation
    pub quota_applied: bool,
}

impl Headroom {
    /// True when `limit × replicas` does not fit for either resource
    pub fn is_exceeded_by(&self, request: &DeploymentRequest) -> bool {
        let replicas = request.replica_count();

        // Round the product so 0.1 × 3 compares equal to 0.3
        let cpu = round_cpu(request.cpu_limit_per_replica() * f64::from(replicas));
        if cpu > self.cpu.max {
            return true;
        }

        let memory = request
            .memory_limit_per_replica_mb()
            .saturating_mul(u64::from(replicas));
        memory > self.memory_mb.max
    }

    /// Nothing left to reserve in at least one resource
    pub fn is_capacity_exhausted(&self) -> bool {
        self.cpu.max <= 0.0 || self.memory_mb.max == 0
    }

    /// Snap limits that fall outside the range back to the minimum
    pub fn clamp_request(&self, request: &DeploymentRequest) -> DeploymentRequest {
        let mut cpu = request.cpu_limit_per_replica();
        let mut memory = request.memory_limit_per_replica_mb();

        if !self.cpu.contains(cpu) {
            cpu = self.cpu.min;
        }
        if !self.memory_mb.contains(memory) {
            memory = self.memory_mb.min;
        }

        request.clone().with_limits_unchecked(cpu, memory)
    }
}

/// Sum of node capacities
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClusterTotals {
    pub cpu_cores: f64,
    pub memory_bytes: u64,
}

impl ClusterTotals {
    pub fn from_nodes(nodes: &[NodeCapacity]) -> Self {
        nodes.iter().fold(Self::default(), |acc, node| Self {
            cpu_cores: acc.cpu_cores + node.cpu_cores(),
            memory_bytes: acc.memory_bytes.saturating_add(node.memory_bytes()),
        })
    }
}

/// Computes headroom for the resource sliders
#[derive(Debug, Clone, Default)]
pub struct QuotaEvaluator {
    policy: QuotaPolicy,
}

impl QuotaEvaluator {
    pub fn new(policy: QuotaPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Compute the allowable per-replica range for CPU and memory.
    ///
    /// Without a quota, or for a resource the quota leaves unlimited, the
    /// range is `[0, cluster total]`. A quota limit gives
    /// `[policy floor, limit - used]`, plus the saved reservation when
    /// editing. Maximums never go below zero.
    pub fn compute_headroom(
        &self,
        nodes: &[NodeCapacity],
        quota: Option<&NamespaceQuota>,
        saved: Option<&SavedReservation>,
    ) -> Headroom {
        let totals = ClusterTotals::from_nodes(nodes);

        Headroom {
            cpu: self.cpu_range(&totals, quota, saved),
            memory_mb: self.memory_range(&totals, quota, saved),
            quota_applied: quota.is_some(),
        }
    }

    fn cpu_range(
        &self,
        totals: &ClusterTotals,
        quota: Option<&NamespaceQuota>,
        saved: Option<&SavedReservation>,
    ) -> ResourceRange<f64> {
        let Some((limit, used)) = quota.and_then(|q| q.cpu_limit().map(|l| (l, q.cpu_limit_used())))
        else {
            return ResourceRange {
                min: 0.0,
                max: round_cpu(totals.cpu_cores),
            };
        };

        let mut max = limit - used;
        if let Some(saved) = saved.filter(|s| s.cpu_limit_per_replica() > 0.0) {
            max += saved.cpu_limit_per_replica() * f64::from(saved.replica_count());
        }

        ResourceRange {
            min: self.policy.cpu_floor,
            max: round_cpu(max.max(0.0)),
        }
    }

    fn memory_range(
        &self,
        totals: &ClusterTotals,
        quota: Option<&NamespaceQuota>,
        saved: Option<&SavedReservation>,
    ) -> ResourceRange<u64> {
        let Some((limit, used)) =
            quota.and_then(|q| q.memory_limit().map(|l| (l, q.memory_limit_used())))
        else {
            return ResourceRange {
                min: 0,
                max: megabytes(totals.memory_bytes),
            };
        };

        // Signed so a credited edit can recover from an over-used quota
        let mut max = i128::from(limit) - i128::from(used);
        if let Some(saved) = saved.filter(|s| s.memory_limit_per_replica_mb() > 0) {
            let per_replica = bytes_from_megabytes(saved.memory_limit_per_replica_mb());
            max += i128::from(per_replica) * i128::from(saved.replica_count());
        }

        let max_bytes = u64::try_from(max.max(0)).unwrap_or(u64::MAX);
        ResourceRange {
            min: self.policy.memory_floor_mb,
            max: megabytes(max_bytes),
        }
    }
}

/// Whether a request reserves more than the headroom allows
pub fn reservation_exceeds_headroom(request: &DeploymentRequest, headroom: &Headroom) -> bool {
    headroom.is_exceeded_by(request)
}
