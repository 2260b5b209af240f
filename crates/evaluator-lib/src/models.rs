//! Core data models for the evaluators
//!
//! Every entity is validated when it is built, so the evaluators can treat
//! their inputs as well-formed.

use crate::error::{EvaluatorError, Result};
use crate::quantity::{is_valid_cpu, parse_cpu, parse_memory};
use k8s_openapi::api::core::v1::{Node, ResourceQuota};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Allocatable capacity of a single cluster node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCapacity {
    name: String,
    cpu_cores: f64,
    memory_bytes: u64,
}

impl NodeCapacity {
    pub fn new(name: impl Into<String>, cpu_cores: f64, memory_bytes: u64) -> Result<Self> {
        if !is_valid_cpu(cpu_cores) {
            return Err(EvaluatorError::input(
                "node cpu",
                format!("{} is not a non-negative core count", cpu_cores),
            ));
        }
        Ok(Self {
            name: name.into(),
            cpu_cores,
            memory_bytes,
        })
    }

    /// Build from a node listing entry where memory is a size string
    pub fn parse(name: impl Into<String>, cpu_cores: f64, memory: &str) -> Result<Self> {
        let memory_bytes = parse_memory(memory)?;
        Self::new(name, cpu_cores, memory_bytes)
    }

    /// Build from a Kubernetes node, preferring allocatable over raw capacity
    pub fn from_node(node: &Node) -> Result<Self> {
        let name = node
            .metadata
            .name
            .clone()
            .ok_or_else(|| EvaluatorError::input("node name", "missing"))?;

        let status = node
            .status
            .as_ref()
            .ok_or_else(|| EvaluatorError::input("node status", format!("missing on {}", name)))?;

        let resources = status
            .allocatable
            .as_ref()
            .or(status.capacity.as_ref())
            .ok_or_else(|| {
                EvaluatorError::input("node allocatable", format!("missing on {}", name))
            })?;

        let cpu = required_quantity(resources, "cpu", "node cpu")?;
        let memory = required_quantity(resources, "memory", "node memory")?;

        Self::new(name, parse_cpu(&cpu.0)?, parse_memory(&memory.0)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cpu_cores(&self) -> f64 {
        self.cpu_cores
    }

    pub fn memory_bytes(&self) -> u64 {
        self.memory_bytes
    }
}

/// Node entry as returned by a node listing API (`CPU`, `Memory`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeListing {
    pub name: String,
    #[serde(alias = "CPU")]
    pub cpu: f64,
    #[serde(alias = "Memory")]
    pub memory: String,
}

impl TryFrom<&NodeListing> for NodeCapacity {
    type Error = EvaluatorError;

    fn try_from(listing: &NodeListing) -> Result<Self> {
        NodeCapacity::parse(listing.name.clone(), listing.cpu, &listing.memory)
    }
}

/// Parse a full node listing; a single malformed entry fails the batch
pub fn parse_node_listings(listings: &[NodeListing]) -> Result<Vec<NodeCapacity>> {
    listings.iter().map(NodeCapacity::try_from).collect()
}

fn required_quantity<'a>(
    resources: &'a BTreeMap<String, Quantity>,
    key: &str,
    field: &'static str,
) -> Result<&'a Quantity> {
    resources
        .get(key)
        .ok_or_else(|| EvaluatorError::input(field, "missing"))
}

/// Namespace-scoped ceiling on aggregate CPU and memory limits
///
/// A `None` limit means the resource is only bounded by the cluster.
/// Memory values are bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceQuota {
    cpu_limit: Option<f64>,
    cpu_limit_used: f64,
    memory_limit: Option<u64>,
    memory_limit_used: u64,
}

impl NamespaceQuota {
    /// Zero limits are treated as "no limit set".
    pub fn new(
        cpu_limit: Option<f64>,
        cpu_limit_used: f64,
        memory_limit: Option<u64>,
        memory_limit_used: u64,
    ) -> Result<Self> {
        if let Some(limit) = cpu_limit {
            if !is_valid_cpu(limit) {
                return Err(EvaluatorError::input(
                    "quota cpu limit",
                    format!("{} is not a non-negative core count", limit),
                ));
            }
        }
        if !is_valid_cpu(cpu_limit_used) {
            return Err(EvaluatorError::input(
                "quota cpu used",
                format!("{} is not a non-negative core count", cpu_limit_used),
            ));
        }

        Ok(Self {
            cpu_limit: cpu_limit.filter(|limit| *limit > 0.0),
            cpu_limit_used,
            memory_limit: memory_limit.filter(|limit| *limit > 0),
            memory_limit_used,
        })
    }

    /// Build from a Kubernetes `ResourceQuota` using `limits.cpu` and
    /// `limits.memory` from its status (hard and used)
    pub fn from_resource_quota(quota: &ResourceQuota) -> Result<Self> {
        let status = quota.status.as_ref();
        let hard = status.and_then(|s| s.hard.as_ref());
        let used = status.and_then(|s| s.used.as_ref());

        let lookup = |map: Option<&BTreeMap<String, Quantity>>, key: &str| {
            map.and_then(|m| m.get(key)).map(|q| q.0.clone())
        };

        let cpu_limit = lookup(hard, "limits.cpu").map(|v| parse_cpu(&v)).transpose()?;
        let memory_limit = lookup(hard, "limits.memory")
            .map(|v| parse_memory(&v))
            .transpose()?;
        let cpu_used = lookup(used, "limits.cpu")
            .map(|v| parse_cpu(&v))
            .transpose()?
            .unwrap_or(0.0);
        let memory_used = lookup(used, "limits.memory")
            .map(|v| parse_memory(&v))
            .transpose()?
            .unwrap_or(0);

        Self::new(cpu_limit, cpu_used, memory_limit, memory_used)
    }

    pub fn cpu_limit(&self) -> Option<f64> {
        self.cpu_limit
    }

    pub fn cpu_limit_used(&self) -> f64 {
        self.cpu_limit_used
    }

    pub fn memory_limit(&self) -> Option<u64> {
        self.memory_limit
    }

    pub fn memory_limit_used(&self) -> u64 {
        self.memory_limit_used
    }
}

/// Reservation of an existing application, used when editing it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedReservation {
    cpu_limit_per_replica: f64,
    memory_limit_per_replica_mb: u64,
    replica_count: u32,
}

impl SavedReservation {
    pub fn new(
        cpu_limit_per_replica: f64,
        memory_limit_per_replica_mb: u64,
        replica_count: u32,
    ) -> Result<Self> {
        if !is_valid_cpu(cpu_limit_per_replica) {
            return Err(EvaluatorError::input(
                "saved cpu limit",
                format!("{} is not a non-negative core count", cpu_limit_per_replica),
            ));
        }
        if replica_count == 0 {
            return Err(EvaluatorError::input("saved replica count", "must be at least 1"));
        }
        Ok(Self {
            cpu_limit_per_replica,
            memory_limit_per_replica_mb,
            replica_count,
        })
    }

    pub fn cpu_limit_per_replica(&self) -> f64 {
        self.cpu_limit_per_replica
    }

    pub fn memory_limit_per_replica_mb(&self) -> u64 {
        self.memory_limit_per_replica_mb
    }

    pub fn replica_count(&self) -> u32 {
        self.replica_count
    }
}

impl From<&DeploymentRequest> for SavedReservation {
    fn from(request: &DeploymentRequest) -> Self {
        Self {
            cpu_limit_per_replica: request.cpu_limit_per_replica,
            memory_limit_per_replica_mb: request.memory_limit_per_replica_mb,
            replica_count: request.replica_count,
        }
    }
}

/// Storage access modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    #[serde(rename = "RWO", alias = "ReadWriteOnce")]
    ReadWriteOnce,
    #[serde(rename = "ROX", alias = "ReadOnlyMany")]
    ReadOnlyMany,
    #[serde(rename = "RWX", alias = "ReadWriteMany")]
    ReadWriteMany,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadWriteOnce => "RWO",
            AccessMode::ReadOnlyMany => "ROX",
            AccessMode::ReadWriteMany => "RWX",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = EvaluatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RWO" | "ReadWriteOnce" => Ok(AccessMode::ReadWriteOnce),
            "ROX" | "ReadOnlyMany" => Ok(AccessMode::ReadOnlyMany),
            "RWX" | "ReadWriteMany" => Ok(AccessMode::ReadWriteMany),
            other => Err(EvaluatorError::input(
                "access mode",
                format!("unknown access mode {:?}", other),
            )),
        }
    }
}

/// A storage class together with the access modes it supports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageClassRef {
    name: String,
    access_modes: BTreeSet<AccessMode>,
}

impl StorageClassRef {
    pub fn new(
        name: impl Into<String>,
        access_modes: impl IntoIterator<Item = AccessMode>,
    ) -> Result<Self> {
        let name = name.into();
        let access_modes: BTreeSet<_> = access_modes.into_iter().collect();
        if access_modes.is_empty() {
            return Err(EvaluatorError::input(
                "storage class access modes",
                format!("{} declares no access mode", name),
            ));
        }
        Ok(Self { name, access_modes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_modes(&self) -> &BTreeSet<AccessMode> {
        &self.access_modes
    }

    /// True when the class supports exactly `RWO` and nothing else
    pub fn is_read_write_once_only(&self) -> bool {
        self.access_modes.len() == 1 && self.access_modes.contains(&AccessMode::ReadWriteOnce)
    }
}

/// A container path backed by a persistent volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedFolderSpec {
    pub container_path: String,
    pub storage_class: StorageClassRef,
}

impl PersistedFolderSpec {
    pub fn new(container_path: impl Into<String>, storage_class: StorageClassRef) -> Self {
        Self {
            container_path: container_path.into(),
            storage_class,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeploymentType {
    #[default]
    Replicated,
    Global,
    #[serde(alias = "STATEFUL_SET")]
    StatefulSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataAccessPolicy {
    #[default]
    Shared,
    Isolated,
}

/// Kubernetes workload an application is realized as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkloadKind {
    Deployment,
    DaemonSet,
    StatefulSet,
}

impl DeploymentType {
    /// Global deployments run as daemon sets; isolated data access is
    /// always realized as a stateful set.
    pub fn workload_kind(&self, policy: DataAccessPolicy) -> WorkloadKind {
        match (self, policy) {
            (DeploymentType::StatefulSet, _) | (_, DataAccessPolicy::Isolated) => {
                WorkloadKind::StatefulSet
            }
            (DeploymentType::Global, DataAccessPolicy::Shared) => WorkloadKind::DaemonSet,
            (DeploymentType::Replicated, DataAccessPolicy::Shared) => WorkloadKind::Deployment,
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::StatefulSet => "StatefulSet",
        };
        f.write_str(name)
    }
}

/// Requested deployment shape and per-replica limits (memory in MB)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentRequest {
    deployment_type: DeploymentType,
    data_access_policy: DataAccessPolicy,
    replica_count: u32,
    cpu_limit_per_replica: f64,
    memory_limit_per_replica_mb: u64,
}

impl DeploymentRequest {
    pub fn new(
        deployment_type: DeploymentType,
        data_access_policy: DataAccessPolicy,
        replica_count: u32,
        cpu_limit_per_replica: f64,
        memory_limit_per_replica_mb: u64,
    ) -> Result<Self> {
        if replica_count == 0 {
            return Err(EvaluatorError::input("replica count", "must be at least 1"));
        }
        if !is_valid_cpu(cpu_limit_per_replica) {
            return Err(EvaluatorError::input(
                "cpu limit",
                format!("{} is not a non-negative core count", cpu_limit_per_replica),
            ));
        }
        Ok(Self {
            deployment_type,
            data_access_policy,
            replica_count,
            cpu_limit_per_replica,
            memory_limit_per_replica_mb,
        })
    }

    pub fn deployment_type(&self) -> DeploymentType {
        self.deployment_type
    }

    pub fn data_access_policy(&self) -> DataAccessPolicy {
        self.data_access_policy
    }

    pub fn replica_count(&self) -> u32 {
        self.replica_count
    }

    pub fn cpu_limit_per_replica(&self) -> f64 {
        self.cpu_limit_per_replica
    }

    pub fn memory_limit_per_replica_mb(&self) -> u64 {
        self.memory_limit_per_replica_mb
    }

    pub fn with_deployment_type(mut self, deployment_type: DeploymentType) -> Self {
        self.deployment_type = deployment_type;
        self
    }

    pub fn with_data_access_policy(mut self, policy: DataAccessPolicy) -> Self {
        self.data_access_policy = policy;
        self
    }

    pub fn with_replica_count(mut self, replica_count: u32) -> Result<Self> {
        if replica_count == 0 {
            return Err(EvaluatorError::input("replica count", "must be at least 1"));
        }
        self.replica_count = replica_count;
        Ok(self)
    }

    pub fn with_limits(mut self, cpu_limit_per_replica: f64, memory_limit_per_replica_mb: u64) -> Result<Self> {
        if !is_valid_cpu(cpu_limit_per_replica) {
            return Err(EvaluatorError::input(
                "cpu limit",
                format!("{} is not a non-negative core count", cpu_limit_per_replica),
            ));
        }
        self.cpu_limit_per_replica = cpu_limit_per_replica;
        self.memory_limit_per_replica_mb = memory_limit_per_replica_mb;
        Ok(self)
    }

    /// Replace both limits without validation; callers pass values that
    /// came out of a computed headroom range
    pub(crate) fn with_limits_unchecked(mut self, cpu: f64, memory_mb: u64) -> Self {
        self.cpu_limit_per_replica = cpu;
        self.memory_limit_per_replica_mb = memory_mb;
        self
    }

    /// Realized workload for this request
    pub fn workload_kind(&self) -> WorkloadKind {
        self.deployment_type.workload_kind(self.data_access_policy)
    }
}

impl Default for DeploymentRequest {
    fn default() -> Self {
        Self {
            deployment_type: DeploymentType::Replicated,
            data_access_policy: DataAccessPolicy::Shared,
            replica_count: 1,
            cpu_limit_per_replica: 0.0,
            memory_limit_per_replica_mb: 0,
        }
    }
}
