//! Cluster and form snapshot documents
//!
//! A snapshot is the JSON document the CLI evaluates: node listing,
//! namespace quota, the application form and, when editing, the form as it
//! was saved. The raw serde types here are converted into validated
//! library types before any rule runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use evaluator_lib::{
    parse_node_listings, AccessMode, ApplicationForm, ConfigurationDataForm, DataAccessPolicy,
    DeploymentRequest, DeploymentType, EnvironmentVariable, ExistingApplication, NamespaceQuota,
    NodeCapacity, NodeListing, PersistedFolderSpec, StorageClassRef,
};
use evaluator_lib::quantity::{parse_cpu, parse_memory};
use k8s_openapi::api::core::v1::{Node, Pod, ResourceQuota};
use serde::{Deserialize, Serialize};

/// Full snapshot document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
    /// Simplified node listing (`name`, `CPU`, `Memory`)
    #[serde(default)]
    pub nodes: Vec<NodeListing>,
    /// Kubernetes `Node` objects; used when `nodes` is empty
    #[serde(default)]
    pub k8s_nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaSummary>,
    /// Kubernetes `ResourceQuota`; ignored when `quota` is present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_quota: Option<ResourceQuota>,
    #[serde(default)]
    pub form: FormDocument,
    /// Form as loaded before editing; absent when creating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved: Option<FormDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editing_id: Option<String>,
    #[serde(default)]
    pub existing_applications: Vec<ExistingApplication>,
    #[serde(default)]
    pub pods: Vec<Pod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ConfigurationDataForm>,
}

/// Namespace quota as quantity strings (`"4"`, `"500m"`, `"8Gi"`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_used: Option<String>,
}

impl QuotaSummary {
    pub fn to_quota(&self) -> Result<NamespaceQuota> {
        let cpu_limit = self
            .cpu_limit
            .as_deref()
            .map(parse_cpu)
            .transpose()
            .context("Invalid quota cpu_limit")?;
        let cpu_used = self
            .cpu_used
            .as_deref()
            .map(parse_cpu)
            .transpose()
            .context("Invalid quota cpu_used")?
            .unwrap_or_default();
        let memory_limit = self
            .memory_limit
            .as_deref()
            .map(parse_memory)
            .transpose()
            .context("Invalid quota memory_limit")?;
        let memory_used = self
            .memory_used
            .as_deref()
            .map(parse_memory)
            .transpose()
            .context("Invalid quota memory_used")?
            .unwrap_or_default();

        NamespaceQuota::new(cpu_limit, cpu_used, memory_limit, memory_used)
            .context("Invalid namespace quota")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageClassDocument {
    pub name: String,
    pub access_modes: Vec<AccessMode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedFolderDocument {
    pub container_path: String,
    pub storage_class: StorageClassDocument,
}

/// Application form as submitted (memory in MB)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deployment_type: DeploymentType,
    #[serde(default)]
    pub data_access_policy: DataAccessPolicy,
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    #[serde(default)]
    pub cpu_limit: f64,
    #[serde(default)]
    pub memory_limit_mb: u64,
    #[serde(default)]
    pub environment_variables: Vec<EnvironmentVariable>,
    #[serde(default)]
    pub persisted_folders: Vec<PersistedFolderDocument>,
    #[serde(default)]
    pub configurations: Vec<String>,
}

fn default_replicas() -> u32 {
    1
}

impl Default for FormDocument {
    fn default() -> Self {
        Self {
            name: String::new(),
            deployment_type: DeploymentType::default(),
            data_access_policy: DataAccessPolicy::default(),
            replicas: default_replicas(),
            cpu_limit: 0.0,
            memory_limit_mb: 0,
            environment_variables: Vec::new(),
            persisted_folders: Vec::new(),
            configurations: Vec::new(),
        }
    }
}

impl TryFrom<&FormDocument> for ApplicationForm {
    type Error = anyhow::Error;

    fn try_from(doc: &FormDocument) -> Result<Self> {
        let deployment = DeploymentRequest::new(
            doc.deployment_type,
            doc.data_access_policy,
            doc.replicas,
            doc.cpu_limit,
            doc.memory_limit_mb,
        )
        .with_context(|| format!("Invalid deployment settings for {:?}", doc.name))?;

        let persisted_folders = doc
            .persisted_folders
            .iter()
            .map(|folder| {
                let class = StorageClassRef::new(
                    folder.storage_class.name.clone(),
                    folder.storage_class.access_modes.iter().copied(),
                )
                .with_context(|| format!("Invalid storage class for {}", folder.container_path))?;
                Ok(PersistedFolderSpec::new(folder.container_path.clone(), class))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ApplicationForm {
            name: doc.name.clone(),
            deployment,
            environment_variables: doc.environment_variables.clone(),
            persisted_folders,
            configurations: doc.configurations.clone(),
        })
    }
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse snapshot")
    }

    /// Node listing, derived from `k8s_nodes` when no listing is given
    pub fn node_listings(&self) -> Result<Vec<NodeListing>> {
        if !self.nodes.is_empty() || self.k8s_nodes.is_empty() {
            return Ok(self.nodes.clone());
        }

        self.k8s_nodes
            .iter()
            .map(|node| {
                let capacity = NodeCapacity::from_node(node).context("Invalid node capacity")?;
                Ok(NodeListing {
                    name: capacity.name().to_string(),
                    cpu: capacity.cpu_cores(),
                    memory: capacity.memory_bytes().to_string(),
                })
            })
            .collect()
    }

    pub fn node_capacities(&self) -> Result<Vec<NodeCapacity>> {
        parse_node_listings(&self.node_listings()?).context("Invalid node listing")
    }

    pub fn namespace_quota(&self) -> Result<Option<NamespaceQuota>> {
        if let Some(summary) = &self.quota {
            return summary.to_quota().map(Some);
        }
        self.resource_quota
            .as_ref()
            .map(|quota| NamespaceQuota::from_resource_quota(quota).context("Invalid resource quota"))
            .transpose()
    }

    pub fn application_form(&self) -> Result<ApplicationForm> {
        ApplicationForm::try_from(&self.form)
    }

    pub fn saved_form(&self) -> Result<Option<ApplicationForm>> {
        self.saved.as_ref().map(ApplicationForm::try_from).transpose()
    }

    pub fn is_edit(&self) -> bool {
        self.saved.is_some()
    }
}
