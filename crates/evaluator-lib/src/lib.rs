//! Resource evaluation library for Kubernetes applications
//!
//! This crate provides the core functionality for:
//! - Quantity parsing for node capacities and pod requests
//! - Per-replica CPU and memory headroom under namespace quotas
//! - Deployment compatibility with `RWO`-only persisted storage
//! - Duplicate key detection for form rows
//! - Cluster-wide reservation from scheduled pods
//! - Deploy gating for the application form

pub mod compatibility;
pub mod duplicates;
pub mod error;
pub mod form;
pub mod models;
pub mod quantity;
pub mod quota;
pub mod reservation;

pub use compatibility::{
    is_edit_and_non_scalable, is_edit_and_stateful_set, non_scalable_storage_classes,
    show_data_access_policy, supports_global_deployment, supports_scalable_replicas,
};
pub use duplicates::{duplicate_positions, find_duplicates, has_duplicates};
pub use error::{EvaluatorError, Result};
pub use form::{
    ApplicationForm, BlockReason, ConfigurationDataForm, ConfigurationEntry, DeployContext,
    DeployReadiness, EnvironmentVariable, ExistingApplication, SliderState,
};
pub use models::*;
pub use quota::{Headroom, QuotaEvaluator, QuotaPolicy, ResourceRange};
pub use reservation::{ClusterReservation, ResourceReservation};
