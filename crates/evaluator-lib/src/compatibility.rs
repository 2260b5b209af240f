//! Deployment compatibility with persisted storage
//!
//! A storage class that only supports `RWO` can be mounted by a single
//! node, which rules out one-replica-per-node (global) deployments and
//! shared scaling. Isolated data access gives every replica its own volume
//! and lifts the scaling restriction.

use crate::models::{DataAccessPolicy, PersistedFolderSpec};
use std::collections::HashSet;

fn has_read_write_once_only(folders: &[PersistedFolderSpec]) -> bool {
    folders
        .iter()
        .any(|folder| folder.storage_class.is_read_write_once_only())
}

/// Whether a global (one replica per node) deployment is allowed
pub fn supports_global_deployment(folders: &[PersistedFolderSpec], policy: DataAccessPolicy) -> bool {
    if folders.is_empty() {
        return true;
    }

    if has_read_write_once_only(folders) {
        return false;
    }

    policy != DataAccessPolicy::Isolated
}

/// Whether the replica count may be raised above one
pub fn supports_scalable_replicas(folders: &[PersistedFolderSpec], policy: DataAccessPolicy) -> bool {
    if folders.is_empty() {
        return true;
    }

    if has_read_write_once_only(folders) {
        return policy == DataAccessPolicy::Isolated;
    }

    true
}

/// Names of the `RWO`-only storage classes, first occurrence order
pub fn non_scalable_storage_classes(folders: &[PersistedFolderSpec]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();

    folders
        .iter()
        .map(|folder| &folder.storage_class)
        .filter(|class| class.is_read_write_once_only())
        .filter(|class| seen.insert(class.name().to_string()))
        .map(|class| class.name().to_string())
        .collect()
}

/// The data access policy only matters once a folder is persisted
pub fn show_data_access_policy(folders: &[PersistedFolderSpec]) -> bool {
    !folders.is_empty()
}

/// An isolated application is a stateful set; its policy is fixed once
/// created
pub fn is_edit_and_stateful_set(is_edit: bool, policy: DataAccessPolicy) -> bool {
    is_edit && policy == DataAccessPolicy::Isolated
}

/// Editing an application whose storage rules out global deployment
/// must not scale it past a single replica
pub fn is_edit_and_non_scalable(
    is_edit: bool,
    folders: &[PersistedFolderSpec],
    policy: DataAccessPolicy,
    replica_count: u32,
) -> bool {
    is_edit && !supports_global_deployment(folders, policy) && replica_count > 1
}
