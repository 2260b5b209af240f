//! Application form state and deploy gating
//!
//! The form is a plain value owned by the caller. The functions here only
//! derive facts from it: which keys collide, whether the reservation fits,
//! and whether the deploy/update action must stay disabled.

use crate::compatibility::is_edit_and_non_scalable;
use crate::duplicates::find_duplicates;
use crate::error::Result;
use crate::models::{
    parse_node_listings, DeploymentRequest, DeploymentType, NamespaceQuota, NodeListing,
    PersistedFolderSpec, SavedReservation,
};
use crate::quota::{Headroom, QuotaEvaluator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// Application already present in the target namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingApplication {
    pub id: String,
    pub name: String,
}

/// Whether `name` is taken by another application. When editing, the
/// application itself does not count.
pub fn name_conflicts(existing: &[ExistingApplication], name: &str, editing_id: Option<&str>) -> bool {
    existing
        .iter()
        .filter(|app| app.name == name)
        .any(|app| editing_id != Some(app.id.as_str()))
}

/// Values of the create/edit application form
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ApplicationForm {
    pub name: String,
    pub deployment: DeploymentRequest,
    pub environment_variables: Vec<EnvironmentVariable>,
    pub persisted_folders: Vec<PersistedFolderSpec>,
    /// Names of the configurations mounted into the application
    pub configurations: Vec<String>,
}

impl ApplicationForm {
    /// Adding storage can invalidate a global deployment, so the type goes
    /// back to replicated
    pub fn add_persisted_folder(&mut self, folder: PersistedFolderSpec) {
        self.persisted_folders.push(folder);
        self.deployment = self
            .deployment
            .clone()
            .with_deployment_type(DeploymentType::Replicated);
    }

    pub fn remove_persisted_folder(&mut self, index: usize) -> Option<PersistedFolderSpec> {
        (index < self.persisted_folders.len()).then(|| self.persisted_folders.remove(index))
    }

    pub fn duplicate_environment_variables(&self) -> BTreeMap<String, usize> {
        find_duplicates(self.environment_variables.iter().map(|env| env.name.as_str()))
    }

    pub fn duplicate_persisted_folder_paths(&self) -> BTreeMap<String, usize> {
        find_duplicates(
            self.persisted_folders
                .iter()
                .map(|folder| folder.container_path.as_str()),
        )
    }

    /// Current reservation, as it will be credited on a later edit
    pub fn reservation(&self) -> SavedReservation {
        SavedReservation::from(&self.deployment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationEntry {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Key/value data of a configuration (config map or secret)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigurationDataForm {
    pub entries: Vec<ConfigurationEntry>,
}

impl ConfigurationDataForm {
    pub fn duplicate_keys(&self) -> BTreeMap<String, usize> {
        find_duplicates(self.entries.iter().map(|entry| entry.key.as_str()))
    }

    pub fn is_valid(&self) -> bool {
        self.duplicate_keys().is_empty()
    }
}

/// Inputs needed to decide whether the deploy action is allowed
#[derive(Debug, Clone, Copy)]
pub struct DeployContext<'a> {
    pub form: &'a ApplicationForm,
    /// Snapshot of the form as loaded, present only when editing
    pub saved: Option<&'a ApplicationForm>,
    pub headroom: &'a Headroom,
    pub existing_applications: &'a [ExistingApplication],
    /// Identifier of the application being edited
    pub editing_id: Option<&'a str>,
}

impl DeployContext<'_> {
    pub fn is_edit(&self) -> bool {
        self.saved.is_some()
    }
}

/// Why the deploy/update action is disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockReason {
    ReservationOverflow,
    DuplicateEnvironmentVariables,
    DuplicatePersistedFolderPaths,
    NameConflict,
    NoChanges,
    EditNonScalable,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BlockReason::ReservationOverflow => "requested resources exceed the available headroom",
            BlockReason::DuplicateEnvironmentVariables => "environment variable names are duplicated",
            BlockReason::DuplicatePersistedFolderPaths => "persisted folder paths are duplicated",
            BlockReason::NameConflict => "an application with this name already exists",
            BlockReason::NoChanges => "no changes were made to the application",
            BlockReason::EditNonScalable => {
                "the application storage does not allow more than one replica"
            }
        };
        f.write_str(text)
    }
}

/// Boolean facts that gate the deploy/update action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployReadiness {
    pub reservation_overflow: bool,
    pub capacity_exhausted: bool,
    pub duplicate_environment_variables: BTreeMap<String, usize>,
    pub duplicate_persisted_folder_paths: BTreeMap<String, usize>,
    pub name_conflict: bool,
    pub no_changes: bool,
    pub edit_non_scalable: bool,
}

impl DeployReadiness {
    pub fn evaluate(ctx: &DeployContext<'_>) -> Self {
        let form = ctx.form;
        let deployment = &form.deployment;
        let is_edit = ctx.is_edit();

        Self {
            reservation_overflow: ctx.headroom.is_exceeded_by(deployment),
            capacity_exhausted: ctx.headroom.is_capacity_exhausted(),
            duplicate_environment_variables: form.duplicate_environment_variables(),
            duplicate_persisted_folder_paths: form.duplicate_persisted_folder_paths(),
            name_conflict: name_conflicts(ctx.existing_applications, &form.name, ctx.editing_id),
            no_changes: ctx.saved.is_some_and(|saved| saved == form),
            edit_non_scalable: is_edit_and_non_scalable(
                is_edit,
                &form.persisted_folders,
                deployment.data_access_policy(),
                deployment.replica_count(),
            ),
        }
    }

    /// Capacity exhaustion is only a warning; the overflow check already
    /// blocks any reservation that does not fit.
    pub fn blocking_reasons(&self) -> Vec<BlockReason> {
        let checks = [
            (self.reservation_overflow, BlockReason::ReservationOverflow),
            (
                !self.duplicate_environment_variables.is_empty(),
                BlockReason::DuplicateEnvironmentVariables,
            ),
            (
                !self.duplicate_persisted_folder_paths.is_empty(),
                BlockReason::DuplicatePersistedFolderPaths,
            ),
            (self.name_conflict, BlockReason::NameConflict),
            (self.no_changes, BlockReason::NoChanges),
            (self.edit_non_scalable, BlockReason::EditNonScalable),
        ];

        checks
            .into_iter()
            .filter_map(|(blocked, reason)| blocked.then_some(reason))
            .collect()
    }

    pub fn is_deploy_disabled(&self) -> bool {
        !self.blocking_reasons().is_empty()
    }
}

/// Last successfully computed headroom for the resource sliders
///
/// A refresh that fails on malformed input leaves the previous values in
/// place so the sliders never widen to an unchecked maximum.
#[derive(Debug, Clone, Default)]
pub struct SliderState {
    headroom: Option<Headroom>,
}

impl SliderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headroom(&self) -> Option<&Headroom> {
        self.headroom.as_ref()
    }

    /// Recompute from a fresh node listing and quota
    pub fn refresh(
        &mut self,
        evaluator: &QuotaEvaluator,
        nodes: &[NodeListing],
        quota: Option<&NamespaceQuota>,
        saved: Option<&SavedReservation>,
    ) -> Result<Headroom> {
        let nodes = parse_node_listings(nodes)?;
        let headroom = evaluator.compute_headroom(&nodes, quota, saved);
        self.headroom = Some(headroom);
        Ok(headroom)
    }

    /// Recompute and snap the form's limits into the new range
    pub fn refresh_form(
        &mut self,
        evaluator: &QuotaEvaluator,
        nodes: &[NodeListing],
        quota: Option<&NamespaceQuota>,
        saved: Option<&SavedReservation>,
        form: &mut ApplicationForm,
    ) -> Result<Headroom> {
        let headroom = self.refresh(evaluator, nodes, quota, saved)?;
        form.deployment = headroom.clamp_request(&form.deployment);
        Ok(headroom)
    }
}
