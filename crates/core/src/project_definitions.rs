use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::compute::VmInstance;
use crate::error::{Error, Result};

/// A remembered VM. Keyed by `(name, zone)` within a project.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct VmDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub description: String,
}

impl VmDescriptor {
    #[must_use]
    pub fn is_same_vm(&self, name: &str, zone: &str) -> bool {
        self.name == name && self.zone == zone
    }
}

impl From<&VmInstance> for VmDescriptor {
    fn from(instance: &VmInstance) -> Self {
        Self {
            name: instance.name.clone(),
            zone: instance.zone.clone(),
            region: instance.region_display.clone(),
            description: instance.default_description(),
        }
    }
}

impl Display for VmDescriptor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{} ({})", self.name, self.zone)?;

        if !self.description.is_empty() {
            write!(formatter, ": {}", self.description)?;
        }

        Ok(())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectEntry {
    #[serde(default)]
    pub vms: Vec<VmDescriptor>,
}

impl ProjectEntry {
    #[must_use]
    pub fn find_vm(&self, name: &str, zone: &str) -> Option<&VmDescriptor> {
        self.vms.iter().find(|vm| vm.is_same_vm(name, zone))
    }
}

/// The persisted cache: project IDs, in insertion order, to remembered VMs.
///
/// Not authoritative. Live listings win; entries absent from a listing stay.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectConfig {
    #[serde(default)]
    pub projects: IndexMap<String, ProjectEntry>,
}

impl ProjectConfig {
    #[must_use]
    pub fn project_ids(&self) -> Vec<String> {
        self.projects.keys().cloned().collect()
    }

    #[must_use]
    pub fn contains(&self, project: &str) -> bool {
        self.projects.contains_key(project)
    }

    /// Adds an empty project. The ID is trimmed first.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyProjectId`] for a blank ID, [`Error::ProjectExists`] for a duplicate.
    pub fn add_project(&mut self, project: &str) -> Result<()> {
        let project = project.trim();
        if project.is_empty() {
            return Err(Error::EmptyProjectId);
        }

        if self.contains(project) {
            return Err(Error::ProjectExists(project.to_string()));
        }

        self.projects
            .insert(project.to_string(), ProjectEntry::default());
        Ok(())
    }

    /// Removes a project, keeping the order of the others.
    ///
    /// # Errors
    ///
    /// [`Error::ProjectNotFound`] if the project is not configured.
    pub fn remove_project(&mut self, project: &str) -> Result<ProjectEntry> {
        self.projects
            .shift_remove(project)
            .ok_or_else(|| Error::ProjectNotFound(project.to_string()))
    }

    /// Stored description for a VM, if the cache knows it.
    #[must_use]
    pub fn description_for(&self, project: &str, name: &str, zone: &str) -> Option<&str> {
        self.projects
            .get(project)
            .and_then(|entry| entry.find_vm(name, zone))
            .map(|vm| vm.description.as_str())
            .filter(|description| !description.is_empty())
    }

    /// Adds every live VM the cache does not know yet. Nothing is removed.
    ///
    /// Returns the number of descriptors added.
    ///
    /// # Errors
    ///
    /// [`Error::ProjectNotFound`] if the project is not configured.
    pub fn reconcile_vms(&mut self, project: &str, live: &[VmInstance]) -> Result<usize> {
        let entry = self
            .projects
            .get_mut(project)
            .ok_or_else(|| Error::ProjectNotFound(project.to_string()))?;

        let mut added = 0;
        for instance in live {
            if entry.find_vm(&instance.name, &instance.zone).is_none() {
                debug!("Caching VM `{}` in {}", instance.name, instance.zone);
                entry.vms.push(VmDescriptor::from(instance));
                added += 1;
            }
        }

        Ok(added)
    }
}

/// Environment tag shown next to each project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Staging,
}

impl Environment {
    #[must_use]
    pub fn for_project(project: &str) -> Self {
        if project.to_lowercase().contains("production") {
            Environment::Production
        } else {
            Environment::Staging
        }
    }
}

impl Display for Environment {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => formatter.write_str("PRODUCTION"),
            Environment::Staging => formatter.write_str("STAGING"),
        }
    }
}
