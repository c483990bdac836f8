//! Compute Engine VMs: listing, status and the helpers that turn provider
//! JSON into display-ready values.

use std::fmt::{Display, Formatter};

use log::{debug, warn};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::execution::{CommandOutput, CommandRunner};
use crate::gcloud::Gcloud;

const UNKNOWN: &str = "Unknown";

#[derive(Deserialize, Debug, Default)]
struct RawNetworkInterface {
    #[serde(default, rename = "networkIP")]
    network_ip: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct RawInstance {
    #[serde(default)]
    name: String,
    #[serde(default)]
    zone: String,
    #[serde(default, rename = "machineType")]
    machine_type: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "networkInterfaces")]
    network_interfaces: Vec<RawNetworkInterface>,
}

#[derive(Deserialize, Debug)]
struct RawStatus {
    status: Option<String>,
}

/// A VM as reported by a live listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmInstance {
    pub name: String,
    pub zone: String,
    pub region: String,
    pub region_display: String,
    pub machine_type: String,
    pub status: String,
    pub internal_ip: Option<String>,
}

impl VmInstance {
    /// Used when the cache has no description for this VM.
    #[must_use]
    pub fn default_description(&self) -> String {
        format!("{} instance", self.machine_type)
    }

    #[must_use]
    pub fn vm_status(&self) -> VmStatus {
        VmStatus::from(self.status.as_str())
    }
}

impl From<RawInstance> for VmInstance {
    fn from(raw: RawInstance) -> Self {
        let zone = last_segment(&raw.zone).unwrap_or(UNKNOWN).to_string();
        let region = region_from_zone(&zone);
        let region_display = friendly_region(&region);
        let machine_type = last_segment(&raw.machine_type)
            .unwrap_or(UNKNOWN)
            .to_string();

        Self {
            name: raw.name,
            zone,
            region,
            region_display,
            machine_type,
            status: raw.status.unwrap_or_else(|| VmStatus::Unknown.to_string()),
            internal_ip: raw
                .network_interfaces
                .into_iter()
                .next()
                .and_then(|nic| nic.network_ip),
        }
    }
}

/// Lifecycle state of a VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmStatus {
    Running,
    Stopped,
    Terminated,
    Other(String),
    /// The status could not be read from the provider's output.
    Unknown,
    /// The status query itself failed.
    Error,
}

impl VmStatus {
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, VmStatus::Running)
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, VmStatus::Stopped | VmStatus::Terminated)
    }
}

impl From<&str> for VmStatus {
    fn from(value: &str) -> Self {
        match value {
            "RUNNING" => VmStatus::Running,
            "STOPPED" => VmStatus::Stopped,
            "TERMINATED" => VmStatus::Terminated,
            "UNKNOWN" => VmStatus::Unknown,
            "ERROR" => VmStatus::Error,
            other => VmStatus::Other(other.to_string()),
        }
    }
}

impl Display for VmStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VmStatus::Running => formatter.write_str("RUNNING"),
            VmStatus::Stopped => formatter.write_str("STOPPED"),
            VmStatus::Terminated => formatter.write_str("TERMINATED"),
            VmStatus::Other(other) => formatter.write_str(other),
            VmStatus::Unknown => formatter.write_str("UNKNOWN"),
            VmStatus::Error => formatter.write_str("ERROR"),
        }
    }
}

/// Last `/`-separated segment of a provider resource URL, if non-empty.
#[must_use]
pub fn last_segment(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}

/// `us-central1-a` becomes `us-central1`.
#[must_use]
pub fn region_from_zone(zone: &str) -> String {
    if zone == UNKNOWN || zone.len() <= 2 {
        return UNKNOWN.to_string();
    }

    zone.get(..zone.len() - 2).unwrap_or(UNKNOWN).to_string()
}

/// Human-friendly region name, falling back to the region itself.
#[must_use]
pub fn friendly_region(region: &str) -> String {
    let friendly = if region.starts_with("us-central") {
        "US Central"
    } else if region.starts_with("us-west") {
        "US West"
    } else if region.starts_with("us-east") {
        "US East"
    } else if region.starts_with("europe") {
        "Europe"
    } else if region.starts_with("asia") {
        "Asia"
    } else {
        region
    };

    friendly.to_string()
}

/// Parses a VM listing, sorted by name.
///
/// # Errors
///
/// [`Error::Json`] if the output is not a JSON array of instances.
pub fn parse_instances(stdout: &str) -> Result<Vec<VmInstance>> {
    let raw: Vec<RawInstance> =
        serde_json::from_str(stdout).map_err(|e| Error::json_error("VM list", e))?;

    let mut instances: Vec<VmInstance> = raw.into_iter().map(VmInstance::from).collect();
    instances.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(instances)
}

/// Status of one VM from `describe --format json(status)` output.
///
/// A failed query is `ERROR`; unreadable output is `UNKNOWN`.
#[must_use]
pub fn parse_vm_status(output: &CommandOutput) -> VmStatus {
    if !output.success() {
        debug!("Status query failed: {}", output.stderr.trim());
        return VmStatus::Error;
    }

    match serde_json::from_str::<RawStatus>(&output.stdout) {
        Ok(RawStatus {
            status: Some(status),
        }) => VmStatus::from(status.as_str()),
        Ok(RawStatus { status: None }) => VmStatus::Unknown,
        Err(e) => {
            warn!("Unreadable VM status output: {e}");
            VmStatus::Unknown
        }
    }
}

pub fn get_vm_status(
    runner: &dyn CommandRunner,
    gcloud: &Gcloud,
    project: &str,
    vm_name: &str,
    zone: &str,
) -> VmStatus {
    parse_vm_status(&runner.run(&gcloud.instance_status(project, vm_name, zone)))
}

/// Live listing of every VM in the project.
///
/// # Errors
///
/// [`Error::CommandFailed`] with the captured stderr if `gcloud` fails,
/// [`Error::Json`] if its output cannot be parsed.
pub fn list_vms(
    runner: &dyn CommandRunner,
    gcloud: &Gcloud,
    project: &str,
) -> Result<Vec<VmInstance>> {
    let output = runner.run(&gcloud.list_instances(project));
    if !output.success() {
        return Err(Error::command_failed("gcloud compute instances list", &output.stderr));
    }

    let instances = parse_instances(&output.stdout)?;
    debug!("Found {} VMs in {project}", instances.len());
    Ok(instances)
}
