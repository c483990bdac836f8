//! Cloud Run services, revisions, logs and the debug-endpoint requests used
//! by the debug container connection method.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::execution::CommandRunner;
use crate::gcloud::{curl_get, curl_post_json, Gcloud};

const LOCATION_LABEL: &str = "cloud.googleapis.com/location";
const UNKNOWN: &str = "Unknown";

#[derive(Deserialize, Debug, Default)]
struct RawMetadata {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    labels: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Default)]
struct RawCondition {
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct RawStatus {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    conditions: Vec<RawCondition>,
}

impl RawStatus {
    fn first_condition_true(&self) -> bool {
        self.conditions
            .first()
            .and_then(|condition| condition.status.as_deref())
            == Some("True")
    }
}

#[derive(Deserialize, Debug, Default)]
struct RawResource {
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    status: RawStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudRunService {
    pub name: String,
    pub region: String,
    pub url: String,
    pub ready: bool,
}

impl From<RawResource> for CloudRunService {
    fn from(mut raw: RawResource) -> Self {
        let ready = raw.status.first_condition_true();
        Self {
            name: raw.metadata.name.unwrap_or_else(|| UNKNOWN.to_string()),
            region: raw
                .metadata
                .labels
                .remove(LOCATION_LABEL)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            url: raw.status.url.unwrap_or_else(|| UNKNOWN.to_string()),
            ready,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub name: String,
    pub active: bool,
}

impl From<RawResource> for Revision {
    fn from(raw: RawResource) -> Self {
        let active = raw.status.first_condition_true();
        Self {
            name: raw.metadata.name.unwrap_or_default(),
            active,
        }
    }
}

/// # Errors
///
/// [`Error::Json`] if the output is not a JSON array of services.
pub fn parse_services(stdout: &str) -> Result<Vec<CloudRunService>> {
    let raw: Vec<RawResource> =
        serde_json::from_str(stdout).map_err(|e| Error::json_error("Cloud Run services", e))?;
    Ok(raw.into_iter().map(CloudRunService::from).collect())
}

/// # Errors
///
/// [`Error::Json`] if the output is not a JSON array of revisions.
pub fn parse_revisions(stdout: &str) -> Result<Vec<Revision>> {
    let raw: Vec<RawResource> =
        serde_json::from_str(stdout).map_err(|e| Error::json_error("Cloud Run revisions", e))?;
    Ok(raw.into_iter().map(Revision::from).collect())
}

/// The first revision whose ready condition holds, in listing order.
#[must_use]
pub fn latest_active_revision(revisions: &[Revision]) -> Option<&Revision> {
    revisions
        .iter()
        .find(|revision| revision.active && !revision.name.is_empty())
}

/// `status.url` from `describe --format json(status.url)` output.
#[must_use]
pub fn parse_service_url(stdout: &str) -> Option<String> {
    let raw: RawResource = serde_json::from_str(stdout).ok()?;
    raw.status.url.filter(|url| !url.is_empty())
}

/// # Errors
///
/// [`Error::CommandFailed`] if `gcloud` fails, [`Error::Json`] for unparsable output.
pub fn list_services(
    runner: &dyn CommandRunner,
    gcloud: &Gcloud,
    project: &str,
) -> Result<Vec<CloudRunService>> {
    let output = runner.run(&gcloud.list_run_services(project));
    if !output.success() {
        return Err(Error::command_failed("gcloud run services list", &output.stderr));
    }

    parse_services(&output.stdout)
}

/// # Errors
///
/// [`Error::CommandFailed`] if `gcloud` fails or prints nothing,
/// [`Error::Json`] for unparsable output.
pub fn list_revisions(
    runner: &dyn CommandRunner,
    gcloud: &Gcloud,
    project: &str,
    service: &str,
    region: &str,
) -> Result<Vec<Revision>> {
    let output = runner.run(&gcloud.list_revisions(project, service, region));
    if !output.success() || output.stdout.trim().is_empty() {
        return Err(Error::command_failed("gcloud run revisions list", &output.stderr));
    }

    parse_revisions(&output.stdout)
}

/// One line of `gcloud logging read` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub severity: String,
    pub message: String,
}

impl From<&Value> for LogEntry {
    fn from(value: &Value) -> Self {
        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .unwrap_or("Unknown time");
        let severity = value
            .get("severity")
            .and_then(Value::as_str)
            .unwrap_or("INFO");
        let message = value
            .get("textPayload")
            .and_then(Value::as_str)
            .or_else(|| {
                value
                    .get("jsonPayload")
                    .and_then(|payload| payload.get("message"))
                    .and_then(Value::as_str)
            })
            .unwrap_or("No message");

        Self {
            timestamp: timestamp.to_string(),
            severity: severity.to_string(),
            message: message.to_string(),
        }
    }
}

/// # Errors
///
/// [`Error::Json`] if the output is not a JSON array.
pub fn parse_log_entries(stdout: &str) -> Result<Vec<LogEntry>> {
    let values: Vec<Value> =
        serde_json::from_str(stdout).map_err(|e| Error::json_error("Cloud Run logs", e))?;
    Ok(values.iter().map(LogEntry::from).collect())
}

const ENV_ENDPOINT: &str = "/_debug/env";
const CMD_ENDPOINT: &str = "/_debug/cmd";

/// A request against the service's debug endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugRequest {
    Environment,
    Command(String),
}

impl DebugRequest {
    /// Canned requests for menu choices 1 to 7.
    #[must_use]
    pub fn preset(choice: usize) -> Option<Self> {
        let command = match choice {
            1 => return Some(DebugRequest::Environment),
            2 => "ls -la",
            3 => "ps aux",
            4 => "netstat -tuln || ss -tuln",
            5 => "free -h || cat /proc/meminfo",
            6 => "df -h",
            7 => "tail /var/log/syslog 2>/dev/null || journalctl -n 50 2>/dev/null || echo 'No system logs available'",
            _ => return None,
        };
        Some(DebugRequest::Command(command.to_string()))
    }

    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        match self {
            DebugRequest::Environment => ENV_ENDPOINT,
            DebugRequest::Command(_) => CMD_ENDPOINT,
        }
    }

    /// `{"command": ...}`, properly escaped.
    #[must_use]
    pub fn body(&self) -> Option<String> {
        match self {
            DebugRequest::Environment => None,
            DebugRequest::Command(command) => Some(json!({ "command": command }).to_string()),
        }
    }

    #[must_use]
    pub fn curl_args(&self, token: &str, service_url: &str) -> Vec<String> {
        let url = format!("{}{}", service_url.trim_end_matches('/'), self.endpoint());
        debug!("Debug request to {url}");
        match self.body() {
            None => curl_get(token, &url),
            Some(body) => curl_post_json(token, &url, &body),
        }
    }
}

impl Display for DebugRequest {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DebugRequest::Environment => write!(formatter, "GET {ENV_ENDPOINT}"),
            DebugRequest::Command(command) => formatter.write_str(command),
        }
    }
}
