//! Argument vectors for every `gcloud` and `curl` invocation.
//!
//! Builders are pure; nothing here runs a process. Each vector is passed
//! unmodified to a [`crate::execution::CommandRunner`].

use std::fmt::{Display, Formatter};

use crate::config::{CURL, DEFAULT_GCLOUD};
use crate::port::Port;

const BEARER_PREFIX: &str = "Authorization: Bearer ";
const MASKED_BEARER: &str = "Authorization: Bearer [TOKEN]";

/// Local port used by `gcloud beta run services proxy`.
pub const PROXY_PORT: u16 = 8080;

/// Output format for VM listings, including the first internal IP.
const INSTANCE_LIST_FORMAT: &str =
    "json(name,zone,machineType,status,networkInterfaces[0].networkIP)";

/// Lifecycle operations on a VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmLifecycle {
    Start,
    Stop,
    Reset,
}

impl VmLifecycle {
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            VmLifecycle::Start => "start",
            VmLifecycle::Stop => "stop",
            VmLifecycle::Reset => "reset",
        }
    }
}

impl Display for VmLifecycle {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.verb())
    }
}

/// Builds invocations of the provider CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gcloud {
    tool: String,
}

impl Default for Gcloud {
    fn default() -> Self {
        Self::new(DEFAULT_GCLOUD)
    }
}

fn to_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

impl Gcloud {
    #[must_use]
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    #[must_use]
    pub fn tool(&self) -> &str {
        &self.tool
    }

    fn command(&self, parts: &[&str]) -> Vec<String> {
        let mut args = Vec::with_capacity(parts.len() + 1);
        args.push(self.tool.clone());
        args.extend(parts.iter().map(ToString::to_string));
        args
    }

    #[must_use]
    pub fn version(&self) -> Vec<String> {
        self.command(&["--version"])
    }

    #[must_use]
    pub fn list_instances(&self, project: &str) -> Vec<String> {
        self.command(&[
            "compute",
            "instances",
            "list",
            "--project",
            project,
            "--format",
            INSTANCE_LIST_FORMAT,
        ])
    }

    #[must_use]
    pub fn instance_status(&self, project: &str, vm_name: &str, zone: &str) -> Vec<String> {
        self.command(&[
            "compute",
            "instances",
            "describe",
            vm_name,
            "--project",
            project,
            "--zone",
            zone,
            "--format",
            "json(status)",
        ])
    }

    #[must_use]
    pub fn describe_instance(&self, project: &str, vm_name: &str, zone: &str) -> Vec<String> {
        self.command(&[
            "compute",
            "instances",
            "describe",
            vm_name,
            "--project",
            project,
            "--zone",
            zone,
            "--format",
            "json",
        ])
    }

    #[must_use]
    pub fn lifecycle(
        &self,
        action: VmLifecycle,
        project: &str,
        vm_name: &str,
        zone: &str,
    ) -> Vec<String> {
        self.command(&[
            "compute",
            "instances",
            action.verb(),
            vm_name,
            "--project",
            project,
            "--zone",
            zone,
        ])
    }

    #[must_use]
    pub fn serial_port_output(&self, project: &str, vm_name: &str, zone: &str) -> Vec<String> {
        self.command(&[
            "compute",
            "instances",
            "get-serial-port-output",
            vm_name,
            "--project",
            project,
            "--zone",
            zone,
        ])
    }

    #[must_use]
    pub fn ssh(&self, project: &str, vm_name: &str, zone: &str) -> Vec<String> {
        self.command(&[
            "compute",
            "ssh",
            "--zone",
            zone,
            vm_name,
            "--tunnel-through-iap",
            "--project",
            project,
        ])
    }

    #[must_use]
    pub fn ssh_command(
        &self,
        project: &str,
        vm_name: &str,
        zone: &str,
        remote_command: &str,
    ) -> Vec<String> {
        self.command(&[
            "compute",
            "ssh",
            vm_name,
            "--project",
            project,
            "--zone",
            zone,
            "--tunnel-through-iap",
            "--command",
            remote_command,
        ])
    }

    #[must_use]
    pub fn scp_upload(
        &self,
        project: &str,
        vm_name: &str,
        zone: &str,
        local_path: &str,
        remote_path: &str,
    ) -> Vec<String> {
        let destination = format!("{vm_name}:{remote_path}");
        self.command(&[
            "compute",
            "scp",
            local_path,
            &destination,
            "--project",
            project,
            "--zone",
            zone,
            "--tunnel-through-iap",
        ])
    }

    #[must_use]
    pub fn scp_download(
        &self,
        project: &str,
        vm_name: &str,
        zone: &str,
        remote_path: &str,
        local_path: &str,
    ) -> Vec<String> {
        let source = format!("{vm_name}:{remote_path}");
        self.command(&[
            "compute",
            "scp",
            &source,
            local_path,
            "--project",
            project,
            "--zone",
            zone,
            "--tunnel-through-iap",
        ])
    }

    /// `tool compute start-iap-tunnel VM REMOTE --local-host-port localhost:LOCAL --project P --zone Z`
    #[must_use]
    pub fn start_iap_tunnel(
        &self,
        project: &str,
        vm_name: &str,
        zone: &str,
        remote_port: Port,
        local_port: Port,
    ) -> Vec<String> {
        let remote = remote_port.to_string();
        let local_host_port = format!("localhost:{local_port}");
        self.command(&[
            "compute",
            "start-iap-tunnel",
            vm_name,
            &remote,
            "--local-host-port",
            &local_host_port,
            "--project",
            project,
            "--zone",
            zone,
        ])
    }

    #[must_use]
    pub fn list_run_services(&self, project: &str) -> Vec<String> {
        self.command(&["run", "services", "list", "--project", project, "--format", "json"])
    }

    #[must_use]
    pub fn describe_run_service(&self, project: &str, service: &str, region: &str) -> Vec<String> {
        self.command(&[
            "run", "services", "describe", service, "--project", project, "--region", region,
            "--format", "json",
        ])
    }

    #[must_use]
    pub fn run_service_url(&self, project: &str, service: &str, region: &str) -> Vec<String> {
        self.command(&[
            "run",
            "services",
            "describe",
            service,
            "--project",
            project,
            "--region",
            region,
            "--format",
            "json(status.url)",
        ])
    }

    #[must_use]
    pub fn list_revisions(&self, project: &str, service: &str, region: &str) -> Vec<String> {
        self.command(&[
            "run",
            "revisions",
            "list",
            "--service",
            service,
            "--project",
            project,
            "--region",
            region,
            "--format",
            "json",
        ])
    }

    #[must_use]
    pub fn run_service_ssh(
        &self,
        project: &str,
        service: &str,
        region: &str,
        verbose: bool,
    ) -> Vec<String> {
        let mut args = self.command(&[
            "run", "services", "ssh", service, "--project", project, "--region", region,
        ]);
        if verbose {
            args.push("--verbosity=debug".to_string());
        }
        args
    }

    #[must_use]
    pub fn run_service_proxy(&self, project: &str, service: &str, region: &str) -> Vec<String> {
        let port = PROXY_PORT.to_string();
        self.command(&[
            "beta", "run", "services", "proxy", service, "--project", project, "--region",
            region, "--port", &port,
        ])
    }

    #[must_use]
    pub fn identity_token(&self, audience: &str) -> Vec<String> {
        self.command(&["auth", "print-identity-token", "--audiences", audience])
    }

    #[must_use]
    pub fn read_run_logs(&self, project: &str, service: &str) -> Vec<String> {
        let filter = format!(
            "resource.type=cloud_run_revision AND resource.labels.service_name={service}"
        );
        let project_flag = format!("--project={project}");
        self.command(&["logging", "read", &filter, &project_flag, "--limit=100", "--format=json"])
    }
}

/// `curl -s -H "Authorization: Bearer TOKEN" URL`
#[must_use]
pub fn curl_get(token: &str, url: &str) -> Vec<String> {
    let authorization = format!("{BEARER_PREFIX}{token}");
    to_args(&[CURL, "-s", "-H", &authorization, url])
}

/// `curl -s -H "Authorization: Bearer TOKEN" -H "Content-Type: application/json" -d BODY URL`
#[must_use]
pub fn curl_post_json(token: &str, url: &str, body: &str) -> Vec<String> {
    let authorization = format!("{BEARER_PREFIX}{token}");
    to_args(&[
        CURL,
        "-s",
        "-H",
        &authorization,
        "-H",
        "Content-Type: application/json",
        "-d",
        body,
        url,
    ])
}

/// Copy of `args` with bearer tokens replaced, safe to log or print.
#[must_use]
pub fn mask_bearer_tokens(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            if arg.starts_with(BEARER_PREFIX) {
                MASKED_BEARER.to_string()
            } else {
                arg.clone()
            }
        })
        .collect()
}
