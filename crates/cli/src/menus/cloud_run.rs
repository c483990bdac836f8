//! Cloud Run service selection, details, logs and the connection flow.

use std::io::{BufRead, Write};

use crossterm::style::Color;
use gcp_vm_manager_core::cloud_run::{
    latest_active_revision, list_revisions, list_services, parse_log_entries, CloudRunService,
    Revision,
};
use gcp_vm_manager_core::error::{Error, Result};
use gcp_vm_manager_core::formatting::{pretty_json, pretty_json_or_raw};
use gcp_vm_manager_core::gcloud::PROXY_PORT;
use log::debug;

use crate::app::App;
use crate::menus::style::{column_widths, severity_color, table_row};

const HEADERS: [&str; 5] = ["#", "Name", "Region", "URL", "Status"];

const SERVICE_ACTIONS: [&str; 3] = [
    "SSH into Cloud Run instance",
    "View service details",
    "View service logs",
];

const CONNECTION_METHODS: [&str; 3] = [
    "Try direct SSH (requires Cloud Run SSH enabled)",
    "Use exec method (interactive shell)",
    "Use debug container (advanced)",
];

const DIRECT_SSH_TIPS: [&str; 5] = [
    "1. Ensure you have gcloud SDK version 428.0.0 or higher",
    "2. Try updating with: gcloud components update",
    "3. Verify the service has instances running",
    "4. Check that you have the right IAM permissions",
    "5. For more information, see: https://cloud.google.com/run/docs/debugging/ssh",
];

const SSH_UNSUPPORTED: &str = "Invalid choice: 'ssh'";

fn readiness(service: &CloudRunService) -> (&'static str, Color) {
    if service.ready {
        ("Ready", Color::Green)
    } else {
        ("Not Ready", Color::Red)
    }
}

impl<I: BufRead, O: Write> App<'_, I, O> {
    /// Project selection, then service selection, then the service's action menu.
    pub(crate) fn manage_cloud_run(&mut self) -> Result<()> {
        while let Some(project) = self.select_project()? {
            while let Some(service) = self.select_service(&project)? {
                self.service_action_menu(&project, &service)?;
            }
        }
        Ok(())
    }

    fn print_service_table(&mut self, services: &[CloudRunService]) -> Result<()> {
        let rows: Vec<Vec<String>> = services
            .iter()
            .enumerate()
            .map(|(index, service)| {
                vec![
                    (index + 1).to_string(),
                    service.name.clone(),
                    service.region.clone(),
                    service.url.clone(),
                    readiness(service).0.to_string(),
                ]
            })
            .collect();
        let widths = column_widths(&HEADERS, &rows);
        let style = self.console.style();

        let header: Vec<(String, Option<Color>)> =
            HEADERS.iter().map(|header| (header.to_string(), None)).collect();
        self.console.println(table_row(style, &header, &widths))?;
        self.console
            .println("-".repeat(widths.iter().sum::<usize>() + widths.len()))?;

        for (row, service) in rows.into_iter().zip(services) {
            let color = readiness(service).1;
            let cells: Vec<(String, Option<Color>)> = row
                .into_iter()
                .enumerate()
                .map(|(column, cell)| (cell, (column == 4).then_some(color)))
                .collect();
            self.console.println(table_row(style, &cells, &widths))?;
        }
        Ok(())
    }

    fn select_service(&mut self, project: &str) -> Result<Option<CloudRunService>> {
        self.console.header()?;
        self.console
            .colored(format!("Project: {project}"), Color::Yellow)?;
        self.console
            .colored("Loading Cloud Run services...", Color::Blue)?;

        let services = match list_services(self.runner, &self.gcloud, project) {
            Ok(services) => services,
            Err(Error::CommandFailed { stderr, .. }) => {
                self.console.error(format!(
                    "Failed to get Cloud Run services: {}",
                    stderr.trim()
                ))?;
                self.console.pause()?;
                return Ok(None);
            }
            Err(e) => {
                self.console.error("Failed to parse Cloud Run services.")?;
                debug!("{e}");
                self.console.pause()?;
                return Ok(None);
            }
        };

        if services.is_empty() {
            self.console
                .error("No Cloud Run services found in this project.")?;
            self.console.pause()?;
            return Ok(None);
        }

        self.console
            .colored("Select a Cloud Run service:", Color::Cyan)?;
        self.print_service_table(&services)?;
        self.console.println("0) Back to project selection")?;

        let choice = self.console.read_choice(services.len())?;
        Ok(choice
            .checked_sub(1)
            .and_then(|index| services.into_iter().nth(index)))
    }

    fn service_action_menu(&mut self, project: &str, service: &CloudRunService) -> Result<()> {
        loop {
            self.console.header()?;
            self.console
                .colored(format!("Project: {project}"), Color::Yellow)?;
            self.console.success(format!(
                "Cloud Run Service: {} ({})",
                service.name, service.region
            ))?;
            self.console.blank_line()?;
            self.console.colored("Select an action:", Color::Cyan)?;
            self.console
                .options(&SERVICE_ACTIONS, "Back to service selection")?;

            match self.console.read_choice(SERVICE_ACTIONS.len())? {
                1 => self.ssh_to_cloud_run(project, service)?,
                2 => self.view_service_details(project, service)?,
                3 => self.view_service_logs(project, service)?,
                _ => return Ok(()),
            }
        }
    }

    fn view_service_details(&mut self, project: &str, service: &CloudRunService) -> Result<()> {
        self.console
            .warning("Loading Cloud Run service details...")?;
        let output = self.runner.run(&self.gcloud.describe_run_service(
            project,
            &service.name,
            &service.region,
        ));

        if output.success() {
            match pretty_json("Cloud Run service details", &output.stdout) {
                Ok(details) => self.console.println(details)?,
                Err(_) => {
                    self.console
                        .error("Failed to parse Cloud Run service details.")?;
                    self.console.println(output.stdout.trim_end())?;
                }
            }
        } else {
            self.console.error(format!(
                "Failed to get Cloud Run service details: {}",
                output.stderr.trim()
            ))?;
        }
        self.console.pause()
    }

    fn view_service_logs(&mut self, project: &str, service: &CloudRunService) -> Result<()> {
        self.console.warning("Loading Cloud Run service logs...")?;
        let output = self
            .runner
            .run(&self.gcloud.read_run_logs(project, &service.name));

        if !output.success() {
            self.console.error(format!(
                "Failed to get Cloud Run logs: {}",
                output.stderr.trim()
            ))?;
            return self.console.pause();
        }

        match parse_log_entries(&output.stdout) {
            Ok(entries) if entries.is_empty() => self.console.println("No logs found")?,
            Ok(entries) => {
                self.console
                    .section(format!("Logs for {}", service.name))?;
                let style = self.console.style();
                for entry in entries {
                    let severity = style.paint(
                        format!("[{}]", entry.severity),
                        severity_color(&entry.severity),
                    );
                    self.console
                        .println(format!("{} {severity} {}", entry.timestamp, entry.message))?;
                }
            }
            Err(e) => {
                self.console
                    .error(format!("Failed to parse Cloud Run logs: {e}"))?;
                self.console.println(output.stdout.trim_end())?;
            }
        }
        self.console.pause()
    }

    /// Preflight checks, then one of the three connection methods.
    fn ssh_to_cloud_run(&mut self, project: &str, service: &CloudRunService) -> Result<()> {
        self.console.colored(
            format!("Connecting to Cloud Run service {}...", service.name),
            Color::Cyan,
        )?;

        let debug_mode = self.console.confirm("Enable debug mode?")? || self.debug;
        if debug_mode {
            self.console
                .colored("Debug mode enabled. Additional logs will be displayed.", Color::Blue)?;
        }

        let Some(revisions) = self.cloud_run_preflight(project, service, debug_mode)? else {
            return self.console.pause();
        };

        self.console.blank_line()?;
        self.console
            .colored("Select a connection method:", Color::Cyan)?;
        self.console.options(&CONNECTION_METHODS, "Cancel")?;

        match self.console.read_choice(CONNECTION_METHODS.len())? {
            1 => self.try_direct_ssh(project, service, debug_mode)?,
            2 => self.use_exec_method(project, service, &revisions, debug_mode)?,
            3 => self.use_debug_container(project, service, debug_mode)?,
            _ => return Ok(()),
        }
        self.console.pause()
    }

    /// Checks the tool, the service and its revisions. `None` if any check failed.
    fn cloud_run_preflight(
        &mut self,
        project: &str,
        service: &CloudRunService,
        debug_mode: bool,
    ) -> Result<Option<Vec<Revision>>> {
        let version = self.runner.run(&self.gcloud.version());
        if !version.success() {
            self.console.error(format!(
                "Failed to get gcloud version: {}",
                version.stderr.trim()
            ))?;
            return Ok(None);
        }
        if debug_mode {
            self.console
                .colored("[DEBUG] gcloud version info:", Color::Blue)?;
            self.console.println(version.stdout.trim_end())?;
        }

        self.console
            .warning(format!("Checking service {} details...", service.name))?;
        let details = self.runner.run(&self.gcloud.describe_run_service(
            project,
            &service.name,
            &service.region,
        ));
        if !details.success() {
            self.console.error(format!(
                "Failed to get Cloud Run service details: {}",
                details.stderr.trim()
            ))?;
            return Ok(None);
        }
        if debug_mode {
            self.console.colored("[DEBUG] Service details:", Color::Blue)?;
            self.console.println(pretty_json_or_raw(&details.stdout))?;
        }

        self.console.warning(format!(
            "Checking active revisions for {}...",
            service.name
        ))?;
        let revisions = match list_revisions(
            self.runner,
            &self.gcloud,
            project,
            &service.name,
            &service.region,
        ) {
            Ok(revisions) => revisions,
            Err(e) => {
                self.console
                    .error(format!("Failed to get Cloud Run revisions: {e}"))?;
                return Ok(None);
            }
        };
        if debug_mode {
            self.console.colored("[DEBUG] Revisions:", Color::Blue)?;
            for revision in &revisions {
                let state = if revision.active { "active" } else { "inactive" };
                self.console
                    .println(format!("  {} ({state})", revision.name))?;
            }
        }

        Ok(Some(revisions))
    }

    fn try_direct_ssh(
        &mut self,
        project: &str,
        service: &CloudRunService,
        debug_mode: bool,
    ) -> Result<()> {
        let args =
            self.gcloud
                .run_service_ssh(project, &service.name, &service.region, debug_mode);
        self.console
            .warning("Initiating SSH connection to Cloud Run service...")?;
        self.echo_command(debug_mode, &args)?;

        if !debug_mode {
            let result = self.runner.run_interactive(&args);
            self.report_session("SSH session", result)?;
            return Ok(());
        }

        // Debug mode captures the output so failures can be inspected
        let output = self.runner.run(&args);
        if output.success() {
            self.console.println(output.stdout.trim_end())?;
        } else {
            self.console.error(format!(
                "[DEBUG] SSH command failed with code {}",
                output.code
            ))?;
            self.console.error("[DEBUG] Error output:")?;
            self.console.println(output.stderr.trim_end())?;

            if output.stderr.contains(SSH_UNSUPPORTED) {
                self.console.warning(
                    "The 'ssh' subcommand is not available in your gcloud version.",
                )?;
                self.console.warning(
                    "Please consider using one of the alternative connection methods.",
                )?;
            }
        }

        self.console.blank_line()?;
        self.console
            .warning("Troubleshooting tips for direct SSH:")?;
        for tip in DIRECT_SSH_TIPS {
            self.console.println(tip)?;
        }
        Ok(())
    }

    fn use_exec_method(
        &mut self,
        project: &str,
        service: &CloudRunService,
        revisions: &[Revision],
        debug_mode: bool,
    ) -> Result<()> {
        self.console.warning(format!(
            "Connecting to {} using exec method...",
            service.name
        ))?;

        if revisions.is_empty() {
            return self.console.error("No revisions found for this service.");
        }
        let Some(revision) = latest_active_revision(revisions) else {
            return self
                .console
                .error("No active revisions found. The service might not be running.");
        };
        if debug_mode {
            self.console.colored(
                format!("[DEBUG] Using revision: {}", revision.name),
                Color::Blue,
            )?;
        }

        self.console
            .success(format!("Connecting to revision {}...", revision.name))?;
        self.console
            .warning("Attempting to connect using proxy method...")?;
        self.console
            .warning("This will open a local port connected to your Cloud Run service.")?;
        self.console.blank_line()?;
        self.console
            .colored("Instructions for connecting:", Color::Cyan)?;
        self.console.println(format!(
            "1. In a new terminal, after the proxy starts, connect using: curl http://localhost:{PROXY_PORT}"
        ))?;
        self.console.println(format!(
            "2. To execute a shell command, try: curl -X POST http://localhost:{PROXY_PORT}/debug/shell -d 'cmd=ls'"
        ))?;
        self.console
            .println("3. Press Ctrl+C in this terminal when done to stop the proxy")?;

        if !self.console.confirm("Start proxy connection?")? {
            return self.console.warning("Proxy connection cancelled.");
        }

        let args = self
            .gcloud
            .run_service_proxy(project, &service.name, &service.region);
        self.echo_command(debug_mode, &args)?;
        let result = self.runner.run_interactive(&args);
        self.report_session("Proxy connection", result)?;
        Ok(())
    }
}
