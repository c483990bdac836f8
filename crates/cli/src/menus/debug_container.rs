//! Debug container connection method: authenticated requests against the
//! service's `/_debug/env` and `/_debug/cmd` endpoints.

use std::io::{BufRead, Write};

use crossterm::style::Color;
use gcp_vm_manager_core::cloud_run::{parse_service_url, CloudRunService, DebugRequest};
use gcp_vm_manager_core::error::Result;
use gcp_vm_manager_core::formatting::pretty_json_or_raw;
use log::debug;

use crate::app::App;

const DEBUG_OPTIONS: [&str; 9] = [
    "View environment variables",
    "View file system (ls -la)",
    "Show running processes (ps aux)",
    "Check network connections (netstat -tuln)",
    "Display memory usage (free -h)",
    "Check disk space (df -h)",
    "View system logs (tail /var/log/syslog)",
    "Run custom command",
    "Interactive mode (run multiple commands)",
];

const CUSTOM_COMMAND: usize = 8;
const INTERACTIVE_MODE: usize = 9;

impl<I: BufRead, O: Write> App<'_, I, O> {
    pub(crate) fn use_debug_container(
        &mut self,
        project: &str,
        service: &CloudRunService,
        debug_mode: bool,
    ) -> Result<()> {
        self.console
            .warning("Connecting using debug container method...")?;

        let Some(service_url) = self.debug_service_url(project, service, debug_mode)? else {
            return Ok(());
        };
        let Some(token) = self.identity_token(&service_url, debug_mode)? else {
            return Ok(());
        };

        self.console.blank_line()?;
        self.console
            .colored("Debug container options:", Color::Cyan)?;
        self.console.options(&DEBUG_OPTIONS, "Cancel")?;

        let request = match self.console.read_choice(DEBUG_OPTIONS.len())? {
            CUSTOM_COMMAND => {
                let command = self
                    .console
                    .read_line("Enter command to run: ")?
                    .unwrap_or_default();
                if command.is_empty() {
                    return self.console.error("No command entered.");
                }
                DebugRequest::Command(command)
            }
            INTERACTIVE_MODE => return self.debug_shell(&token, &service_url, debug_mode),
            choice => match DebugRequest::preset(choice) {
                Some(request) => request,
                None => return Ok(()),
            },
        };

        self.send_debug_request(&token, &service_url, &request, debug_mode)
    }

    fn debug_service_url(
        &mut self,
        project: &str,
        service: &CloudRunService,
        debug_mode: bool,
    ) -> Result<Option<String>> {
        self.console.colored("Checking service URL...", Color::Blue)?;
        let output = self.runner.run(&self.gcloud.run_service_url(
            project,
            &service.name,
            &service.region,
        ));
        if !output.success() {
            self.console.error(format!(
                "Failed to get service URL: {}",
                output.stderr.trim()
            ))?;
            return Ok(None);
        }

        let Some(url) = parse_service_url(&output.stdout) else {
            self.console.error("Could not get service URL.")?;
            return Ok(None);
        };
        if debug_mode {
            self.console
                .colored(format!("[DEBUG] Service URL: {url}"), Color::Blue)?;
        }
        Ok(Some(url))
    }

    fn identity_token(&mut self, audience: &str, debug_mode: bool) -> Result<Option<String>> {
        self.console
            .colored("Getting authentication token...", Color::Blue)?;
        let output = self.runner.run(&self.gcloud.identity_token(audience));
        let token = output.stdout.trim();
        if !output.success() || token.is_empty() {
            self.console.error(format!(
                "Failed to get authentication token: {}",
                output.stderr.trim()
            ))?;
            return Ok(None);
        }

        if debug_mode {
            self.console.colored(
                format!("[DEBUG] Got token of length: {}", token.len()),
                Color::Blue,
            )?;
        }
        Ok(Some(token.to_string()))
    }

    /// Sends commands one line at a time until `exit` or end of input.
    fn debug_shell(&mut self, token: &str, service_url: &str, debug_mode: bool) -> Result<()> {
        self.console
            .success("Entering interactive mode. Type 'exit' to quit.")?;
        let prompt = self.console.style().paint("cloud-run-debug> ", Color::Green);

        while let Some(line) = self.console.read_line(&prompt)? {
            if line.eq_ignore_ascii_case("exit") {
                break;
            }
            if line.is_empty() {
                continue;
            }
            self.send_debug_request(token, service_url, &DebugRequest::Command(line), debug_mode)?;
        }
        Ok(())
    }

    fn send_debug_request(
        &mut self,
        token: &str,
        service_url: &str,
        request: &DebugRequest,
        debug_mode: bool,
    ) -> Result<()> {
        let args = request.curl_args(token, service_url);
        self.echo_command(debug_mode, &args)?;
        self.console
            .success(format!("Executing command: {request}"))?;

        let output = self.runner.run(&args);
        debug!("Debug request exited with code {}", output.code);

        let body = pretty_json_or_raw(&output.stdout);
        if !body.is_empty() {
            let rule = "-".repeat(50);
            self.console.println(format!("\n{rule}"))?;
            self.console.println(body)?;
            self.console.println(format!("{rule}\n"))?;
        } else if !output.success() {
            self.console
                .error(format!("Request failed: {}", output.stderr.trim()))?;
        }

        if debug_mode && !output.stderr.trim().is_empty() {
            self.console
                .error(format!("[DEBUG] stderr: {}", output.stderr.trim()))?;
        }
        Ok(())
    }
}
