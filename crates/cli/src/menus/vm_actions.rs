//! Actions on a single VM, gated on its live status.

use std::io::{BufRead, Write};
use std::path::Path;

use crossterm::style::Color;
use gcp_vm_manager_core::compute::{get_vm_status, VmInstance, VmStatus};
use gcp_vm_manager_core::error::Result;
use gcp_vm_manager_core::formatting::pretty_json;
use gcp_vm_manager_core::gcloud::VmLifecycle;
use log::info;

use crate::app::App;
use crate::menus::style::status_color;

const ACTION_COUNT: usize = 9;

fn power_label(status: &VmStatus) -> &'static str {
    if status.is_running() {
        "Stop VM"
    } else if status.is_stopped() {
        "Start VM"
    } else {
        "[Disabled] Stop VM"
    }
}

fn progress_and_result(action: VmLifecycle) -> (&'static str, &'static str) {
    match action {
        VmLifecycle::Start => ("Starting", "started"),
        VmLifecycle::Stop => ("Stopping", "stopped"),
        VmLifecycle::Reset => ("Resetting", "reset"),
    }
}

impl<I: BufRead, O: Write> App<'_, I, O> {
    /// Loops on the action menu for one VM, re-reading its status each time.
    pub(crate) fn vm_action_menu(&mut self, project: &str, vm: &VmInstance) -> Result<()> {
        loop {
            let status = get_vm_status(self.runner, &self.gcloud, project, &vm.name, &vm.zone);

            self.console.header()?;
            self.console
                .colored(format!("Project: {project}"), Color::Yellow)?;
            self.console
                .success(format!("VM: {} ({})", vm.name, vm.zone))?;
            let painted = self.console.style().paint(&status, status_color(&status));
            self.console.println(format!("Status: {painted}"))?;
            self.console.blank_line()?;

            let reset_label = if status.is_running() {
                "Reset VM"
            } else {
                "[Disabled] Reset VM"
            };
            self.console.colored("Select an action:", Color::Cyan)?;
            self.console.options(
                &[
                    "SSH into VM",
                    power_label(&status),
                    reset_label,
                    "View VM details",
                    "View VM logs",
                    "Upload file to VM",
                    "Download file from VM",
                    "Run command on VM",
                    "Forward a local port to VM (IAP tunnel)",
                ],
                "Back to VM selection",
            )?;

            match self.console.read_choice(ACTION_COUNT)? {
                1 => self.ssh_to_vm(project, vm)?,
                2 if status.is_running() => self.change_power(VmLifecycle::Stop, project, vm)?,
                2 if status.is_stopped() => self.change_power(VmLifecycle::Start, project, vm)?,
                2 => self.action_unavailable(&status)?,
                3 if status.is_running() => self.change_power(VmLifecycle::Reset, project, vm)?,
                3 => self.action_unavailable(&status)?,
                4 => self.view_vm_details(project, vm)?,
                5 => self.view_vm_logs(project, vm)?,
                6 => self.upload_file(project, vm)?,
                7 => self.download_file(project, vm)?,
                8 => self.run_remote_command(project, vm)?,
                9 => {
                    self.configure_port_forward(project, vm)?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn action_unavailable(&mut self, status: &VmStatus) -> Result<()> {
        self.console.error(format!(
            "Cannot perform this action while VM is in {status} state."
        ))?;
        self.console.pause()
    }

    fn ssh_to_vm(&mut self, project: &str, vm: &VmInstance) -> Result<()> {
        self.console
            .colored(format!("Connecting to {}...", vm.name), Color::Cyan)?;
        let result = self
            .runner
            .run_interactive(&self.gcloud.ssh(project, &vm.name, &vm.zone));
        self.report_session("SSH session", result)?;
        self.console.pause()
    }

    fn change_power(&mut self, action: VmLifecycle, project: &str, vm: &VmInstance) -> Result<()> {
        let (progress, done) = progress_and_result(action);
        self.console.warning(format!("{progress} {}...", vm.name))?;

        let output = self
            .runner
            .run(&self.gcloud.lifecycle(action, project, &vm.name, &vm.zone));
        if output.success() {
            info!("{} {done}", vm.name);
        }
        self.report_output(
            &output,
            &format!("VM {done} successfully."),
            &format!("Failed to {action} VM"),
        )?;
        self.console.pause()
    }

    fn view_vm_details(&mut self, project: &str, vm: &VmInstance) -> Result<()> {
        self.console.warning("Loading VM details...")?;
        let output = self
            .runner
            .run(&self.gcloud.describe_instance(project, &vm.name, &vm.zone));

        if output.success() {
            match pretty_json("VM details", &output.stdout) {
                Ok(details) => self.console.println(details)?,
                Err(_) => {
                    self.console.error("Failed to parse VM details.")?;
                    self.console.println(output.stdout.trim_end())?;
                }
            }
        } else {
            self.console.error(format!(
                "Failed to get VM details: {}",
                output.stderr.trim()
            ))?;
        }
        self.console.pause()
    }

    fn view_vm_logs(&mut self, project: &str, vm: &VmInstance) -> Result<()> {
        self.console.warning("Loading VM logs...")?;
        let output = self
            .runner
            .run(&self.gcloud.serial_port_output(project, &vm.name, &vm.zone));

        if output.success() {
            self.console.section(format!("Serial port output of {}", vm.name))?;
            self.console.println(output.stdout.trim_end())?;
        } else {
            self.console
                .error(format!("Failed to get VM logs: {}", output.stderr.trim()))?;
        }
        self.console.pause()
    }

    fn upload_file(&mut self, project: &str, vm: &VmInstance) -> Result<()> {
        self.console
            .colored(format!("Upload a file to {}", vm.name), Color::Cyan)?;

        let Some(local_path) = self.console.read_line("Enter local file path: ")? else {
            return Ok(());
        };
        if local_path.is_empty() || !Path::new(&local_path).exists() {
            self.console.error(format!("File not found: {local_path}"))?;
            return self.console.pause();
        }
        let Some(remote_path) = self.console.read_line_or("Enter remote path", "~/")? else {
            return Ok(());
        };

        self.console.warning(format!(
            "Uploading {local_path} to {}:{remote_path}...",
            vm.name
        ))?;
        let args = self
            .gcloud
            .scp_upload(project, &vm.name, &vm.zone, &local_path, &remote_path);
        self.transfer("Upload", &args)
    }

    fn download_file(&mut self, project: &str, vm: &VmInstance) -> Result<()> {
        self.console
            .colored(format!("Download a file from {}", vm.name), Color::Cyan)?;

        let Some(remote_path) = self.console.read_line("Enter remote file path: ")? else {
            return Ok(());
        };
        if remote_path.is_empty() {
            self.console.error("No remote path entered.")?;
            return self.console.pause();
        }
        let Some(local_path) = self.console.read_line_or("Enter local path", "./")? else {
            return Ok(());
        };

        self.console.warning(format!(
            "Downloading {}:{remote_path} to {local_path}...",
            vm.name
        ))?;
        let args = self
            .gcloud
            .scp_download(project, &vm.name, &vm.zone, &remote_path, &local_path);
        self.transfer("Download", &args)
    }

    /// scp shows its own progress, so it runs with the terminal attached.
    fn transfer(&mut self, what: &str, args: &[String]) -> Result<()> {
        let result = self.runner.run_interactive(args);
        self.report_session(what, result)?;
        self.console.pause()
    }

    fn run_remote_command(&mut self, project: &str, vm: &VmInstance) -> Result<()> {
        self.console
            .colored(format!("Run a command on {}", vm.name), Color::Cyan)?;

        let command = self
            .console
            .read_line("Enter command to run: ")?
            .unwrap_or_default();
        if command.is_empty() {
            self.console.error("No command entered.")?;
            return self.console.pause();
        }

        self.console
            .warning(format!("Running command on {}: {command}", vm.name))?;
        let output = self
            .runner
            .run(&self.gcloud.ssh_command(project, &vm.name, &vm.zone, &command));

        if output.success() {
            self.console.success("Command executed successfully.")?;
            self.console
                .println(format!("\nOutput:\n{}", output.stdout.trim_end()))?;
            if !output.stderr.trim().is_empty() {
                self.console.println("\nErrors:")?;
                self.console.error(output.stderr.trim_end())?;
            }
        } else {
            self.console.error(format!(
                "Failed to execute command: {}",
                output.stderr.trim()
            ))?;
        }
        self.console.pause()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{app_with, output_of, RecordingRunner};
    use gcp_vm_manager_core::execution::{CommandOutput, SessionOutcome};

    fn vm() -> VmInstance {
        VmInstance {
            name: "web-1".to_string(),
            zone: "us-central1-a".to_string(),
            region: "us-central1".to_string(),
            region_display: "US Central".to_string(),
            machine_type: "e2-medium".to_string(),
            status: "RUNNING".to_string(),
            internal_ip: Some("10.0.0.2".to_string()),
        }
    }

    fn status(status: &str) -> CommandOutput {
        CommandOutput::new(0, format!(r#"{{"status": "{status}"}}"#), "")
    }

    #[test]
    fn test_stop_running_vm() {
        let runner = RecordingRunner::with_outputs(vec![
            status("RUNNING"),
            CommandOutput::new(0, "", ""),
            status("TERMINATED"),
        ]);
        let mut app = app_with(&runner, "2\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls[1],
            vec![
                "gcloud",
                "compute",
                "instances",
                "stop",
                "web-1",
                "--project",
                "acme",
                "--zone",
                "us-central1-a",
            ]
        );
        let output = output_of(app);
        assert!(output.contains("Stopping web-1..."));
        assert!(output.contains("VM stopped successfully."));
        assert!(output.contains("2) Start VM"));
    }

    #[test]
    fn test_start_terminated_vm_failure_shows_stderr() {
        let runner = RecordingRunner::with_outputs(vec![
            status("TERMINATED"),
            CommandOutput::new(1, "", "quota exceeded"),
            status("TERMINATED"),
        ]);
        let mut app = app_with(&runner, "2\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        assert_eq!(runner.calls()[1][3], "start");
        assert!(output_of(app).contains("Failed to start VM: quota exceeded"));
    }

    #[test]
    fn test_disabled_actions_do_not_run_commands() {
        let runner = RecordingRunner::with_outputs(vec![
            status("STOPPING"),
            status("STOPPING"),
            status("STOPPING"),
        ]);
        let mut app = app_with(&runner, "2\n\n3\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        // Only the three status queries
        assert_eq!(runner.calls().len(), 3);
        let output = output_of(app);
        assert_eq!(
            output
                .matches("Cannot perform this action while VM is in STOPPING state.")
                .count(),
            2
        );
        assert!(output.contains("2) [Disabled] Stop VM"));
    }

    #[test]
    fn test_status_query_failure_shows_error_state() {
        let runner = RecordingRunner::with_outputs(vec![CommandOutput::new(1, "", "boom")]);
        let mut app = app_with(&runner, "0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        assert!(output_of(app).contains("Status: ERROR"));
    }

    #[test]
    fn test_ssh_runs_interactively() {
        let runner = RecordingRunner::with_outputs(vec![status("RUNNING"), status("RUNNING")]);
        let mut app = app_with(&runner, "1\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        assert_eq!(
            runner.interactive_calls(),
            vec![vec![
                "gcloud",
                "compute",
                "ssh",
                "--zone",
                "us-central1-a",
                "web-1",
                "--tunnel-through-iap",
                "--project",
                "acme",
            ]]
        );
    }

    #[test]
    fn test_view_details_pretty_prints_or_falls_back() {
        let runner = RecordingRunner::with_outputs(vec![
            status("RUNNING"),
            CommandOutput::new(0, r#"{"name":"web-1"}"#, ""),
            status("RUNNING"),
            CommandOutput::new(0, "not json", ""),
            status("RUNNING"),
        ]);
        let mut app = app_with(&runner, "4\n\n4\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        let output = output_of(app);
        assert!(output.contains("{\n  \"name\": \"web-1\"\n}"));
        assert!(output.contains("Failed to parse VM details."));
        assert!(output.contains("not json"));
    }

    #[test]
    fn test_upload_requires_existing_file() {
        let runner = RecordingRunner::with_outputs(vec![status("RUNNING"), status("RUNNING")]);
        let mut app = app_with(&runner, "6\n/definitely/not/here\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        assert!(runner.interactive_calls().is_empty());
        assert!(output_of(app).contains("File not found: /definitely/not/here"));
    }

    #[test]
    fn test_upload_with_default_remote_path() {
        let local = tempfile::NamedTempFile::new().unwrap();
        let local_path = local.path().to_str().unwrap().to_string();
        let runner = RecordingRunner::with_outputs(vec![status("RUNNING"), status("RUNNING")]);
        let input = format!("6\n{local_path}\n\n\n0\n");
        let mut app = app_with(&runner, &input, "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        let calls = runner.interactive_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][3], local_path);
        assert_eq!(calls[0][4], "web-1:~/");
        assert!(output_of(app).contains("Upload completed."));
    }

    #[test]
    fn test_download_with_default_local_path() {
        let runner = RecordingRunner::with_outputs(vec![status("RUNNING"), status("RUNNING")]);
        let mut app = app_with(&runner, "7\n/var/log/app.log\n\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        let calls = runner.interactive_calls();
        assert_eq!(calls[0][3], "web-1:/var/log/app.log");
        assert_eq!(calls[0][4], "./");
    }

    #[test]
    fn test_download_failure_is_reported() {
        let runner = RecordingRunner::with_sessions(vec![Ok(SessionOutcome::Completed(1))]);
        runner.push_output(status("RUNNING"));
        runner.push_output(status("RUNNING"));
        let mut app = app_with(&runner, "7\n/var/log/app.log\n\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        assert!(output_of(app).contains("Download exited with code 1."));
    }

    #[test]
    fn test_run_command_prints_output_and_errors() {
        let runner = RecordingRunner::with_outputs(vec![
            status("RUNNING"),
            CommandOutput::new(0, "up 3 days\n", "warning: host key\n"),
            status("RUNNING"),
        ]);
        let mut app = app_with(&runner, "8\nuptime\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        assert_eq!(
            runner.calls()[1][9..],
            ["--command".to_string(), "uptime".to_string()]
        );
        let output = output_of(app);
        assert!(output.contains("Output:\nup 3 days"));
        assert!(output.contains("warning: host key"));
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let runner = RecordingRunner::with_outputs(vec![status("RUNNING"), status("RUNNING")]);
        let mut app = app_with(&runner, "8\n\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        assert_eq!(runner.calls().len(), 2);
        assert!(output_of(app).contains("No command entered."));
    }

    #[test]
    fn test_port_forward_from_action_menu() {
        let runner = RecordingRunner::with_outputs(vec![status("RUNNING"), status("RUNNING")]);
        let mut app = app_with(&runner, "9\n22\n2222\n\n0\n", "unused.json");

        app.vm_action_menu("acme", &vm()).unwrap();

        let calls = runner.interactive_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][2], "start-iap-tunnel");
        assert_eq!(calls[0][6], "localhost:2222");
    }
}
