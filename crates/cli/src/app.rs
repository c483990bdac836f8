//! The context every menu runs in.

use std::io::{BufRead, Write};

use crossterm::style::Color;
use gcp_vm_manager_core::error::{Error, Result};
use gcp_vm_manager_core::execution::{CommandOutput, CommandRunner, SessionOutcome};
use gcp_vm_manager_core::file_handling::{get_project_config, write_project_config};
use gcp_vm_manager_core::gcloud::{mask_bearer_tokens, Gcloud};
use gcp_vm_manager_core::project_definitions::ProjectConfig;
use itertools::Itertools;
use log::{debug, warn};

use crate::menus::console::Console;

/// Runner, console and config location shared by all menus.
///
/// Each menu module adds its screens as methods on `App`.
pub struct App<'r, I, O> {
    pub(crate) runner: &'r dyn CommandRunner,
    pub(crate) gcloud: Gcloud,
    pub(crate) console: Console<I, O>,
    pub(crate) config_path: String,
    pub(crate) debug: bool,
}

impl<'r, I: BufRead, O: Write> App<'r, I, O> {
    pub fn new(
        runner: &'r dyn CommandRunner,
        gcloud: Gcloud,
        console: Console<I, O>,
        config_path: impl Into<String>,
        debug: bool,
    ) -> Self {
        Self {
            runner,
            gcloud,
            console,
            config_path: config_path.into(),
            debug,
        }
    }

    pub fn into_console(self) -> Console<I, O> {
        self.console
    }

    /// Runs the main menu until the user exits.
    ///
    /// # Errors
    ///
    /// Only terminal I/O errors escape; everything else is reported in the
    /// menu where it happened.
    pub fn run(&mut self) -> Result<()> {
        self.main_menu()
    }

    /// Startup diagnostics printed with `--debug`.
    pub fn print_debug_banner(&mut self) -> Result<()> {
        self.console.colored("Debug mode enabled", Color::Blue)?;
        self.console
            .println(format!("Operating system: {}", std::env::consts::OS))?;
        self.console
            .println(format!("Config file path: {}", self.config_path))?;
        self.console
            .println(format!("gcloud executable: {}", self.gcloud.tool()))?;
        self.console.blank_line()
    }

    /// Reads the project cache. `None` when the file cannot be read or
    /// parsed; the error is reported here and the file is left as it is.
    pub(crate) fn load_config(&mut self) -> Result<Option<ProjectConfig>> {
        match get_project_config(&self.config_path) {
            Ok(config) => Ok(Some(config)),
            Err(e @ (Error::Io { .. } | Error::ConfigJson { .. })) => {
                warn!("{e}");
                self.console.error(format!("Error loading config file: {e}"))?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Writes the project cache and reports whether that worked.
    pub(crate) fn save_config(&mut self, config: &ProjectConfig) -> Result<bool> {
        match write_project_config(&self.config_path, config) {
            Ok(()) => Ok(true),
            Err(e @ (Error::Io { .. } | Error::ConfigJson { .. })) => {
                warn!("{e}");
                self.console.error(format!("Error saving config file: {e}"))?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Echoes a command with tokens masked, when session debug output is on.
    pub(crate) fn echo_command(&mut self, enabled: bool, args: &[String]) -> Result<()> {
        if !enabled {
            return Ok(());
        }

        let masked = mask_bearer_tokens(args).iter().join(" ");
        self.console
            .colored(format!("[DEBUG] Running command: {masked}"), Color::Blue)
    }

    /// Reports a captured command: `success` on exit 0, otherwise stderr.
    pub(crate) fn report_output(
        &mut self,
        output: &CommandOutput,
        success: &str,
        failure: &str,
    ) -> Result<()> {
        if output.success() {
            self.console.success(success)
        } else {
            debug!("Command failed with code {}", output.code);
            self.console
                .error(format!("{failure}: {}", output.stderr.trim()))
        }
    }

    /// Reports how an interactive session ended. Never fails on the session's account.
    pub(crate) fn report_session(
        &mut self,
        what: &str,
        result: Result<SessionOutcome>,
    ) -> Result<Option<i32>> {
        match result {
            Ok(SessionOutcome::Completed(0)) => {
                self.console.success(format!("{what} completed."))?;
                Ok(Some(0))
            }
            Ok(SessionOutcome::Completed(code)) => {
                self.console
                    .error(format!("{what} exited with code {code}."))?;
                Ok(Some(code))
            }
            Ok(SessionOutcome::Interrupted) => {
                self.console.success(format!("{what} terminated."))?;
                Ok(None)
            }
            Err(e) => {
                self.console.error(format!("Failed to start {what}: {e}"))?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menus::style::OutputStyle;
    use crate::testing::{app_with, output_of, RecordingRunner};

    #[test]
    fn test_report_session_variants() {
        let runner = RecordingRunner::default();
        let mut app = app_with(&runner, "", "unused.json");

        assert_eq!(
            app.report_session("Upload", Ok(SessionOutcome::Completed(0)))
                .unwrap(),
            Some(0)
        );
        assert_eq!(
            app.report_session("Upload", Ok(SessionOutcome::Completed(255)))
                .unwrap(),
            Some(255)
        );
        assert_eq!(
            app.report_session("Proxy connection", Ok(SessionOutcome::Interrupted))
                .unwrap(),
            None
        );
        let launch_error = Error::SubProcess(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "No such file or directory",
        ));
        assert_eq!(
            app.report_session("SSH session", Err(launch_error)).unwrap(),
            None
        );

        let output = output_of(app);
        assert!(output.contains("Upload completed."));
        assert!(output.contains("Upload exited with code 255."));
        assert!(output.contains("Proxy connection terminated."));
        assert!(output.contains("Failed to start SSH session"));
    }

    #[test]
    fn test_echo_command_masks_tokens() {
        let runner = RecordingRunner::default();
        let mut app = app_with(&runner, "", "unused.json");
        let args = gcp_vm_manager_core::gcloud::curl_get("secret-token", "https://x.run.app");

        app.echo_command(false, &args).unwrap();
        app.echo_command(true, &args).unwrap();

        let output = output_of(app);
        assert_eq!(output.matches("[DEBUG] Running command:").count(), 1);
        assert!(output.contains("Authorization: Bearer [TOKEN]"));
        assert!(!output.contains("secret-token"));
    }

    #[test]
    fn test_debug_banner() {
        let runner = RecordingRunner::default();
        let console = Console::new(std::io::Cursor::new(Vec::new()), Vec::new(), OutputStyle::plain());
        let mut app = App::new(&runner, Gcloud::new("/opt/gcloud"), console, "/tmp/c.json", true);

        app.print_debug_banner().unwrap();

        let output = output_of(app);
        assert!(output.contains("Config file path: /tmp/c.json"));
        assert!(output.contains("gcloud executable: /opt/gcloud"));
    }

    #[test]
    fn test_config_errors_are_reported_not_raised() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("config.json");
        let runner = RecordingRunner::default();
        let mut app = app_with(&runner, "", path.to_str().unwrap());

        assert_eq!(app.load_config().unwrap(), None);
        assert!(!app.save_config(&ProjectConfig::default()).unwrap());

        let output = output_of(app);
        assert!(output.contains("Error loading config file"));
        assert!(output.contains("Error saving config file"));
    }
}
