//! IAP tunnel configurator: two validated ports, then one long-running tunnel.

use std::io::{BufRead, Write};

use gcp_vm_manager_core::compute::VmInstance;
use gcp_vm_manager_core::error::Result;
use gcp_vm_manager_core::execution::SessionOutcome;
use gcp_vm_manager_core::port::{parse_port, Port};
use log::{info, warn};

use crate::app::App;

/// Terminal state of one configurator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunnelOutcome {
    /// Input ended before both ports were given; nothing was launched.
    Cancelled,
    Exited(i32),
    TerminatedByUser,
    /// The tunnel process could not be started.
    Failed(String),
}

impl<I: BufRead, O: Write> App<'_, I, O> {
    fn prompt_port(&mut self, prompt: &str) -> Result<Option<Port>> {
        self.console.read_validated(prompt, parse_port)
    }

    /// Collects a remote and a local port, then forwards `localhost:LOCAL` to
    /// `VM:REMOTE` until the tunnel exits or the user presses Ctrl-C.
    ///
    /// Launch failures and interrupts are reported here and returned as
    /// outcomes; only terminal I/O errors propagate.
    pub fn configure_port_forward(
        &mut self,
        project: &str,
        vm: &VmInstance,
    ) -> Result<TunnelOutcome> {
        self.console
            .section(format!("Port forwarding to {} ({})", vm.name, vm.zone))?;

        let Some(remote_port) = self.prompt_port("Enter remote port on the VM (1-65535): ")? else {
            self.console.warning("Port forwarding cancelled.")?;
            return Ok(TunnelOutcome::Cancelled);
        };
        let Some(local_port) = self.prompt_port("Enter local port (1-65535): ")? else {
            self.console.warning("Port forwarding cancelled.")?;
            return Ok(TunnelOutcome::Cancelled);
        };

        let args = self
            .gcloud
            .start_iap_tunnel(project, &vm.name, &vm.zone, remote_port, local_port);
        self.echo_command(self.debug, &args)?;
        self.console.warning(format!(
            "Forwarding localhost:{local_port} to {}:{remote_port}. Press Ctrl+C to stop.",
            vm.name
        ))?;

        let outcome = match self.runner.run_interactive(&args) {
            Ok(SessionOutcome::Interrupted) => {
                info!("Tunnel to {} stopped by user", vm.name);
                self.console.success("Tunnel terminated.")?;
                TunnelOutcome::TerminatedByUser
            }
            Ok(SessionOutcome::Completed(0)) => {
                self.console.success("Tunnel closed.")?;
                TunnelOutcome::Exited(0)
            }
            Ok(SessionOutcome::Completed(code)) => {
                self.console
                    .error(format!("Tunnel exited with code {code}."))?;
                TunnelOutcome::Exited(code)
            }
            Err(e) => {
                warn!("Could not start tunnel: {e}");
                self.console.error(format!("Failed to start tunnel: {e}"))?;
                TunnelOutcome::Failed(e.to_string())
            }
        };

        self.console.pause()?;
        Ok(outcome)
    }
}
