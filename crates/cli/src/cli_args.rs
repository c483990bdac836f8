//! Command-line argument parsing.
//!
//! This module defines the command-line interface of the `gvm` binary using
//! the `clap` crate.

use clap::Parser;

/// Command-line arguments for the `gvm` interactive manager.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use gcp_vm_manager_cli::cli_args::Args;
///
/// let args = Args::parse_from(["gvm", "--no-color"]);
/// assert!(args.no_color);
/// ```
#[derive(Parser, Debug)]
#[command(name = "gvm", version, about = "Interactive manager for GCP VMs and Cloud Run services")]
#[command(term_width = 0)]
pub struct Args {
    /// Enable debug logging and diagnostic output.
    #[arg(long, action)]
    pub debug: bool,

    /// Disable colored output.
    #[arg(long, action)]
    pub no_color: bool,

    /// Path to the project/VM cache file (JSON).
    ///
    /// If not provided, defaults to `~/.gcp-vm-manager/config.json`.
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// The `gcloud` executable to run.
    ///
    /// If not provided, `gcloud` is looked up on the `PATH`.
    #[arg(long, env = "GVM_GCLOUD")]
    pub gcloud: Option<String>,
}
