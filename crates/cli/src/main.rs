use std::io::{stdin, stdout};
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use gcp_vm_manager_cli::app::App;
use gcp_vm_manager_cli::cli_args::Args;
use gcp_vm_manager_cli::menus::console::Console;
use gcp_vm_manager_cli::menus::style::OutputStyle;
use gcp_vm_manager_core::error::Result;
use gcp_vm_manager_core::execution::SystemRunner;
use gcp_vm_manager_core::gcloud::Gcloud;
use gcp_vm_manager_core::{config, interrupt};
use log::debug;

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
}

fn execute(args: &Args) -> Result<()> {
    let config_path = config::get_config_path(&args.config);
    debug!("Config path: `{config_path}`");

    let gcloud = Gcloud::new(config::get_gcloud_tool(&args.gcloud));
    let console = Console::new(stdin().lock(), stdout(), OutputStyle::new(!args.no_color));
    let mut app = App::new(&SystemRunner, gcloud, console, config_path, args.debug);

    if args.debug {
        app.print_debug_banner()?;
    }

    interrupt::exit_on_interrupt();
    app.run()
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("An unexpected error occurred: {e}");
            if args.debug {
                eprintln!("{e:#?}");
            }
            ExitCode::FAILURE
        }
    }
}
