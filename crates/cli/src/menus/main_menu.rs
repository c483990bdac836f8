use std::io::{BufRead, Write};

use crossterm::style::Color;
use gcp_vm_manager_core::error::Result;
use gcp_vm_manager_core::interrupt::FAREWELL;
use log::debug;

use crate::app::App;

const MAIN_OPTIONS: [&str; 3] = [
    "Manage Virtual Machines",
    "Connect to Cloud Run Instances",
    "Manage Projects",
];

impl<I: BufRead, O: Write> App<'_, I, O> {
    /// Top-level loop. Returns when the user picks 0 or input ends.
    pub fn main_menu(&mut self) -> Result<()> {
        loop {
            self.console.header()?;
            self.console.colored("Main Menu:", Color::Yellow)?;
            self.console.options(&MAIN_OPTIONS, "Exit")?;

            let choice = self.console.read_choice(MAIN_OPTIONS.len())?;
            debug!("Main menu choice {choice}");
            match choice {
                1 => self.manage_vms()?,
                2 => self.manage_cloud_run()?,
                3 => self.manage_projects()?,
                _ => {
                    self.console.success(FAREWELL)?;
                    return Ok(());
                }
            }
        }
    }
}
