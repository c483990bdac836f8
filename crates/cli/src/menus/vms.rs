//! VM selection: live listing joined with the cached descriptions.

use std::io::{BufRead, Write};

use crossterm::style::Color;
use gcp_vm_manager_core::compute::{list_vms, VmInstance};
use gcp_vm_manager_core::error::{Error, Result};
use gcp_vm_manager_core::project_definitions::ProjectConfig;

use crate::app::App;
use crate::menus::style::{column_widths, status_color, table_row};

const HEADERS: [&str; 6] = ["#", "Name", "Region", "Zone", "Status", "Description"];

fn listing_failure_tips(project: &str) -> Vec<String> {
    vec![
        "1. Verify you have the correct permissions for this project".to_string(),
        "2. Check if you're authenticated with the right account: gcloud auth list".to_string(),
        "3. Verify the project ID is correct".to_string(),
        format!("4. Try running the command manually: gcloud compute instances list --project {project}"),
    ]
}

fn empty_project_tips(project: &str) -> Vec<String> {
    vec![
        "1. Verify the project ID is correct".to_string(),
        "2. Check if you're looking at the right project".to_string(),
        format!("3. Try running: gcloud compute instances list --project {project}"),
    ]
}

/// Table cells for one VM. The cached description wins over the machine type.
fn vm_row(index: usize, vm: &VmInstance, config: &ProjectConfig, project: &str) -> Vec<String> {
    let description = config
        .description_for(project, &vm.name, &vm.zone)
        .map_or_else(|| vm.default_description(), str::to_string);

    vec![
        (index + 1).to_string(),
        vm.name.clone(),
        vm.region_display.clone(),
        vm.zone.clone(),
        vm.status.clone(),
        description,
    ]
}

impl<I: BufRead, O: Write> App<'_, I, O> {
    /// Project selection, then VM selection, then the VM's action menu.
    pub(crate) fn manage_vms(&mut self) -> Result<()> {
        while let Some(project) = self.select_project()? {
            while let Some(vm) = self.select_vm(&project)? {
                self.vm_action_menu(&project, &vm)?;
            }
        }
        Ok(())
    }

    fn print_tips(&mut self, tips: &[String]) -> Result<()> {
        self.console.warning("Troubleshooting tips:")?;
        for tip in tips {
            self.console.println(tip)?;
        }
        Ok(())
    }

    fn print_vm_table(&mut self, project: &str, vms: &[VmInstance]) -> Result<()> {
        let config = self.load_config()?.unwrap_or_default();
        let rows: Vec<Vec<String>> = vms
            .iter()
            .enumerate()
            .map(|(index, vm)| vm_row(index, vm, &config, project))
            .collect();
        let widths = column_widths(&HEADERS, &rows);
        let style = self.console.style();

        let header: Vec<(String, Option<Color>)> =
            HEADERS.iter().map(|header| (header.to_string(), None)).collect();
        self.console.println(table_row(style, &header, &widths))?;
        self.console
            .println("-".repeat(widths.iter().sum::<usize>() + widths.len()))?;

        for (row, vm) in rows.into_iter().zip(vms) {
            let color = status_color(&vm.vm_status());
            let cells: Vec<(String, Option<Color>)> = row
                .into_iter()
                .enumerate()
                .map(|(column, cell)| (cell, (column == 4).then_some(color)))
                .collect();
            self.console.println(table_row(style, &cells, &widths))?;
        }
        Ok(())
    }

    /// Lists the project's VMs live and lets the user pick one. `None` means back.
    pub(crate) fn select_vm(&mut self, project: &str) -> Result<Option<VmInstance>> {
        self.console.header()?;
        self.console
            .colored(format!("Project: {project}"), Color::Yellow)?;
        self.console
            .colored("Loading VM statuses and information...", Color::Blue)?;

        let vms = match list_vms(self.runner, &self.gcloud, project) {
            Ok(vms) => vms,
            Err(Error::CommandFailed { stderr, .. }) => {
                self.console
                    .error(format!("Failed to get VM list: {}", stderr.trim()))?;
                self.print_tips(&listing_failure_tips(project))?;
                self.console.pause()?;
                return Ok(None);
            }
            Err(e) => {
                self.console.error(e)?;
                self.console.pause()?;
                return Ok(None);
            }
        };

        if vms.is_empty() {
            self.console.warning("No VMs found in this project.")?;
            self.print_tips(&empty_project_tips(project))?;
            self.console.pause()?;
            return Ok(None);
        }

        self.console.colored("Select a VM:", Color::Cyan)?;
        self.print_vm_table(project, &vms)?;
        self.console.println("0) Back to project selection")?;

        let choice = self.console.read_choice(vms.len())?;
        Ok(choice
            .checked_sub(1)
            .and_then(|index| vms.into_iter().nth(index)))
    }
}
