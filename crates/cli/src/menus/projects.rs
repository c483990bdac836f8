//! Project selection and the project management menu.

use std::io::{BufRead, Write};

use crossterm::style::Color;
use gcp_vm_manager_core::compute::list_vms;
use gcp_vm_manager_core::error::{Error, Result};
use gcp_vm_manager_core::project_definitions::Environment;
use log::info;

use crate::app::App;

const MANAGE_OPTIONS: [&str; 4] = [
    "List configured projects",
    "Add new project",
    "Remove project",
    "Refresh cached VMs for a project",
];

impl<I: BufRead, O: Write> App<'_, I, O> {
    fn print_projects(&mut self, projects: &[String]) -> Result<()> {
        let style = self.console.style();
        for (index, project) in projects.iter().enumerate() {
            let tag = style.environment_tag(Environment::for_project(project));
            self.console
                .println(format!("{}) {project} {tag}", index + 1))?;
        }
        Ok(())
    }

    /// Picks one of the configured projects. `None` means back.
    pub(crate) fn select_project(&mut self) -> Result<Option<String>> {
        self.console.header()?;
        self.console.colored("Select a project:", Color::Yellow)?;
        let Some(config) = self.load_config()? else {
            self.console.pause()?;
            return Ok(None);
        };

        let projects = config.project_ids();
        if projects.is_empty() {
            self.console
                .warning("No projects configured. Please add a project first.")?;
            self.console.pause()?;
            return Ok(None);
        }

        self.print_projects(&projects)?;
        self.console.println("0) Back to main menu")?;

        let choice = self.console.read_choice(projects.len())?;
        Ok(choice
            .checked_sub(1)
            .and_then(|index| projects.get(index).cloned()))
    }

    pub(crate) fn manage_projects(&mut self) -> Result<()> {
        loop {
            self.console.header()?;
            self.console.colored("Project Management", Color::Yellow)?;
            self.console.options(&MANAGE_OPTIONS, "Back to main menu")?;

            match self.console.read_choice(MANAGE_OPTIONS.len())? {
                1 => self.list_projects()?,
                2 => self.add_project()?,
                3 => self.remove_project()?,
                4 => self.refresh_cached_vms()?,
                _ => return Ok(()),
            }
        }
    }

    fn list_projects(&mut self) -> Result<()> {
        let Some(config) = self.load_config()? else {
            return self.console.pause();
        };

        let projects = config.project_ids();
        if projects.is_empty() {
            self.console.warning("No projects configured.")?;
        } else {
            self.console.blank_line()?;
            self.console.success("Configured projects:")?;
            for project in &projects {
                self.console.println(format!("- {project}"))?;
            }
        }

        self.console.pause()
    }

    fn add_project(&mut self) -> Result<()> {
        let Some(project) = self.console.read_line("Enter project ID: ")? else {
            return Ok(());
        };
        if project.is_empty() {
            return Ok(());
        }

        let Some(mut config) = self.load_config()? else {
            return self.console.pause();
        };
        match config.add_project(&project) {
            Ok(()) => {
                if self.save_config(&config)? {
                    info!("Added project {project}");
                    self.console.success("Project added successfully.")?;
                }
            }
            Err(Error::ProjectExists(_)) => self.console.error("Project already exists.")?,
            Err(e) => self.console.error(e)?,
        }

        self.console.pause()
    }

    fn remove_project(&mut self) -> Result<()> {
        let Some(mut config) = self.load_config()? else {
            return self.console.pause();
        };
        let projects = config.project_ids();
        if projects.is_empty() {
            self.console.warning("No projects to remove.")?;
            return self.console.pause();
        }

        self.console.blank_line()?;
        self.console.success("Select project to remove:")?;
        for (index, project) in projects.iter().enumerate() {
            self.console.println(format!("{}) {project}", index + 1))?;
        }
        self.console.println("0) Cancel")?;

        let choice = self.console.read_choice(projects.len())?;
        let Some(project) = choice.checked_sub(1).and_then(|index| projects.get(index)) else {
            return Ok(());
        };

        if !self
            .console
            .confirm(&format!("Are you sure you want to remove {project}?"))?
        {
            return Ok(());
        }

        match config.remove_project(project) {
            Ok(_) => {
                if self.save_config(&config)? {
                    info!("Removed project {project}");
                    self.console.success("Project removed successfully.")?;
                }
            }
            Err(e) => self.console.error(e)?,
        }

        self.console.pause()
    }

    /// Adds every live VM the cache does not know yet and saves the file.
    fn refresh_cached_vms(&mut self) -> Result<()> {
        let Some(project) = self.select_project()? else {
            return Ok(());
        };

        self.console
            .colored(format!("Loading VMs in {project}..."), Color::Blue)?;
        let live = match list_vms(self.runner, &self.gcloud, &project) {
            Ok(live) => live,
            Err(e) => {
                self.console.error(format!("Failed to refresh VM cache: {e}"))?;
                return self.console.pause();
            }
        };

        let Some(mut config) = self.load_config()? else {
            return self.console.pause();
        };
        let added = config.reconcile_vms(&project, &live)?;
        if added > 0 && !self.save_config(&config)? {
            return self.console.pause();
        }

        self.console.success(format!(
            "Cache refreshed: {added} new VM(s) added, {} live.",
            live.len()
        ))?;
        self.console.pause()
    }
}
