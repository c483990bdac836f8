//! Interactive menus. Every screen is a method on [`crate::app::App`].

pub mod cloud_run;
pub mod console;
pub mod debug_container;
pub mod main_menu;
pub mod port_forward;
pub mod projects;
pub mod style;
pub mod vm_actions;
pub mod vms;
