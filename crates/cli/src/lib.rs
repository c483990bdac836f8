//! GCP VM Manager CLI Library
//!
//! This crate provides the interactive terminal layer of `gvm`: numbered
//! menus for Compute Engine VMs, Cloud Run services and the cached project
//! list, all driving `gcloud` through a
//! [`gcp_vm_manager_core::execution::CommandRunner`].
//!
//! # Architecture
//!
//! - [`cli_args`]: Command-line argument parsing
//! - [`app`]: The context shared by every menu
//! - [`menus`]: One module per screen, plus the console and style primitives
//!
//! # Examples
//!
//! ```bash
//! # Interactive mode
//! gvm
//!
//! # Plain output, custom cache file, verbose logging
//! gvm --no-color --config ./vms.json --debug
//!
//! # Use a specific gcloud installation
//! GVM_GCLOUD=/opt/google-cloud-sdk/bin/gcloud gvm
//! ```

pub mod app;
pub mod cli_args;
pub mod menus;

#[cfg(test)]
mod testing;
