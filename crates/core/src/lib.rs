//! GCP VM Manager Core Library
//!
//! This crate provides everything behind the interactive `gvm` menu that is
//! not terminal I/O: building `gcloud`/`curl` argument vectors, running them
//! through a [`execution::CommandRunner`], parsing their JSON output, and the
//! persisted project/VM cache.
//!
//! # Key Features
//!
//! - **Command Runner**: Captured and interactive subprocess execution, never failing on non-zero exit
//! - **Command Builders**: Every provider invocation as a pure argument vector
//! - **Port Validation**: [`port::parse_port`] for the IAP tunnel configurator
//! - **Provider Parsing**: VM listings and statuses, Cloud Run services, revisions and logs
//! - **Project Cache**: JSON config of projects and remembered VMs
//!
//! # Examples
//!
//! Querying a VM's status:
//!
//! ```no_run
//! use gcp_vm_manager_core::compute::get_vm_status;
//! use gcp_vm_manager_core::execution::SystemRunner;
//! use gcp_vm_manager_core::gcloud::Gcloud;
//!
//! let status = get_vm_status(&SystemRunner, &Gcloud::default(), "my-project", "web-1", "us-central1-a");
//! println!("web-1 is {status}");
//! ```

pub mod cloud_run;
pub mod compute;
pub mod config;
pub mod error;
pub mod execution;
pub mod file_handling;
pub mod formatting;
pub mod gcloud;
pub mod interrupt;
pub mod port;
pub mod project_definitions;
