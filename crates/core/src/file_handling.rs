//! Reading and writing the project/VM cache file.
//!
//! The file is created with an empty `{"projects": {}}` document on first
//! read. It is only written by explicit user actions.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{Error, Result};
use crate::project_definitions::ProjectConfig;

const FILE_DESCRIPTION: &str = "config";

fn get_reader(path: &str) -> Result<File> {
    File::open(path)
        .map_err(|e| Error::io_error(FILE_DESCRIPTION.to_string(), path.to_string(), e))
}

fn ensure_parent_directory(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating config directory `{}`", parent.display());
            fs::create_dir_all(parent)
                .map_err(|e| Error::io_error(FILE_DESCRIPTION.to_string(), path.to_string(), e))?;
        }
    }

    Ok(())
}

/// Reads the project cache, creating it with the default shape if absent.
///
/// # Arguments
///
/// * `config_path` - Path to the JSON config file
///
/// # Errors
///
/// Returns an error if:
/// - The file (or its directory) cannot be created or read
/// - The file contains invalid JSON or the wrong structure
///
/// # Examples
///
/// ```no_run
/// use gcp_vm_manager_core::file_handling::get_project_config;
///
/// let config = get_project_config("/home/me/.gcp-vm-manager/config.json")?;
/// println!("{} projects", config.projects.len());
/// # Ok::<(), gcp_vm_manager_core::error::Error>(())
/// ```
pub fn get_project_config(config_path: &str) -> Result<ProjectConfig> {
    if !Path::new(config_path).exists() {
        info!("No config at `{config_path}`, creating default");
        let config = ProjectConfig::default();
        write_project_config(config_path, &config)?;
        return Ok(config);
    }

    let reader = BufReader::new(get_reader(config_path)?);

    serde_json::from_reader(reader).map_err(|e| {
        Error::config_json_error(
            "reading".to_string(),
            FILE_DESCRIPTION.to_string(),
            config_path.to_string(),
            e,
        )
    })
}

/// Writes the project cache, pretty-printed with 4-space indentation.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn write_project_config(config_path: &str, config: &ProjectConfig) -> Result<()> {
    ensure_parent_directory(config_path)?;

    let f = File::create(config_path).map_err(|e| {
        Error::io_error(FILE_DESCRIPTION.to_string(), config_path.to_string(), e)
    })?;
    let mut writer = BufWriter::new(f);

    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    config.serialize(&mut serializer).map_err(|e| {
        Error::config_json_error(
            "writing".to_string(),
            FILE_DESCRIPTION.to_string(),
            config_path.to_string(),
            e,
        )
    })?;

    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| Error::io_error(FILE_DESCRIPTION.to_string(), config_path.to_string(), e))?;

    info!("Saved config to `{config_path}`");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_is_created_with_default_shape() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");
        let path = path.to_str().unwrap();

        let config = get_project_config(path).unwrap();
        assert!(config.projects.is_empty());

        let written = fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value, serde_json::json!({"projects": {}}));
    }

    #[test]
    fn test_write_and_read_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path().to_str().unwrap();

        let mut config = ProjectConfig::default();
        config.add_project("staging-project").unwrap();
        config.add_project("acme-production").unwrap();

        write_project_config(temp_path, &config).unwrap();
        let read_back = get_project_config(temp_path).unwrap();
        assert_eq!(read_back, config);
        assert_eq!(
            read_back.project_ids(),
            vec!["staging-project", "acme-production"]
        );

        let written = fs::read_to_string(temp_path).unwrap();
        assert!(written.contains("\n    \"projects\""));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{{ not json").unwrap();
        let temp_path = temp_file.path().to_str().unwrap();

        let result = get_project_config(temp_path);
        assert!(matches!(result, Err(Error::ConfigJson { .. })));

        // The broken file is left alone
        assert_eq!(fs::read_to_string(temp_path).unwrap(), "{ not json");
    }

    #[test]
    fn test_empty_object_reads_as_no_projects() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{{}}").unwrap();

        let config = get_project_config(temp_file.path().to_str().unwrap()).unwrap();
        assert!(config.projects.is_empty());
    }
}
