use log::error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error with sub process: {}", _0)]
    SubProcess(#[from] std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    ConfigJson {
        action: String,
        file_description: String,
        path: String,
        original: serde_json::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    Io {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Error parsing {} output: {}", .what, .original)]
    Json {
        what: String,
        original: serde_json::Error,
    },

    #[error("`{}` failed: {}", .what, .stderr.trim())]
    CommandFailed { what: String, stderr: String },

    #[error("Invalid port `{}`: please enter a number", .0)]
    InvalidPort(String),

    #[error("Port {} is out of range: must be between 1 and 65535", .0)]
    PortOutOfRange(i64),

    #[error("Project `{}` already exists", .0)]
    ProjectExists(String),

    #[error("Project `{}` is not configured", .0)]
    ProjectNotFound(String),

    #[error("Invalid project ID: ID may not be empty")]
    EmptyProjectId,

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),

    #[error("No command to execute")]
    EmptyCommand,
}

impl Error {
    pub fn config_json_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_json::Error,
    ) -> Self {
        Self::ConfigJson {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn io_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::Io {
            file_description,
            path,
            original,
        }
    }

    pub fn json_error(what: &str, original: serde_json::Error) -> Self {
        error!("Could not parse {what} output: {original}");
        Self::Json {
            what: what.to_string(),
            original,
        }
    }

    pub fn command_failed(what: &str, stderr: &str) -> Self {
        Self::CommandFailed {
            what: what.to_string(),
            stderr: stderr.to_string(),
        }
    }

    /// Terminal read/write failures are kept apart from subprocess failures.
    pub fn stdio(original: std::io::Error) -> Self {
        Self::Stdio(original)
    }
}
