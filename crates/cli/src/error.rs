//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// An output folder is mandatory for every run
    #[error("no output folder given, pass --output-folder")]
    OutputFolderRequired,

    /// The frontend selector did not match a known variant
    #[error("{0}")]
    UnknownFrontend(String),

    /// The parameter file could not be copied into the output folder
    #[error("cannot copy parameter file into '{dest}': {message}")]
    ParamsCopy { dest: String, message: String },
}

impl CliError {
    pub fn params_copy(dest: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParamsCopy {
            dest: dest.into(),
            message: message.into(),
        }
    }
}
