//! # Config Loader
//!
//! Parameter-file loading and parsing module.
//!
//! Responsibilities:
//! - Parse the YAML parameter document (flat key/value, no parameter
//!   service required)
//! - Extract each key into the strongly-typed [`Params`] structure,
//!   tolerating missing keys per-key
//! - Validate parameter legality
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let report = ConfigLoader::load_from_path(Path::new("params.yaml")).unwrap();
//! println!("camera: {}x{}", report.params.img_width, report.params.img_height);
//! ```

mod loader;
mod parser;
mod validator;

pub use contracts::Params;
pub use loader::ParamsReport;

use contracts::EvalError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load parameters from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load parameters from a YAML file
    ///
    /// # Errors
    /// - File read failure
    /// - Parse failure
    /// - Validation failure (bad dimensions / tile grid)
    ///
    /// Missing keys with safe defaults are reported in the returned
    /// [`ParamsReport`], not treated as errors; the caller decides.
    pub fn load_from_path(path: &Path) -> Result<ParamsReport, EvalError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EvalError::config_parse(format!("cannot read '{}': {e}", path.display())))?;
        Self::load_from_str(&content)
    }

    /// Load parameters from a YAML string
    pub fn load_from_str(content: &str) -> Result<ParamsReport, EvalError> {
        let doc = parser::parse(content)?;
        let report = loader::load_params(&doc)?;
        validator::validate(&report.params)?;
        Ok(report)
    }
}
