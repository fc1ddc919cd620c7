//! Per-key tolerant extraction into [`Params`]
//!
//! Mirrors the parameter-loader contract: each key is looked up
//! individually; an absent key leaves the default in place and is
//! recorded in the report instead of failing the whole load. A key
//! that is present but has the wrong type is an error.

use contracts::{EvalError, Params};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

/// Result of a parameter load
#[derive(Debug, Clone)]
pub struct ParamsReport {
    /// Loaded parameters (defaults filled in for absent keys)
    pub params: Params,

    /// Keys that were absent from the document
    pub missing: Vec<String>,
}

struct KeyReader<'a> {
    doc: &'a Mapping,
    missing: Vec<String>,
}

impl<'a> KeyReader<'a> {
    fn new(doc: &'a Mapping) -> Self {
        Self {
            doc,
            missing: Vec::new(),
        }
    }

    /// Read `key` into `target`, leaving it untouched when absent.
    fn read<T: DeserializeOwned>(&mut self, key: &str, target: &mut T) -> Result<(), EvalError> {
        match self.doc.get(Value::from(key)) {
            Some(value) => {
                *target = serde_yaml::from_value(value.clone()).map_err(|e| {
                    EvalError::config_parse(format!("key '{key}' has invalid value: {e}"))
                })?;
                Ok(())
            }
            None => {
                self.missing.push(key.to_string());
                Ok(())
            }
        }
    }
}

/// Extract all recognized keys from the parsed document
pub fn load_params(doc: &Mapping) -> Result<ParamsReport, EvalError> {
    let mut params = Params::default();
    let mut reader = KeyReader::new(doc);

    reader.read("img_width", &mut params.img_width)?;
    reader.read("img_height", &mut params.img_height)?;
    reader.read("n_tiles_h", &mut params.n_tiles_h)?;
    reader.read("n_tiles_w", &mut params.n_tiles_w)?;
    reader.read("max_feat_per_tile", &mut params.max_feat_per_tile)?;
    reader.read("init_window_sec", &mut params.init_window_sec)?;
    reader.read("sigma_a", &mut params.sigma_a)?;
    reader.read("sigma_w", &mut params.sigma_w)?;
    reader.read("gravity", &mut params.gravity)?;

    Ok(ParamsReport {
        params,
        missing: reader.missing,
    })
}
