//! Parameter validation
//!
//! Rules:
//! - img_width / img_height > 0 (required keys; the default is 0)
//! - n_tiles_h / n_tiles_w > 0
//! - max_feat_per_tile > 0
//! - init_window_sec >= 0

use contracts::{EvalError, Params};

/// Validate loaded parameters
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(params: &Params) -> Result<(), EvalError> {
    validate_dimensions(params)?;
    validate_tile_grid(params)?;
    validate_filter_params(params)?;
    Ok(())
}

fn validate_dimensions(params: &Params) -> Result<(), EvalError> {
    if params.img_width == 0 {
        return Err(EvalError::config_validation(
            "img_width",
            "img_width is required and must be > 0",
        ));
    }
    if params.img_height == 0 {
        return Err(EvalError::config_validation(
            "img_height",
            "img_height is required and must be > 0",
        ));
    }
    Ok(())
}

fn validate_tile_grid(params: &Params) -> Result<(), EvalError> {
    if params.n_tiles_h == 0 {
        return Err(EvalError::config_validation(
            "n_tiles_h",
            "tile grid rows must be > 0",
        ));
    }
    if params.n_tiles_w == 0 {
        return Err(EvalError::config_validation(
            "n_tiles_w",
            "tile grid columns must be > 0",
        ));
    }
    if params.max_feat_per_tile == 0 {
        return Err(EvalError::config_validation(
            "max_feat_per_tile",
            "per-tile feature cap must be > 0",
        ));
    }
    Ok(())
}

fn validate_filter_params(params: &Params) -> Result<(), EvalError> {
    if params.init_window_sec < 0.0 {
        return Err(EvalError::config_validation(
            "init_window_sec",
            format!(
                "initialization window must be >= 0, got {}",
                params.init_window_sec
            ),
        ));
    }
    Ok(())
}
