//! Optional PNG dumps of input and feature-annotated frames
//!
//! Off by default; enabled per channel by CLI flags. Dump failures
//! are per-frame and recoverable.

use std::fs;
use std::path::{Path, PathBuf};

use contracts::{EvalError, TiledImage};
use image::GrayImage;
use tracing::debug;

/// Writes grayscale PNGs under `<out>/frames/{input,debug}/`
pub struct FrameDumper {
    input_dir: Option<PathBuf>,
    debug_dir: Option<PathBuf>,
}

impl FrameDumper {
    pub fn new(out_dir: &Path, dump_input: bool, dump_debug: bool) -> Result<Self, EvalError> {
        let make = |sub: &str| -> Result<PathBuf, EvalError> {
            let dir = out_dir.join("frames").join(sub);
            fs::create_dir_all(&dir)?;
            Ok(dir)
        };
        Ok(Self {
            input_dir: dump_input.then(|| make("input")).transpose()?,
            debug_dir: dump_debug.then(|| make("debug")).transpose()?,
        })
    }

    /// Whether any channel is enabled
    pub fn active(&self) -> bool {
        self.input_dir.is_some() || self.debug_dir.is_some()
    }

    pub fn dump_input(&self, img: &TiledImage) -> Result<(), EvalError> {
        match &self.input_dir {
            Some(dir) => Self::save(dir, img),
            None => Ok(()),
        }
    }

    pub fn dump_debug(&self, img: &TiledImage) -> Result<(), EvalError> {
        match &self.debug_dir {
            Some(dir) => Self::save(dir, img),
            None => Ok(()),
        }
    }

    fn save(dir: &Path, img: &TiledImage) -> Result<(), EvalError> {
        if img.width == 0 || img.height == 0 {
            // scratch images start empty; nothing to dump yet
            return Ok(());
        }
        let gray = GrayImage::from_raw(img.width, img.height, img.data.to_vec()).ok_or_else(
            || EvalError::ImageConversion {
                seq: img.seq,
                message: format!(
                    "buffer length {} does not cover {}x{}",
                    img.data.len(),
                    img.width,
                    img.height
                ),
            },
        )?;
        let path = dir.join(format!("{:06}.png", img.seq));
        gray.save(&path)
            .map_err(|e| EvalError::ImageConversion {
                seq: img.seq,
                message: e.to_string(),
            })?;
        debug!(path = %path.display(), "frame dumped");
        Ok(())
    }
}
