//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses the recorded log timestamp ("sim time", seconds, f64) as primary clock
//! - Wall-clock / CPU time appears only in resource telemetry rows

mod error;
mod frontend;
mod message;
mod params;
mod state;
mod window;

pub use error::*;
pub use frontend::*;
pub use message::*;
pub use params::*;
pub use state::*;
pub use window::*;
