//! # Frontends
//!
//! The selectable estimator variants behind the [`contracts::Frontend`]
//! capability trait, plus a scriptable mock for tests.
//!
//! The harness only depends on the trait; the variants shipped here
//! wrap a shared strapdown propagation core ([`filter::InsFilter`])
//! sufficient to exercise the replay contract. Swapping in a full
//! estimator is a matter of implementing the trait and extending
//! [`build`].

pub mod filter;
pub mod mock;
mod variants;

pub use contracts::{Frontend, FrontendKind};
pub use mock::{MockCall, MockCallKind, MockFrontend, MockLog};
pub use variants::{EkltFrontend, EvioFrontend, HasteFrontend, XvioFrontend};

/// Construct the frontend selected at startup.
///
/// The returned frontend is unconfigured; `set_up` is one-time and
/// belongs to the engine's configuration step.
pub fn build(kind: FrontendKind) -> Box<dyn Frontend> {
    match kind {
        FrontendKind::Xvio => Box::new(XvioFrontend::new()),
        FrontendKind::Eklt => Box::new(EkltFrontend::new()),
        FrontendKind::Evio => Box::new(EvioFrontend::new()),
        FrontendKind::Haste => Box::new(HasteFrontend::new()),
    }
}
