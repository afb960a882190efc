//! Viewport state and resize reconciliation.
//!
//! [`ViewportState`] is the single source of truth for window, framebuffer
//! and device-pixel-ratio. [`ResizeCoordinator`] is its only writer.

mod resize;
mod state;

pub use resize::{ReconcileOutcome, ReconcilePhase, ResizeCoordinator};
pub use state::ViewportState;
