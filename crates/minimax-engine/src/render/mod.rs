//! Frame orchestration.
//!
//! A frame is a fixed sequence: geometry pass, then UI pass, inside one
//! begin/submit bracket on the graphics device.
//!
//! - [`RenderPass`] is the seam between the pipeline and a concrete device.
//! - [`GeometryPass`] and [`UiPass`] are the wgpu implementations.

mod geometry;
mod pass;
mod pipeline;
mod ui;

pub use geometry::GeometryPass;
pub use pass::{FrameContent, PassInput, PassKind, RenderPass};
pub use pipeline::{FrameOutcome, PassRecord, RenderPipeline};
pub use ui::UiPass;
