//! Application-level orchestration.
//!
//! [`Viewer`] ties the window, the graphics device, the render pipeline and
//! the loaded scene together. It is generic over the window and device seams,
//! so the same startup, frame and resize logic runs against mocks in tests.

mod viewer;

pub use viewer::Viewer;
