//! Animation primitives for UI easing.
//!
//! A [`SpringAnimator`] drives one scalar towards a target with a damped
//! harmonic oscillator. It is stepped once per frame with the frame's
//! (already clamped) delta time.

mod spring;

pub use spring::{SpringAnimator, SpringConfig};
