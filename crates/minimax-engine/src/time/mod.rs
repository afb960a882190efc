//! Time subsystem.
//!
//! One `FrameClock` per render loop; `step()` once per frame. The clock
//! reports raw deltas and the orchestration layer clamps them before they
//! reach animation integrators.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime, MAX_FRAME_DT};
