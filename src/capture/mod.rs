//! Screenshot capture engine.
//!
//! One capture attempt: open a tab with the device profile, filter requests,
//! navigate (a non-200 answer fails the attempt), race the readiness checks,
//! wait the base delay, look for content and a hero section, hide overlays,
//! compute the region, settle, take a JPEG and write it to the screenshots
//! directory under a timestamped name.

mod engine;
mod options;
mod region;

pub use engine::CaptureEngine;
pub use options::CaptureOptions;
pub use region::compute_capture_region;
