//! Mock collaborator implementations for testing and development.
//!
//! This module provides simulated implementations of the scale driver and
//! the host lifecycle source that can be controlled programmatically
//! without requiring physical hardware or a mobile host.

pub mod lifecycle;
pub mod scale;

// Re-export commonly used types
pub use lifecycle::{MockHostLifecycle, MockHostLifecycleHandle};
pub use scale::{MockScaleDriver, MockScaleHandle};
