//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Geometry value types (extents, points, API versions)
//! - Logging utilities

pub mod math;
pub mod logging;
