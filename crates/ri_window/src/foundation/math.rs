//! Geometry value types
//!
//! Plain value types shared by the window, builder and configuration layers.
//! GLFW reports sizes and positions as signed integers; conversions clamp
//! negative sizes to zero instead of wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width/height pair in screen coordinates or pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Extent2D {
    /// Horizontal size
    pub width: u32,
    /// Vertical size
    pub height: u32,
}

impl Extent2D {
    /// Create a new extent
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Build an extent from GLFW's signed dimensions
    pub fn from_signed(width: i32, height: i32) -> Self {
        Self {
            width: u32::try_from(width).unwrap_or(0),
            height: u32::try_from(height).unwrap_or(0),
        }
    }

    /// Dimensions as GLFW's signed pair, saturating at `i32::MAX`
    pub fn to_signed(self) -> (i32, i32) {
        (
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    /// Covered area
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True if either dimension is zero (minimized windows report this)
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Extent2D {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

impl fmt::Display for Extent2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Screen position of a window's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point2D {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point2D {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rendering API version requested at window creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

impl Version {
    /// Create a new version
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_glfw_sizes_clamp_to_zero() {
        let extent = Extent2D::from_signed(-4, 600);
        assert_eq!(extent, Extent2D::new(0, 600));
        assert!(extent.is_empty());
    }

    #[test]
    fn test_extent_area_does_not_overflow() {
        let extent = Extent2D::new(u32::MAX, 2);
        assert_eq!(extent.area(), u64::from(u32::MAX) * 2);
        assert_eq!(extent.to_signed(), (i32::MAX, 2));
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(Extent2D::new(800, 600).to_string(), "800x600");
        assert_eq!(Point2D::new(-3, 7).to_string(), "(-3, 7)");
        assert_eq!(Version::new(4, 6).to_string(), "4.6");
        assert!(Version::new(3, 3) < Version::new(4, 1));
    }
}
