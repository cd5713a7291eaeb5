//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// Rendered size of a mounted panel or container, in device pixels.
///
/// Only extents are tracked; the workbench never needs absolute screen
/// positions, just areas and aspect comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl Bounds {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Area in square pixels, widened so `u32::MAX` squared cannot wrap.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check whether either extent is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether both extents are strictly below `edge`.
    #[inline]
    pub const fn fits_within(&self, edge: u32) -> bool {
        self.width < edge && self.height < edge
    }

    /// The axis along which this size is longer.
    ///
    /// A size that is taller than it is wide is long on the vertical axis;
    /// square sizes count as horizontal.
    #[inline]
    pub const fn long_axis(&self) -> Axis {
        if self.height > self.width {
            Axis::Vertical
        } else {
            Axis::Horizontal
        }
    }
}

/// One of the two layout axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// The other axis.
    #[inline]
    pub const fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_widens_before_multiplying() {
        let bounds = Bounds::new(u32::MAX, 2);
        assert_eq!(bounds.area(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn empty_when_either_extent_is_zero() {
        assert!(Bounds::new(0, 10).is_empty());
        assert!(Bounds::new(10, 0).is_empty());
        assert!(!Bounds::new(1, 1).is_empty());
    }

    #[test]
    fn fits_within_is_strict_on_both_extents() {
        assert!(Bounds::new(99, 99).fits_within(100));
        assert!(!Bounds::new(100, 50).fits_within(100));
        assert!(!Bounds::new(50, 100).fits_within(100));
    }

    #[test]
    fn long_axis_prefers_horizontal_on_square() {
        assert_eq!(Bounds::new(100, 300).long_axis(), Axis::Vertical);
        assert_eq!(Bounds::new(300, 100).long_axis(), Axis::Horizontal);
        assert_eq!(Bounds::new(100, 100).long_axis(), Axis::Horizontal);
    }
}
