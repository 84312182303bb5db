#![forbid(unsafe_code)]

//! Geometric configuration and measurements.
//!
//! All lengths are logical points (`f64`). Heights are measured upward from
//! the bottom edge of the content area, so a larger height means a more
//! expanded sheet.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Content height used before the render layer reports a real frame.
pub const DEFAULT_CONTENT_HEIGHT: f64 = 844.0;

/// Top corner radius applied when the sheet reaches the top of a device with
/// rounded display corners.
pub const DEFAULT_DEVICE_CORNER_RADIUS: f64 = 39.0;

/// Height of the header inset the sheet grows into as it nears full expansion.
pub const DEFAULT_HEADER_INSET_UNIT: f64 = 44.0;

/// Platform-reported unsafe insets (notch, home indicator).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SafeArea {
    pub top: f64,
    pub bottom: f64,
}

impl SafeArea {
    /// No insets.
    pub const NONE: Self = Self {
        top: 0.0,
        bottom: 0.0,
    };

    #[inline]
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }
}

/// Distance kept free between the top of the content area and the fully
/// expanded sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TopOffset {
    pub value: f64,
    /// Add the safe-area top inset when `value` is positive.
    pub include_safe_area: bool,
}

impl TopOffset {
    #[inline]
    pub const fn new(value: f64, include_safe_area: bool) -> Self {
        Self {
            value,
            include_safe_area,
        }
    }

    /// The offset actually subtracted from the content height.
    ///
    /// A zero offset never picks up the safe area: a sheet pinned to the very
    /// top grows into the inset instead (see the derived safe-area output).
    #[inline]
    pub fn effective(&self, safe_area: SafeArea) -> f64 {
        if self.include_safe_area && self.value > 0.0 {
            self.value + safe_area.top
        } else {
            self.value
        }
    }

    /// Whether the derived safe-area inset and corner radius interpolate
    /// with the anchor fraction.
    #[inline]
    pub fn interpolates_insets(&self) -> bool {
        self.include_safe_area && self.value == 0.0
    }
}

impl Default for TopOffset {
    fn default() -> Self {
        Self::new(0.0, true)
    }
}

/// Height of the collapsed sheet above the bottom of the content area.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BottomOffset {
    pub value: f64,
    /// Keep the pinned header visible when collapsed.
    pub include_header_height: bool,
}

impl BottomOffset {
    #[inline]
    pub const fn new(value: f64, include_header_height: bool) -> Self {
        Self {
            value,
            include_header_height,
        }
    }

    #[inline]
    pub fn effective(&self, header_height: f64) -> f64 {
        if self.include_header_height {
            self.value + header_height
        } else {
            self.value
        }
    }
}

impl Default for BottomOffset {
    fn default() -> Self {
        Self::new(0.0, true)
    }
}

/// How the anchored (middle) resting height is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnchorRule {
    /// A fraction of the content height below either the content top
    /// (`include_top_offset`) or the expanded height.
    Fraction { value: f64, include_top_offset: bool },
    /// An absolute height, clamped between the collapsed and expanded heights.
    FixedHeight(f64),
}

impl Default for AnchorRule {
    fn default() -> Self {
        Self::Fraction {
            value: 0.5,
            include_top_offset: true,
        }
    }
}

/// Corner radius applied at the top position versus everywhere else.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CornerRadiusPolicy {
    pub on_top: f64,
    pub on_any_other: f64,
}

impl CornerRadiusPolicy {
    #[inline]
    pub const fn new(on_top: f64, on_any_other: f64) -> Self {
        Self {
            on_top,
            on_any_other,
        }
    }

    /// Round the top corners only once fully expanded, matching the device.
    #[inline]
    pub const fn top_by_device_radius() -> Self {
        Self::new(DEFAULT_DEVICE_CORNER_RADIUS, 0.0)
    }
}

impl Default for CornerRadiusPolicy {
    fn default() -> Self {
        Self::top_by_device_radius()
    }
}

/// Static description of where the sheet may rest.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeometryConfig {
    #[cfg_attr(feature = "serde", serde(rename = "top_offset"))]
    pub top: TopOffset,
    #[cfg_attr(feature = "serde", serde(rename = "bottom_offset"))]
    pub bottom: BottomOffset,
    pub anchor: AnchorRule,
    pub corner_radius: CornerRadiusPolicy,
    /// Safe-area inset reached when the sheet is fully expanded.
    pub header_inset_unit: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            top: TopOffset::default(),
            bottom: BottomOffset::default(),
            anchor: AnchorRule::default(),
            corner_radius: CornerRadiusPolicy::default(),
            header_inset_unit: DEFAULT_HEADER_INSET_UNIT,
        }
    }
}

/// Sizes measured by the render layer on each layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    /// Total vertical extent available to the sheet.
    pub content_height: f64,
    /// Height of the optional pinned header.
    pub header_height: f64,
    pub safe_area: SafeArea,
}

impl Measurements {
    #[inline]
    pub const fn new(content_height: f64, header_height: f64, safe_area: SafeArea) -> Self {
        Self {
            content_height,
            header_height,
            safe_area,
        }
    }

    /// Default measurements with the given content height.
    #[inline]
    pub const fn with_content_height(content_height: f64) -> Self {
        Self::new(content_height, 0.0, SafeArea::NONE)
    }
}

impl Default for Measurements {
    fn default() -> Self {
        Self::with_content_height(DEFAULT_CONTENT_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_offset_adds_safe_area_only_when_positive() {
        let safe = SafeArea::new(47.0, 34.0);
        assert_eq!(TopOffset::new(20.0, true).effective(safe), 67.0);
        assert_eq!(TopOffset::new(0.0, true).effective(safe), 0.0);
        assert_eq!(TopOffset::new(20.0, false).effective(safe), 20.0);
    }

    #[test]
    fn bottom_offset_header_height() {
        assert_eq!(BottomOffset::new(10.0, true).effective(56.0), 66.0);
        assert_eq!(BottomOffset::new(10.0, false).effective(56.0), 10.0);
    }

    #[test]
    fn interpolation_requires_zero_offset_with_safe_area() {
        assert!(TopOffset::new(0.0, true).interpolates_insets());
        assert!(!TopOffset::new(0.0, false).interpolates_insets());
        assert!(!TopOffset::new(8.0, true).interpolates_insets());
    }

    #[test]
    fn defaults() {
        let config = GeometryConfig::default();
        assert_eq!(config.top, TopOffset::new(0.0, true));
        assert_eq!(config.bottom, BottomOffset::new(0.0, true));
        assert_eq!(
            config.anchor,
            AnchorRule::Fraction {
                value: 0.5,
                include_top_offset: true
            }
        );
        assert_eq!(config.corner_radius.on_top, DEFAULT_DEVICE_CORNER_RADIUS);
        assert_eq!(config.corner_radius.on_any_other, 0.0);
        assert_eq!(config.header_inset_unit, 44.0);

        let m = Measurements::default();
        assert_eq!(m.content_height, DEFAULT_CONTENT_HEIGHT);
        assert_eq!(m.header_height, 0.0);
        assert_eq!(m.safe_area, SafeArea::NONE);
    }
}
