#![forbid(unsafe_code)]

//! Resting positions and the pure functions that derive them.
//!
//! [`available_positions`] turns a [`GeometryConfig`] and the latest
//! [`Measurements`] into exactly three candidates, one per
//! [`PositionStyle`]. Nothing here is cached: callers recompute after every
//! measurement or configuration change.
//!
//! # Invariants
//!
//! 1. There are always exactly three positions, in the order
//!    `Expanded, Anchored, Collapsed`.
//! 2. The anchored height lies in `[collapsed, expanded]` whenever
//!    `collapsed <= expanded`.
//! 3. [`AvailablePositions::nearest`] is deterministic: on equal distance the
//!    earlier style in enumeration order wins.
//!
//! # Failure Modes
//!
//! Degenerate geometry (zero or negative content height, offsets larger than
//! the content) still yields three well-formed positions, possibly sharing a
//! height. [`anchor_fraction`] never divides by zero.

use crate::geometry::{AnchorRule, CornerRadiusPolicy, GeometryConfig, Measurements};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Named resting state of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PositionStyle {
    Expanded,
    #[default]
    Anchored,
    Collapsed,
}

impl PositionStyle {
    /// Enumeration order, also the tie-break order for snapping.
    pub const ALL: [PositionStyle; 3] = [Self::Expanded, Self::Anchored, Self::Collapsed];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Expanded => 0,
            Self::Anchored => 1,
            Self::Collapsed => 2,
        }
    }
}

/// A resting state together with its computed height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub style: PositionStyle,
    pub height: f64,
}

impl Position {
    #[inline]
    pub const fn new(style: PositionStyle, height: f64) -> Self {
        Self { style, height }
    }
}

/// The three candidate resting positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailablePositions {
    positions: [Position; 3],
}

impl AvailablePositions {
    /// Build from the three heights.
    #[must_use]
    pub const fn new(expanded: f64, anchored: f64, collapsed: f64) -> Self {
        Self {
            positions: [
                Position::new(PositionStyle::Expanded, expanded),
                Position::new(PositionStyle::Anchored, anchored),
                Position::new(PositionStyle::Collapsed, collapsed),
            ],
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Position] {
        &self.positions
    }

    /// Look up a position by style.
    ///
    /// Always `Some` today; kept fallible so callers treat a missing style as
    /// a no-op rather than a panic.
    #[inline]
    pub fn get(&self, style: PositionStyle) -> Option<Position> {
        self.positions.get(style.index()).copied()
    }

    #[inline]
    pub fn expanded(&self) -> Position {
        self.positions[0]
    }

    #[inline]
    pub fn anchored(&self) -> Position {
        self.positions[1]
    }

    #[inline]
    pub fn collapsed(&self) -> Position {
        self.positions[2]
    }

    /// Lowest and highest candidate heights.
    pub fn bounds(&self) -> (f64, f64) {
        self.positions
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.height), hi.max(p.height))
            })
    }

    /// Whether `location` lies within [`bounds`](Self::bounds), inclusive.
    pub fn contains(&self, location: f64) -> bool {
        let (lo, hi) = self.bounds();
        (lo..=hi).contains(&location)
    }

    /// The position closest to `location`.
    ///
    /// Ties go to the first style in `Expanded, Anchored, Collapsed` order.
    pub fn nearest(&self, location: f64) -> Position {
        let mut best = self.positions[0];
        let mut best_distance = (best.height - location).abs();
        for candidate in &self.positions[1..] {
            let distance = (candidate.height - location).abs();
            // Strict comparison keeps the earlier candidate on ties.
            if distance < best_distance {
                best = *candidate;
                best_distance = distance;
            }
        }
        best
    }
}

impl<'a> IntoIterator for &'a AvailablePositions {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}

/// Height of the fully expanded sheet.
#[inline]
pub fn expanded_height(config: &GeometryConfig, m: &Measurements) -> f64 {
    m.content_height - config.top.effective(m.safe_area)
}

/// Height of the collapsed sheet.
#[inline]
pub fn collapsed_height(config: &GeometryConfig, m: &Measurements) -> f64 {
    config.bottom.effective(m.header_height)
}

/// Height of the anchored sheet.
///
/// A fixed anchor is clamped into `[collapsed, expanded]`; a fraction anchor
/// is taken as computed.
pub fn anchored_height(config: &GeometryConfig, m: &Measurements) -> f64 {
    let top = expanded_height(config, m);
    match config.anchor {
        AnchorRule::Fraction {
            value,
            include_top_offset,
        } => {
            let base = if include_top_offset {
                m.content_height
            } else {
                top
            };
            base - m.content_height * value
        }
        AnchorRule::FixedHeight(height) => {
            clamp_between(height, collapsed_height(config, m), top)
        }
    }
}

/// Clamp `value` into `[low, high]`; when the band is inverted, `low` wins
/// for values at or below it and `high` for values at or above it.
fn clamp_between(value: f64, low: f64, high: f64) -> f64 {
    if value <= low {
        low
    } else if value >= high {
        high
    } else {
        value
    }
}

/// Compute the three candidate resting positions.
#[must_use]
pub fn available_positions(config: &GeometryConfig, m: &Measurements) -> AvailablePositions {
    AvailablePositions::new(
        expanded_height(config, m),
        anchored_height(config, m),
        collapsed_height(config, m),
    )
}

/// Interpolation factor in `[0, 1]` as the sheet approaches `top`.
///
/// The ramp starts two safe-area insets below the expanded height.
pub fn anchor_fraction(location: f64, top: f64, safe_area_top: f64) -> f64 {
    let trigger = top - safe_area_top * 2.0;
    let travelled = location - trigger;
    if travelled <= 0.0 {
        return 0.0;
    }
    let distance = top - trigger;
    if distance <= 0.0 {
        return 1.0;
    }
    (travelled / distance).min(1.0)
}

/// Corner radius for a given anchor fraction.
#[inline]
pub fn corner_radius(fraction: f64, policy: &CornerRadiusPolicy) -> f64 {
    policy.on_any_other.max(policy.on_top * fraction)
}

/// Safe-area inset for a given anchor fraction.
#[inline]
pub fn safe_area_inset(fraction: f64, unit: f64) -> f64 {
    (unit * fraction).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BottomOffset, SafeArea, TopOffset};

    fn config_600_350_100() -> (GeometryConfig, Measurements) {
        let config = GeometryConfig {
            top: TopOffset::new(100.0, false),
            bottom: BottomOffset::new(100.0, false),
            anchor: AnchorRule::Fraction {
                value: 0.5,
                include_top_offset: true,
            },
            ..GeometryConfig::default()
        };
        (config, Measurements::with_content_height(700.0))
    }

    #[test]
    fn three_positions_in_order() {
        let (config, m) = config_600_350_100();
        let positions = available_positions(&config, &m);
        let styles: Vec<_> = positions.iter().map(|p| p.style).collect();
        assert_eq!(styles, PositionStyle::ALL);
        assert_eq!(positions.expanded().height, 600.0);
        assert_eq!(positions.anchored().height, 350.0);
        assert_eq!(positions.collapsed().height, 100.0);
    }

    #[test]
    fn safe_area_only_added_for_positive_top_offset() {
        let mut config = GeometryConfig::default();
        let m = Measurements::new(800.0, 0.0, SafeArea::new(44.0, 34.0));
        assert_eq!(expanded_height(&config, &m), 800.0);

        config.top = TopOffset::new(10.0, true);
        assert_eq!(expanded_height(&config, &m), 746.0);

        config.top = TopOffset::new(10.0, false);
        assert_eq!(expanded_height(&config, &m), 790.0);
    }

    #[test]
    fn collapsed_includes_header_when_requested() {
        let mut config = GeometryConfig::default();
        config.bottom = BottomOffset::new(20.0, true);
        let m = Measurements::new(800.0, 60.0, SafeArea::NONE);
        assert_eq!(collapsed_height(&config, &m), 80.0);

        config.bottom.include_header_height = false;
        assert_eq!(collapsed_height(&config, &m), 20.0);
    }

    #[test]
    fn fraction_anchor_relative_to_expanded_height() {
        let (mut config, m) = config_600_350_100();
        config.anchor = AnchorRule::Fraction {
            value: 0.25,
            include_top_offset: false,
        };
        // base = top (600) - 700 * 0.25
        assert_eq!(anchored_height(&config, &m), 425.0);
    }

    #[test]
    fn fixed_anchor_clamped_into_band() {
        let (mut config, m) = config_600_350_100();
        config.anchor = AnchorRule::FixedHeight(50.0);
        assert_eq!(anchored_height(&config, &m), 100.0);
        config.anchor = AnchorRule::FixedHeight(900.0);
        assert_eq!(anchored_height(&config, &m), 600.0);
        config.anchor = AnchorRule::FixedHeight(420.0);
        assert_eq!(anchored_height(&config, &m), 420.0);
    }

    #[test]
    fn fraction_anchor_is_not_clamped() {
        let (mut config, m) = config_600_350_100();
        config.anchor = AnchorRule::Fraction {
            value: 0.05,
            include_top_offset: true,
        };
        // 700 - 700 * 0.05, above the expanded height.
        assert!((anchored_height(&config, &m) - 665.0).abs() < 1e-9);
        config.anchor = AnchorRule::Fraction {
            value: 1.0,
            include_top_offset: true,
        };
        assert_eq!(anchored_height(&config, &m), 0.0);

        let config = GeometryConfig {
            top: TopOffset::new(0.0, false),
            bottom: BottomOffset::new(100.0, false),
            anchor: AnchorRule::Fraction {
                value: 0.9,
                include_top_offset: true,
            },
            ..GeometryConfig::default()
        };
        let m = Measurements::with_content_height(844.0);
        let anchored = available_positions(&config, &m).anchored().height;
        assert!((anchored - 84.4).abs() < 1e-9, "anchored {anchored}");
    }

    #[test]
    fn nearest_prefers_closest() {
        let positions = AvailablePositions::new(600.0, 350.0, 100.0);
        assert_eq!(positions.nearest(340.0).style, PositionStyle::Anchored);
        assert_eq!(positions.nearest(590.0).style, PositionStyle::Expanded);
        assert_eq!(positions.nearest(-40.0).style, PositionStyle::Collapsed);
    }

    #[test]
    fn nearest_tie_goes_to_first_enumerated() {
        let positions = AvailablePositions::new(600.0, 350.0, 100.0);
        assert_eq!(positions.nearest(225.0).style, PositionStyle::Anchored);
        assert_eq!(positions.nearest(475.0).style, PositionStyle::Expanded);

        let flat = AvailablePositions::new(0.0, 0.0, 0.0);
        assert_eq!(flat.nearest(10.0).style, PositionStyle::Expanded);
    }

    #[test]
    fn bounds_and_contains() {
        let positions = AvailablePositions::new(600.0, 350.0, 100.0);
        assert_eq!(positions.bounds(), (100.0, 600.0));
        assert!(positions.contains(100.0));
        assert!(positions.contains(600.0));
        assert!(!positions.contains(99.9));
        assert!(!positions.contains(600.1));
    }

    #[test]
    fn get_by_style() {
        let positions = AvailablePositions::new(600.0, 350.0, 100.0);
        for style in PositionStyle::ALL {
            assert_eq!(positions.get(style).map(|p| p.style), Some(style));
        }
    }

    #[test]
    fn anchor_fraction_ramp() {
        // top 600, inset 44 -> trigger at 512
        assert_eq!(anchor_fraction(600.0, 600.0, 44.0), 1.0);
        assert_eq!(anchor_fraction(512.0, 600.0, 44.0), 0.0);
        assert_eq!(anchor_fraction(300.0, 600.0, 44.0), 0.0);
        assert!((anchor_fraction(556.0, 600.0, 44.0) - 0.5).abs() < 1e-12);
        assert_eq!(anchor_fraction(700.0, 600.0, 44.0), 1.0);
    }

    #[test]
    fn anchor_fraction_zero_inset_guard() {
        assert_eq!(anchor_fraction(600.0, 600.0, 0.0), 0.0);
        assert_eq!(anchor_fraction(600.5, 600.0, 0.0), 1.0);
        assert!(anchor_fraction(f64::MAX, 600.0, 0.0).is_finite());
    }

    #[test]
    fn corner_radius_and_inset_follow_fraction() {
        let policy = CornerRadiusPolicy::new(40.0, 12.0);
        assert_eq!(corner_radius(0.0, &policy), 12.0);
        assert_eq!(corner_radius(0.5, &policy), 20.0);
        assert_eq!(corner_radius(1.0, &policy), 40.0);

        assert_eq!(safe_area_inset(0.0, 44.0), 0.0);
        assert_eq!(safe_area_inset(0.5, 44.0), 22.0);
        assert_eq!(safe_area_inset(1.0, 44.0), 44.0);
    }

    #[test]
    fn degenerate_geometry_is_well_formed() {
        let config = GeometryConfig::default();
        let positions = available_positions(&config, &Measurements::with_content_height(0.0));
        assert_eq!(positions.bounds(), (0.0, 0.0));
        assert_eq!(positions.as_slice().len(), 3);

        let negative = available_positions(&config, &Measurements::with_content_height(-50.0));
        assert!(negative.iter().all(|p| p.height.is_finite()));
    }
}
