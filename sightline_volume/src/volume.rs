// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`ViewVolume`] trait and the axis-aligned [`BoxVolume`].

use core::fmt::Debug;

use glam::Vec3;

use crate::types::{Cube, Intersection, contains, overlaps};

/// A viewer's visibility volume.
///
/// Implementations only need to classify cubes and compare themselves with an
/// earlier snapshot of the same viewer.
pub trait ViewVolume: Clone + Debug {
    /// Classify `cube` as outside, straddling, or fully inside the volume.
    ///
    /// `Inside` must only be reported when the whole cube is covered; callers
    /// use it to skip work, so a conservative `Intersect` is always allowed.
    fn calculate_cube_keyhole_intersection(&self, cube: &Cube) -> Intersection;

    /// Whether any part of `cube` is in the volume.
    fn cube_intersects_keyhole(&self, cube: &Cube) -> bool {
        self.calculate_cube_keyhole_intersection(cube).is_visible()
    }

    /// Whether `other` is close enough to `self` that a full differential
    /// rescan is unnecessary.
    fn is_very_similar(&self, other: &Self) -> bool;
}

/// An axis-aligned region of space.
///
/// Useful for orthographic or region-of-interest viewers and as a simple,
/// exact volume in tests.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoxVolume {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
    /// Largest per-axis corner displacement still considered "very similar".
    pub tolerance: f32,
}

impl BoxVolume {
    /// Default similarity tolerance.
    pub const DEFAULT_TOLERANCE: f32 = 1.0e-3;

    /// Create a region from its corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }

    /// The region exactly covering `cube`.
    pub fn from_cube(cube: &Cube) -> Self {
        Self::new(cube.corner, cube.max_corner())
    }

    /// Override the similarity tolerance.
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl ViewVolume for BoxVolume {
    fn calculate_cube_keyhole_intersection(&self, cube: &Cube) -> Intersection {
        let (min, max) = (cube.corner, cube.max_corner());
        if !overlaps(self.min, self.max, min, max) {
            Intersection::Outside
        } else if contains(self.min, self.max, min, max) {
            Intersection::Inside
        } else {
            Intersection::Intersect
        }
    }

    fn is_very_similar(&self, other: &Self) -> bool {
        let tolerance = Vec3::splat(self.tolerance);
        (self.min - other.min).abs().cmple(tolerance).all()
            && (self.max - other.max).abs().cmple(tolerance).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> BoxVolume {
        BoxVolume::new(Vec3::ZERO, Vec3::splat(10.0))
    }

    #[test]
    fn classifies_three_ways() {
        let v = region();
        let inside = Cube::new(Vec3::splat(1.0), 2.0);
        let straddle = Cube::new(Vec3::splat(9.0), 2.0);
        let outside = Cube::new(Vec3::splat(20.0), 2.0);
        assert_eq!(
            v.calculate_cube_keyhole_intersection(&inside),
            Intersection::Inside
        );
        assert_eq!(
            v.calculate_cube_keyhole_intersection(&straddle),
            Intersection::Intersect
        );
        assert_eq!(
            v.calculate_cube_keyhole_intersection(&outside),
            Intersection::Outside
        );
        assert!(v.cube_intersects_keyhole(&straddle));
        assert!(!v.cube_intersects_keyhole(&outside));
    }

    #[test]
    fn cube_on_the_boundary_is_outside() {
        let v = region();
        let touching = Cube::new(Vec3::new(10.0, 0.0, 0.0), 5.0);
        assert_eq!(
            v.calculate_cube_keyhole_intersection(&touching),
            Intersection::Outside
        );
    }

    #[test]
    fn similarity_uses_tolerance() {
        let v = region();
        let nudged = BoxVolume::new(Vec3::splat(0.0005), Vec3::splat(10.0));
        let moved = BoxVolume::new(Vec3::splat(1.0), Vec3::splat(11.0));
        assert!(v.is_very_similar(&v));
        assert!(v.is_very_similar(&nudged));
        assert!(!v.is_very_similar(&moved));
        assert!(v.with_tolerance(2.0).is_very_similar(&moved));
    }
}
