// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types: axis-aligned cubes and intersection classes.

use glam::Vec3;

/// Number of children of a [`Cube`] when split at its center.
pub const OCTANTS: usize = 8;

/// Axis-aligned cube given by its minimum corner and edge length.
///
/// Overlap tests are half-open: two cubes that only share a face do not
/// intersect. This keeps sibling octants of a subdivided cube disjoint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cube {
    /// Minimum corner.
    pub corner: Vec3,
    /// Edge length. Assumed finite and non-negative.
    pub scale: f32,
}

impl Cube {
    /// A zero-sized cube at the origin.
    pub const ZERO: Self = Self::new(Vec3::ZERO, 0.0);

    /// Create a cube from its minimum corner and edge length.
    pub const fn new(corner: Vec3, scale: f32) -> Self {
        Self { corner, scale }
    }

    /// The maximum corner.
    #[inline]
    pub fn max_corner(&self) -> Vec3 {
        self.corner + Vec3::splat(self.scale)
    }

    /// The center point.
    #[inline]
    pub fn center(&self) -> Vec3 {
        self.corner + Vec3::splat(self.scale * 0.5)
    }

    /// The child cube for `octant`.
    ///
    /// Bit 0 selects the upper half along x, bit 1 along y and bit 2 along z.
    /// Only the low three bits of `octant` are used.
    pub fn child(&self, octant: usize) -> Self {
        let half = self.scale * 0.5;
        let offset = Vec3::new(
            if octant & 1 != 0 { half } else { 0.0 },
            if octant & 2 != 0 { half } else { 0.0 },
            if octant & 4 != 0 { half } else { 0.0 },
        );
        Self::new(self.corner + offset, half)
    }

    /// Whether the point lies inside or on the boundary of this cube.
    pub fn contains_point(&self, p: Vec3) -> bool {
        let max = self.max_corner();
        self.corner.cmple(p).all() && p.cmple(max).all()
    }

    /// Whether the interiors of the two cubes overlap.
    pub fn intersects(&self, other: &Self) -> bool {
        overlaps(self.corner, self.max_corner(), other.corner, other.max_corner())
    }

    /// Whether `other` lies entirely within this cube.
    pub fn contains_cube(&self, other: &Self) -> bool {
        contains(self.corner, self.max_corner(), other.corner, other.max_corner())
    }
}

/// Three-way classification of a cube against a view volume.
///
/// Ordered from least to most visible so results can be combined with `max`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intersection {
    /// No part of the cube is in the volume.
    Outside,
    /// The cube straddles the volume boundary (or could not be proven inside).
    Intersect,
    /// The cube lies entirely within the volume.
    Inside,
}

impl Intersection {
    /// True for anything other than [`Intersection::Outside`].
    #[inline]
    pub fn is_visible(self) -> bool {
        self != Self::Outside
    }
}

/// Half-open overlap of two min/max boxes.
#[inline]
pub(crate) fn overlaps(a_min: Vec3, a_max: Vec3, b_min: Vec3, b_max: Vec3) -> bool {
    a_min.cmplt(b_max).all() && b_min.cmplt(a_max).all()
}

/// Whether box `b` lies inside box `a`.
#[inline]
pub(crate) fn contains(a_min: Vec3, a_max: Vec3, b_min: Vec3, b_max: Vec3) -> bool {
    a_min.cmple(b_min).all() && b_max.cmple(a_max).all()
}

/// `|a - b| <= tolerance * max(|a|, |b|)`, without relying on `f32::abs`.
pub(crate) fn close_enough(a: f32, b: f32, relative: f32) -> bool {
    let diff = if a > b { a - b } else { b - a };
    let ma = if a < 0.0 { -a } else { a };
    let mb = if b < 0.0 { -b } else { b };
    let mag = if ma > mb { ma } else { mb };
    diff <= relative * mag
}
