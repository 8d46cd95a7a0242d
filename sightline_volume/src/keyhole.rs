// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Perspective frustum and keyhole volumes.
//!
//! A keyhole is a frustum plus a small sphere around the viewer, so content
//! right next to the viewer (behind or beside the camera) stays relevant.

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::types::{Cube, Intersection, close_enough};
use crate::volume::ViewVolume;

/// View frustum represented as six inward-facing planes.
///
/// Each plane is `(normal, d)` with `dot(normal, p) + d >= 0` on the inside.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far.
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract planes from a view-projection matrix with a `0..1` depth range
    /// (as produced by [`Mat4::perspective_rh`]).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);
        Self {
            planes: [
                normalize_plane(row3 + row0),
                normalize_plane(row3 - row0),
                normalize_plane(row3 + row1),
                normalize_plane(row3 - row1),
                normalize_plane(row2),
                normalize_plane(row3 - row2),
            ],
        }
    }

    /// Classify a cube against all six planes.
    ///
    /// Uses the positive/negative vertex test, so a cube near a frustum corner
    /// may be reported as `Intersect` while actually outside. That error is
    /// conservative.
    pub fn classify(&self, cube: &Cube) -> Intersection {
        let (min, max) = (cube.corner, cube.max_corner());
        let mut result = Intersection::Inside;
        for plane in &self.planes {
            let p_vertex = Vec3::new(
                if plane.x > 0.0 { max.x } else { min.x },
                if plane.y > 0.0 { max.y } else { min.y },
                if plane.z > 0.0 { max.z } else { min.z },
            );
            if plane.truncate().dot(p_vertex) + plane.w < 0.0 {
                return Intersection::Outside;
            }
            let n_vertex = Vec3::new(
                if plane.x > 0.0 { min.x } else { max.x },
                if plane.y > 0.0 { min.y } else { max.y },
                if plane.z > 0.0 { min.z } else { max.z },
            );
            if plane.truncate().dot(n_vertex) + plane.w < 0.0 {
                result = Intersection::Intersect;
            }
        }
        result
    }

    /// Whether the point is inside all planes.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(p) + plane.w >= 0.0)
    }
}

#[inline]
fn normalize_plane(plane: Vec4) -> Vec4 {
    let normal_length = plane.truncate().length();
    if normal_length > 0.0001 {
        plane / normal_length
    } else {
        plane
    }
}

/// Perspective projection parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width over height.
    pub aspect_ratio: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y: core::f32::consts::FRAC_PI_3,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    fn is_close(&self, other: &Self, relative: f32) -> bool {
        close_enough(self.fov_y, other.fov_y, relative)
            && close_enough(self.aspect_ratio, other.aspect_ratio, relative)
            && close_enough(self.near, other.near, relative)
            && close_enough(self.far, other.far, relative)
    }
}

/// Thresholds deciding when two keyholes are "very similar".
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Similarity {
    /// Maximum squared distance between viewer positions.
    pub max_position_delta_squared: f32,
    /// Minimum `|dot|` between orientations (1.0 means identical).
    pub min_orientation_dot: f32,
    /// Maximum relative difference between projection parameters.
    pub max_relative_error: f32,
}

impl Similarity {
    /// One world unit of travel, about fourteen degrees of rotation, 1% projection drift.
    pub const DEFAULT: Self = Self {
        max_position_delta_squared: 1.0,
        min_orientation_dot: 0.992_403_9,
        max_relative_error: 0.01,
    };

    /// Only bit-identical keyholes are similar.
    pub const EXACT: Self = Self {
        max_position_delta_squared: 0.0,
        min_orientation_dot: 1.0,
        max_relative_error: 0.0,
    };
}

impl Default for Similarity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A viewer's frustum plus a sphere of radius `center_radius` around its position.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyhole {
    position: Vec3,
    orientation: Quat,
    projection: Projection,
    center_radius: f32,
    frustum: Frustum,
    similarity: Similarity,
}

impl Keyhole {
    /// Build a keyhole for a viewer at `position` looking down its local `-Z`.
    pub fn new(
        position: Vec3,
        orientation: Quat,
        projection: Projection,
        center_radius: f32,
    ) -> Self {
        let view = Mat4::from_rotation_translation(orientation, position).inverse();
        let frustum = Frustum::from_view_projection(&(projection.matrix() * view));
        Self {
            position,
            orientation,
            projection,
            center_radius,
            frustum,
            similarity: Similarity::DEFAULT,
        }
    }

    /// Replace the similarity thresholds.
    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// Viewer position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Viewer orientation.
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Projection parameters.
    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Radius of the sphere around the viewer.
    pub fn center_radius(&self) -> f32 {
        self.center_radius
    }

    /// The frustum part of the keyhole.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    fn sphere_intersection(&self, cube: &Cube) -> Intersection {
        if self.center_radius <= 0.0 {
            return Intersection::Outside;
        }
        let (min, max) = (cube.corner, cube.max_corner());
        let r2 = self.center_radius * self.center_radius;
        let nearest = self.position.clamp(min, max);
        if nearest.distance_squared(self.position) > r2 {
            return Intersection::Outside;
        }
        let farthest = (self.position - min).abs().max((self.position - max).abs());
        if farthest.length_squared() <= r2 {
            Intersection::Inside
        } else {
            Intersection::Intersect
        }
    }
}

impl ViewVolume for Keyhole {
    fn calculate_cube_keyhole_intersection(&self, cube: &Cube) -> Intersection {
        let sphere = self.sphere_intersection(cube);
        if sphere == Intersection::Inside {
            return Intersection::Inside;
        }
        match self.frustum.classify(cube) {
            Intersection::Outside => sphere,
            frustum => frustum,
        }
    }

    fn is_very_similar(&self, other: &Self) -> bool {
        let s = self.similarity;
        let dot = self.orientation.dot(other.orientation);
        let dot = if dot < 0.0 { -dot } else { dot };
        self.position.distance_squared(other.position) <= s.max_position_delta_squared
            && dot >= s.min_orientation_dot
            && self.projection.is_close(&other.projection, s.max_relative_error)
            && close_enough(self.center_radius, other.center_radius, s.max_relative_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_keyhole() -> Keyhole {
        Keyhole::new(Vec3::ZERO, Quat::IDENTITY, Projection::default(), 2.0)
    }

    #[test]
    fn frustum_culls_box_behind_camera() {
        let k = forward_keyhole();
        let front = Cube::new(Vec3::new(-1.0, -1.0, -12.0), 2.0);
        let back = Cube::new(Vec3::new(-1.0, -1.0, 10.0), 2.0);
        assert_eq!(k.frustum().classify(&front), Intersection::Inside);
        assert_eq!(k.frustum().classify(&back), Intersection::Outside);
        assert!(k.frustum().contains_point(Vec3::new(0.0, 0.0, -5.0)));
        assert!(!k.frustum().contains_point(Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn frustum_reports_straddling_cubes() {
        let k = forward_keyhole();
        // Crosses the far plane.
        let far = Cube::new(Vec3::new(-10.0, -10.0, -1010.0), 20.0);
        assert_eq!(k.frustum().classify(&far), Intersection::Intersect);
    }

    #[test]
    fn sphere_keeps_content_behind_viewer() {
        let k = forward_keyhole();
        let tiny_behind = Cube::new(Vec3::new(-0.25, -0.25, 0.5), 0.5);
        assert_eq!(
            k.calculate_cube_keyhole_intersection(&tiny_behind),
            Intersection::Inside
        );
        let large_behind = Cube::new(Vec3::new(-4.0, -4.0, 1.0), 8.0);
        assert_eq!(
            k.calculate_cube_keyhole_intersection(&large_behind),
            Intersection::Intersect
        );
        let far_behind = Cube::new(Vec3::new(-1.0, -1.0, 50.0), 2.0);
        assert_eq!(
            k.calculate_cube_keyhole_intersection(&far_behind),
            Intersection::Outside
        );
    }

    #[test]
    fn similarity_tracks_motion_and_rotation() {
        let k = forward_keyhole();
        let nudged = Keyhole::new(
            Vec3::new(0.5, 0.0, 0.0),
            Quat::IDENTITY,
            Projection::default(),
            2.0,
        );
        let moved = Keyhole::new(
            Vec3::new(5.0, 0.0, 0.0),
            Quat::IDENTITY,
            Projection::default(),
            2.0,
        );
        let turned = Keyhole::new(
            Vec3::ZERO,
            Quat::from_rotation_y(core::f32::consts::FRAC_PI_2),
            Projection::default(),
            2.0,
        );
        assert!(k.is_very_similar(&nudged));
        assert!(!k.is_very_similar(&moved));
        assert!(!k.is_very_similar(&turned));
        let strict = forward_keyhole().with_similarity(Similarity::EXACT);
        assert!(strict.is_very_similar(&k));
        assert!(!strict.is_very_similar(&nudged));
    }
}
