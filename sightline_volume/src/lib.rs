// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=sightline_volume --heading-base-level=0

//! Sightline Volume: cubes and view volumes for view-dependent scene streaming.
//!
//! A streaming server decides, per viewer, which parts of a scene tree are worth sending.
//! This crate supplies the geometric half of that decision:
//!
//! - [`Cube`]: the axis-aligned bounding cube of a scene element, with octant subdivision.
//! - [`Intersection`]: the three-way "keyhole" classification (`Outside`, `Intersect`, `Inside`).
//! - [`ViewVolume`]: what a traversal needs from a viewer's visibility volume.
//!   Classify a cube, and decide whether two snapshots are close enough to skip a full rescan.
//! - [`BoxVolume`]: an exact axis-aligned region.
//! - [`Frustum`] and [`Keyhole`]: a perspective frustum plus a sphere around the viewer.
//!
//! Classification may be conservative (`Intersect` where the exact answer is `Inside` or
//! `Outside`) but never claims `Inside` for a cube that is not fully covered.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use sightline_volume::{BoxVolume, Cube, Intersection, ViewVolume};
//!
//! let view = BoxVolume::new(Vec3::ZERO, Vec3::splat(8.0));
//! let world = Cube::new(Vec3::ZERO, 16.0);
//!
//! // The lowest octant of the world exactly fills the view.
//! assert_eq!(view.calculate_cube_keyhole_intersection(&world.child(0)), Intersection::Inside);
//! // The whole world only partially overlaps it.
//! assert_eq!(view.calculate_cube_keyhole_intersection(&world), Intersection::Intersect);
//! // The highest octant is out of view.
//! assert!(!view.cube_intersects_keyhole(&world.child(7)));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

pub mod keyhole;
pub mod types;
pub mod volume;

pub use keyhole::{Frustum, Keyhole, Projection, Similarity};
pub use types::{Cube, Intersection, OCTANTS};
pub use volume::{BoxVolume, ViewVolume};
