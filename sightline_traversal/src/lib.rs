// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=sightline_traversal --heading-base-level=0

//! Sightline Traversal: decide what each viewer of a shared scene needs sent next.
//!
//! ## Overview
//!
//! A streaming server keeps one [`DiffTraversal`] per viewer. Every frame it hands
//! the traversal the viewer's current [`View`] and a budget, and the traversal walks
//! the scene tree depth first, emitting only the elements that viewer must be
//! (re)sent. A pass that runs out of budget is suspended and picks up exactly where
//! it stopped on the next call.
//!
//! Three strategies are chosen per pass by comparing the new view with the view
//! of the last completed pass:
//!
//! - [`TraversalType::First`]: nothing is known yet; everything in view.
//! - [`TraversalType::Repeat`]: the view barely moved; only subtrees changed since
//!   the last completed pass, pruned by stamp before any geometry test.
//! - [`TraversalType::Differential`]: the view moved; everything in the old view
//!   unless provably covered and unchanged, plus everything in the new one.
//!
//! ## Collaborators
//!
//! - The scene is read through [`SceneTree`]. Ids are weak: an element deleted
//!   while a pass is suspended simply stops being visited.
//! - Visibility volumes implement [`ViewVolume`](sightline_volume::ViewVolume).
//! - Budgets implement [`Budget`]: [`Unbounded`], [`ElementBudget`], and with `std`
//!   a wall-clock [`TimeBudget`].
//!
//! ## Features
//!
//! - `std` (default): wall-clock budgets.
//! - `scene_adapter` (default): [`SceneTree`] for `sightline_scene::Tree`.
//! - `tracing`: pass life-cycle events.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use sightline_scene::Tree;
//! use sightline_traversal::adapters::scene::view_now;
//! use sightline_traversal::{DiffTraversal, TraversalType, Unbounded};
//! use sightline_volume::{BoxVolume, Cube};
//!
//! let mut scene: Tree<&str> = Tree::new(Cube::new(Vec3::ZERO, 16.0));
//! let lamp = scene.ensure_element(Vec3::splat(1.0), 1).unwrap();
//! let _ = scene.set_content(lamp, Some("lamp"));
//!
//! let region = BoxVolume::new(Vec3::ZERO, Vec3::splat(8.0));
//! let mut viewer = DiffTraversal::new();
//! let mut sent = Vec::new();
//!
//! // Nothing sent yet: everything in view.
//! let kind = viewer.prepare_new_traversal(&scene, view_now(&scene, region), scene.root());
//! assert_eq!(kind, TraversalType::First);
//! viewer.traverse_with(&scene, &mut Unbounded, |e, _| sent.push(e.id));
//! assert_eq!(sent, [lamp]);
//!
//! // Same view, nothing changed: nothing to send.
//! sent.clear();
//! let kind = viewer.prepare_new_traversal(&scene, view_now(&scene, region), scene.root());
//! assert_eq!(kind, TraversalType::Repeat);
//! viewer.traverse_with(&scene, &mut Unbounded, |e, _| sent.push(e.id));
//! assert!(sent.is_empty());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
mod budget;
mod traversal;
mod types;
mod view;
mod waypoint;

#[cfg(test)]
mod test_tree;

#[cfg(feature = "std")]
pub use budget::TimeBudget;
pub use budget::{Budget, ElementBudget, Unbounded};
pub use traversal::{DiffTraversal, ScanCallback, TraversalStats};
pub use types::{ElementInfo, PassInfo, SceneTree, Timestamp, TraversalType, VisibleElement};
pub use view::View;
pub use waypoint::Waypoint;
