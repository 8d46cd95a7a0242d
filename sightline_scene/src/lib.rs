// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=sightline_scene --heading-base-level=0

//! Sightline Scene: an octree of content elements with change stamps.
//!
//! Sightline Scene is the authoritative world model a streaming server reads from.
//!
//! - Elements form an octree: each element's cube is an octant of its parent's cube.
//! - Elements are addressed by generational [`NodeId`] handles. A removed element's handle
//!   goes stale and is never confused with a later element in the same slot.
//! - Every mutation advances a logical clock. The touched element's `last_changed_content`
//!   and the `last_changed` of it and all its ancestors are stamped, so a reader can skip
//!   any subtree whose `last_changed` is not newer than the last time it looked.
//! - Removals are kept in a deletion log so viewers can be told what disappeared since a stamp.
//!
//! The tree does not know about viewers; see `sightline_traversal` for the per-viewer diff traversal.
//!
//! ## API overview
//!
//! - [`Tree`]: the octree, its logical clock and deletion log.
//! - [`NodeId`]: generational handle of an element.
//! - [`ElementFlags`]: streaming controls.
//! - [`Deletion`]: one entry of the deletion log.
//!
//! # Example
//!
//! ```rust
//! use glam::Vec3;
//! use sightline_scene::Tree;
//! use sightline_volume::Cube;
//!
//! let mut tree: Tree<&str> = Tree::new(Cube::new(Vec3::ZERO, 64.0));
//! let seen = tree.now();
//!
//! // Place an entity two levels down, at the element containing the point.
//! let lamp = tree.ensure_element(Vec3::new(40.0, 2.0, 2.0), 2).unwrap();
//! let _ = tree.set_content(lamp, Some("lamp"));
//!
//! // The change is visible from the root, so readers can prune unchanged subtrees.
//! assert!(tree.last_changed(tree.root()).unwrap() > seen);
//! assert!(tree.has_content(lamp));
//!
//! // Removing it leaves a stale handle and a deletion record.
//! tree.remove(lamp);
//! assert!(!tree.is_alive(lamp));
//! assert_eq!(tree.deleted_since(seen).next().map(|d| d.id), Some(lamp));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod tree;
mod types;

pub use tree::Tree;
pub use types::{Deletion, ElementFlags, NodeId};
