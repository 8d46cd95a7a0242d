// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter for Sightline Scene.
//!
//! ## Feature
//!
//! Enable with `scene_adapter` (on by default).
//!
//! ## Notes
//!
//! [`Tree`] ids are generational, so an element removed while a pass is
//! suspended resolves to nothing and its branch is simply not descended.
//! Scene stamps map one to one onto [`Timestamp`]s.

use sightline_scene::{Deletion, NodeId, Tree};
use sightline_volume::{OCTANTS, ViewVolume};

use crate::traversal::DiffTraversal;
use crate::types::{ElementInfo, SceneTree, Timestamp};
use crate::view::View;

impl<P> SceneTree for Tree<P> {
    type Id = NodeId;
    const CHILD_COUNT: usize = OCTANTS;

    fn element(&self, id: NodeId) -> Option<ElementInfo> {
        Some(ElementInfo {
            cube: self.cube(id)?,
            last_changed: Timestamp(self.last_changed(id)?),
            last_changed_content: Timestamp(self.last_changed_content(id)?),
            has_content: self.has_content(id),
        })
    }

    fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        Self::child_at(self, id, index)
    }
}

/// A view of `volume` starting at the scene's current stamp.
pub fn view_now<P, V: ViewVolume>(tree: &Tree<P>, volume: V) -> View<V> {
    View::new(volume, Timestamp(tree.now()))
}

/// Removals the viewer has not been told about, as of its last completed pass.
///
/// Before any pass completes this is every logged removal. The iterator
/// borrows only `tree`, so the traversal stays free to run meanwhile.
pub fn deletions_since_completed<'a, P, V: ViewVolume>(
    tree: &'a Tree<P>,
    traversal: &DiffTraversal<NodeId, V>,
) -> impl Iterator<Item = Deletion> + use<'a, P, V> {
    let since = traversal.start_of_completed_traversal().0;
    tree.deleted_since(since)
}
