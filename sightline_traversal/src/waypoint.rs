// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One resumable frame of the traversal path and the three per-strategy visit rules.

use sightline_volume::{Intersection, ViewVolume};

use crate::types::{ElementInfo, SceneTree, Timestamp, VisibleElement};
use crate::view::View;

/// A frame of the traversal path, bound to one element.
///
/// `next_index` only ever grows: `-1` while the root frame has not emitted its
/// own element, then the index of the next child to consider, and finally the
/// tree's fan-out once every child has been considered. Each child is
/// considered exactly once per pass whether it is emitted or skipped, so
/// re-entering a frame continues where it stopped.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Waypoint<Id> {
    element: Id,
    next_index: isize,
}

impl<Id: Copy + Eq> Waypoint<Id> {
    /// `next_index` of a root frame that has not emitted its element yet.
    pub const ROOT_PENDING: isize = -1;

    /// The frame a pass starts from.
    pub fn root(element: Id) -> Self {
        Self {
            element,
            next_index: Self::ROOT_PENDING,
        }
    }

    /// A frame for an element that has just been emitted; its children are next.
    pub fn new(element: Id) -> Self {
        Self {
            element,
            next_index: 0,
        }
    }

    /// The element this frame is bound to.
    pub fn element(&self) -> Id {
        self.element
    }

    /// Current position; see the type docs.
    pub fn next_index(&self) -> isize {
        self.next_index
    }

    /// Whether every child has been considered.
    pub fn is_exhausted<T: SceneTree<Id = Id>>(&self) -> bool {
        self.next_index >= fan_out::<T>()
    }

    /// First pass: emit the root unconditionally, then every child overlapping the view.
    pub fn next_visible_first_time<T, V>(
        &mut self,
        tree: &T,
        view: &View<V>,
    ) -> Option<VisibleElement<Id>>
    where
        T: SceneTree<Id = Id>,
        V: ViewVolume,
    {
        if self.next_index == Self::ROOT_PENDING {
            let info = self.take_root(tree)?;
            return Some(VisibleElement {
                id: self.element,
                info,
                intersection: Intersection::Intersect,
            });
        }
        while let Some((id, info)) = self.next_child(tree) {
            if view.volume().cube_intersects_keyhole(&info.cube) {
                return Some(VisibleElement {
                    id,
                    info,
                    intersection: Intersection::Intersect,
                });
            }
        }
        None
    }

    /// Repeat pass: only what changed after `since` and is in view.
    ///
    /// The root is emitted only if its own content changed, classified inside.
    /// Children whose subtree is unchanged are skipped before any geometry test.
    pub fn next_visible_repeat<T, V>(
        &mut self,
        tree: &T,
        view: &View<V>,
        since: Timestamp,
    ) -> Option<VisibleElement<Id>>
    where
        T: SceneTree<Id = Id>,
        V: ViewVolume,
    {
        if self.next_index == Self::ROOT_PENDING {
            let info = self.take_root(tree)?;
            if info.last_changed_content > since {
                return Some(VisibleElement {
                    id: self.element,
                    info,
                    intersection: Intersection::Inside,
                });
            }
        }
        while let Some((id, info)) = self.next_child(tree) {
            if info.last_changed <= since {
                continue;
            }
            let intersection = view.volume().calculate_cube_keyhole_intersection(&info.cube);
            if intersection.is_visible() {
                return Some(VisibleElement {
                    id,
                    info,
                    intersection,
                });
            }
        }
        None
    }

    /// Differential pass: reconcile the last completed view with the current one.
    ///
    /// A child is skipped only when it is outside both views, or when it lay
    /// entirely inside the completed view and nothing in its subtree changed
    /// after `since`. Everything else is emitted, classified against the
    /// current view when it is visible there and against the completed view
    /// otherwise.
    pub fn next_visible_differential<T, V>(
        &mut self,
        tree: &T,
        view: &View<V>,
        completed: &View<V>,
        since: Timestamp,
    ) -> Option<VisibleElement<Id>>
    where
        T: SceneTree<Id = Id>,
        V: ViewVolume,
    {
        if self.next_index == Self::ROOT_PENDING {
            let info = self.take_root(tree)?;
            if info.last_changed_content > since {
                return Some(VisibleElement {
                    id: self.element,
                    info,
                    intersection: Intersection::Intersect,
                });
            }
        }
        while let Some((id, info)) = self.next_child(tree) {
            let old = completed
                .volume()
                .calculate_cube_keyhole_intersection(&info.cube);
            if old == Intersection::Inside && info.last_changed <= since {
                continue;
            }
            let new = view.volume().calculate_cube_keyhole_intersection(&info.cube);
            if new.is_visible() || old.is_visible() {
                return Some(VisibleElement {
                    id,
                    info,
                    intersection: if new.is_visible() { new } else { old },
                });
            }
        }
        None
    }

    /// Move past the root's own emission. A root that no longer resolves exhausts the frame.
    fn take_root<T: SceneTree<Id = Id>>(&mut self, tree: &T) -> Option<ElementInfo> {
        match tree.element(self.element) {
            Some(info) => {
                self.next_index = 0;
                Some(info)
            }
            None => {
                self.next_index = fan_out::<T>();
                None
            }
        }
    }

    /// Advance past the next existing child and return it, or `None` once exhausted.
    fn next_child<T: SceneTree<Id = Id>>(&mut self, tree: &T) -> Option<(Id, ElementInfo)> {
        let end = fan_out::<T>();
        while self.next_index < end {
            let index = usize::try_from(self.next_index).unwrap_or_default();
            self.next_index += 1;
            let found = tree
                .child_at(self.element, index)
                .and_then(|child| Some((child, tree.element(child)?)));
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

fn fan_out<T: SceneTree>() -> isize {
    isize::try_from(T::CHILD_COUNT).unwrap_or(isize::MAX)
}
