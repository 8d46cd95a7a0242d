// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Types shared by the traversal and its scene-tree collaborator.

use core::fmt::Debug;

use sightline_volume::{Cube, Intersection};

/// A logical instant in the scene's change history.
///
/// Stamps only need to be totally ordered and monotonic per scene; they are
/// never compared with wall-clock time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Before anything happened. A traversal that never completed a pass reports this.
    pub const NEVER: Self = Self(0);
}

/// Read access to a scene tree, as needed by [`DiffTraversal`](crate::DiffTraversal).
///
/// Ids are weak: the traversal never keeps an element alive, and an id whose
/// element has been removed must resolve to `None` rather than to another element.
pub trait SceneTree {
    /// Weak handle to an element.
    type Id: Copy + Eq + Debug;

    /// Fixed fan-out of every element. Children are addressed `0..CHILD_COUNT`.
    const CHILD_COUNT: usize;

    /// Snapshot of an element's traversal-relevant state, or `None` if it no longer exists.
    fn element(&self, id: Self::Id) -> Option<ElementInfo>;

    /// The child of `id` at `index`, or `None` if there is none (or `id` no longer exists).
    fn child_at(&self, id: Self::Id, index: usize) -> Option<Self::Id>;
}

/// What the traversal reads from one element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ElementInfo {
    /// Bounding cube.
    pub cube: Cube,
    /// Latest change of this element or any descendant.
    pub last_changed: Timestamp,
    /// Latest change of this element's own content.
    pub last_changed_content: Timestamp,
    /// Whether the element has anything worth sending.
    pub has_content: bool,
}

/// An element the current pass says must be considered for sending.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisibleElement<Id> {
    /// The element.
    pub id: Id,
    /// Its state when it was visited.
    pub info: ElementInfo,
    /// How it relates to the view that selected it.
    pub intersection: Intersection,
}

/// The strategy chosen for a pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TraversalType {
    /// No pass has completed yet: everything in view.
    #[default]
    First,
    /// View barely moved: only what changed since the last completed pass.
    Repeat,
    /// View moved: reconcile the previous and current views.
    Differential,
}

/// Context handed to the scan callback with every element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PassInfo {
    /// Strategy of the running pass.
    pub kind: TraversalType,
    /// Start time of the running pass.
    pub start: Timestamp,
    /// Start of the last completed pass; `None` during a first pass.
    ///
    /// Content stamped at or before this was already covered for the previous view.
    pub since: Option<Timestamp>,
    /// Level-of-detail scale of the running pass's view.
    ///
    /// The traversal never culls by it; sinks that drop detail apply it themselves.
    pub lod_scale_factor: f32,
}
