// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene tree: element identifiers, flags, and deletions.

/// Identifier for an element in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is freed.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// ### Liveness
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live element.
/// Stale `NodeId`s never alias a different live element because the generation must match.
/// Every accessor on [`Tree`](crate::Tree) treats a stale id as "no such element".
///
/// ### Notes
///
/// - The generation increments on slot reuse and never decreases.
/// - `u32` is ample for practical lifetimes; behavior on generation overflow is unspecified.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// The generation of this handle.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Element flags controlling whether content is streamed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ElementFlags: u8 {
        /// Content participates in streaming to viewers.
        const VISIBLE = 0b0000_0001;
    }
}

impl Default for ElementFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// A removed element and the stamp at which it was removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Deletion {
    /// The (now stale) id of the removed element.
    pub id: NodeId,
    /// Logical time of removal.
    pub stamp: u64,
}
