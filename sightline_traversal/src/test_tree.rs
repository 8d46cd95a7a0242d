// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small in-memory [`SceneTree`] for unit tests.

use alloc::vec::Vec;

use glam::Vec3;
use sightline_volume::{Cube, OCTANTS};

use crate::types::{ElementInfo, SceneTree, Timestamp};

#[derive(Clone, Debug)]
struct Slot {
    info: ElementInfo,
    children: [Option<usize>; OCTANTS],
    alive: bool,
}

/// Flat octree with plain index ids; removed slots stay dead.
#[derive(Clone, Debug)]
pub(crate) struct TestTree {
    slots: Vec<Slot>,
}

impl TestTree {
    /// Root at id `0`, a 16-unit cube at the origin, stamped `1`.
    pub(crate) fn new() -> Self {
        let mut tree = Self { slots: Vec::new() };
        tree.push(Cube::new(Vec3::ZERO, 16.0), 1);
        tree
    }

    fn push(&mut self, cube: Cube, stamp: u64) -> usize {
        self.slots.push(Slot {
            info: ElementInfo {
                cube,
                last_changed: Timestamp(stamp),
                last_changed_content: Timestamp(stamp),
                has_content: true,
            },
            children: [None; OCTANTS],
            alive: true,
        });
        self.slots.len() - 1
    }

    /// Add the `octant` child of `parent`, stamped `stamp`. Ancestors are not restamped.
    pub(crate) fn child(&mut self, parent: usize, octant: usize, stamp: u64) -> usize {
        let cube = self.slots[parent].info.cube.child(octant);
        let id = self.push(cube, stamp);
        self.slots[parent].children[octant] = Some(id);
        id
    }

    /// Stamp `id`'s content and the `last_changed` of it and its ancestors.
    pub(crate) fn touch(&mut self, id: usize, stamp: u64) {
        self.slots[id].info.last_changed_content = Timestamp(stamp);
        let mut cur = Some(id);
        while let Some(i) = cur {
            self.slots[i].info.last_changed = Timestamp(stamp);
            cur = self
                .slots
                .iter()
                .position(|s| s.children.contains(&Some(i)));
        }
    }

    pub(crate) fn set_has_content(&mut self, id: usize, has_content: bool) {
        self.slots[id].info.has_content = has_content;
    }

    pub(crate) fn kill(&mut self, id: usize) {
        self.slots[id].alive = false;
    }
}

impl SceneTree for TestTree {
    type Id = usize;
    const CHILD_COUNT: usize = OCTANTS;

    fn element(&self, id: usize) -> Option<ElementInfo> {
        self.slots.get(id).filter(|s| s.alive).map(|s| s.info)
    }

    fn child_at(&self, id: usize, index: usize) -> Option<usize> {
        let slot = self.slots.get(id).filter(|s| s.alive)?;
        slot.children.get(index).copied().flatten()
    }
}
