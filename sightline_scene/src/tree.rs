// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, change stamps, deletions.

use alloc::vec;
use alloc::vec::Vec;
use glam::Vec3;
use sightline_volume::{Cube, OCTANTS};

use crate::types::{Deletion, ElementFlags, NodeId};

/// Octree of content elements.
///
/// The tree always has a root covering the whole scene. Every other element is
/// the child of its parent at a fixed octant, and its cube is that octant of the
/// parent's cube.
///
/// Every mutation advances a logical clock ([`Tree::now`]) and stamps the
/// touched element and all of its ancestors, so `last_changed` of an element is
/// never older than that of any descendant.
#[derive(Clone)]
pub struct Tree<P> {
    nodes: Vec<Option<Node<P>>>, // slots
    generations: Vec<u32>,       // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    epoch: u64,
    root: NodeId,
    deletions: Vec<Deletion>, // ordered by stamp
}

impl<P> core::fmt::Debug for Tree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("epoch", &self.epoch)
            .field("root", &self.root)
            .field("deletions", &self.deletions.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node<P> {
    generation: u32,
    parent: Option<NodeId>,
    children: [Option<NodeId>; OCTANTS],
    cube: Cube,
    flags: ElementFlags,
    content: Option<P>,
    last_changed: u64,
    last_changed_content: u64,
}

impl<P> Node<P> {
    fn new(generation: u32, parent: Option<NodeId>, cube: Cube, stamp: u64) -> Self {
        Self {
            generation,
            parent,
            children: [None; OCTANTS],
            cube,
            flags: ElementFlags::default(),
            content: None,
            last_changed: stamp,
            last_changed_content: stamp,
        }
    }
}

impl<P> Tree<P> {
    /// Create a tree whose root element covers `root_cube`.
    pub fn new(root_cube: Cube) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
            root: NodeId::new(0, 0),
            deletions: Vec::new(),
        };
        let stamp = tree.tick();
        tree.root = tree.alloc(None, root_cube, stamp);
        tree
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The most recent stamp handed out.
    ///
    /// Any later mutation stamps strictly after this value.
    pub fn now(&self) -> u64 {
        self.epoch
    }

    /// Number of live elements, including the root.
    pub fn element_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Whether `id` refers to a live element.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Bounding cube of an element.
    pub fn cube(&self, id: NodeId) -> Option<Cube> {
        self.node(id).map(|n| n.cube)
    }

    /// Parent of an element (`None` for the root or a stale id).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Child of an element at `index` (its octant).
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id)?.children.get(index).copied().flatten()
    }

    /// Existing children of an element in octant order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.children.iter().flatten().copied())
    }

    /// Latest stamp at which this element or any descendant changed.
    pub fn last_changed(&self, id: NodeId) -> Option<u64> {
        self.node(id).map(|n| n.last_changed)
    }

    /// Latest stamp at which this element's own content or flags changed.
    pub fn last_changed_content(&self, id: NodeId) -> Option<u64> {
        self.node(id).map(|n| n.last_changed_content)
    }

    /// Flags of an element.
    pub fn flags(&self, id: NodeId) -> Option<ElementFlags> {
        self.node(id).map(|n| n.flags)
    }

    /// Content of an element.
    pub fn content(&self, id: NodeId) -> Option<&P> {
        self.node(id)?.content.as_ref()
    }

    /// Whether an element carries content that should be streamed.
    ///
    /// False for stale ids, empty elements, and elements not marked [`ElementFlags::VISIBLE`].
    pub fn has_content(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|n| n.content.is_some() && n.flags.contains(ElementFlags::VISIBLE))
    }

    /// Get or create the child of `parent` at `octant`.
    ///
    /// Returns `None` if `parent` is stale or `octant` is out of range.
    /// Creating a child stamps it and its ancestors.
    pub fn insert_child(&mut self, parent: NodeId, octant: usize) -> Option<NodeId> {
        if octant >= OCTANTS {
            return None;
        }
        let parent_node = self.node(parent)?;
        if let Some(existing) = parent_node.children[octant] {
            return Some(existing);
        }
        let cube = parent_node.cube.child(octant);
        let stamp = self.tick();
        let id = self.alloc(Some(parent), cube, stamp);
        if let Some(p) = self.node_mut(parent) {
            p.children[octant] = Some(id);
        }
        self.propagate(parent, stamp);
        Some(id)
    }

    /// Get or create the element `depth` levels below the root that contains `point`.
    ///
    /// Returns `None` if `point` lies outside the root cube.
    pub fn ensure_element(&mut self, point: Vec3, depth: usize) -> Option<NodeId> {
        let mut id = self.root;
        if !self.node(id)?.cube.contains_point(point) {
            return None;
        }
        for _ in 0..depth {
            let center = self.node(id)?.cube.center();
            let octant = usize::from(point.x >= center.x)
                | (usize::from(point.y >= center.y) << 1)
                | (usize::from(point.z >= center.z) << 2);
            id = self.insert_child(id, octant)?;
        }
        Some(id)
    }

    /// Replace the content of an element, returning the previous content.
    ///
    /// Stamps the element's content and its ancestors. Does nothing for a stale id.
    pub fn set_content(&mut self, id: NodeId, content: Option<P>) -> Option<P> {
        self.node(id)?;
        let stamp = self.tick();
        let node = self.node_mut(id)?;
        let old = core::mem::replace(&mut node.content, content);
        node.last_changed_content = stamp;
        self.propagate(id, stamp);
        old
    }

    /// Edit existing content in place. Returns false if there was nothing to edit.
    pub fn update_content(&mut self, id: NodeId, f: impl FnOnce(&mut P)) -> bool {
        if self.content(id).is_none() {
            return false;
        }
        let stamp = self.tick();
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if let Some(content) = node.content.as_mut() {
            f(content);
        }
        node.last_changed_content = stamp;
        self.propagate(id, stamp);
        true
    }

    /// Update flags. Changing flags counts as a content change.
    pub fn set_flags(&mut self, id: NodeId, flags: ElementFlags) {
        if self.flags(id).is_none_or(|f| f == flags) {
            return;
        }
        let stamp = self.tick();
        if let Some(node) = self.node_mut(id) {
            node.flags = flags;
            node.last_changed_content = stamp;
        }
        self.propagate(id, stamp);
    }

    /// Remove an element and its subtree.
    ///
    /// Every removed element is recorded in the deletion log. The root cannot be
    /// removed; use [`Tree::set_content`] to clear it.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.root || !self.is_alive(id) {
            return;
        }
        let stamp = self.tick();
        let parent = self.parent(id);
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            for slot in p.children.iter_mut() {
                if *slot == Some(id) {
                    *slot = None;
                }
            }
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if !self.is_alive(n) {
                continue;
            }
            if let Some(node) = self.nodes[n.idx()].take() {
                stack.extend(node.children.iter().flatten().copied());
                self.free_list.push(n.idx());
                self.deletions.push(Deletion { id: n, stamp });
            }
        }
        if let Some(p) = parent {
            self.propagate(p, stamp);
        }
    }

    /// Elements removed strictly after `since`, oldest first.
    pub fn deleted_since(&self, since: u64) -> impl Iterator<Item = Deletion> + '_ {
        let start = self.deletions.partition_point(|d| d.stamp <= since);
        self.deletions[start..].iter().copied()
    }

    /// Drop deletion records stamped at or before `through`.
    ///
    /// Call once every viewer has acknowledged deletions up to that stamp.
    pub fn forget_deletions_through(&mut self, through: u64) {
        let end = self.deletions.partition_point(|d| d.stamp <= through);
        self.deletions.drain(..end);
    }

    /// All live elements in depth-first, octant-ascending order starting at the root.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.element_count());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).collect::<Vec<_>>().into_iter().rev());
        }
        out
    }

    // --- internals ---

    fn tick(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn alloc(&mut self, parent: Option<NodeId>, cube: Cube, stamp: u64) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, parent, cube, stamp));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, parent, cube, stamp)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    /// Stamp `id` and every ancestor as changed at `stamp`.
    fn propagate(&mut self, mut id: NodeId, stamp: u64) {
        while let Some(node) = self.node_mut(id) {
            node.last_changed = node.last_changed.max(stamp);
            match node.parent {
                Some(p) => id = p,
                None => break,
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node<P>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<P>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Tree<u32> {
        Tree::new(Cube::new(Vec3::ZERO, 16.0))
    }

    #[test]
    fn children_take_their_parent_octant() {
        let mut tree = world();
        let root = tree.root();
        let c = tree.insert_child(root, 5).unwrap();
        assert_eq!(tree.cube(c), Some(Cube::new(Vec3::new(8.0, 0.0, 8.0), 8.0)));
        assert_eq!(tree.parent(c), Some(root));
        assert_eq!(tree.child_at(root, 5), Some(c));
        assert_eq!(tree.child_at(root, 4), None);
        assert_eq!(tree.insert_child(root, 5), Some(c), "insert is idempotent");
        assert_eq!(tree.insert_child(root, 8), None);
        assert_eq!(tree.element_count(), 2);
    }

    #[test]
    fn mutations_stamp_ancestors() {
        let mut tree = world();
        let root = tree.root();
        let a = tree.insert_child(root, 0).unwrap();
        let b = tree.insert_child(a, 1).unwrap();
        let sibling = tree.insert_child(root, 1).unwrap();
        let before = tree.now();

        let _ = tree.set_content(b, Some(7));
        let stamp = tree.now();
        assert!(stamp > before);
        assert_eq!(tree.last_changed_content(b), Some(stamp));
        assert_eq!(tree.last_changed(b), Some(stamp));
        assert_eq!(tree.last_changed(a), Some(stamp));
        assert_eq!(tree.last_changed(root), Some(stamp));
        assert!(tree.last_changed_content(a).unwrap() < stamp);
        assert!(tree.last_changed(sibling).unwrap() <= before);
        assert!(tree.has_content(b));
        assert_eq!(tree.content(b), Some(&7));
    }

    #[test]
    fn update_and_flags_count_as_content_changes() {
        let mut tree = world();
        let a = tree.insert_child(tree.root(), 3).unwrap();
        assert!(!tree.update_content(a, |v| *v += 1), "nothing to edit yet");
        let _ = tree.set_content(a, Some(1));
        let t0 = tree.now();
        assert!(tree.update_content(a, |v| *v += 1));
        assert_eq!(tree.content(a), Some(&2));
        assert!(tree.last_changed_content(a).unwrap() > t0);

        let t1 = tree.now();
        tree.set_flags(a, ElementFlags::empty());
        assert!(!tree.has_content(a), "hidden content is not streamed");
        assert!(tree.last_changed_content(a).unwrap() > t1);

        let t2 = tree.now();
        tree.set_flags(a, ElementFlags::empty());
        assert_eq!(tree.now(), t2, "unchanged flags do not stamp");
    }

    #[test]
    fn removal_invalidates_handles_and_logs_deletions() {
        let mut tree = world();
        let root = tree.root();
        let a = tree.insert_child(root, 0).unwrap();
        let a1 = tree.insert_child(a, 2).unwrap();
        let keep = tree.insert_child(root, 7).unwrap();
        let t0 = tree.now();

        tree.remove(a);
        assert!(!tree.is_alive(a));
        assert!(!tree.is_alive(a1));
        assert!(tree.is_alive(keep));
        assert_eq!(tree.child_at(root, 0), None);
        assert_eq!(tree.cube(a1), None);
        assert_eq!(tree.last_changed(root), Some(tree.now()));

        let deleted: Vec<_> = tree.deleted_since(t0).map(|d| d.id).collect();
        assert_eq!(deleted.len(), 2);
        assert!(deleted.contains(&a) && deleted.contains(&a1));
        assert_eq!(tree.deleted_since(tree.now()).count(), 0);

        // Reused slots get a new generation; the old handle stays stale.
        let b = tree.insert_child(root, 0).unwrap();
        assert_ne!(b, a);
        assert!(!tree.is_alive(a));
        assert_eq!(tree.set_content(a, Some(1)), None);
        assert!(tree.content(b).is_none());

        tree.forget_deletions_through(tree.now());
        assert_eq!(tree.deleted_since(0).count(), 0);
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut tree = world();
        let root = tree.root();
        let t = tree.now();
        tree.remove(root);
        assert!(tree.is_alive(root));
        assert_eq!(tree.now(), t);
    }

    #[test]
    fn ensure_element_descends_by_point() {
        let mut tree = world();
        let leaf = tree.ensure_element(Vec3::new(13.0, 1.0, 1.0), 2).unwrap();
        assert_eq!(tree.cube(leaf), Some(Cube::new(Vec3::new(12.0, 0.0, 0.0), 4.0)));
        assert_eq!(tree.element_count(), 3);
        assert_eq!(tree.ensure_element(Vec3::new(13.5, 1.0, 1.0), 2), Some(leaf));
        assert_eq!(tree.ensure_element(Vec3::splat(-1.0), 2), None);
        assert_eq!(tree.ensure_element(Vec3::splat(1.0), 0), Some(tree.root()));
    }

    #[test]
    fn depth_first_is_preorder_by_octant() {
        let mut tree = world();
        let root = tree.root();
        let c = tree.insert_child(root, 6).unwrap();
        let a = tree.insert_child(root, 1).unwrap();
        let a2 = tree.insert_child(a, 4).unwrap();
        let a1 = tree.insert_child(a, 0).unwrap();
        assert_eq!(tree.depth_first(), [root, a, a1, a2, c]);
    }
}
