// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-viewer diff traversal engine.
//!
//! ## Overview
//!
//! A [`DiffTraversal`] owns the explicit stack of [`Waypoint`]s from the root to
//! its current frontier, plus the view of the pass in progress and the view of
//! the last completed pass. Each frame the server:
//!
//! 1. calls [`DiffTraversal::prepare_new_traversal`] with the viewer's current
//!    [`View`] (or skips it while [`DiffTraversal::finished`] is `false` to
//!    resume a suspended pass),
//! 2. calls one of the `traverse` methods with a [`Budget`].
//!
//! ## Strategy selection
//!
//! - No completed pass yet: [`TraversalType::First`].
//! - New view very similar to the completed one: [`TraversalType::Repeat`].
//! - Otherwise: [`TraversalType::Differential`].
//!
//! The strategy is fixed for the whole pass, including across suspensions.
//!
//! ## Completion
//!
//! When the path empties the pass is complete: the current view becomes the
//! completed view and its start time becomes
//! [`DiffTraversal::start_of_completed_traversal`]. A suspended pass never
//! touches either.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use sightline_volume::ViewVolume;

use crate::budget::Budget;
use crate::types::{PassInfo, SceneTree, Timestamp, TraversalType, VisibleElement};
use crate::view::View;
use crate::waypoint::Waypoint;

/// Sink invoked once per emitted element that has content.
pub type ScanCallback<Id> = Box<dyn FnMut(&VisibleElement<Id>, &PassInfo) + Send>;

/// Counters accumulated across passes until [`DiffTraversal::reset_stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Passes prepared.
    pub passes_started: u64,
    /// Passes that ran until the path emptied.
    pub passes_completed: u64,
    /// Child slots considered, whether emitted, skipped, or empty.
    pub children_examined: u64,
    /// Elements produced by the stack machine.
    pub elements_emitted: u64,
    /// Emitted elements with content, handed to the scan sink.
    pub elements_scanned: u64,
    /// `traverse` calls that returned with the pass still pending.
    pub suspensions: u64,
}

/// Resumable, budgeted, view-dependent traversal for one viewer.
///
/// See the [module docs](self) for the life cycle.
pub struct DiffTraversal<Id, V> {
    path: Vec<Waypoint<Id>>,
    current_view: Option<View<V>>,
    completed_view: Option<View<V>>,
    start_of_completed: Timestamp,
    kind: TraversalType,
    scan: Option<ScanCallback<Id>>,
    stats: TraversalStats,
}

impl<Id: Debug, V: Debug> Debug for DiffTraversal<Id, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DiffTraversal")
            .field("kind", &self.kind)
            .field("path_len", &self.path.len())
            .field("current_view", &self.current_view)
            .field("completed_view", &self.completed_view)
            .field("start_of_completed", &self.start_of_completed)
            .field("has_scan_callback", &self.scan.is_some())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<Id, V> Default for DiffTraversal<Id, V> {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            current_view: None,
            completed_view: None,
            start_of_completed: Timestamp::NEVER,
            kind: TraversalType::First,
            scan: None,
            stats: TraversalStats::default(),
        }
    }
}

impl<Id: Copy + Eq + Debug, V: ViewVolume> DiffTraversal<Id, V> {
    /// A traversal that has never run; its first pass will be [`TraversalType::First`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a pass over `view` from `root`, discarding any suspended pass.
    ///
    /// `root` must resolve in `tree`; this is checked in debug builds. In release
    /// builds an unresolvable root yields an empty pass that completes on the
    /// first pull.
    pub fn prepare_new_traversal<T>(&mut self, tree: &T, view: View<V>, root: Id) -> TraversalType
    where
        T: SceneTree<Id = Id>,
    {
        debug_assert!(
            tree.element(root).is_some(),
            "traversal root {root:?} does not resolve in the scene tree"
        );
        self.kind = match &self.completed_view {
            None => TraversalType::First,
            Some(done) if view.is_very_similar(done) => TraversalType::Repeat,
            Some(_) => TraversalType::Differential,
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(
            kind = ?self.kind,
            start = view.start_time().0,
            abandoned = !self.path.is_empty(),
            "preparing traversal pass"
        );
        self.path.clear();
        self.path.push(Waypoint::root(root));
        self.current_view = Some(view);
        self.stats.passes_started += 1;
        self.kind
    }

    /// Pull the next element of the running pass.
    ///
    /// Returns `None` once the pass is complete (or when none is running).
    pub fn get_next_visible_element<T>(&mut self, tree: &T) -> Option<VisibleElement<Id>>
    where
        T: SceneTree<Id = Id>,
    {
        if self.path.is_empty() {
            return None;
        }
        let view = self.current_view.as_ref()?;
        let since = self.start_of_completed;
        let found = loop {
            let Some(top) = self.path.last_mut() else {
                break None;
            };
            let before = top.next_index().max(0);
            let next = match (self.kind, self.completed_view.as_ref()) {
                (TraversalType::Repeat, Some(_)) => top.next_visible_repeat(tree, view, since),
                (TraversalType::Differential, Some(done)) => {
                    top.next_visible_differential(tree, view, done, since)
                }
                _ => top.next_visible_first_time(tree, view),
            };
            let after = top.next_index().max(0);
            self.stats.children_examined += u64::try_from(after - before).unwrap_or_default();
            match next {
                Some(element) => {
                    // A root that just emitted itself is already on the path.
                    if top.next_index() > 0 {
                        self.path.push(Waypoint::new(element.id));
                    }
                    self.stats.elements_emitted += 1;
                    break Some(element);
                }
                None => {
                    self.path.pop();
                }
            }
        };
        if self.path.is_empty() {
            self.complete_pass();
        }
        found
    }

    /// Run the pending pass with a borrowed sink until it completes or `budget` runs out.
    ///
    /// Returns whether the pass is complete. The budget is checked after every
    /// emitted element, so each call with a pass pending makes progress.
    pub fn traverse_with<T, B, F>(&mut self, tree: &T, budget: &mut B, mut scan: F) -> bool
    where
        T: SceneTree<Id = Id>,
        B: Budget,
        F: FnMut(&VisibleElement<Id>, &PassInfo),
    {
        if self.path.is_empty() {
            return true;
        }
        budget.start();
        let pass = self.pass_info();
        while let Some(element) = self.get_next_visible_element(tree) {
            if element.info.has_content {
                scan(&element, &pass);
                self.stats.elements_scanned += 1;
            }
            if budget.exhausted() {
                break;
            }
        }
        if self.path.is_empty() {
            return true;
        }
        self.stats.suspensions += 1;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            kind = ?self.kind,
            depth = self.path.len(),
            "traversal pass suspended"
        );
        false
    }

    /// Run the pending pass, feeding the stored scan callback, until it completes or `budget` runs out.
    ///
    /// Without a stored callback the pass still advances; elements are simply dropped.
    pub fn traverse_within<T, B>(&mut self, tree: &T, budget: &mut B) -> bool
    where
        T: SceneTree<Id = Id>,
        B: Budget,
    {
        let mut scan = self.scan.take();
        let done = self.traverse_with(tree, budget, |element, pass| {
            if let Some(scan) = scan.as_mut() {
                scan(element, pass);
            }
        });
        self.scan = scan;
        done
    }

    /// Run the pending pass for at most about `budget` of wall-clock time.
    #[cfg(feature = "std")]
    pub fn traverse<T>(&mut self, tree: &T, budget: core::time::Duration) -> bool
    where
        T: SceneTree<Id = Id>,
    {
        self.traverse_within(tree, &mut crate::budget::TimeBudget::new(budget))
    }

    /// Install the sink used by [`traverse`](Self::traverse) and
    /// [`traverse_within`](Self::traverse_within).
    pub fn set_scan_callback<F>(&mut self, scan: F)
    where
        F: FnMut(&VisibleElement<Id>, &PassInfo) + Send + 'static,
    {
        self.scan = Some(Box::new(scan));
    }

    /// Remove the stored sink, returning it.
    pub fn take_scan_callback(&mut self) -> Option<ScanCallback<Id>> {
        self.scan.take()
    }

    /// Forget all history: the next pass is [`TraversalType::First`], and any pending pass is dropped.
    pub fn reset(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(abandoned = !self.path.is_empty(), "traversal reset");
        self.path.clear();
        self.current_view = None;
        self.completed_view = None;
        self.start_of_completed = Timestamp::NEVER;
        self.kind = TraversalType::First;
    }

    /// `true` when no pass is pending.
    pub fn finished(&self) -> bool {
        self.path.is_empty()
    }

    /// View of the pass in progress (or of the last prepared pass).
    pub fn current_view(&self) -> Option<&View<V>> {
        self.current_view.as_ref()
    }

    /// View of the last completed pass.
    pub fn completed_view(&self) -> Option<&View<V>> {
        self.completed_view.as_ref()
    }

    /// Start time of the last completed pass, or [`Timestamp::NEVER`].
    ///
    /// Everything stamped at or before this has been covered for
    /// [`completed_view`](Self::completed_view). Servers use it, for example, to
    /// ask the scene for deletions since.
    pub fn start_of_completed_traversal(&self) -> Timestamp {
        self.start_of_completed
    }

    /// Strategy of the current (or last) pass.
    pub fn traversal_type(&self) -> TraversalType {
        self.kind
    }

    /// Frames from the root to the current frontier.
    pub fn path(&self) -> &[Waypoint<Id>] {
        &self.path
    }

    /// Depth of the pending pass; `0` when finished.
    pub fn path_len(&self) -> usize {
        self.path.len()
    }

    /// Context of the current pass as handed to scan sinks.
    pub fn pass_info(&self) -> PassInfo {
        PassInfo {
            kind: self.kind,
            start: self
                .current_view
                .as_ref()
                .map_or(Timestamp::NEVER, View::start_time),
            since: self.completed_view.as_ref().map(|_| self.start_of_completed),
            lod_scale_factor: self
                .current_view
                .as_ref()
                .map_or(1.0, View::lod_scale_factor),
        }
    }

    /// Accumulated counters.
    pub fn stats(&self) -> TraversalStats {
        self.stats
    }

    /// Zero the counters.
    pub fn reset_stats(&mut self) {
        self.stats = TraversalStats::default();
    }

    fn complete_pass(&mut self) {
        if let Some(view) = &self.current_view {
            self.start_of_completed = view.start_time();
            self.completed_view = Some(view.clone());
        }
        self.stats.passes_completed += 1;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            kind = ?self.kind,
            completed_at = self.start_of_completed.0,
            "traversal pass complete"
        );
    }
}
