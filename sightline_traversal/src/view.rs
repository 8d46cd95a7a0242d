// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Immutable snapshots of what a viewer can see, as of when.

use sightline_volume::ViewVolume;

use crate::types::Timestamp;

/// A viewer's visibility volume, level-of-detail scale, and the logical time a
/// pass over it starts.
///
/// Views are values: to change what a viewer sees, build a new `View`.
#[derive(Clone, Debug, PartialEq)]
pub struct View<V> {
    volume: V,
    lod_scale_factor: f32,
    start_time: Timestamp,
}

impl<V: ViewVolume> View<V> {
    /// A view of `volume` whose pass starts at `start_time`, with a level-of-detail scale of `1.0`.
    ///
    /// `start_time` should be the scene's current stamp: every change made after
    /// it must be stamped strictly later.
    pub fn new(volume: V, start_time: Timestamp) -> Self {
        Self {
            volume,
            lod_scale_factor: 1.0,
            start_time,
        }
    }

    /// Same view with a different level-of-detail scale.
    pub fn with_lod_scale_factor(mut self, lod_scale_factor: f32) -> Self {
        self.lod_scale_factor = lod_scale_factor;
        self
    }

    /// The visibility volume.
    pub fn volume(&self) -> &V {
        &self.volume
    }

    /// Level-of-detail scale supplied by the server.
    ///
    /// Only [`is_very_similar`](Self::is_very_similar) reads it. Visibility
    /// tests ignore it; scan sinks receive it as [`PassInfo::lod_scale_factor`].
    ///
    /// [`PassInfo::lod_scale_factor`]: crate::PassInfo::lod_scale_factor
    pub fn lod_scale_factor(&self) -> f32 {
        self.lod_scale_factor
    }

    /// Logical time at which a pass over this view starts.
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Whether a pass over `other` can be a repeat of a pass over `self`.
    ///
    /// Volumes must be very similar and the level-of-detail scale unchanged.
    pub fn is_very_similar(&self, other: &Self) -> bool {
        self.lod_scale_factor == other.lod_scale_factor
            && self.volume.is_very_similar(&other.volume)
    }
}
