// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A viewer sliding through a changing scene under a per-frame budget.
//!
//! Each frame the scene is edited (and occasionally loses an element), then the
//! viewer's traversal runs for a fixed slice of time. Unfinished passes carry
//! over; finished ones are followed by a fresh pass over the latest view.
//!
//! Run:
//! - `cargo run -p sightline_demos --example viewer_stream`

use std::sync::{Arc, Mutex};
use std::time::Duration;

use glam::Vec3;
use sightline_scene::{NodeId, Tree};
use sightline_traversal::adapters::scene::{deletions_since_completed, view_now};
use sightline_traversal::{DiffTraversal, TraversalType};
use sightline_volume::{BoxVolume, Cube};

const WORLD: f32 = 256.0;
const DEPTH: usize = 4;
const FRAME_BUDGET: Duration = Duration::from_micros(150);

fn main() {
    let mut scene: Tree<String> = Tree::new(Cube::new(Vec3::ZERO, WORLD));
    let mut entities = Vec::new();
    for i in 0..400_u32 {
        // Deterministic scatter over the world.
        let f = i as f32;
        let p = Vec3::new(
            (f * 37.0) % WORLD,
            (f * 101.0) % WORLD,
            (f * 13.0) % WORLD,
        );
        if let Some(id) = scene.ensure_element(p, DEPTH) {
            let _ = scene.set_content(id, Some(format!("entity-{i}")));
            entities.push(id);
        }
    }

    // The packet queue the server would encode from.
    let queue: Arc<Mutex<Vec<NodeId>>> = Arc::default();
    let mut viewer = DiffTraversal::new();
    let sink = Arc::clone(&queue);
    viewer.set_scan_callback(move |element, _pass| {
        if let Ok(mut q) = sink.lock() {
            q.push(element.id);
        }
    });

    let mut kind = TraversalType::First;
    for frame in 0..24_usize {
        // World activity.
        let edited = entities[(frame * 7) % entities.len()];
        scene.update_content(edited, |name| name.push('\''));
        if frame % 6 == 5 {
            let doomed = entities.remove((frame * 11) % entities.len());
            scene.remove(doomed);
        }

        // The viewer drifts along x, jumping every eighth frame.
        let x = if frame % 8 == 7 {
            WORLD * 0.6
        } else {
            (frame % 8) as f32 * 0.0001
        };
        let region = BoxVolume::new(
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(x + WORLD * 0.4, WORLD, WORLD),
        );

        if viewer.finished() {
            let gone = deletions_since_completed(&scene, &viewer).count();
            kind = viewer.prepare_new_traversal(&scene, view_now(&scene, region), scene.root());
            println!("frame {frame:2}: new {kind:?} pass, {gone} deletion(s) to announce");
        }
        let done = viewer.traverse(&scene, FRAME_BUDGET);

        let sent = queue.lock().map(|mut q| q.drain(..).count()).unwrap_or(0);
        println!(
            "frame {frame:2}: {kind:?} sent {sent:3} element(s), {}",
            if done { "pass complete" } else { "suspended" }
        );
    }
    println!("{:?}", viewer.stats());
}
