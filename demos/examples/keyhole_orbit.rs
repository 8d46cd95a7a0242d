// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A camera turning on the spot, and which strategy each pass uses.
//!
//! Small turns stay within the keyhole's similarity thresholds and run as
//! repeat passes; large turns run as differential passes that also cover what
//! just came into view.
//!
//! Run:
//! - `cargo run -p sightline_demos --example keyhole_orbit`

use glam::{Quat, Vec3};
use sightline_scene::Tree;
use sightline_traversal::adapters::scene::view_now;
use sightline_traversal::{DiffTraversal, Unbounded};
use sightline_volume::{Cube, Keyhole, Projection};

fn main() {
    let mut scene: Tree<u32> = Tree::new(Cube::new(Vec3::splat(-128.0), 256.0));
    let mut n = 0;
    for x in (-120..120).step_by(24) {
        for z in (-120..120).step_by(24) {
            let p = Vec3::new(x as f32, 0.0, z as f32);
            if let Some(id) = scene.ensure_element(p, 4) {
                n += 1;
                let _ = scene.set_content(id, Some(n));
            }
        }
    }

    let projection = Projection {
        far: 200.0,
        ..Projection::default()
    };
    let mut viewer = DiffTraversal::new();
    let mut heading = 0.0_f32;
    for step in [0.0, 0.5, 0.5, 45.0, 0.5, 90.0, 0.0] {
        heading += step;
        let camera = Keyhole::new(
            Vec3::new(0.0, 4.0, 0.0),
            Quat::from_rotation_y(heading.to_radians()),
            projection,
            16.0,
        );
        let kind = viewer.prepare_new_traversal(&scene, view_now(&scene, camera), scene.root());
        let mut sent = 0;
        viewer.traverse_with(&scene, &mut Unbounded, |_, _| sent += 1);
        println!("heading {heading:6.1}: {kind:?} pass sent {sent} element(s)");
    }
}
