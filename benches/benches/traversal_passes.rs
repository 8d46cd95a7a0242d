// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Quat, Vec3};
use sightline_scene::{NodeId, Tree};
use sightline_traversal::adapters::scene::view_now;
use sightline_traversal::{DiffTraversal, ElementBudget, Unbounded};
use sightline_volume::{BoxVolume, Cube, Keyhole, Projection, ViewVolume};

const WORLD: f32 = 1024.0;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self) -> f32 {
        let v = self.next_u64() >> 40;
        (v as f32) / ((1_u64 << 24) as f32)
    }
    fn point(&mut self) -> Vec3 {
        Vec3::new(self.next_f32(), self.next_f32(), self.next_f32()) * WORLD
    }
}

/// `count` entities scattered `depth` levels down a `WORLD`-sized octree.
fn gen_scene(count: usize, depth: usize, seed: u64) -> (Tree<u32>, Vec<NodeId>) {
    let mut tree = Tree::new(Cube::new(Vec3::ZERO, WORLD));
    let mut rng = Rng::new(seed);
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let Some(id) = tree.ensure_element(rng.point(), depth) else {
            continue;
        };
        let _ = tree.set_content(id, Some(i as u32));
        ids.push(id);
    }
    (tree, ids)
}

fn left_half() -> BoxVolume {
    BoxVolume::new(Vec3::ZERO, Vec3::new(WORLD * 0.5, WORLD, WORLD))
}

fn middle_slab() -> BoxVolume {
    BoxVolume::new(
        Vec3::new(WORLD * 0.25, 0.0, 0.0),
        Vec3::new(WORLD * 0.75, WORLD, WORLD),
    )
}

fn camera() -> Keyhole {
    Keyhole::new(
        Vec3::new(WORLD * 0.5, WORLD * 0.5, WORLD),
        Quat::IDENTITY,
        Projection::default(),
        64.0,
    )
}

fn completed<V: ViewVolume>(tree: &Tree<u32>, volume: V) -> DiffTraversal<NodeId, V> {
    let mut t = DiffTraversal::new();
    t.prepare_new_traversal(tree, view_now(tree, volume), tree.root());
    t.traverse_within(tree, &mut Unbounded);
    t
}

fn scanned<V: ViewVolume>(t: &mut DiffTraversal<NodeId, V>, tree: &Tree<u32>) -> usize {
    let mut n = 0;
    t.traverse_with(tree, &mut Unbounded, |e, _| {
        black_box(e);
        n += 1;
    });
    n
}

fn bench_first(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_pass");
    for &count in &[1_000_usize, 10_000] {
        let (tree, _) = gen_scene(count, 5, 0x5eed);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("box_n{count}"), |b| {
            b.iter_batched(
                DiffTraversal::new,
                |mut t| {
                    t.prepare_new_traversal(&tree, view_now(&tree, left_half()), tree.root());
                    black_box(scanned(&mut t, &tree))
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_function(format!("keyhole_n{count}"), |b| {
            b.iter_batched(
                DiffTraversal::new,
                |mut t| {
                    t.prepare_new_traversal(&tree, view_now(&tree, camera()), tree.root());
                    black_box(scanned(&mut t, &tree))
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_repeat(c: &mut Criterion) {
    let mut group = c.benchmark_group("repeat_pass");
    for &count in &[1_000_usize, 10_000] {
        let (tree, ids) = gen_scene(count, 5, 0x5eed);
        group.throughput(Throughput::Elements(count as u64));

        let mut idle = completed(&tree, left_half());
        group.bench_function(format!("idle_n{count}"), |b| {
            b.iter(|| {
                idle.prepare_new_traversal(&tree, view_now(&tree, left_half()), tree.root());
                black_box(scanned(&mut idle, &tree))
            });
        });

        group.bench_function(format!("one_percent_edited_n{count}"), |b| {
            b.iter_batched(
                || {
                    let t = completed(&tree, left_half());
                    let mut edited = tree.clone();
                    let mut rng = Rng::new(7);
                    for _ in 0..count / 100 {
                        let id = ids[rng.next_u64() as usize % ids.len()];
                        edited.update_content(id, |c| *c += 1);
                    }
                    (t, edited)
                },
                |(mut t, edited)| {
                    t.prepare_new_traversal(&edited, view_now(&edited, left_half()), edited.root());
                    black_box(scanned(&mut t, &edited))
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_differential(c: &mut Criterion) {
    let mut group = c.benchmark_group("differential_pass");
    for &count in &[1_000_usize, 10_000] {
        let (tree, _) = gen_scene(count, 5, 0x5eed);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("slide_n{count}"), |b| {
            b.iter_batched(
                || completed(&tree, left_half()),
                |mut t| {
                    t.prepare_new_traversal(&tree, view_now(&tree, middle_slab()), tree.root());
                    black_box(scanned(&mut t, &tree))
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_budgeted(c: &mut Criterion) {
    let mut group = c.benchmark_group("budgeted_first_pass");
    let (tree, _) = gen_scene(10_000, 5, 0x5eed);
    for &limit in &[16_usize, 256] {
        group.bench_function(format!("elements_per_call_{limit}"), |b| {
            b.iter_batched(
                DiffTraversal::new,
                |mut t| {
                    t.prepare_new_traversal(&tree, view_now(&tree, left_half()), tree.root());
                    let mut calls = 0_usize;
                    while !t.traverse_within(&tree, &mut ElementBudget::new(limit)) {
                        calls += 1;
                    }
                    black_box(calls)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_first,
    bench_repeat,
    bench_differential,
    bench_budgeted
);
criterion_main!(benches);
