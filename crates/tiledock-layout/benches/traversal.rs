//! Benchmarks for the traversal layer.
//!
//! Run with: cargo bench -p tiledock-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tiledock_layout::config::{ConfigNode, NodeKind};
use tiledock_layout::tree::ConfigTree;
use tiledock_layout::{ReverseCursor, filter_tree, state_fingerprint};

/// Build a tree of `depth` alternating row/stack levels with `width`
/// children per container.
fn make_tree(depth: usize, width: usize) -> Vec<ConfigNode> {
    fn level(depth: usize, width: usize, index: usize) -> ConfigNode {
        if depth == 0 {
            return ConfigNode::panel(format!("panel-{index}"));
        }
        let children = (0..width)
            .map(|child| level(depth - 1, width, index * width + child))
            .collect();
        if depth % 2 == 0 {
            ConfigNode::row(children)
        } else {
            ConfigNode::stack(children)
        }
    }
    vec![level(depth, width, 0)]
}

fn bench_cursor_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal/drain");
    for (depth, width) in [(4, 4), (6, 3), (10, 2)] {
        let content = make_tree(depth, width);
        group.bench_with_input(
            BenchmarkId::new("reverse_dfs", format!("{depth}x{width}")),
            &content,
            |b, content| {
                b.iter_batched(
                    || ConfigTree::new(content.clone()),
                    |mut tree| {
                        let mut cursor = ReverseCursor::new(&mut tree);
                        let mut count = 0usize;
                        while cursor.advance().is_some() {
                            count += 1;
                        }
                        black_box(count)
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal/filter");
    for (depth, width) in [(4, 4), (6, 3)] {
        let content = make_tree(depth, width);
        group.bench_with_input(
            BenchmarkId::new("drop_half", format!("{depth}x{width}")),
            &content,
            |b, content| {
                b.iter_batched(
                    || ConfigTree::new(content.clone()),
                    |mut tree| {
                        let removed = filter_tree(&mut tree, |node| match &node.kind {
                            NodeKind::Panel { component, .. } => !component.ends_with(['0', '2']),
                            _ => node.children().is_some_and(|children| !children.is_empty()),
                        })
                        .expect("config trees support removal");
                        black_box(removed)
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal/fingerprint");
    for (depth, width) in [(4, 4), (6, 3)] {
        let content = make_tree(depth, width);
        group.bench_with_input(
            BenchmarkId::new("state", format!("{depth}x{width}")),
            &content,
            |b, content| b.iter(|| black_box(state_fingerprint(content))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_cursor_drain, bench_filter, bench_fingerprint);
criterion_main!(benches);
