//! Benchmarks the forward fixpoint driver on a chain of self-looping
//! blocks, the shape that exercises widening/narrowing most heavily.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rustc_hash::FxHashMap;

use absint_core::config::AnalysisConfig;
use absint_core::features::fixpoint::application::iterator::FixpointIterator;
use absint_core::features::interval::domain::interval::Interval;
use absint_core::shared::ir::Statement;
use absint_core::shared::models::{BlockId, ZNumber};
use absint_core::shared::ports::{CancellationFlag, ControlFlowGraph, NeverCancel};

struct ChainCfg {
    edges: FxHashMap<BlockId, Vec<BlockId>>,
}

impl ControlFlowGraph for ChainCfg {
    fn entry(&self) -> BlockId {
        0
    }
    fn exit_blocks(&self) -> Vec<BlockId> {
        vec![*self.edges.keys().max().unwrap_or(&0)]
    }
    fn blocks(&self) -> Vec<BlockId> {
        self.edges.keys().copied().collect()
    }
    fn successors(&self, block: BlockId) -> Vec<BlockId> {
        self.edges.get(&block).cloned().unwrap_or_default()
    }
    fn predecessors(&self, _block: BlockId) -> Vec<BlockId> {
        Vec::new()
    }
    fn statements(&self, _block: BlockId) -> &[Statement] {
        &[]
    }
}

/// `blocks` self-looping blocks in a row: `0 -> 1 -> 1 -> 2 -> 2 -> 3 -> ...`.
fn chain_with_loops(blocks: u32) -> ChainCfg {
    let mut edges: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
    for b in 0..blocks {
        edges.entry(b).or_default().push(b);
        if b + 1 < blocks {
            edges.entry(b).or_default().push(b + 1);
        }
    }
    ChainCfg { edges }
}

fn bench_fixpoint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixpoint_run");
    for &blocks in &[4u32, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &blocks, |b, &blocks| {
            let cfg = chain_with_loops(blocks);
            let config = AnalysisConfig::default();
            let never = NeverCancel;
            b.iter(|| {
                let iter = FixpointIterator::<Interval<ZNumber>>::new(&cfg, &config, &never);
                let result = iter
                    .run(Interval::singleton(ZNumber::from_i64(0)), |_block, pre: &Interval<ZNumber>| Ok(pre.add(&Interval::singleton(ZNumber::from_i64(1)))))
                    .unwrap();
                black_box(result)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fixpoint);
criterion_main!(benches);
