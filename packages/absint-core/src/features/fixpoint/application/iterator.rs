//! The forward fixpoint driver (spec.md §4.13): walks a weak topological
//! ordering of the CFG, re-computing each block's post-state from its
//! pre-state and propagating it to successors, widening at loop heads on
//! a configurable schedule and narrowing once the whole graph stabilizes.
//!
//! The per-statement transfer function and the choice of numerical
//! domain `D` are both supplied by the caller, this module only knows
//! about `D` through the [`AbstractDomain`] contract and never looks at
//! a `Statement` itself, matching this codebase's layering of "domain"
//! and "driver" into separate modules.

use rustc_hash::FxHashMap;

use crate::config::AnalysisConfig;
use crate::errors::{AnalyzerError, Result};
use crate::features::fixpoint::domain::wto::{Component, Wto};
use crate::shared::lattice::AbstractDomain;
use crate::shared::models::BlockId;
use crate::shared::ports::{CancellationFlag, ControlFlowGraph};

/// Per-block pre/post invariants produced by a completed (or cancelled)
/// run.
#[derive(Debug, Clone)]
pub struct FixpointResult<D> {
    pub pre: FxHashMap<BlockId, D>,
    pub post: FxHashMap<BlockId, D>,
    /// Set when the iterator returned early on a cancellation request;
    /// the invariants above are then a sound *under-approximation* of
    /// the blocks visited so far, not a full-program fixpoint.
    pub cancelled: bool,
}

/// A block's transfer function: given its pre-state, produce its
/// post-state. Implemented by composing a `StatementVisitor` over the
/// block's statements; this module is agnostic to how.
pub trait BlockTransfer<D> {
    fn apply(&mut self, block: BlockId, pre: &D) -> Result<D>;
}

impl<D, F> BlockTransfer<D> for F
where
    F: FnMut(BlockId, &D) -> Result<D>,
{
    fn apply(&mut self, block: BlockId, pre: &D) -> Result<D> {
        self(block, pre)
    }
}

pub struct FixpointIterator<'a, D: AbstractDomain> {
    cfg: &'a dyn ControlFlowGraph,
    config: &'a AnalysisConfig,
    cancel: &'a dyn CancellationFlag,
    pre: FxHashMap<BlockId, D>,
    post: FxHashMap<BlockId, D>,
}

impl<'a, D: AbstractDomain> FixpointIterator<'a, D> {
    pub fn new(cfg: &'a dyn ControlFlowGraph, config: &'a AnalysisConfig, cancel: &'a dyn CancellationFlag) -> Self {
        Self { cfg, config, cancel, pre: FxHashMap::default(), post: FxHashMap::default() }
    }

    /// Runs to a fixpoint (ascending + narrowing) starting from `entry_state`
    /// as the entry block's initial pre-state.
    pub fn run(mut self, entry_state: D, mut transfer: impl BlockTransfer<D>) -> Result<FixpointResult<D>> {
        let wto = match self.cfg.precomputed_wto() {
            Some(w) => w.clone(),
            None => Wto::build(self.cfg),
        };
        self.pre.insert(self.cfg.entry(), entry_state);

        if let Err(e) = self.process_components(wto.components(), &mut transfer) {
            return self.finish_cancelled(e);
        }
        if let Err(e) = self.narrow(wto.components(), &mut transfer) {
            return self.finish_cancelled(e);
        }

        Ok(FixpointResult { pre: self.pre, post: self.post, cancelled: false })
    }

    fn finish_cancelled(self, e: AnalyzerError) -> Result<FixpointResult<D>> {
        if matches!(e, AnalyzerError::Cancelled) {
            Ok(FixpointResult { pre: self.pre, post: self.post, cancelled: true })
        } else {
            Err(e)
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(AnalyzerError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn process_components(&mut self, components: &[Component], transfer: &mut impl BlockTransfer<D>) -> Result<()> {
        for c in components {
            match c {
                Component::Vertex(b) => self.process_vertex(*b, transfer)?,
                Component::Nested { head, body } => self.process_loop(*head, body, transfer)?,
            }
        }
        Ok(())
    }

    fn process_vertex(&mut self, block: BlockId, transfer: &mut impl BlockTransfer<D>) -> Result<()> {
        self.check_cancelled()?;
        let pre = self.pre.entry(block).or_insert_with(D::bottom).clone();
        let post = transfer.apply(block, &pre)?;
        self.propagate(block, &post);
        self.post.insert(block, post);
        Ok(())
    }

    fn propagate(&mut self, block: BlockId, post: &D) {
        for succ in self.cfg.successors(block) {
            self.pre.entry(succ).or_insert_with(D::bottom).join_with(post);
        }
    }

    /// Iterates a loop's body until the head's pre-state stabilizes,
    /// widening after `widening_delay` plain-join rounds.
    fn process_loop(&mut self, head: BlockId, body: &[Component], transfer: &mut impl BlockTransfer<D>) -> Result<()> {
        let mut iteration = 0u32;
        loop {
            self.check_cancelled()?;
            let before = self.pre.get(&head).cloned().unwrap_or_else(D::bottom);

            self.process_vertex(head, transfer)?;
            self.process_components(body, transfer)?;

            let new_pre = self.pre.get(&head).cloned().unwrap_or_else(D::bottom);
            let stabilized = new_pre.leq(&before);

            let widened = if stabilized {
                new_pre
            } else if iteration < self.config.widening_delay {
                before.join(&new_pre)
            } else if !self.config.widening_thresholds.is_empty() {
                before.widening_threshold(&new_pre, &self.config.widening_thresholds)
            } else {
                before.widening(&new_pre)
            };
            self.pre.insert(head, widened);
            iteration += 1;

            if stabilized {
                return Ok(());
            }
        }
    }

    /// Descending pass (spec.md §4.13 step 5): re-runs the same WTO walk
    /// with `narrowing` in place of `join`/`widening` at loop heads, up
    /// to `narrowing_iterations` times or until nothing changes.
    fn narrow(&mut self, components: &[Component], transfer: &mut impl BlockTransfer<D>) -> Result<()> {
        for _ in 0..self.config.narrowing_iterations {
            self.check_cancelled()?;
            let mut changed = false;
            self.narrow_components(components, transfer, &mut changed)?;
            if !changed {
                break;
            }
        }
        Ok(())
    }

    /// Re-runs [`process_vertex`]/[`process_components`] (plain joins
    /// everywhere, exactly like the ascending phase) so downstream blocks
    /// pick up freshly tightened values, but at a loop head `h` applies
    /// `pre_h ← pre_h.narrowing(new_pre_h)` in place of the join, only a
    /// loop head's pre-state ever loses precision to widening, so only a
    /// loop head's pre-state needs narrowing back.
    fn narrow_components(
        &mut self,
        components: &[Component],
        transfer: &mut impl BlockTransfer<D>,
        changed: &mut bool,
    ) -> Result<()> {
        for c in components {
            match c {
                Component::Vertex(b) => self.process_vertex(*b, transfer)?,
                Component::Nested { head, body } => {
                    self.check_cancelled()?;
                    let before = self.pre.get(head).cloned().unwrap_or_else(D::bottom);
                    self.process_vertex(*head, transfer)?;
                    self.narrow_components(body, transfer, changed)?;
                    let new_pre = self.pre.get(head).cloned().unwrap_or_else(D::bottom);
                    let narrowed = before.narrowing(&new_pre);
                    if !narrowed.equals(&before) {
                        *changed = true;
                    }
                    self.pre.insert(*head, narrowed);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::interval::domain::interval::Interval;
    use crate::shared::ir::Statement;
    use crate::shared::models::{Bound, ZNumber};
    use crate::shared::ports::NeverCancel;

    struct FakeCfg {
        edges: FxHashMap<BlockId, Vec<BlockId>>,
        entry: BlockId,
    }

    impl ControlFlowGraph for FakeCfg {
        fn entry(&self) -> BlockId {
            self.entry
        }
        fn exit_blocks(&self) -> Vec<BlockId> {
            Vec::new()
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

    fn cfg(edges: &[(BlockId, BlockId)], entry: BlockId) -> FakeCfg {
        let mut map: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        for &(a, b) in edges {
            map.entry(a).or_default().push(b);
        }
        FakeCfg { edges: map, entry }
    }

    #[test]
    fn straight_line_cfg_propagates_post_to_pre() {
        let g = cfg(&[(0, 1), (1, 2)], 0);
        let config = AnalysisConfig::default();
        let never = NeverCancel;
        let iter = FixpointIterator::<Interval<ZNumber>>::new(&g, &config, &never);
        let result = iter
            .run(Interval::singleton(ZNumber::from_i64(0)), |_b, pre: &Interval<ZNumber>| {
                Ok(pre.add(&Interval::singleton(ZNumber::from_i64(1))))
            })
            .unwrap();
        assert!(!result.cancelled);
        assert_eq!(result.post[&0], Interval::singleton(ZNumber::from_i64(1)));
        assert_eq!(result.post[&2], Interval::singleton(ZNumber::from_i64(3)));
    }

    #[test]
    fn a_loop_widens_to_a_stable_invariant() {
        // 0 -> 1 -> 1 (self loop, x += 1 each time) -> 2
        let g = cfg(&[(0, 1), (1, 1), (1, 2)], 0);
        let config = AnalysisConfig { widening_delay: 1, ..AnalysisConfig::default() };
        let never = NeverCancel;
        let iter = FixpointIterator::<Interval<ZNumber>>::new(&g, &config, &never);
        let result = iter
            .run(Interval::singleton(ZNumber::from_i64(0)), |_b, pre: &Interval<ZNumber>| {
                Ok(pre.add(&Interval::singleton(ZNumber::from_i64(1))))
            })
            .unwrap();
        assert!(!result.cancelled);
        // widening to the loop head must have produced an unbounded upper bound.
        assert_eq!(*result.pre[&1].ub(), Bound::PlusInfinity);
    }

    #[test]
    fn cancellation_returns_partial_results_instead_of_erroring() {
        use std::sync::atomic::AtomicBool;
        let g = cfg(&[(0, 1)], 0);
        let config = AnalysisConfig::default();
        let flag = AtomicBool::new(true);
        let iter = FixpointIterator::<Interval<ZNumber>>::new(&g, &config, &flag);
        let result = iter.run(Interval::top(), |_b, pre: &Interval<ZNumber>| Ok(pre.clone())).unwrap();
        assert!(result.cancelled);
    }
}
