//! Weak topological ordering (spec.md §4.13 step 1): a hierarchical
//! ordering of a CFG's blocks in which every non-back edge runs left to
//! right and every strongly-connected subgraph is represented as one
//! nested component with an explicit head (the loop's widening point).
//!
//! # References
//! - Bourdoncle, F. "Efficient chaotic iteration strategies with
//!   widenings." FMPA 1993.

use crate::shared::models::BlockId;
use crate::shared::ports::ControlFlowGraph;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Vertex(BlockId),
    Nested { head: BlockId, body: Vec<Component> },
}

impl Component {
    pub fn head(&self) -> BlockId {
        match self {
            Component::Vertex(b) => *b,
            Component::Nested { head, .. } => *head,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wto {
    components: Vec<Component>,
}

impl Wto {
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn build(cfg: &dyn ControlFlowGraph) -> Self {
        let mut builder = WtoBuilder::new(cfg);
        let components = builder.partition_from(cfg.entry());
        Wto { components }
    }

    /// A block is a loop head (spec.md §4.13 step 4's `h`) iff it heads a
    /// `Nested` component somewhere in the ordering.
    pub fn is_head(&self, block: BlockId) -> bool {
        fn scan(components: &[Component], block: BlockId) -> bool {
            components.iter().any(|c| match c {
                Component::Vertex(_) => false,
                Component::Nested { head, body } => *head == block || scan(body, block),
            })
        }
        scan(&self.components, block)
    }

    /// A flat visiting order, loop heads listed once ahead of their body
    /// (sufficient for callers that only need "some sound order", not
    /// the nesting itself).
    pub fn flatten(&self) -> Vec<BlockId> {
        fn go(components: &[Component], out: &mut Vec<BlockId>) {
            for c in components {
                match c {
                    Component::Vertex(b) => out.push(*b),
                    Component::Nested { head, body } => {
                        out.push(*head);
                        go(body, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        go(&self.components, &mut out);
        out
    }
}

const UNVISITED: u32 = 0;

struct WtoBuilder<'a> {
    cfg: &'a dyn ControlFlowGraph,
    dfn: FxHashMap<BlockId, u32>,
    next_num: u32,
    stack: Vec<BlockId>,
}

impl<'a> WtoBuilder<'a> {
    fn new(cfg: &'a dyn ControlFlowGraph) -> Self {
        Self { cfg, dfn: FxHashMap::default(), next_num: 0, stack: Vec::new() }
    }

    fn partition_from(&mut self, entry: BlockId) -> Vec<Component> {
        let mut partition = Vec::new();
        self.visit(entry, &mut partition);
        // `visit` appends each component when it finishes, i.e. in reverse
        // topological order (a node's successors all finish, and so are
        // appended, before the node itself), same as any DFS-postorder
        // topological sort, this needs one reversal to read left to right.
        partition.reverse();
        partition
    }

    /// Bourdoncle's `visit`: a Tarjan-style DFS that returns the lowest
    /// `dfn` reachable from `v` without crossing a completed vertex, and
    /// emits `v` (or the nested component it heads) into `partition` once
    /// its own low-link comes back around to itself.
    fn visit(&mut self, v: BlockId, partition: &mut Vec<Component>) -> u32 {
        self.stack.push(v);
        self.next_num += 1;
        self.dfn.insert(v, self.next_num);
        let mut head = self.next_num;
        let mut is_loop = false;
        for w in self.cfg.successors(v) {
            let w_dfn = *self.dfn.get(&w).unwrap_or(&UNVISITED);
            let min = if w_dfn == UNVISITED { self.visit(w, partition) } else { w_dfn };
            if min <= head {
                head = min;
                is_loop = true;
            }
        }
        if head == self.dfn[&v] {
            self.dfn.insert(v, u32::MAX);
            let mut popped = self.stack.pop();
            if is_loop {
                while popped != Some(v) {
                    let elem = popped.expect("v is still on the stack until its own pop");
                    self.dfn.insert(elem, UNVISITED);
                    popped = self.stack.pop();
                }
                let body = self.component(v);
                partition.push(Component::Nested { head: v, body });
            } else {
                partition.push(Component::Vertex(v));
            }
        }
        head
    }

    /// Builds the nested component headed by `v`: every successor of `v`
    /// reset to unvisited by the loop-unwind above gets its own `visit`,
    /// collected in DFS order as `v`'s body.
    fn component(&mut self, v: BlockId) -> Vec<Component> {
        let mut body = Vec::new();
        for w in self.cfg.successors(v) {
            if *self.dfn.get(&w).unwrap_or(&UNVISITED) == UNVISITED {
                self.visit(w, &mut body);
            }
        }
        body.reverse();
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ir::Statement;

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
    fn a_straight_line_cfg_has_no_loop_heads() {
        let g = cfg(&[(0, 1), (1, 2)], 0);
        let wto = Wto::build(&g);
        assert_eq!(wto.flatten(), vec![0, 1, 2]);
        assert!(!wto.is_head(0));
        assert!(!wto.is_head(1));
    }

    #[test]
    fn a_simple_loop_nests_its_body_under_the_head() {
        // 0 -> 1 -> 2 -> 1 (back edge), 2 -> 3 (exit)
        let g = cfg(&[(0, 1), (1, 2), (2, 1), (2, 3)], 0);
        let wto = Wto::build(&g);
        assert!(wto.is_head(1));
        assert!(!wto.is_head(2));
        let flat = wto.flatten();
        assert_eq!(flat, vec![0, 1, 2, 3]);
    }

    #[test]
    fn a_self_loop_is_its_own_head() {
        let g = cfg(&[(0, 1), (1, 1), (1, 2)], 0);
        let wto = Wto::build(&g);
        assert!(wto.is_head(1));
    }
}
