use std::collections::BTreeSet;

use cranelift_entity::{packed_option::PackedOption, SecondaryMap};

use crate::{BlockId, FuncRef, Module};

/// Untagged predecessor/successor view of a function's CFG.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ControlFlowGraph {
    entry: PackedOption<BlockId>,
    blocks: SecondaryMap<BlockId, BlockNode>,
    pub exits: smallvec::SmallVec<[BlockId; 8]>,
}

impl ControlFlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compute(&mut self, module: &Module, func_ref: FuncRef) {
        self.clear();

        let func = module.func(func_ref);
        self.entry = func.entry_block().into();

        for block in func.iter_block() {
            let block_data = module.block(block);
            if block_data.num_succs() == 0 {
                self.exits.push(block);
            }

            for (_, succ) in block_data.succs() {
                self.add_edge(block, succ);
            }
        }
    }

    pub fn preds_of(&self, block: BlockId) -> impl Iterator<Item = &BlockId> {
        self.blocks[block].preds()
    }

    pub fn succs_of(&self, block: BlockId) -> impl Iterator<Item = &BlockId> {
        self.blocks[block].succs()
    }

    pub fn pred_num_of(&self, block: BlockId) -> usize {
        self.blocks[block].pred_num()
    }

    pub fn succ_num_of(&self, block: BlockId) -> usize {
        self.blocks[block].succ_num()
    }

    pub fn entry(&self) -> Option<BlockId> {
        self.entry.expand()
    }

    /// Blocks reachable from the entry, in post order.
    pub fn post_order(&self) -> CfgPostOrder<'_> {
        CfgPostOrder::new(self)
    }

    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        self.blocks[to].push_pred(from);
        self.blocks[from].push_succ(to);
    }

    pub fn remove_edge(&mut self, from: BlockId, to: BlockId) {
        self.blocks[to].remove_pred(from);
        self.blocks[from].remove_succ(to);
    }

    pub fn clear(&mut self) {
        self.entry = None.into();
        self.blocks.clear();
        self.exits.clear();
    }
}

#[derive(Default, Clone, Debug, PartialEq, Eq)]
struct BlockNode {
    preds: BTreeSet<BlockId>,
    succs: BTreeSet<BlockId>,
}

impl BlockNode {
    fn push_pred(&mut self, pred: BlockId) {
        self.preds.insert(pred);
    }

    fn push_succ(&mut self, succ: BlockId) {
        self.succs.insert(succ);
    }

    fn remove_pred(&mut self, pred: BlockId) {
        self.preds.remove(&pred);
    }

    fn remove_succ(&mut self, succ: BlockId) {
        self.succs.remove(&succ);
    }

    fn preds(&self) -> impl Iterator<Item = &BlockId> {
        self.preds.iter()
    }

    fn succs(&self) -> impl Iterator<Item = &BlockId> {
        self.succs.iter()
    }

    fn pred_num(&self) -> usize {
        self.preds.len()
    }

    fn succ_num(&self) -> usize {
        self.succs.len()
    }
}

pub struct CfgPostOrder<'a> {
    cfg: &'a ControlFlowGraph,
    node_state: SecondaryMap<BlockId, NodeState>,
    stack: Vec<BlockId>,
}

impl<'a> CfgPostOrder<'a> {
    fn new(cfg: &'a ControlFlowGraph) -> Self {
        let mut stack = Vec::new();

        if let Some(entry) = cfg.entry() {
            stack.push(entry);
        }

        Self {
            cfg,
            node_state: SecondaryMap::default(),
            stack,
        }
    }
}

impl Iterator for CfgPostOrder<'_> {
    type Item = BlockId;

    fn next(&mut self) -> Option<BlockId> {
        while let Some(&block) = self.stack.last() {
            if self.node_state[block].is_unvisited() {
                // Mark before expanding so back edges of loops are not followed again.
                self.node_state[block].set_visited();
                for &succ in self.cfg.succs_of(block) {
                    if self.node_state[succ].is_unvisited() {
                        self.stack.push(succ);
                    }
                }
            } else {
                self.stack.pop();
                if !self.node_state[block].has_finished() {
                    self.node_state[block].set_finished();
                    return Some(block);
                }
            }
        }

        None
    }
}

#[derive(Default, Debug, Clone, Copy)]
struct NodeState(u8);

impl NodeState {
    fn is_unvisited(self) -> bool {
        self.0 == 0
    }

    fn has_finished(self) -> bool {
        self.0 == 2
    }

    fn set_visited(&mut self) {
        self.0 = 1;
    }

    fn set_finished(&mut self) {
        self.0 = 2;
    }
}
