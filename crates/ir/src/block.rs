use std::io;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{ir_writer::IrWrite, FuncRef, InstId, Module};

/// An opaque reference to a [`Block`] stored in a [`Module`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);
use cranelift_entity::entity_impl;
entity_impl!(BlockId, "block");

/// A straight-line instruction sequence plus its tagged CFG out-edges.
///
/// Instructions are kept in execution order. Successors are keyed by tag and
/// keep the order they were added in; at most one successor exists per tag.
#[derive(Debug, Clone)]
pub struct Block {
    name: String,
    func: FuncRef,
    insts: Vec<InstId>,
    succs: IndexMap<String, BlockId, FxBuildHasher>,
}

impl Block {
    pub(crate) fn new(name: &str, func: FuncRef) -> Self {
        Self {
            name: name.to_string(),
            func,
            insts: Vec::new(),
            succs: IndexMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function owning this block.
    pub fn func(&self) -> FuncRef {
        self.func
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn num_insts(&self) -> usize {
        self.insts.len()
    }

    pub fn iter_inst(&self) -> impl DoubleEndedIterator<Item = InstId> + '_ {
        self.insts.iter().copied()
    }

    pub fn num_succs(&self) -> usize {
        self.succs.len()
    }

    /// Returns `(tag, successor)` pairs in insertion order.
    pub fn succs(&self) -> impl Iterator<Item = (&str, BlockId)> + '_ {
        self.succs.iter().map(|(tag, succ)| (tag.as_str(), *succ))
    }

    pub fn succ_by_tag(&self, tag: &str) -> Option<BlockId> {
        self.succs.get(tag).copied()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.succs.contains_key(tag)
    }

    pub(crate) fn append_inst(&mut self, inst: InstId) {
        self.insts.push(inst);
    }

    pub(crate) fn remove_inst(&mut self, inst: InstId) -> bool {
        match self.insts.iter().position(|i| *i == inst) {
            Some(pos) => {
                self.insts.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Caller checks that `tag` is unused.
    pub(crate) fn insert_succ(&mut self, tag: &str, succ: BlockId) {
        debug_assert!(!self.has_tag(tag));
        self.succs.insert(tag.to_string(), succ);
    }

    /// Removes the first edge pointing at `succ`.
    pub(crate) fn remove_succ(&mut self, succ: BlockId) -> bool {
        match self.succs.values().position(|s| *s == succ) {
            Some(idx) => {
                self.succs.shift_remove_index(idx);
                true
            }
            None => false,
        }
    }

    /// Removes every edge pointing at `succ`, returning how many were removed.
    pub(crate) fn remove_succs_to(&mut self, succ: BlockId) -> usize {
        let before = self.succs.len();
        self.succs.retain(|_, s| *s != succ);
        before - self.succs.len()
    }

    pub(crate) fn clear_succs(&mut self) {
        self.succs.clear();
    }
}

impl IrWrite for BlockId {
    fn write<W>(&self, w: &mut W, module: &Module) -> io::Result<()>
    where
        W: io::Write,
    {
        let block = module.block(*self);
        if block.num_succs() != 0 {
            write!(w, " ; Successors: ")?;
            for (tag, succ) in block.succs() {
                write!(w, "{}(tag: {tag}) ", module.block(succ).name())?;
            }
            writeln!(w)?;
        }

        writeln!(w, " {}:", block.name())?;
        for inst in block.iter_inst() {
            write!(w, "    ")?;
            inst.write(w, module)?;
            writeln!(w)?;
        }

        Ok(())
    }
}
