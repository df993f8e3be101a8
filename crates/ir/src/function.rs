use std::io;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{ir_writer::IrWrite, BlockId, Module};

/// An opaque reference to a [`Function`] stored in a [`Module`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FuncRef(u32);
use cranelift_entity::entity_impl;
entity_impl!(FuncRef, "func");

/// A name keyed collection of basic blocks, one of which may be the entry block.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    blocks: IndexMap<String, BlockId, FxBuildHasher>,
    entry_block: Option<BlockId>,
}

impl Function {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            blocks: IndexMap::default(),
            entry_block: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the function has no basic blocks. Such a function is
    /// dead and can be removed from its module.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        self.entry_block
    }

    pub fn block_by_name(&self, name: &str) -> Option<BlockId> {
        self.blocks.get(name).copied()
    }

    /// Blocks in insertion order.
    pub fn iter_block(&self) -> impl DoubleEndedIterator<Item = BlockId> + '_ {
        self.blocks.values().copied()
    }

    pub(crate) fn contains(&self, name: &str, block: BlockId) -> bool {
        self.blocks.get(name) == Some(&block)
    }

    pub(crate) fn insert_block(&mut self, name: &str, block: BlockId) {
        debug_assert!(!self.blocks.contains_key(name));
        self.blocks.insert(name.to_string(), block);
    }

    pub(crate) fn remove_block(&mut self, name: &str) {
        self.blocks.shift_remove(name);
    }

    pub(crate) fn set_entry_block(&mut self, block: Option<BlockId>) {
        self.entry_block = block;
    }
}

impl IrWrite for FuncRef {
    fn write<W>(&self, w: &mut W, module: &Module) -> io::Result<()>
    where
        W: io::Write,
    {
        let func = module.func(*self);
        writeln!(w, "def {}():", func.name())?;

        if func.is_empty() {
            writeln!(w, "  empty function")?;
        } else {
            for block in func.iter_block() {
                block.write(w, module)?;
            }
        }

        writeln!(w)
    }
}
