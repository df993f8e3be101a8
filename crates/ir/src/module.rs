//! The top level IR container and the only place IR entities are created,
//! linked and destroyed.
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use cranelift_entity::{packed_option::PackedOption, PrimaryMap};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::{
    error::{expect_ok, IrError, IrResult},
    global_variable::GlobalVariableStore,
    graphviz::{write_cfg_dot, DotConfig},
    ir_writer::ModuleWriter,
    verifier::{verify_function, VerifierConfig},
    Block, BlockId, FuncRef, Function, GlobalVariable, Inst, InstId,
};

/// A compilation unit: functions and global variables, plus the arenas holding
/// every block and instruction of those functions.
///
/// Ownership is tree shaped. A function owns its blocks and a block owns its
/// instructions; successor edges and instruction operands are plain handles.
/// Removing an entity requires all of its children to be removed first.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    funcs: PrimaryMap<FuncRef, Function>,
    func_table: IndexMap<String, FuncRef, FxBuildHasher>,
    blocks: PrimaryMap<BlockId, Block>,
    insts: PrimaryMap<InstId, InstNode>,
    gv_store: GlobalVariableStore,
}

#[derive(Debug, Clone)]
struct InstNode {
    inst: Box<dyn Inst>,
    /// `None` once the instruction is removed from its block.
    block: PackedOption<BlockId>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            funcs: PrimaryMap::default(),
            func_table: IndexMap::default(),
            blocks: PrimaryMap::default(),
            insts: PrimaryMap::default(),
            gv_store: GlobalVariableStore::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gv_store(&self) -> &GlobalVariableStore {
        &self.gv_store
    }

    pub fn var_with_id(&self, id: u32) -> Option<GlobalVariable> {
        self.gv_store.gv_by_id(id)
    }

    /// Declares the global variable `id`.
    ///
    /// # Panics
    /// Panics if `id` is already declared.
    #[track_caller]
    pub fn make_gv(&mut self, id: u32) -> GlobalVariable {
        expect_ok(self.try_make_gv(id))
    }

    pub fn try_make_gv(&mut self, id: u32) -> IrResult<GlobalVariable> {
        let gv = self.gv_store.make_gv(id)?;
        tracing::debug!(module = %self.name, gv = id, "declared global variable");
        Ok(gv)
    }

    /// Creates an empty function named `name`.
    ///
    /// # Panics
    /// Panics if the module already has a function with that name.
    #[track_caller]
    pub fn make_func(&mut self, name: &str) -> FuncRef {
        expect_ok(self.try_make_func(name))
    }

    pub fn try_make_func(&mut self, name: &str) -> IrResult<FuncRef> {
        if self.func_table.contains_key(name) {
            return Err(IrError::DuplicateFunction(name.to_string()));
        }

        let func_ref = self.funcs.push(Function::new(name));
        self.func_table.insert(name.to_string(), func_ref);
        tracing::debug!(module = %self.name, func = name, "created function");
        Ok(func_ref)
    }

    /// Returns `func_ref`s of the live functions in creation order.
    pub fn iter_functions(&self) -> impl Iterator<Item = FuncRef> + '_ {
        self.func_table.values().copied()
    }

    pub fn num_funcs(&self) -> usize {
        self.func_table.len()
    }

    pub fn func_by_name(&self, name: &str) -> Option<FuncRef> {
        self.func_table.get(name).copied()
    }

    #[track_caller]
    pub fn func(&self, func_ref: FuncRef) -> &Function {
        expect_ok(self.check_func(func_ref));
        &self.funcs[func_ref]
    }

    pub fn is_func_inserted(&self, func_ref: FuncRef) -> bool {
        self.funcs
            .get(func_ref)
            .is_some_and(|func| self.func_table.get(func.name()) == Some(&func_ref))
    }

    /// Creates a block named `name` at the end of `func_ref`, optionally making it
    /// the entry block.
    ///
    /// # Panics
    /// Panics if the function already has a block with that name.
    #[track_caller]
    pub fn make_block(&mut self, func_ref: FuncRef, name: &str, is_entry: bool) -> BlockId {
        expect_ok(self.try_make_block(func_ref, name, is_entry))
    }

    pub fn try_make_block(
        &mut self,
        func_ref: FuncRef,
        name: &str,
        is_entry: bool,
    ) -> IrResult<BlockId> {
        self.check_func(func_ref)?;
        let func = &self.funcs[func_ref];
        if func.block_by_name(name).is_some() {
            return Err(IrError::DuplicateBlock {
                func: func.name().to_string(),
                block: name.to_string(),
            });
        }

        let block = self.blocks.push(Block::new(name, func_ref));
        let func = &mut self.funcs[func_ref];
        func.insert_block(name, block);
        if is_entry {
            func.set_entry_block(Some(block));
        }

        tracing::debug!(func = %func.name(), block = name, is_entry, "created basic block");
        Ok(block)
    }

    #[track_caller]
    pub fn block(&self, block: BlockId) -> &Block {
        expect_ok(self.check_block(block));
        &self.blocks[block]
    }

    pub fn is_block_inserted(&self, block: BlockId) -> bool {
        self.blocks.get(block).is_some_and(|data| {
            self.is_func_inserted(data.func()) && self.funcs[data.func()].contains(data.name(), block)
        })
    }

    #[track_caller]
    pub fn set_entry_block(&mut self, func_ref: FuncRef, block: BlockId) {
        expect_ok(self.try_set_entry_block(func_ref, block))
    }

    pub fn try_set_entry_block(&mut self, func_ref: FuncRef, block: BlockId) -> IrResult<()> {
        self.check_func(func_ref)?;
        self.check_block(block)?;
        let block_data = &self.blocks[block];
        if block_data.func() != func_ref {
            return Err(IrError::EntryBlockNotInFunction {
                func: self.funcs[func_ref].name().to_string(),
                block: block_data.name().to_string(),
            });
        }

        self.funcs[func_ref].set_entry_block(Some(block));
        Ok(())
    }

    #[track_caller]
    pub fn entry_block(&self, func_ref: FuncRef) -> Option<BlockId> {
        self.func(func_ref).entry_block()
    }

    /// Appends `inst` to the end of `block`.
    ///
    /// # Panics
    /// Panics if an operand is not declared in this module.
    #[track_caller]
    pub fn append_inst<I: Inst>(&mut self, block: BlockId, inst: I) -> InstId {
        expect_ok(self.try_append_inst(block, inst))
    }

    pub fn try_append_inst<I: Inst>(&mut self, block: BlockId, inst: I) -> IrResult<InstId> {
        self.check_block(block)?;
        if let Some(gv) = inst
            .args()
            .iter()
            .find(|gv| !self.gv_store.contains(**gv))
        {
            return Err(IrError::UnknownGlobal(*gv));
        }

        let opcode = inst.opcode();
        let inst_id = self.insts.push(InstNode {
            inst: Box::new(inst),
            block: block.into(),
        });
        let block_data = &mut self.blocks[block];
        block_data.append_inst(inst_id);

        tracing::debug!(block = %block_data.name(), %opcode, "appended instruction");
        Ok(inst_id)
    }

    #[track_caller]
    pub fn inst(&self, inst: InstId) -> &dyn Inst {
        expect_ok(self.check_inst(inst));
        self.insts[inst].inst.as_ref()
    }

    /// The block owning `inst`.
    #[track_caller]
    pub fn inst_block(&self, inst: InstId) -> BlockId {
        expect_ok(self.check_inst(inst));
        self.insts[inst].block.unwrap()
    }

    pub fn is_inst_inserted(&self, inst: InstId) -> bool {
        self.insts
            .get(inst)
            .is_some_and(|node| node.block.is_some())
    }

    /// Removes `inst` from its block. Returns `false`, doing nothing, if the
    /// instruction is not inserted.
    pub fn remove_inst(&mut self, inst: InstId) -> bool {
        let Some(block) = self.insts.get(inst).and_then(|node| node.block.expand()) else {
            return false;
        };

        let removed = self.blocks[block].remove_inst(inst);
        debug_assert!(removed);
        self.insts[inst].block = None.into();
        tracing::debug!(block = %self.blocks[block].name(), %inst, "removed instruction");
        removed
    }

    /// Adds the CFG edge `from -> to` labelled with `tag`.
    ///
    /// # Panics
    /// Panics if `from` already has a successor tagged `tag`, or if the blocks
    /// belong to different functions.
    #[track_caller]
    pub fn add_succ(&mut self, from: BlockId, tag: &str, to: BlockId) {
        expect_ok(self.try_add_succ(from, tag, to))
    }

    pub fn try_add_succ(&mut self, from: BlockId, tag: &str, to: BlockId) -> IrResult<()> {
        self.check_block(from)?;
        self.check_block(to)?;

        let (from_data, to_data) = (&self.blocks[from], &self.blocks[to]);
        if from_data.has_tag(tag) {
            return Err(IrError::DuplicateSuccessorTag {
                block: from_data.name().to_string(),
                tag: tag.to_string(),
            });
        }
        if from_data.func() != to_data.func() {
            return Err(IrError::CrossFunctionEdge {
                from: from_data.name().to_string(),
                to: to_data.name().to_string(),
            });
        }

        tracing::debug!(from = %from_data.name(), to = %to_data.name(), tag, "added successor");
        self.blocks[from].insert_succ(tag, to);
        Ok(())
    }

    /// Removes the first successor edge of `from` pointing at `to`. Returns
    /// whether an edge was removed.
    #[track_caller]
    pub fn remove_succ(&mut self, from: BlockId, to: BlockId) -> bool {
        expect_ok(self.try_remove_succ(from, to))
    }

    pub fn try_remove_succ(&mut self, from: BlockId, to: BlockId) -> IrResult<bool> {
        self.check_block(from)?;
        Ok(self.blocks[from].remove_succ(to))
    }

    /// Removes an instruction free `block` from its function, dropping every
    /// successor edge of its siblings that points at it.
    ///
    /// # Panics
    /// Panics if the block still has instructions.
    #[track_caller]
    pub fn remove_block(&mut self, block: BlockId) {
        expect_ok(self.try_remove_block(block))
    }

    pub fn try_remove_block(&mut self, block: BlockId) -> IrResult<()> {
        self.check_block(block)?;
        let block_data = &self.blocks[block];
        if !block_data.is_empty() {
            return Err(IrError::BlockNotEmpty(block_data.name().to_string()));
        }

        let func_ref = block_data.func();
        let name = block_data.name().to_string();
        let func = &mut self.funcs[func_ref];
        func.remove_block(&name);
        if func.entry_block() == Some(block) {
            func.set_entry_block(None);
        }

        for sibling in self.funcs[func_ref].iter_block() {
            let removed = self.blocks[sibling].remove_succs_to(block);
            if removed != 0 {
                tracing::debug!(
                    from = %self.blocks[sibling].name(),
                    to = %name,
                    removed,
                    "dropped successor edges to removed block"
                );
            }
        }
        self.blocks[block].clear_succs();

        tracing::debug!(func = %self.funcs[func_ref].name(), block = %name, "removed basic block");
        Ok(())
    }

    /// Removes a function that has no basic blocks left.
    ///
    /// # Panics
    /// Panics if the function still has basic blocks.
    #[track_caller]
    pub fn remove_func(&mut self, func_ref: FuncRef) {
        expect_ok(self.try_remove_func(func_ref))
    }

    pub fn try_remove_func(&mut self, func_ref: FuncRef) -> IrResult<()> {
        self.check_func(func_ref)?;
        let func = &self.funcs[func_ref];
        if !func.is_empty() {
            return Err(IrError::FunctionNotEmpty(func.name().to_string()));
        }

        self.func_table.shift_remove(func.name());
        tracing::debug!(module = %self.name, func = %func.name(), "removed function");
        Ok(())
    }

    /// Returns `true` if the function has an entry block from which every one of
    /// its blocks is reachable.
    #[track_caller]
    pub fn is_valid(&self, func_ref: FuncRef) -> bool {
        verify_function(self, func_ref, &VerifierConfig::default()).is_ok()
    }

    /// Prints the module to stdout.
    pub fn dump(&self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        ModuleWriter::new(self).write(&mut stdout)?;
        stdout.flush()
    }

    pub fn dump_string(&self) -> String {
        ModuleWriter::new(self).dump_string()
    }

    /// Writes the CFG of `func_ref` to `path` as a graphviz digraph.
    pub fn print_cfg_as_dot(&self, func_ref: FuncRef, path: impl AsRef<Path>) -> io::Result<()> {
        let mut file = BufWriter::new(File::create(path.as_ref())?);
        write_cfg_dot(self, func_ref, &mut file, &DotConfig::default())?;
        file.flush()
    }

    fn check_func(&self, func_ref: FuncRef) -> IrResult<()> {
        if self.is_func_inserted(func_ref) {
            Ok(())
        } else {
            Err(IrError::StaleFunction(func_ref))
        }
    }

    fn check_block(&self, block: BlockId) -> IrResult<()> {
        if self.is_block_inserted(block) {
            Ok(())
        } else {
            Err(IrError::StaleBlock(block))
        }
    }

    fn check_inst(&self, inst: InstId) -> IrResult<()> {
        if self.is_inst_inserted(inst) {
            Ok(())
        } else {
            Err(IrError::StaleInst(inst))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::inst::{Add, Load, Store};

    #[test]
    fn registries_reject_duplicates() {
        let mut module = Module::new("m");
        module.make_gv(0);
        assert!(matches!(module.try_make_gv(0), Err(IrError::DuplicateGlobal(_))));

        let f = module.make_func("f");
        assert_eq!(
            module.try_make_func("f"),
            Err(IrError::DuplicateFunction("f".into()))
        );

        module.make_block(f, "bb.0", true);
        assert!(matches!(
            module.try_make_block(f, "bb.0", false),
            Err(IrError::DuplicateBlock { .. })
        ));

        // Block names are scoped to their function.
        let g = module.make_func("g");
        module.make_block(g, "bb.0", true);
    }

    #[test]
    fn successor_tags_are_unique_per_block() {
        let mut module = Module::new("m");
        let f = module.make_func("f");
        let b0 = module.make_block(f, "bb.0", true);
        let b1 = module.make_block(f, "bb.1", false);
        let b2 = module.make_block(f, "bb.2", false);

        module.add_succ(b0, "true", b1);
        assert_eq!(
            module.try_add_succ(b0, "true", b2),
            Err(IrError::DuplicateSuccessorTag {
                block: "bb.0".into(),
                tag: "true".into()
            })
        );
        module.add_succ(b0, "false", b1);
        assert_eq!(module.block(b0).num_succs(), 2);
        assert_eq!(module.block(b0).succ_by_tag("true"), Some(b1));
    }

    #[test]
    #[should_panic(expected = "the successor with the tag `true` already exists on block `bb.0`")]
    fn duplicate_tag_panics() {
        let mut module = Module::new("m");
        let f = module.make_func("f");
        let b0 = module.make_block(f, "bb.0", true);
        let b1 = module.make_block(f, "bb.1", false);
        module.add_succ(b0, "true", b1);
        module.add_succ(b0, "true", b0);
    }

    #[test]
    fn cross_function_edge_is_rejected() {
        let mut module = Module::new("m");
        let f = module.make_func("f");
        let g = module.make_func("g");
        let fb = module.make_block(f, "bb.0", true);
        let gb = module.make_block(g, "bb.0", true);

        assert!(matches!(
            module.try_add_succ(fb, "", gb),
            Err(IrError::CrossFunctionEdge { .. })
        ));
        assert!(matches!(
            module.try_set_entry_block(f, gb),
            Err(IrError::EntryBlockNotInFunction { .. })
        ));
    }

    #[test]
    fn instructions_keep_order_and_parent() {
        let mut module = Module::new("m");
        let gvs: Vec<_> = (0..3).map(|id| module.make_gv(id)).collect();
        let f = module.make_func("f");
        let b0 = module.make_block(f, "bb.0", true);

        let i0 = module.append_inst(b0, Add::new(&gvs));
        let i1 = module.append_inst(b0, Load::new(&gvs[..1]));
        let i2 = module.append_inst(b0, Store::new(&gvs[1..]));

        assert_eq!(module.block(b0).iter_inst().collect::<Vec<_>>(), vec![i0, i1, i2]);
        assert_eq!(module.inst_block(i1), b0);
        assert_eq!(module.inst(i0).downcast_ref::<Add>().unwrap().dest(), gvs[0]);
        assert!(module.inst(i1).is::<Load>());

        assert!(module.remove_inst(i1));
        assert!(!module.remove_inst(i1));
        assert!(!module.is_inst_inserted(i1));
        assert_eq!(module.block(b0).iter_inst().collect::<Vec<_>>(), vec![i0, i2]);
    }

    #[test]
    fn operands_must_be_declared() {
        let mut module = Module::new("m");
        let mut other = Module::new("other");
        let foreign = other.make_gv(9);

        let f = module.make_func("f");
        let b0 = module.make_block(f, "bb.0", true);
        assert_eq!(
            module.try_append_inst(b0, Load::new(&[foreign])),
            Err(IrError::UnknownGlobal(foreign))
        );
        assert!(module.block(b0).is_empty());
    }

    #[test]
    fn remove_block_requires_empty_block_and_drops_edges() {
        let mut module = Module::new("m");
        let gv = module.make_gv(0);
        let f = module.make_func("f");
        let b0 = module.make_block(f, "bb.0", true);
        let b1 = module.make_block(f, "bb.1", false);
        let b2 = module.make_block(f, "bb.2", false);
        module.add_succ(b0, "true", b1);
        module.add_succ(b0, "false", b2);
        module.add_succ(b2, "", b1);
        module.add_succ(b1, "loop", b1);
        let load = module.append_inst(b1, Load::new(&[gv]));

        assert_eq!(
            module.try_remove_block(b1),
            Err(IrError::BlockNotEmpty("bb.1".into()))
        );

        module.remove_inst(load);
        module.remove_block(b1);

        assert!(!module.is_block_inserted(b1));
        assert_eq!(module.block(b0).succs().collect::<Vec<_>>(), vec![("false", b2)]);
        assert_eq!(module.block(b2).num_succs(), 0);
        assert_eq!(module.func(f).iter_block().collect::<Vec<_>>(), vec![b0, b2]);

        // The name is free again.
        let b1 = module.make_block(f, "bb.1", false);
        assert_eq!(module.func(f).iter_block().last(), Some(b1));
    }

    #[test]
    fn removing_entry_block_unsets_entry() {
        let mut module = Module::new("m");
        let f = module.make_func("f");
        let b0 = module.make_block(f, "bb.0", true);
        module.remove_block(b0);
        assert_eq!(module.entry_block(f), None);
        assert!(module.func(f).is_empty());
    }

    #[test]
    #[should_panic(expected = "basic block `bb.0` still has instructions")]
    fn remove_non_empty_block_panics() {
        let mut module = Module::new("m");
        let gv = module.make_gv(0);
        let f = module.make_func("f");
        let b0 = module.make_block(f, "bb.0", true);
        module.append_inst(b0, Load::new(&[gv]));
        module.remove_block(b0);
    }

    #[test]
    fn remove_func_requires_empty_func() {
        let mut module = Module::new("m");
        let f = module.make_func("f");
        let g = module.make_func("g");
        let h = module.make_func("h");
        let b0 = module.make_block(f, "bb.0", true);

        assert_eq!(
            module.try_remove_func(f),
            Err(IrError::FunctionNotEmpty("f".into()))
        );
        module.remove_func(g);
        assert!(!module.is_func_inserted(g));
        assert_eq!(module.iter_functions().collect::<Vec<_>>(), vec![f, h]);

        module.remove_block(b0);
        module.remove_func(f);
        assert_eq!(module.num_funcs(), 1);
        assert_eq!(module.func_by_name("f"), None);
        assert_eq!(module.try_make_block(f, "bb.0", true), Err(IrError::StaleFunction(f)));
    }

    #[test]
    #[should_panic(expected = "function `f` still has basic blocks")]
    fn remove_non_empty_func_panics() {
        let mut module = Module::new("m");
        let f = module.make_func("f");
        module.make_block(f, "bb.0", true);
        module.remove_func(f);
    }

    #[test]
    fn clone_is_a_snapshot() {
        let mut module = Module::new("m");
        let gv = module.make_gv(0);
        let f = module.make_func("f");
        let b0 = module.make_block(f, "bb.0", true);
        let load = module.append_inst(b0, Load::new(&[gv]));

        let snapshot = module.clone();
        module.remove_inst(load);

        assert!(module.block(b0).is_empty());
        assert_eq!(snapshot.block(b0).num_insts(), 1);
        assert_eq!(snapshot.inst(load).opcode(), crate::inst::Opcode::Load);
    }
}
