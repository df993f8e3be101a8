use crate::{
    inst::{Add, Load, Store},
    BlockId, FuncRef, GlobalVariable, Inst, InstId, Module,
};

/// Appends blocks and instructions to one function of a module.
///
/// Instructions are appended to the end of the block selected with
/// [`FunctionBuilder::switch_to_block`].
pub struct FunctionBuilder<'m> {
    module: &'m mut Module,
    func_ref: FuncRef,
    position: Option<BlockId>,
}

impl<'m> FunctionBuilder<'m> {
    /// Creates the function `name` in `module` and starts building it.
    pub fn new(module: &'m mut Module, name: &str) -> Self {
        let func_ref = module.make_func(name);
        Self::for_func(module, func_ref)
    }

    pub fn for_func(module: &'m mut Module, func_ref: FuncRef) -> Self {
        Self {
            module,
            func_ref,
            position: None,
        }
    }

    pub fn func_ref(&self) -> FuncRef {
        self.func_ref
    }

    pub fn module(&self) -> &Module {
        self.module
    }

    pub fn append_block(&mut self, name: &str) -> BlockId {
        self.module.make_block(self.func_ref, name, false)
    }

    pub fn append_entry_block(&mut self, name: &str) -> BlockId {
        self.module.make_block(self.func_ref, name, true)
    }

    pub fn switch_to_block(&mut self, block: BlockId) {
        debug_assert_eq!(self.module.block(block).func(), self.func_ref);
        self.position = Some(block);
    }

    pub fn current_block(&self) -> Option<BlockId> {
        self.position
    }

    /// Appends `inst` to the current block.
    ///
    /// # Panics
    /// Panics if no block is selected.
    pub fn insert_inst<I: Inst>(&mut self, inst: I) -> InstId {
        let block = self
            .position
            .expect("no block selected, call `switch_to_block` first");
        self.module.append_inst(block, inst)
    }

    pub fn load(&mut self, addr: GlobalVariable) -> InstId {
        self.insert_inst(Load::new(&[addr]))
    }

    pub fn store(&mut self, value: GlobalVariable, addr: GlobalVariable) -> InstId {
        self.insert_inst(Store::new(&[value, addr]))
    }

    pub fn add(&mut self, dest: GlobalVariable, addends: &[GlobalVariable]) -> InstId {
        let mut args = Vec::with_capacity(addends.len() + 1);
        args.push(dest);
        args.extend_from_slice(addends);
        self.insert_inst(Add::new(&args))
    }

    pub fn add_succ(&mut self, from: BlockId, tag: &str, to: BlockId) {
        self.module.add_succ(from, tag, to);
    }

    pub fn finish(self) -> FuncRef {
        self.func_ref
    }
}
