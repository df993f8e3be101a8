mod func_builder;

pub use func_builder::FunctionBuilder;

pub mod test_util {
    //! Small modules shared by the tests.
    use super::*;

    use crate::{FuncRef, Module};

    /// Module `m1` with globals 0, 1 and 2 and the function `f1`:
    /// `bb.0` adds into var 0 and branches to `bb.1` (load) on `true` and to
    /// `bb.2` (store) on `false`.
    pub fn branch_module() -> (Module, FuncRef) {
        let mut module = Module::new("m1");
        let v0 = module.make_gv(0);
        let v1 = module.make_gv(1);
        let v2 = module.make_gv(2);

        let mut builder = FunctionBuilder::new(&mut module, "f1");
        let bb0 = builder.append_entry_block("bb.0");
        builder.switch_to_block(bb0);
        builder.add(v0, &[v1, v2]);

        let bb1 = builder.append_block("bb.1");
        builder.add_succ(bb0, "true", bb1);
        builder.switch_to_block(bb1);
        builder.load(v0);

        let bb2 = builder.append_block("bb.2");
        builder.add_succ(bb0, "false", bb2);
        builder.switch_to_block(bb2);
        builder.store(v1, v2);

        let func_ref = builder.finish();
        (module, func_ref)
    }

    /// Module `m` with the function `foo`: `entry` branches to `H` and `I`,
    /// which both fall through to `J`.
    pub fn diamond_module() -> (Module, FuncRef) {
        let mut module = Module::new("m");
        let mut builder = FunctionBuilder::new(&mut module, "foo");
        let entry = builder.append_entry_block("entry");
        let h = builder.append_block("H");
        builder.add_succ(entry, "true", h);
        let i = builder.append_block("I");
        builder.add_succ(entry, "false", i);
        let j = builder.append_block("J");
        builder.add_succ(h, "", j);
        builder.add_succ(i, "", j);
        let func_ref = builder.finish();
        (module, func_ref)
    }
}
