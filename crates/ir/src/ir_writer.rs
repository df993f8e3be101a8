//! Human readable dump of the IR.
//!
//! ```text
//! ModuleID: m1
//!
//! var !0
//! var !1
//!
//! def f1():
//!  ; Successors: bb.1(tag: true)
//!  bb.0:
//!     LOAD var !0
//!  bb.1:
//!     STORE var !0, var !1
//!
//! ```
use std::io::{self, Write};

use crate::Module;

/// Writes an IR entity in its textual form, resolving handles through the
/// owning module.
pub trait IrWrite {
    fn write<W>(&self, w: &mut W, module: &Module) -> io::Result<()>
    where
        W: io::Write;

    fn dump_string(&self, module: &Module) -> String {
        let mut s = Vec::new();
        self.write(&mut s, module).expect("writing into a `Vec` never fails");
        String::from_utf8_lossy(&s).into_owned()
    }

    /// Prints the entity to stdout.
    fn dump(&self, module: &Module) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.write(&mut stdout, module)?;
        stdout.flush()
    }
}

pub struct ModuleWriter<'a> {
    module: &'a Module,
}

impl<'a> ModuleWriter<'a> {
    pub fn new(module: &'a Module) -> Self {
        Self { module }
    }

    pub fn write(&self, mut w: impl io::Write) -> io::Result<()> {
        let module = self.module;
        writeln!(w, "ModuleID: {}", module.name())?;
        writeln!(w)?;

        let gv_store = module.gv_store();
        for gv in gv_store.iter() {
            gv.write(&mut w, module)?;
            writeln!(w)?;
        }
        if !gv_store.is_empty() {
            writeln!(w)?;
        }

        for func_ref in module.iter_functions() {
            func_ref.write(&mut w, module)?;
        }

        Ok(())
    }

    pub fn dump_string(&self) -> String {
        let mut s = Vec::new();
        self.write(&mut s).expect("writing into a `Vec` never fails");
        String::from_utf8_lossy(&s).into_owned()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{builder::test_util, inst::Load};

    #[test]
    fn dump_empty_module() {
        let module = Module::new("empty");
        assert_eq!(ModuleWriter::new(&module).dump_string(), "ModuleID: empty\n\n");
    }

    #[test]
    fn dump_empty_function() {
        let mut module = Module::new("m");
        let f = module.make_func("f");
        assert_eq!(f.dump_string(&module), "def f():\n  empty function\n\n");
    }

    #[test]
    fn dump_block_without_successors() {
        let mut module = Module::new("m");
        let gv = module.make_gv(3);
        let f = module.make_func("f");
        let b0 = module.make_block(f, "exit", true);
        let load = module.append_inst(b0, Load::new(&[gv]));

        assert_eq!(load.dump_string(&module), "LOAD var !3");
        assert_eq!(b0.dump_string(&module), " exit:\n    LOAD var !3\n");
    }

    #[test]
    fn dump_entities_to_stdout() {
        let (module, f1) = test_util::branch_module();
        let bb0 = module.entry_block(f1).unwrap();
        let add = module.block(bb0).iter_inst().next().unwrap();

        f1.dump(&module).unwrap();
        bb0.dump(&module).unwrap();
        add.dump(&module).unwrap();
        module.var_with_id(2).unwrap().dump(&module).unwrap();
    }

    #[test]
    fn dump_branch_module() {
        let (module, _) = test_util::branch_module();
        let expected = "ModuleID: m1

var !0
var !1
var !2

def f1():
 ; Successors: bb.1(tag: true) bb.2(tag: false) \n bb.0:
    var !0 = ADD var !1, var !2
 bb.1:
    LOAD var !0
 bb.2:
    STORE var !1, var !2

";
        assert_eq!(module.dump_string(), expected);
    }
}
