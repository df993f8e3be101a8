use std::{fmt, io};

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use crate::{
    error::{IrError, IrResult},
    ir_writer::IrWrite,
    Module,
};

/// Registry of the global variables declared in a module, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct GlobalVariableStore {
    gvs: IndexSet<GlobalVariable, FxBuildHasher>,
}

impl GlobalVariableStore {
    pub fn make_gv(&mut self, id: u32) -> IrResult<GlobalVariable> {
        let gv = GlobalVariable(id);
        if !self.gvs.insert(gv) {
            return Err(IrError::DuplicateGlobal(gv));
        }
        Ok(gv)
    }

    pub fn contains(&self, gv: GlobalVariable) -> bool {
        self.gvs.contains(&gv)
    }

    pub fn gv_by_id(&self, id: u32) -> Option<GlobalVariable> {
        self.gvs.get(&GlobalVariable(id)).copied()
    }

    pub fn len(&self) -> usize {
        self.gvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gvs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = GlobalVariable> + '_ {
        self.gvs.iter().copied()
    }
}

/// An addressable storage location, identified by its module-unique id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalVariable(u32);

impl GlobalVariable {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GlobalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "var !{}", self.0)
    }
}

impl IrWrite for GlobalVariable {
    fn write<W>(&self, w: &mut W, _module: &Module) -> io::Result<()>
    where
        W: io::Write,
    {
        write!(w, "{self}")
    }
}
