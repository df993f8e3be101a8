pub mod arith;
pub mod memory;

use std::{any::Any, fmt, io};

use dyn_clone::DynClone;

use crate::{
    error::{IrError, IrResult},
    ir_writer::IrWrite,
    GlobalVariable, Module,
};

pub use arith::Add;
pub use memory::{Load, Store};

/// An opaque reference to a dynamic [`Inst`] stored in a [`Module`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Copy, Hash)]
pub struct InstId(pub u32);
use cranelift_entity::entity_impl;
entity_impl!(InstId, "inst");

pub trait Inst: DynClone + Any + fmt::Debug + Send + Sync {
    fn opcode(&self) -> Opcode;

    /// Operands in the order they were given at construction.
    fn args(&self) -> &[GlobalVariable];

    /// Writes the opcode specific textual form of the instruction.
    fn write_text(&self, w: &mut dyn io::Write) -> io::Result<()>;

    fn as_any(&self) -> &dyn Any;
}

dyn_clone::clone_trait_object!(Inst);

impl dyn Inst {
    pub fn downcast_ref<I: Inst>(&self) -> Option<&I> {
        self.as_any().downcast_ref::<I>()
    }

    pub fn is<I: Inst>(&self) -> bool {
        self.as_any().is::<I>()
    }
}

impl IrWrite for InstId {
    fn write<W>(&self, w: &mut W, module: &Module) -> io::Result<()>
    where
        W: io::Write,
    {
        module.inst(*self).write_text(w)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Load,
    Store,
    Add,
}

impl Opcode {
    pub fn arity(self) -> Arity {
        match self {
            Self::Load => Arity::Exact(1),
            Self::Store => Arity::Exact(2),
            Self::Add => Arity::AtLeast(3),
        }
    }

    pub fn as_text(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Add => "ADD",
        }
    }

    pub(crate) fn check_arity(self, args: &[GlobalVariable]) -> IrResult<()> {
        if self.arity().accepts(args.len()) {
            Ok(())
        } else {
            Err(IrError::ArityMismatch {
                opcode: self,
                found: args.len(),
            })
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

/// The number of operands an instruction variant accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Self::Exact(expected) => n == expected,
            Self::AtLeast(min) => n >= min,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Writes `args` as a comma separated operand list.
pub(crate) fn write_args(w: &mut dyn io::Write, args: &[GlobalVariable]) -> io::Result<()> {
    let mut delim = "";
    for arg in args {
        write!(w, "{delim}{arg}")?;
        delim = ", ";
    }
    Ok(())
}
