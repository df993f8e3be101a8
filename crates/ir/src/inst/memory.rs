use std::{any::Any, io};

use super::{Inst, Opcode};
use crate::{
    error::{expect_ok, IrError, IrResult},
    GlobalVariable,
};

fn fixed_args<const N: usize>(
    opcode: Opcode,
    args: &[GlobalVariable],
) -> IrResult<[GlobalVariable; N]> {
    args.try_into().map_err(|_| IrError::ArityMismatch {
        opcode,
        found: args.len(),
    })
}

/// Loads from the single address operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Load {
    args: [GlobalVariable; 1],
}

impl Load {
    /// # Panics
    /// Panics unless `args` holds exactly one operand.
    #[track_caller]
    pub fn new(args: &[GlobalVariable]) -> Self {
        expect_ok(Self::try_new(args))
    }

    pub fn try_new(args: &[GlobalVariable]) -> IrResult<Self> {
        let args = fixed_args(Opcode::Load, args)?;
        Ok(Self { args })
    }

    pub fn addr(&self) -> GlobalVariable {
        self.args[0]
    }
}

impl Inst for Load {
    fn opcode(&self) -> Opcode {
        Opcode::Load
    }

    fn args(&self) -> &[GlobalVariable] {
        &self.args
    }

    fn write_text(&self, w: &mut dyn io::Write) -> io::Result<()> {
        write!(w, "{} {}", self.opcode(), self.addr())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Stores the first operand (the value) into the second one (the address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Store {
    args: [GlobalVariable; 2],
}

impl Store {
    /// # Panics
    /// Panics unless `args` holds exactly two operands.
    #[track_caller]
    pub fn new(args: &[GlobalVariable]) -> Self {
        expect_ok(Self::try_new(args))
    }

    pub fn try_new(args: &[GlobalVariable]) -> IrResult<Self> {
        let args = fixed_args(Opcode::Store, args)?;
        Ok(Self { args })
    }

    pub fn value(&self) -> GlobalVariable {
        self.args[0]
    }

    pub fn addr(&self) -> GlobalVariable {
        self.args[1]
    }
}

impl Inst for Store {
    fn opcode(&self) -> Opcode {
        Opcode::Store
    }

    fn args(&self) -> &[GlobalVariable] {
        &self.args
    }

    fn write_text(&self, w: &mut dyn io::Write) -> io::Result<()> {
        write!(w, "{} {}, {}", self.opcode(), self.value(), self.addr())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
