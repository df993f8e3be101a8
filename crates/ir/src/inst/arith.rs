use std::{any::Any, io};

use smallvec::SmallVec;

use super::{write_args, Inst, Opcode};
use crate::{
    error::{expect_ok, IrResult},
    GlobalVariable,
};

/// Sums the addends into the destination operand.
///
/// The first operand is the destination, followed by at least two addends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Add {
    args: SmallVec<[GlobalVariable; 4]>,
}

impl Add {
    /// # Panics
    /// Panics if `args` holds fewer than three operands.
    #[track_caller]
    pub fn new(args: &[GlobalVariable]) -> Self {
        expect_ok(Self::try_new(args))
    }

    pub fn try_new(args: &[GlobalVariable]) -> IrResult<Self> {
        Opcode::Add.check_arity(args)?;
        Ok(Self {
            args: SmallVec::from_slice(args),
        })
    }

    pub fn dest(&self) -> GlobalVariable {
        self.args[0]
    }

    pub fn addends(&self) -> &[GlobalVariable] {
        &self.args[1..]
    }
}

impl Inst for Add {
    fn opcode(&self) -> Opcode {
        Opcode::Add
    }

    fn args(&self) -> &[GlobalVariable] {
        &self.args
    }

    fn write_text(&self, w: &mut dyn io::Write) -> io::Result<()> {
        write!(w, "{} = {} ", self.dest(), self.opcode())?;
        write_args(w, self.addends())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
