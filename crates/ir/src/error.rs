use thiserror::Error;

use crate::{inst::Opcode, BlockId, FuncRef, GlobalVariable, InstId};

/// Violations of the structural invariants of the IR.
///
/// These are programming errors on the caller's side. Every mutating operation of
/// [`crate::Module`] that can raise one comes in two forms: a `try_` method
/// returning this error, and a plain method that panics with its message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    #[error("function `{0}` already exists")]
    DuplicateFunction(String),

    #[error("basic block `{block}` already exists in function `{func}`")]
    DuplicateBlock { func: String, block: String },

    #[error("global variable `{0}` already exists")]
    DuplicateGlobal(GlobalVariable),

    #[error("the successor with the tag `{tag}` already exists on block `{block}`")]
    DuplicateSuccessorTag { block: String, tag: String },

    #[error("successor `{to}` of `{from}` belongs to a different function")]
    CrossFunctionEdge { from: String, to: String },

    #[error("`{opcode}` expects {} operand(s), but got {found}", .opcode.arity())]
    ArityMismatch { opcode: Opcode, found: usize },

    #[error("global variable `{0}` is not declared in the module")]
    UnknownGlobal(GlobalVariable),

    #[error("function {0} is not inserted in the module")]
    StaleFunction(FuncRef),

    #[error("basic block {0} is not inserted in any function")]
    StaleBlock(BlockId),

    #[error("instruction {0} is not inserted in any basic block")]
    StaleInst(InstId),

    #[error("basic block `{0}` still has instructions, delete the instructions first")]
    BlockNotEmpty(String),

    #[error("function `{0}` still has basic blocks, delete the basic blocks first")]
    FunctionNotEmpty(String),

    #[error("entry block `{block}` does not belong to function `{func}`")]
    EntryBlockNotInFunction { func: String, block: String },
}

pub type IrResult<T> = Result<T, IrError>;

/// Unwraps the result of a `try_` operation, failing fast on an invariant violation.
#[track_caller]
pub(crate) fn expect_ok<T>(res: IrResult<T>) -> T {
    match res {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
