pub mod block;
pub mod builder;
pub mod cfg;
pub mod error;
pub mod function;
pub mod global_variable;
pub mod graphviz;
pub mod inst;
pub mod ir_writer;
pub mod module;
pub mod verifier;

pub use block::{Block, BlockId};
pub use builder::FunctionBuilder;
pub use cfg::ControlFlowGraph;
pub use error::{IrError, IrResult};
pub use function::{FuncRef, Function};
pub use global_variable::{GlobalVariable, GlobalVariableStore};
pub use graphviz::{render_to, write_cfg_dot, BlockOrder, DotConfig};
pub use inst::{Inst, InstId, Opcode};
pub use ir_writer::{IrWrite, ModuleWriter};
pub use module::Module;
pub use verifier::{verify_function, verify_module, VerificationReport, VerifierConfig};

pub mod prelude {
    pub use crate::{
        inst::{Add, Inst, Load, Store},
        ir_writer::IrWrite,
    };
}
