use std::io;

use crate::{FuncRef, Module};

mod block;
mod function;

use function::FunctionGraph;

/// Order in which blocks are visited when emitting their out-edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockOrder {
    /// Last inserted block first.
    #[default]
    Reverse,
    Insertion,
}

#[derive(Debug, Clone, Default)]
pub struct DotConfig {
    pub block_order: BlockOrder,
    /// Quote graph and node ids, so names such as `bb.0` stay valid DOT ids.
    pub quote_ids: bool,
}

impl DotConfig {
    fn id<'s>(&self, name: &'s str) -> std::borrow::Cow<'s, str> {
        if self.quote_ids {
            format!("\"{}\"", escape(name)).into()
        } else {
            name.into()
        }
    }
}

/// Writes the CFG of `func_ref` as a digraph with one line per tagged edge.
///
/// ```text
/// digraph foo {
///   entry -> H[ label = "true"];
/// }
/// ```
pub fn write_cfg_dot<W: io::Write>(
    module: &Module,
    func_ref: FuncRef,
    w: &mut W,
    config: &DotConfig,
) -> io::Result<()> {
    let func = module.func(func_ref);
    writeln!(w, "digraph {} {{", config.id(func.name()))?;

    let blocks: Vec<_> = match config.block_order {
        BlockOrder::Reverse => func.iter_block().rev().collect(),
        BlockOrder::Insertion => func.iter_block().collect(),
    };
    for block in blocks {
        let block_data = module.block(block);
        for (tag, succ) in block_data.succs() {
            writeln!(
                w,
                "  {} -> {}[ label = \"{}\"];",
                config.id(block_data.name()),
                config.id(module.block(succ).name()),
                escape(tag)
            )?;
        }
    }

    writeln!(w, "}}")
}

/// Renders the function as a graphviz graph whose nodes list the instructions
/// of each block.
pub fn render_to<W: io::Write>(
    module: &Module,
    func_ref: FuncRef,
    output: &mut W,
) -> io::Result<()> {
    let func_graph = FunctionGraph::new(module, func_ref);
    dot2::render(&func_graph, output).map_err(|err| match err {
        dot2::Error::Io(err) => err,
        _ => io::Error::new(io::ErrorKind::InvalidData, "invalid graphviz id"),
    })
}

fn escape(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains(['"', '\\']) {
        s.replace('\\', "\\\\").replace('"', "\\\"").into()
    } else {
        s.into()
    }
}
