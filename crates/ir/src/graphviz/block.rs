use dot2::label;

use crate::{ir_writer::IrWrite, BlockId, FuncRef, Module};

/// A graph node: a basic block, or the function header node when `block` is
/// `None`.
#[derive(Clone, Copy)]
pub(super) struct BlockNode<'a> {
    pub(super) module: &'a Module,
    pub(super) block: Option<BlockId>,
}

impl<'a> BlockNode<'a> {
    pub(super) fn new(module: &'a Module, block: Option<BlockId>) -> Self {
        Self { module, block }
    }

    /// Tagged successors of the block.
    pub(super) fn succs(self) -> Vec<(&'a str, Self)> {
        let Some(block) = self.block else {
            return vec![];
        };

        self.module
            .block(block)
            .succs()
            .map(|(tag, succ)| (tag, BlockNode::new(self.module, Some(succ))))
            .collect()
    }

    pub(super) fn label(self, func_ref: FuncRef) -> label::Text<'static> {
        let Self { module, block } = self;
        let Some(block) = block else {
            let header = format!("def {}():", module.func(func_ref).name());
            return label::Text::LabelStr(header.into());
        };

        let block_data = module.block(block);
        let mut label = r#"<table border="0" cellborder="1" cellspacing="0">"#.to_string();

        // Write block header.
        label.push_str(&format!(
            r#"<tr><td bgcolor="gray" align="center" colspan="1">{}</td></tr>"#,
            dot2::escape_html(block_data.name())
        ));

        // Write block body.
        label.push_str(r#"<tr><td align="left" balign="left">"#);
        for inst in block_data.iter_inst() {
            let inst = inst.dump_string(module);
            label.push_str(&dot2::escape_html(&inst));
            label.push_str("<br/>");
        }
        label.push_str("</td></tr>");

        label.push_str("</table>");

        label::Text::HtmlStr(label.into())
    }
}
