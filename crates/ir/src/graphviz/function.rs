use dot2::{label::Text, GraphWalk, Id, Labeller, Style};

use super::block::BlockNode;
use crate::{FuncRef, Module};

pub(super) struct FunctionGraph<'a> {
    module: &'a Module,
    func_ref: FuncRef,
}

impl<'a> FunctionGraph<'a> {
    pub fn new(module: &'a Module, func_ref: FuncRef) -> Self {
        Self { module, func_ref }
    }
}

impl<'a> FunctionGraph<'a> {
    pub(super) fn blocks(&self) -> Vec<BlockNode<'a>> {
        let Self { module, func_ref } = *self;
        // The header node labels the graph with the function name. It is the
        // last element of the returned vector.
        module
            .func(func_ref)
            .iter_block()
            .map(|block| BlockNode::new(module, Some(block)))
            .chain(std::iter::once(BlockNode::new(module, None)))
            .collect()
    }
}

impl<'a> Labeller<'a> for FunctionGraph<'a> {
    type Node = BlockNode<'a>;
    type Edge = BlockEdge<'a>;
    type Subgraph = ();

    fn graph_id(&self) -> dot2::Result<Id<'a>> {
        let name = self.module.func(self.func_ref).name();
        Id::new(sanitize_id(name))
    }

    fn node_id(&self, n: &Self::Node) -> dot2::Result<Id<'a>> {
        match n.block {
            Some(block) => Id::new(format!("{block}")),
            None => Id::new("func_header"),
        }
    }

    fn node_shape(&self, _n: &Self::Node) -> Option<Text<'a>> {
        Some(Text::LabelStr("none".into()))
    }

    fn edge_style(&'a self, e: &Self::Edge) -> Style {
        if e.from.block.is_none() {
            Style::Invisible
        } else {
            Style::None
        }
    }

    fn node_label(&'a self, n: &Self::Node) -> dot2::Result<Text<'a>> {
        Ok(n.label(self.func_ref))
    }

    fn edge_label(&self, e: &Self::Edge) -> Text<'a> {
        Text::LabelStr(e.tag.into())
    }
}

impl<'a> GraphWalk<'a> for FunctionGraph<'a> {
    type Node = BlockNode<'a>;
    type Edge = BlockEdge<'a>;
    type Subgraph = ();

    fn nodes(&self) -> dot2::Nodes<'a, Self::Node> {
        self.blocks().into()
    }

    fn edges(&'a self) -> dot2::Edges<'a, Self::Edge> {
        let Self { module, func_ref } = *self;
        let mut blocks = self.blocks();

        let mut edges = vec![];
        if let (Some(header), Some(entry)) = (blocks.pop(), module.entry_block(func_ref)) {
            edges.push(BlockEdge {
                from: header,
                to: BlockNode::new(module, Some(entry)),
                tag: "",
            });
        }

        for block in blocks {
            for succ in block.succs() {
                edges.push(BlockEdge {
                    from: block,
                    to: succ.1,
                    tag: succ.0,
                });
            }
        }

        edges.into()
    }

    fn source(&self, edge: &Self::Edge) -> Self::Node {
        edge.from
    }

    fn target(&self, edge: &Self::Edge) -> Self::Node {
        edge.to
    }
}

#[derive(Clone, Copy)]
pub(super) struct BlockEdge<'a> {
    from: BlockNode<'a>,
    to: BlockNode<'a>,
    tag: &'a str,
}

/// Maps `name` onto the `[A-Za-z_][A-Za-z0-9_]*` alphabet of graphviz ids.
fn sanitize_id(name: &str) -> String {
    let mut id: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !id.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') {
        id.insert(0, '_');
    }
    id
}

#[cfg(test)]
mod test {
    use super::sanitize_id;

    #[test]
    fn sanitize() {
        assert_eq!(sanitize_id("foo"), "foo");
        assert_eq!(sanitize_id("my-fn.1"), "my_fn_1");
        assert_eq!(sanitize_id("0main"), "_0main");
        assert_eq!(sanitize_id(""), "_");
    }
}
