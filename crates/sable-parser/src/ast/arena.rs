//! NodeArena: flat node storage for one parse.

use sable_common::interner::{Atom, Interner};
use sable_common::limits::ARENA_NODES_PER_SOURCE_BYTE_DIVISOR;
use sable_common::SourceSpan;
use serde::Serialize;

use super::node::{Node, NodeData, NodeIndex};

/// All nodes of one parse, addressed by `NodeIndex`.
///
/// The arena also carries the interner the lexer filled, so atoms stored in
/// nodes can be resolved without the parser.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
    #[serde(skip)]
    interner: Interner,
}

impl NodeArena {
    /// Maximum pre-allocation to avoid capacity overflow in huge files.
    const MAX_NODE_PREALLOC: usize = 5_000_000;

    pub fn new() -> NodeArena {
        NodeArena::default()
    }

    /// Arena sized for a source text of `source_len` bytes.
    pub fn for_source_len(source_len: usize) -> NodeArena {
        let capacity = (source_len / ARENA_NODES_PER_SOURCE_BYTE_DIVISOR).min(Self::MAX_NODE_PREALLOC);
        NodeArena {
            nodes: Vec::with_capacity(capacity),
            interner: Interner::default(),
        }
    }

    /// Set the interner (called after parsing to transfer ownership from the lexer)
    pub fn set_interner(&mut self, interner: Interner) {
        self.interner = interner;
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Text of an atom; `Atom::NONE` resolves to the empty string.
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    #[inline]
    pub fn add(&mut self, span: SourceSpan, data: NodeData) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node { span, data });
        index
    }

    #[inline]
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get(index.0 as usize)
        }
    }

    #[inline]
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        if index.is_none() {
            None
        } else {
            self.nodes.get_mut(index.0 as usize)
        }
    }

    /// Payload of a node, if the index is valid.
    #[inline]
    pub fn data(&self, index: NodeIndex) -> Option<&NodeData> {
        self.get(index).map(|node| &node.data)
    }

    /// Drop every node added after the first `len`.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get() {
        let mut arena = NodeArena::new();
        let a = arena.add(SourceSpan::new(0, 1), NodeData::Number(1.0));
        let b = arena.add(SourceSpan::new(2, 3), NodeData::Null);
        assert_eq!(a, NodeIndex(0));
        assert_eq!(b, NodeIndex(1));
        assert_eq!(arena.data(a), Some(&NodeData::Number(1.0)));
        assert_eq!(arena.get(NodeIndex::NONE), None);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_interner_transfer() {
        let mut interner = Interner::new();
        let atom = interner.intern("x");
        let mut arena = NodeArena::for_source_len(64);
        arena.set_interner(interner);
        assert_eq!(arena.resolve(atom), "x");
    }
}
