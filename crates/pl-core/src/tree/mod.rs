//! Owned, indexed expression-tree arena. Traversal (including the upward
//! parent walks the chain scanner depends on) goes through `NodeId` indices
//! instead of any host tree library's cursor API.

use crate::span::Span;
use std::fmt::{Display, Formatter};

mod build;
mod kind;

pub use kind::*;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub span: Span,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node and claim its children: every child's parent index is
    /// pointed at the new node.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let children = kind.children();
        self.nodes.push(Node {
            kind,
            parent: None,
            span,
        });
        for child in children {
            self.nodes[child.index()].parent = Some(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.index()].kind.children()
    }

    /// Replace `target`'s kind in place, keeping its identity, span and parent
    /// link so enclosing nodes stay valid. The new kind's children are
    /// reparented onto `target`.
    pub fn replace_kind(&mut self, target: NodeId, kind: NodeKind) {
        let children = kind.children();
        self.nodes[target.index()].kind = kind;
        for child in children {
            self.nodes[child.index()].parent = Some(target);
        }
    }

    /// Splice the subtree rooted at `source` over `target` in place.
    pub fn replace_with(&mut self, target: NodeId, source: NodeId) {
        let kind = self.nodes[source.index()].kind.clone();
        self.replace_kind(target, kind);
    }

    /// True when `id` sits below (or at) `ancestor` following parent indices.
    pub fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Nearest enclosing function literal, excluding `id` itself.
    pub fn enclosing_closure(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if matches!(self.kind(node), NodeKind::Closure(_)) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Re-point a node's parent index after manual kind surgery.
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        self.nodes[id.index()].parent = Some(parent);
    }

    /// Append a statement to a `Block` node.
    ///
    /// Panics if `block` is not a block; lowering only ever opens blocks it
    /// allocated itself.
    pub fn block_push(&mut self, block: NodeId, stmt: NodeId) {
        match &mut self.nodes[block.index()].kind {
            NodeKind::Block(body) => body.stmts.push(stmt),
            other => panic!("block_push on non-block node {:?}", other),
        }
        self.nodes[stmt.index()].parent = Some(block);
    }

    pub fn block_len(&self, block: NodeId) -> usize {
        match self.kind(block) {
            NodeKind::Block(body) => body.stmts.len(),
            _ => 0,
        }
    }
}
