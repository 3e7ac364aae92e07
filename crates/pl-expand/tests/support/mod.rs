#![allow(dead_code)]

// Shared fixtures: a small builder DSL for chain syntax and a reference
// evaluator for checking that lowered output computes the right values.

pub mod eval;

use pl_core::span::Span;
use pl_core::tree::{Ident, NodeId, Tree};

pub fn sp() -> Span {
    Span::dummy()
}

/// `Pipe(root)` / `Pipe()`: returns (entry reference, entry call).
pub fn pipe_entry(tree: &mut Tree, root: Option<NodeId>) -> (NodeId, NodeId) {
    let entry = tree.ident("Pipe", sp());
    let args = root.into_iter().collect();
    let call = tree.call(entry, args, sp());
    (entry, call)
}

/// `current.name(args...)`: one direct stage call, returns the call node.
pub fn stage(tree: &mut Tree, current: NodeId, name: &str, args: Vec<NodeId>) -> NodeId {
    let member = tree.member(current, Ident::new(name), sp());
    tree.call(member, args, sp())
}

/// `current.name.accessor(args...)`: member-shorthand stage.
pub fn member_stage(
    tree: &mut Tree,
    current: NodeId,
    name: &str,
    accessor: &str,
    args: Vec<NodeId>,
) -> NodeId {
    let member = tree.member(current, Ident::new(name), sp());
    let access = tree.member(member, Ident::new(accessor), sp());
    tree.call(access, args, sp())
}

/// The zero-argument finalizing call.
pub fn finalize(tree: &mut Tree, current: NodeId) -> NodeId {
    tree.call(current, Vec::new(), sp())
}

/// Function literal with the given parameter names and expression body.
pub fn arrow(tree: &mut Tree, params: &[&str], body: NodeId) -> NodeId {
    let params = params.iter().map(|name| Ident::new(*name)).collect();
    tree.closure(params, body, sp())
}

pub fn async_arrow(tree: &mut Tree, params: &[&str], body: NodeId) -> NodeId {
    let params = params.iter().map(|name| Ident::new(*name)).collect();
    tree.closure_suspendable(params, body, sp())
}
