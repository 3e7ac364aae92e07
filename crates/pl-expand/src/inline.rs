//! Inline substitution of trivial callbacks. A stage callable that is a
//! non-suspendable function literal with a bare-expression body can skip the
//! call: each parameter becomes a fresh binding on the corresponding
//! argument and the body expression is spliced in as the running value.

use pl_core::diagnostics::DiagnosticCode;
use pl_core::error::Result;
use pl_core::span::Span;
use pl_core::symbol::SymbolGen;
use pl_core::tree::{NodeId, NodeKind, Tree};

use crate::expand_ensure;

/// Statements binding the callback's parameters, followed by the spliced
/// body expression.
pub struct Inlined {
    pub bindings: Vec<NodeId>,
    pub expr: NodeId,
}

/// Attempt to inline `callee(args...)`. Returns `None` when the callee is
/// not a trivial callback; suspendable callbacks are never inlined (splicing
/// the body would erase their deferred completion).
pub fn try_inline(
    tree: &mut Tree,
    symbols: &mut SymbolGen,
    callee: NodeId,
    args: &[NodeId],
    span: Span,
) -> Result<Option<Inlined>> {
    let closure = match tree.kind(callee) {
        NodeKind::Closure(closure) => closure.clone(),
        _ => return Ok(None),
    };
    if closure.suspendable || matches!(tree.kind(closure.body), NodeKind::Block(_)) {
        return Ok(None);
    }
    expand_ensure!(
        closure.params.len() == args.len(),
        DiagnosticCode::InlineArity,
        format!(
            "Inline callback declares {} parameter(s) but receives {} argument(s)",
            closure.params.len(),
            args.len()
        ),
        span
    );

    let mut bindings = Vec::with_capacity(args.len());
    let mut renames = Vec::with_capacity(args.len());
    for (param, &arg) in closure.params.iter().zip(args) {
        let fresh = symbols.fresh("pipe_arg");
        bindings.push(tree.let_decl(fresh.clone(), Some(arg), span));
        renames.push((param.name.clone(), fresh));
    }
    // full consistent rename: nested function literals redeclaring the name
    // are renamed too, so shadowing relationships are unchanged
    for (from, to) in &renames {
        rename_in(tree, closure.body, from, to.as_str());
    }
    Ok(Some(Inlined {
        bindings,
        expr: closure.body,
    }))
}

fn rename_in(tree: &mut Tree, node: NodeId, from: &str, to: &str) {
    match tree.kind_mut(node) {
        NodeKind::Ident(ident) if ident.name == from => {
            ident.name = to.to_string();
        }
        NodeKind::Closure(closure) => {
            for param in &mut closure.params {
                if param.name == from {
                    param.name = to.to_string();
                }
            }
        }
        NodeKind::Let(stmt) if stmt.name.name == from => {
            stmt.name.name = to.to_string();
        }
        NodeKind::Assign(stmt) if stmt.name.name == from => {
            stmt.name.name = to.to_string();
        }
        // member/capability property names are not bindings
        _ => {}
    }
    for child in tree.children(node) {
        rename_in(tree, child, from, to);
    }
}
