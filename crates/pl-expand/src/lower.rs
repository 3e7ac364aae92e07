//! Stage lowering. One `LoweringState` lives per chain: temporaries are
//! hoisted into a declaration block, guarded statements accumulate in the
//! active block (nested one level per unreconciled bail), and the running
//! value stays a plain expression until a stage forces a statement. A chain
//! that never forced one compiles to its bare expression.

use pl_core::error::Result;
use pl_core::span::Span;
use pl_core::symbol::SymbolGen;
use pl_core::tree::{Ident, NodeId, NodeKind, Tree};
use tracing::trace;

use crate::chain::{Chain, Stage, StageKind};
use crate::inline::try_inline;
use crate::scanner::ExpandOptions;

/// One unreconciled bail: the flag recording whether the predicate fired and
/// the temporary holding the value frozen at that point.
#[derive(Debug, Clone)]
pub struct PendingBail {
    pub bail_flag: Ident,
    pub frozen_value: Ident,
}

/// Result of lowering one chain. `expr` replaces the finalizing call site;
/// `suspend_required` propagates outward for the enclosing-context check.
#[derive(Debug, Clone, Copy)]
pub struct LoweredChain {
    pub expr: NodeId,
    pub suspend_required: bool,
}

/// Mutable compilation state, created fresh per chain and discarded once the
/// replacement expression is emitted.
pub struct LoweringState {
    pub current: NodeId,
    pub suspend_required: bool,
    pub pending_bails: Vec<PendingBail>,
    decls: Vec<Ident>,
    top_block: NodeId,
    active_block: NodeId,
    tap_snapshot: Option<Ident>,
    tap_effect: Option<NodeId>,
    reusable_param: Option<Ident>,
}

pub fn lower_chain(
    tree: &mut Tree,
    chain: &Chain,
    symbols: &mut SymbolGen,
    options: &ExpandOptions,
) -> Result<LoweredChain> {
    let span = Span::dummy();
    let top_block = tree.block(Vec::new(), span);
    let (root, reusable_param) = match chain.root {
        Some(root) => (root, None),
        None => {
            let param = symbols.fresh("pipe_input");
            (tree.ident(param.as_str(), span), Some(param))
        }
    };

    // arguments may carry already-lowered nested chains that suspend; the
    // outer chain must then suspend too, or the wrapper would strand their
    // awaits inside a plain function
    let mut suspend_required = chain
        .root
        .is_some_and(|root| subtree_suspends(tree, root));
    for stage in &chain.stages {
        for &arg in stage.callee.iter().chain(stage.extra_args.iter()) {
            suspend_required = suspend_required || subtree_suspends(tree, arg);
        }
    }

    let mut state = LoweringState {
        current: root,
        suspend_required,
        pending_bails: Vec::new(),
        decls: Vec::new(),
        top_block,
        active_block: top_block,
        tap_snapshot: None,
        tap_effect: None,
        reusable_param,
    };

    for stage in &chain.stages {
        state.lower_stage(tree, symbols, options, stage)?;
    }
    if !state.pending_bails.is_empty() {
        // implicit reconcile with no transform
        state.reconcile(tree, symbols, options, None, span)?;
    }
    Ok(state.finalize(tree, chain.is_reusable()))
}

/// True when evaluating `node` in place suspends: an `Await` anywhere in the
/// subtree that is not fenced off behind a function literal.
fn subtree_suspends(tree: &Tree, node: NodeId) -> bool {
    match tree.kind(node) {
        NodeKind::Await(_) => true,
        NodeKind::Closure(_) => false,
        _ => tree
            .children(node)
            .into_iter()
            .any(|child| subtree_suspends(tree, child)),
    }
}

impl LoweringState {
    fn lower_stage(
        &mut self,
        tree: &mut Tree,
        symbols: &mut SymbolGen,
        options: &ExpandOptions,
        stage: &Stage,
    ) -> Result<()> {
        trace!("lowering stage {:?}", stage.kind);
        if !matches!(stage.kind, StageKind::Suspend) {
            self.tap_effect = None;
        }
        if !matches!(stage.kind, StageKind::Tap | StageKind::MemberTap) {
            self.tap_snapshot = None;
        }

        let span = stage.span;
        match stage.kind {
            StageKind::Map => {
                let callee = self.stage_callee(stage);
                let mut args = vec![self.current];
                args.extend(stage.extra_args.iter().copied());
                self.current = self.apply_callable(tree, symbols, options, callee, args, span)?;
            }
            StageKind::MapEnd => {
                let callee = self.stage_callee(stage);
                let mut args: Vec<NodeId> = stage.extra_args.clone();
                args.push(self.current);
                self.current = self.apply_callable(tree, symbols, options, callee, args, span)?;
            }
            StageKind::MemberMap => {
                let accessor = self.stage_accessor(stage);
                if stage.extra_args.is_empty() {
                    // the value's shape is unknown: freeze it, then emit one
                    // polymorphic-dispatch branch on a capability query
                    let temp = self.hoist(symbols, "pipe_temp");
                    self.emit_assign(tree, &temp, self.current, span);
                    let check_obj = tree.ident(temp.as_str(), span);
                    let check = tree.callable_check(check_obj, accessor.clone(), span);
                    let call_obj = tree.ident(temp.as_str(), span);
                    let call_member = tree.member(call_obj, accessor.clone(), span);
                    let call = tree.call(call_member, Vec::new(), span);
                    let read_obj = tree.ident(temp.as_str(), span);
                    let read = tree.member(read_obj, accessor, span);
                    self.current = tree.cond(check, call, read, span);
                } else {
                    let member = tree.member(self.current, accessor, span);
                    self.current = tree.call(member, stage.extra_args.clone(), span);
                }
            }
            StageKind::Tap | StageKind::MemberTap => {
                let snapshot = match self.tap_snapshot.clone() {
                    Some(snapshot) => snapshot,
                    None => {
                        let snapshot = self.hoist(symbols, "pipe_result");
                        self.emit_assign(tree, &snapshot, self.current, span);
                        self.current = tree.ident(snapshot.as_str(), span);
                        self.tap_snapshot = Some(snapshot.clone());
                        snapshot
                    }
                };
                let effect = match stage.kind {
                    StageKind::Tap => {
                        let callee = self.stage_callee(stage);
                        let mut args = vec![tree.ident(snapshot.as_str(), span)];
                        args.extend(stage.extra_args.iter().copied());
                        self.apply_callable(tree, symbols, options, callee, args, span)?
                    }
                    _ => {
                        let accessor = self.stage_accessor(stage);
                        let object = tree.ident(snapshot.as_str(), span);
                        let member = tree.member(object, accessor, span);
                        tree.call(member, stage.extra_args.clone(), span)
                    }
                };
                let stmt = tree.expr_stmt(effect, span);
                self.push_stmt(tree, stmt);
                self.tap_effect = Some(stmt);
            }
            StageKind::Suspend => {
                self.suspend_required = true;
                match self.tap_effect {
                    Some(stmt) => {
                        // the side effect's own completion is awaited, not the
                        // pre-effect snapshot; redundant suspends collapse
                        let effect = match tree.kind(stmt) {
                            NodeKind::ExprStmt(effect_stmt) => effect_stmt.expr,
                            _ => unreachable!("tap effect is always an expression statement"),
                        };
                        if !matches!(tree.kind(effect), NodeKind::Await(_)) {
                            let awaited = tree.await_expr(effect, span);
                            if let NodeKind::ExprStmt(effect_stmt) = tree.kind_mut(stmt) {
                                effect_stmt.expr = awaited;
                            }
                            tree.set_parent(awaited, stmt);
                        }
                    }
                    None => {
                        if !matches!(tree.kind(self.current), NodeKind::Await(_)) {
                            self.current = tree.await_expr(self.current, span);
                        }
                    }
                }
            }
            StageKind::BailIf => {
                let predicate = self.stage_callee(stage);
                let frozen = self.hoist(symbols, "pipe_temp");
                self.emit_assign(tree, &frozen, self.current, span);
                let flag = self.hoist(symbols, "pipe_temp");
                let frozen_ref = tree.ident(frozen.as_str(), span);
                let verdict =
                    self.apply_callable(tree, symbols, options, predicate, vec![frozen_ref], span)?;
                self.emit_assign(tree, &flag, verdict, span);
                self.pending_bails.push(PendingBail {
                    bail_flag: flag.clone(),
                    frozen_value: frozen.clone(),
                });
                // later stages nest inside the not-bailed guard
                let flag_ref = tree.ident(flag.as_str(), span);
                let test = tree.not(flag_ref, span);
                let body = tree.block(Vec::new(), span);
                let guard = tree.if_stmt(test, body, span);
                self.push_stmt(tree, guard);
                self.active_block = body;
                self.current = tree.ident(frozen.as_str(), span);
            }
            StageKind::Reconcile => {
                self.reconcile(tree, symbols, options, stage.callee, span)?;
            }
        }
        Ok(())
    }

    /// Collapse pending bail outcomes, most recently pushed outermost, then
    /// optionally apply the final transform.
    fn reconcile(
        &mut self,
        tree: &mut Tree,
        symbols: &mut SymbolGen,
        options: &ExpandOptions,
        transform: Option<NodeId>,
        span: Span,
    ) -> Result<()> {
        if !self.pending_bails.is_empty() {
            let final_value = self.hoist(symbols, "pipe_temp");
            self.emit_assign(tree, &final_value, self.current, span);
            // break out of the nested guards
            self.active_block = self.top_block;
            let mut selection = tree.ident(final_value.as_str(), span);
            for bail in &self.pending_bails {
                let flag = tree.ident(bail.bail_flag.as_str(), span);
                let value = tree.ident(bail.frozen_value.as_str(), span);
                selection = tree.cond(flag, value, selection, span);
            }
            self.pending_bails.clear();
            self.current = selection;
        }
        if let Some(transform) = transform {
            self.current =
                self.apply_callable(tree, symbols, options, transform, vec![self.current], span)?;
        }
        Ok(())
    }

    /// Either inline a trivial callback (bindings land in the active block)
    /// or emit a plain call.
    fn apply_callable(
        &mut self,
        tree: &mut Tree,
        symbols: &mut SymbolGen,
        options: &ExpandOptions,
        callee: NodeId,
        args: Vec<NodeId>,
        span: Span,
    ) -> Result<NodeId> {
        if options.inline_trivial_callbacks {
            if let Some(inlined) = try_inline(tree, symbols, callee, &args, span)? {
                for binding in inlined.bindings {
                    self.push_stmt(tree, binding);
                }
                return Ok(inlined.expr);
            }
        }
        Ok(tree.call(callee, args, span))
    }

    fn hoist(&mut self, symbols: &mut SymbolGen, hint: &str) -> Ident {
        let name = symbols.fresh(hint);
        self.decls.push(name.clone());
        name
    }

    fn emit_assign(&mut self, tree: &mut Tree, name: &Ident, value: NodeId, span: Span) {
        let stmt = tree.assign(name.clone(), value, span);
        self.push_stmt(tree, stmt);
    }

    fn push_stmt(&mut self, tree: &mut Tree, stmt: NodeId) {
        tree.block_push(self.active_block, stmt);
    }

    fn stage_callee(&self, stage: &Stage) -> NodeId {
        match stage.callee {
            Some(callee) => callee,
            None => unreachable!("scanner guarantees a callable for {:?}", stage.kind),
        }
    }

    fn stage_accessor(&self, stage: &Stage) -> Ident {
        match &stage.accessor {
            Some(accessor) => accessor.clone(),
            None => unreachable!("scanner guarantees an accessor for {:?}", stage.kind),
        }
    }

    /// Wrap up: bare expression when nothing forced a statement, otherwise a
    /// function body of declarations, guarded statements and a final return,
    /// left standalone in reusable mode and invoked (awaited when suspending)
    /// otherwise.
    fn finalize(self, tree: &mut Tree, reusable: bool) -> LoweredChain {
        let span = Span::dummy();
        let has_statements = !self.decls.is_empty() || tree.block_len(self.top_block) > 0;
        let suspend_required = self.suspend_required;

        if !has_statements {
            if !reusable {
                return LoweredChain {
                    expr: self.current,
                    suspend_required,
                };
            }
            let param = match self.reusable_param.clone() {
                Some(param) => param,
                None => unreachable!("reusable chains always carry a generated parameter"),
            };
            let expr = if suspend_required {
                tree.closure_suspendable(vec![param], self.current, span)
            } else {
                tree.closure(vec![param], self.current, span)
            };
            return LoweredChain {
                expr,
                suspend_required,
            };
        }

        let mut stmts = Vec::with_capacity(self.decls.len() + tree.block_len(self.top_block) + 1);
        for name in &self.decls {
            stmts.push(tree.let_decl(name.clone(), None, span));
        }
        if let NodeKind::Block(top) = tree.kind(self.top_block) {
            stmts.extend(top.stmts.clone());
        }
        stmts.push(tree.ret(self.current, span));
        let body = tree.block(stmts, span);

        let params = match (&self.reusable_param, reusable) {
            (Some(param), true) => vec![param.clone()],
            _ => Vec::new(),
        };
        let wrapper = if suspend_required {
            tree.closure_suspendable(params, body, span)
        } else {
            tree.closure(params, body, span)
        };
        if reusable {
            return LoweredChain {
                expr: wrapper,
                suspend_required,
            };
        }
        let invoked = tree.call(wrapper, Vec::new(), span);
        let expr = if suspend_required {
            tree.await_expr(invoked, span)
        } else {
            invoked
        };
        LoweredChain {
            expr,
            suspend_required,
        }
    }
}
