//! Chain recognition. Starting at each pipeline-entry reference, the scanner
//! walks parent indices upward, recovering one stage per recognized member
//! call until the finalizing zero-argument invocation is reached. Entries
//! nested inside a stage's arguments are resolved first, so an outer stage
//! only ever attaches already-lowered values.

use std::collections::HashSet;

use itertools::Itertools;
use pl_core::diagnostics::DiagnosticCode;
use pl_core::error::{Error, Result};
use pl_core::symbol::SymbolGen;
use pl_core::tree::{NodeId, NodeKind, Tree};
use tracing::{debug, trace};

use crate::chain::{Chain, Stage, StageKind, STAGE_NAMES};
use crate::lower::lower_chain;
use crate::{expand_bail, expand_ensure};

#[derive(Debug, Clone)]
pub struct ExpandOptions {
    /// Substitute trivial single-expression callbacks with inline bindings
    /// instead of emitting a call.
    pub inline_trivial_callbacks: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            inline_trivial_callbacks: true,
        }
    }
}

/// Expand every pipeline entry in `entries` (source order), replacing each
/// finalized chain's call site in place. `source` is only used to attach
/// excerpts to diagnostics; `None` disables excerpt rendering.
pub fn expand_unit(tree: &mut Tree, entries: &[NodeId], source: Option<&str>) -> Result<()> {
    Expander::new().expand_unit(tree, entries, source)
}

pub struct Expander {
    options: ExpandOptions,
    symbols: SymbolGen,
    processed: HashSet<NodeId>,
}

impl Default for Expander {
    fn default() -> Self {
        Self::new()
    }
}

impl Expander {
    pub fn new() -> Self {
        Self::with_options(ExpandOptions::default())
    }

    pub fn with_options(options: ExpandOptions) -> Self {
        Self {
            options,
            symbols: SymbolGen::new(),
            processed: HashSet::new(),
        }
    }

    pub fn expand_unit(
        &mut self,
        tree: &mut Tree,
        entries: &[NodeId],
        source: Option<&str>,
    ) -> Result<()> {
        debug!("expanding unit with {} pipeline entries", entries.len());
        for (idx, &entry) in entries.iter().enumerate() {
            self.process_entry(tree, entry, &entries[idx + 1..])
                .map_err(|err| attach_excerpt(err, source))?;
        }
        Ok(())
    }

    /// Recover, lower and splice the chain rooted at `entry`. Idempotent:
    /// an already-processed entry is a no-op.
    fn process_entry(&mut self, tree: &mut Tree, entry: NodeId, pending: &[NodeId]) -> Result<()> {
        if self.processed.contains(&entry) {
            return Ok(());
        }

        let entry_call = match tree.parent(entry) {
            Some(parent) => parent,
            None => expand_bail!(
                DiagnosticCode::EntryNotInvoked,
                "Expected pipeline entry to be invoked as a function",
                tree.span(entry)
            ),
        };
        let args = match tree.kind(entry_call) {
            NodeKind::Call(call) if call.callee == entry => call.args.clone(),
            _ => expand_bail!(
                DiagnosticCode::EntryNotInvoked,
                "Expected pipeline entry to be invoked as a function",
                tree.span(entry)
            ),
        };
        self.ensure_args_processed(tree, &args, pending)?;
        expand_ensure!(
            args.len() <= 1,
            DiagnosticCode::EntryArity,
            "Expected pipeline entry to be invoked with at most one argument",
            tree.span(entry_call)
        );
        let root = args.first().copied();

        let chain = self.scan_chain(tree, entry_call, root, pending)?;
        debug!(
            "lowering chain with {} stages (reusable: {})",
            chain.stages.len(),
            chain.is_reusable()
        );
        let lowered = lower_chain(tree, &chain, &mut self.symbols, &self.options)?;
        if lowered.suspend_required && !chain.is_reusable() {
            self.check_suspend_context(tree, chain.terminal)?;
        }
        tree.replace_with(chain.terminal, lowered.expr);
        self.processed.insert(entry);
        Ok(())
    }

    /// Walk upward from the entry call, collecting stages until the
    /// finalizing call.
    fn scan_chain(
        &mut self,
        tree: &mut Tree,
        start: NodeId,
        root: Option<NodeId>,
        pending: &[NodeId],
    ) -> Result<Chain> {
        let mut current = start;
        let mut stages = Vec::new();
        loop {
            let parent = match tree.parent(current) {
                Some(parent) => parent,
                None => expand_bail!(
                    DiagnosticCode::UnterminatedChain,
                    "Unterminated pipe chain",
                    tree.span(current)
                ),
            };
            match tree.kind(parent).clone() {
                NodeKind::Member(member) if member.object == current => {
                    let stage_span = tree.span(parent);
                    let name = member.property.as_str().to_string();
                    let kind = match StageKind::from_name(&name) {
                        Some(kind) => kind,
                        None => expand_bail!(
                            DiagnosticCode::UnknownStage,
                            format!(
                                "Invocation of unknown member `{}` on pipe chain, expected one of: {}",
                                name,
                                STAGE_NAMES.iter().join(", ")
                            ),
                            stage_span
                        ),
                    };
                    let above = match tree.parent(parent) {
                        Some(above) => above,
                        None => expand_bail!(
                            DiagnosticCode::UnterminatedChain,
                            "Unterminated pipe chain",
                            stage_span
                        ),
                    };
                    match tree.kind(above).clone() {
                        NodeKind::Call(call) if call.callee == parent => {
                            self.ensure_args_processed(tree, &call.args, pending)?;
                            trace!("recognized stage `{}` with {} args", name, call.args.len());
                            stages.push(build_stage(kind, &name, &call.args, stage_span)?);
                            current = above;
                        }
                        NodeKind::Member(accessor) if accessor.object == parent => {
                            let short = match kind.member_shorthand() {
                                Some(short) => short,
                                None => expand_bail!(
                                    DiagnosticCode::StageNotInvoked,
                                    format!(
                                        "Member shorthand is not available for `{}`",
                                        name
                                    ),
                                    tree.span(above)
                                ),
                            };
                            let call_node = match tree.parent(above) {
                                Some(node) => node,
                                None => expand_bail!(
                                    DiagnosticCode::StageNotInvoked,
                                    format!("Expected member `{}` to be invoked", accessor.property),
                                    tree.span(above)
                                ),
                            };
                            let args = match tree.kind(call_node) {
                                NodeKind::Call(call) if call.callee == above => call.args.clone(),
                                _ => expand_bail!(
                                    DiagnosticCode::StageNotInvoked,
                                    format!("Expected member `{}` to be invoked", accessor.property),
                                    tree.span(above)
                                ),
                            };
                            self.ensure_args_processed(tree, &args, pending)?;
                            trace!(
                                "recognized member-shorthand stage `{}.{}`",
                                name,
                                accessor.property
                            );
                            stages.push(Stage {
                                kind: short,
                                callee: None,
                                extra_args: args,
                                accessor: Some(accessor.property.clone()),
                                span: tree.span(above),
                            });
                            current = call_node;
                        }
                        _ => expand_bail!(
                            DiagnosticCode::StageNotInvoked,
                            format!("Expected member `{}` to be invoked as a function", name),
                            stage_span
                        ),
                    }
                }
                NodeKind::Call(call) if call.callee == current => {
                    expand_ensure!(
                        call.args.is_empty(),
                        DiagnosticCode::TerminalArity,
                        "Expected finalizing call to take no arguments",
                        tree.span(parent)
                    );
                    return Ok(Chain {
                        root,
                        stages,
                        terminal: parent,
                    });
                }
                _ => expand_bail!(
                    DiagnosticCode::UnterminatedChain,
                    "Unterminated pipe chain",
                    tree.span(parent)
                ),
            }
        }
    }

    /// Resolve any pending entries nested inside `args` (depth-first,
    /// left-to-right) before the arguments are attached to a chain.
    fn ensure_args_processed(
        &mut self,
        tree: &mut Tree,
        args: &[NodeId],
        pending: &[NodeId],
    ) -> Result<()> {
        for &arg in args {
            for (idx, &entry) in pending.iter().enumerate() {
                if self.processed.contains(&entry) {
                    continue;
                }
                if tree.is_descendant(entry, arg) {
                    self.process_entry(tree, entry, &pending[idx + 1..])?;
                }
            }
        }
        Ok(())
    }

    /// Suspend stages require the nearest enclosing function literal to be
    /// suspendable. With no enclosing function the site is top level, which
    /// is allowed.
    fn check_suspend_context(&self, tree: &Tree, terminal: NodeId) -> Result<()> {
        if let Some(closure) = tree.enclosing_closure(terminal) {
            if let NodeKind::Closure(func) = tree.kind(closure) {
                expand_ensure!(
                    func.suspendable,
                    DiagnosticCode::SuspendContext,
                    "Await must be used inside a suspendable function",
                    tree.span(closure)
                );
            }
        }
        Ok(())
    }
}

fn build_stage(
    kind: StageKind,
    name: &str,
    args: &[NodeId],
    span: pl_core::span::Span,
) -> Result<Stage> {
    match kind {
        StageKind::Suspend => {
            expand_ensure!(
                args.is_empty(),
                DiagnosticCode::SuspendArity,
                "Expected await to be invoked without arguments",
                span
            );
        }
        StageKind::BailIf => {
            expand_ensure!(
                args.len() == 1,
                DiagnosticCode::StageArity,
                "Expected bailIf to be invoked with a single predicate",
                span
            );
        }
        StageKind::Reconcile => {
            expand_ensure!(
                args.len() <= 1,
                DiagnosticCode::StageArity,
                "Expected reconcile to be invoked with at most one transform",
                span
            );
        }
        _ if kind.requires_callable() => {
            expand_ensure!(
                !args.is_empty(),
                DiagnosticCode::StageArity,
                format!("Expected `{}` to be given a callable", name),
                span
            );
        }
        _ => {}
    }
    Ok(Stage {
        kind,
        callee: args.first().copied(),
        extra_args: args.iter().skip(1).copied().collect(),
        accessor: None,
        span,
    })
}

fn attach_excerpt(err: Error, source: Option<&str>) -> Error {
    match (err, source) {
        (Error::Expand(diagnostic), Some(source)) => {
            Error::Expand(diagnostic.with_excerpt_from(source))
        }
        (err, _) => err,
    }
}
