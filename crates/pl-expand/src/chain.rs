//! Recovered chain model. The scanner is the sole writer of these values;
//! lowering reads stage data and emits fresh nodes, never mutating the
//! original syntax in place.

use pl_core::span::Span;
use pl_core::tree::{Ident, NodeId};

/// Recognized stage vocabulary, case-sensitive.
pub const STAGE_THRU: &str = "thru";
pub const STAGE_THRU_END: &str = "thruEnd";
pub const STAGE_TAP: &str = "tap";
pub const STAGE_BAIL_IF: &str = "bailIf";
pub const STAGE_RECONCILE: &str = "reconcile";
pub const STAGE_AWAIT: &str = "await";

pub const STAGE_NAMES: &[&str] = &[
    STAGE_THRU,
    STAGE_THRU_END,
    STAGE_TAP,
    STAGE_BAIL_IF,
    STAGE_RECONCILE,
    STAGE_AWAIT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StageKind {
    /// Plain transform, current value passed first.
    Map,
    /// Transform with end-biased argument order, current value passed last.
    MapEnd,
    /// Side-effecting callback, value passes through unchanged.
    Tap,
    /// Predicate-gated short-circuit; freezes the value without stopping emission.
    BailIf,
    /// Collapse point for pending bails, with optional final transform.
    Reconcile,
    /// The current value must be awaited here.
    Suspend,
    /// Member-accessor shorthand for `Map`: addresses a property or method of
    /// the current value instead of a supplied callable.
    MemberMap,
    /// Member-accessor shorthand for `Tap`.
    MemberTap,
}

impl StageKind {
    /// Direct-call stage for a recognized member name.
    pub fn from_name(name: &str) -> Option<StageKind> {
        match name {
            STAGE_THRU => Some(StageKind::Map),
            STAGE_THRU_END => Some(StageKind::MapEnd),
            STAGE_TAP => Some(StageKind::Tap),
            STAGE_BAIL_IF => Some(StageKind::BailIf),
            STAGE_RECONCILE => Some(StageKind::Reconcile),
            STAGE_AWAIT => Some(StageKind::Suspend),
            _ => None,
        }
    }

    /// Member-shorthand variant, available for `thru`/`tap` only.
    pub fn member_shorthand(&self) -> Option<StageKind> {
        match self {
            StageKind::Map => Some(StageKind::MemberMap),
            StageKind::Tap => Some(StageKind::MemberTap),
            _ => None,
        }
    }

    /// Whether the stage requires a callable/predicate as its first argument.
    pub fn requires_callable(&self) -> bool {
        matches!(
            self,
            StageKind::Map | StageKind::MapEnd | StageKind::Tap | StageKind::BailIf
        )
    }
}

/// One chain operation as recovered from source.
///
/// `accessor` is set only for member-shorthand stages and is mutually
/// exclusive with `callee`: shorthand stages address a member of the current
/// value, direct stages carry the supplied callable (or predicate).
#[derive(Debug, Clone)]
pub struct Stage {
    pub kind: StageKind,
    pub callee: Option<NodeId>,
    pub extra_args: Vec<NodeId>,
    pub accessor: Option<Ident>,
    pub span: Span,
}

/// An ordered sequence of stages rooted at an initial value, terminated by a
/// zero-argument finalizing call.
///
/// `root = None` signals reusable-function mode: the compiled output becomes
/// a single-parameter function rather than an evaluated value.
#[derive(Debug, Clone)]
pub struct Chain {
    pub root: Option<NodeId>,
    pub stages: Vec<Stage>,
    /// The finalizing call node; lowering's output replaces it in place.
    pub terminal: NodeId,
}

impl Chain {
    pub fn is_reusable(&self) -> bool {
        self.root.is_none()
    }
}
