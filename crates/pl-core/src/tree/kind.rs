use super::NodeId;
use std::fmt::{Display, Formatter};

/// Plain identifier. Generated temporaries are ordinary idents produced by
/// `SymbolGen`; nothing downstream distinguishes them from user names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(value) => write!(f, "{}", value),
            Literal::Int(value) => write!(f, "{}", value),
            Literal::Str(value) => write!(f, "{:?}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOp {
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Eq,
    Lt,
    Gt,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Eq => "===",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemberExpr {
    pub object: NodeId,
    pub property: Ident,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CallExpr {
    pub callee: NodeId,
    pub args: Vec<NodeId>,
}

/// Function literal. `body` is either a `Block` node (statement body) or a
/// bare expression node. `suspendable` is the suspend-capability flag the
/// scanner consults for suspend-context checks.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClosureExpr {
    pub params: Vec<Ident>,
    pub body: NodeId,
    pub suspendable: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AwaitExpr {
    pub expr: NodeId,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub expr: NodeId,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: NodeId,
    pub rhs: NodeId,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CondExpr {
    pub test: NodeId,
    pub then: NodeId,
    pub otherwise: NodeId,
}

/// Capability query: does `object.property` hold something invocable at the
/// value's interface? Evaluated by the host runtime; the compiler only emits
/// the single dispatch branch around it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CallableCheck {
    pub object: NodeId,
    pub property: Ident,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlockStmt {
    pub stmts: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LetStmt {
    pub name: Ident,
    pub init: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssignStmt {
    pub name: Ident,
    pub value: NodeId,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExprStmt {
    pub expr: NodeId,
}

/// Guard statement. Lowering only ever emits `if (!bailed) { ... }` blocks,
/// so there is no else arm.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IfStmt {
    pub test: NodeId,
    pub then_block: NodeId,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReturnStmt {
    pub expr: NodeId,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    Ident(Ident),
    Literal(Literal),
    Member(MemberExpr),
    Call(CallExpr),
    Closure(ClosureExpr),
    Await(AwaitExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Cond(CondExpr),
    CallableCheck(CallableCheck),
    Block(BlockStmt),
    Let(LetStmt),
    Assign(AssignStmt),
    ExprStmt(ExprStmt),
    If(IfStmt),
    Return(ReturnStmt),
}

impl NodeKind {
    /// Direct child node ids in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Ident(_) | NodeKind::Literal(_) => Vec::new(),
            NodeKind::Member(member) => vec![member.object],
            NodeKind::Call(call) => {
                let mut out = Vec::with_capacity(call.args.len() + 1);
                out.push(call.callee);
                out.extend(call.args.iter().copied());
                out
            }
            NodeKind::Closure(closure) => vec![closure.body],
            NodeKind::Await(inner) => vec![inner.expr],
            NodeKind::Unary(unary) => vec![unary.expr],
            NodeKind::Binary(binary) => vec![binary.lhs, binary.rhs],
            NodeKind::Cond(cond) => vec![cond.test, cond.then, cond.otherwise],
            NodeKind::CallableCheck(check) => vec![check.object],
            NodeKind::Block(block) => block.stmts.clone(),
            NodeKind::Let(stmt) => stmt.init.into_iter().collect(),
            NodeKind::Assign(stmt) => vec![stmt.value],
            NodeKind::ExprStmt(stmt) => vec![stmt.expr],
            NodeKind::If(stmt) => vec![stmt.test, stmt.then_block],
            NodeKind::Return(stmt) => vec![stmt.expr],
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block(_)
                | NodeKind::Let(_)
                | NodeKind::Assign(_)
                | NodeKind::ExprStmt(_)
                | NodeKind::If(_)
                | NodeKind::Return(_)
        )
    }

    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            NodeKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }
}
