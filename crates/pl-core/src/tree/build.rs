//! Constructor helpers. Hosts hand the expander a tree built through these,
//! and lowering synthesizes its replacement nodes the same way.

use super::*;
use crate::span::Span;

impl Tree {
    pub fn ident(&mut self, name: impl Into<String>, span: Span) -> NodeId {
        self.alloc(NodeKind::Ident(Ident::new(name)), span)
    }

    pub fn literal(&mut self, literal: Literal, span: Span) -> NodeId {
        self.alloc(NodeKind::Literal(literal), span)
    }

    pub fn int(&mut self, value: i64, span: Span) -> NodeId {
        self.literal(Literal::Int(value), span)
    }

    pub fn str(&mut self, value: impl Into<String>, span: Span) -> NodeId {
        self.literal(Literal::Str(value.into()), span)
    }

    pub fn bool(&mut self, value: bool, span: Span) -> NodeId {
        self.literal(Literal::Bool(value), span)
    }

    pub fn null(&mut self, span: Span) -> NodeId {
        self.literal(Literal::Null, span)
    }

    pub fn member(&mut self, object: NodeId, property: Ident, span: Span) -> NodeId {
        self.alloc(NodeKind::Member(MemberExpr { object, property }), span)
    }

    pub fn call(&mut self, callee: NodeId, args: Vec<NodeId>, span: Span) -> NodeId {
        self.alloc(NodeKind::Call(CallExpr { callee, args }), span)
    }

    pub fn closure(&mut self, params: Vec<Ident>, body: NodeId, span: Span) -> NodeId {
        self.alloc(
            NodeKind::Closure(ClosureExpr {
                params,
                body,
                suspendable: false,
            }),
            span,
        )
    }

    pub fn closure_suspendable(&mut self, params: Vec<Ident>, body: NodeId, span: Span) -> NodeId {
        self.alloc(
            NodeKind::Closure(ClosureExpr {
                params,
                body,
                suspendable: true,
            }),
            span,
        )
    }

    pub fn await_expr(&mut self, expr: NodeId, span: Span) -> NodeId {
        self.alloc(NodeKind::Await(AwaitExpr { expr }), span)
    }

    pub fn not(&mut self, expr: NodeId, span: Span) -> NodeId {
        self.alloc(
            NodeKind::Unary(UnaryExpr {
                op: UnaryOp::Not,
                expr,
            }),
            span,
        )
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId, span: Span) -> NodeId {
        self.alloc(NodeKind::Binary(BinaryExpr { op, lhs, rhs }), span)
    }

    pub fn cond(&mut self, test: NodeId, then: NodeId, otherwise: NodeId, span: Span) -> NodeId {
        self.alloc(
            NodeKind::Cond(CondExpr {
                test,
                then,
                otherwise,
            }),
            span,
        )
    }

    pub fn callable_check(&mut self, object: NodeId, property: Ident, span: Span) -> NodeId {
        self.alloc(NodeKind::CallableCheck(CallableCheck { object, property }), span)
    }

    pub fn block(&mut self, stmts: Vec<NodeId>, span: Span) -> NodeId {
        self.alloc(NodeKind::Block(BlockStmt { stmts }), span)
    }

    pub fn let_decl(&mut self, name: Ident, init: Option<NodeId>, span: Span) -> NodeId {
        self.alloc(NodeKind::Let(LetStmt { name, init }), span)
    }

    pub fn assign(&mut self, name: Ident, value: NodeId, span: Span) -> NodeId {
        self.alloc(NodeKind::Assign(AssignStmt { name, value }), span)
    }

    pub fn expr_stmt(&mut self, expr: NodeId, span: Span) -> NodeId {
        self.alloc(NodeKind::ExprStmt(ExprStmt { expr }), span)
    }

    pub fn if_stmt(&mut self, test: NodeId, then_block: NodeId, span: Span) -> NodeId {
        self.alloc(NodeKind::If(IfStmt { test, then_block }), span)
    }

    pub fn ret(&mut self, expr: NodeId, span: Span) -> NodeId {
        self.alloc(NodeKind::Return(ReturnStmt { expr }), span)
    }
}
