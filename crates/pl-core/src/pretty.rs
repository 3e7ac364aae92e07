//! Pretty-printing of tree nodes into a compact JS-like surface syntax.
//! Golden tests compare against this rendering, and diagnostics may embed it.

use crate::tree::{Literal, NodeId, NodeKind, Tree, UnaryOp};
use itertools::Itertools;

/// Configuration for pretty-printing tree nodes.
#[derive(Debug, Clone)]
pub struct PrettyOptions {
    /// Number of spaces to indent per nesting level.
    pub indent_size: usize,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self { indent_size: 4 }
    }
}

/// Render the subtree rooted at `id` with default options.
pub fn pretty(tree: &Tree, id: NodeId) -> String {
    pretty_with(tree, id, &PrettyOptions::default())
}

pub fn pretty_with(tree: &Tree, id: NodeId, options: &PrettyOptions) -> String {
    let mut printer = Printer {
        tree,
        options,
        out: String::new(),
        indent: 0,
    };
    if tree.kind(id).is_statement() {
        printer.stmt(id);
    } else {
        printer.expr(id);
    }
    printer.out
}

struct Printer<'a> {
    tree: &'a Tree,
    options: &'a PrettyOptions,
    out: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent * self.options.indent_size {
            self.out.push(' ');
        }
    }

    fn expr(&mut self, id: NodeId) {
        match self.tree.kind(id) {
            NodeKind::Ident(ident) => self.push(ident.as_str()),
            NodeKind::Literal(literal) => self.push(&literal.to_string()),
            NodeKind::Member(member) => {
                let object = member.object;
                let property = member.property.clone();
                self.operand(object, needs_parens_as_primary(self.tree.kind(object)));
                self.push(".");
                self.push(property.as_str());
            }
            NodeKind::Call(call) => {
                let callee = call.callee;
                let args = call.args.clone();
                self.operand(callee, needs_parens_as_primary(self.tree.kind(callee)));
                self.push("(");
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        self.push(", ");
                    }
                    self.expr(*arg);
                }
                self.push(")");
            }
            NodeKind::Closure(closure) => {
                let body = closure.body;
                let suspendable = closure.suspendable;
                let params = closure.params.iter().join(", ");
                if suspendable {
                    self.push("async ");
                }
                self.push(&format!("({}) => ", params));
                if matches!(self.tree.kind(body), NodeKind::Block(_)) {
                    self.braced_block(body);
                } else {
                    self.expr(body);
                }
            }
            NodeKind::Await(inner) => {
                let operand = inner.expr;
                self.push("await ");
                self.operand(operand, !is_atom(self.tree.kind(operand)));
            }
            NodeKind::Unary(unary) => {
                let operand = unary.expr;
                match unary.op {
                    UnaryOp::Not => self.push("!"),
                }
                self.operand(operand, needs_parens_as_primary(self.tree.kind(operand)));
            }
            NodeKind::Binary(binary) => {
                let (op, lhs, rhs) = (binary.op, binary.lhs, binary.rhs);
                self.operand(lhs, needs_parens_in_binary(self.tree.kind(lhs), op, true));
                self.push(&format!(" {} ", op.as_str()));
                self.operand(rhs, needs_parens_in_binary(self.tree.kind(rhs), op, false));
            }
            NodeKind::Cond(cond) => {
                let (test, then, otherwise) = (cond.test, cond.then, cond.otherwise);
                self.operand(test, matches!(self.tree.kind(test), NodeKind::Cond(_)));
                self.push(" ? ");
                self.operand(then, matches!(self.tree.kind(then), NodeKind::Cond(_)));
                self.push(" : ");
                // right-associative, nested selections print flat
                self.expr(otherwise);
            }
            NodeKind::CallableCheck(check) => {
                let object = check.object;
                let property = check.property.clone();
                self.push("is_callable(");
                self.operand(object, needs_parens_as_primary(self.tree.kind(object)));
                self.push(&format!(".{})", property));
            }
            other => panic!("expected expression node, found {:?}", other),
        }
    }

    fn operand(&mut self, id: NodeId, parens: bool) {
        if parens {
            self.push("(");
            self.expr(id);
            self.push(")");
        } else {
            self.expr(id);
        }
    }

    fn stmt(&mut self, id: NodeId) {
        match self.tree.kind(id) {
            NodeKind::Block(_) => self.braced_block(id),
            NodeKind::Let(stmt) => {
                let (name, init) = (stmt.name.clone(), stmt.init);
                match init {
                    Some(init) => {
                        self.push(&format!("let {} = ", name));
                        self.expr(init);
                        self.push(";");
                    }
                    None => self.push(&format!("let {};", name)),
                }
            }
            NodeKind::Assign(stmt) => {
                let (name, value) = (stmt.name.clone(), stmt.value);
                self.push(&format!("{} = ", name));
                self.expr(value);
                self.push(";");
            }
            NodeKind::ExprStmt(stmt) => {
                let expr = stmt.expr;
                self.expr(expr);
                self.push(";");
            }
            NodeKind::If(stmt) => {
                let (test, then_block) = (stmt.test, stmt.then_block);
                self.push("if (");
                self.expr(test);
                self.push(") ");
                self.braced_block(then_block);
            }
            NodeKind::Return(stmt) => {
                let expr = stmt.expr;
                self.push("return ");
                self.expr(expr);
                self.push(";");
            }
            other => panic!("expected statement node, found {:?}", other),
        }
    }

    fn braced_block(&mut self, block: NodeId) {
        let stmts = match self.tree.kind(block) {
            NodeKind::Block(body) => body.stmts.clone(),
            other => panic!("expected block node, found {:?}", other),
        };
        if stmts.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for stmt in stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }
}

fn is_atom(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Ident(_) | NodeKind::Literal(_) | NodeKind::CallableCheck(_)
    )
}

fn needs_parens_as_primary(kind: &NodeKind) -> bool {
    !matches!(
        kind,
        NodeKind::Ident(_)
            | NodeKind::Literal(Literal::Null)
            | NodeKind::Literal(Literal::Bool(_))
            | NodeKind::Literal(Literal::Str(_))
            | NodeKind::Literal(Literal::Int(_))
            | NodeKind::Member(_)
            | NodeKind::Call(_)
            | NodeKind::CallableCheck(_)
    )
}

fn needs_parens_in_binary(
    kind: &NodeKind,
    op: crate::tree::BinaryOp,
    is_lhs: bool,
) -> bool {
    match kind {
        NodeKind::Binary(inner) => !(is_lhs && inner.op == op),
        NodeKind::Cond(_) | NodeKind::Closure(_) | NodeKind::Await(_) => true,
        _ => false,
    }
}
