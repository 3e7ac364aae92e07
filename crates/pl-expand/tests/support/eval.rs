// Reference evaluator over the expression tree, used to check that lowered
// chains compute the same values the surface chain promises. Awaits are
// evaluated synchronously (the operand's value passes straight through),
// which is all the lowering semantics need.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use pl_core::tree::{BinaryOp, Literal, NodeId, NodeKind, Tree, UnaryOp};

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Closure {
        params: Vec<String>,
        body: NodeId,
        env: Env,
        suspendable: bool,
    },
    Native(Rc<dyn Fn(&[Value]) -> Value>),
    Object(Rc<RefCell<HashMap<String, Value>>>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Closure { params, .. } => write!(f, "closure/{}", params.len()),
            Value::Native(_) => write!(f, "native"),
            Value::Object(_) => write!(f, "object"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Closure { .. } | Value::Native(_))
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    fn display(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Str(s) => s.clone(),
            _ => "[value]".into(),
        }
    }
}

pub type Env = Rc<RefCell<Scope>>;

pub struct Scope {
    vars: HashMap<String, Value>,
    parent: Option<Env>,
}

pub fn root_env() -> Env {
    Rc::new(RefCell::new(Scope {
        vars: HashMap::new(),
        parent: None,
    }))
}

pub fn child_env(parent: &Env) -> Env {
    Rc::new(RefCell::new(Scope {
        vars: HashMap::new(),
        parent: Some(parent.clone()),
    }))
}

pub fn define(env: &Env, name: &str, value: Value) {
    env.borrow_mut().vars.insert(name.to_string(), value);
}

fn lookup(env: &Env, name: &str) -> Value {
    let scope = env.borrow();
    if let Some(value) = scope.vars.get(name) {
        return value.clone();
    }
    match &scope.parent {
        Some(parent) => lookup(parent, name),
        None => panic!("unbound variable {name}"),
    }
}

fn set(env: &Env, name: &str, value: Value) {
    let mut scope = env.borrow_mut();
    if scope.vars.contains_key(name) {
        scope.vars.insert(name.to_string(), value);
        return;
    }
    match scope.parent.clone() {
        Some(parent) => {
            drop(scope);
            set(&parent, name, value);
        }
        None => {
            scope.vars.insert(name.to_string(), value);
        }
    }
}

pub fn native(f: impl Fn(&[Value]) -> Value + 'static) -> Value {
    Value::Native(Rc::new(f))
}

pub fn eval(tree: &Tree, id: NodeId, env: &Env) -> Value {
    match tree.kind(id) {
        NodeKind::Ident(ident) => lookup(env, ident.as_str()),
        NodeKind::Literal(lit) => match lit {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Str(s) => Value::Str(s.clone()),
        },
        NodeKind::Member(member) => {
            let object = eval(tree, member.object, env);
            read_property(&object, member.property.as_str())
        }
        NodeKind::Call(call) => {
            let callee = eval(tree, call.callee, env);
            let args: Vec<Value> = call.args.iter().map(|a| eval(tree, *a, env)).collect();
            call_value(tree, &callee, &args)
        }
        NodeKind::Closure(closure) => Value::Closure {
            params: closure.params.iter().map(|p| p.as_str().to_string()).collect(),
            body: closure.body,
            env: env.clone(),
            suspendable: closure.suspendable,
        },
        NodeKind::Await(awaited) => eval(tree, awaited.expr, env),
        NodeKind::Unary(unary) => match unary.op {
            UnaryOp::Not => Value::Bool(!eval(tree, unary.expr, env).truthy()),
        },
        NodeKind::Binary(binary) => {
            let lhs = eval(tree, binary.lhs, env);
            let rhs = eval(tree, binary.rhs, env);
            binary_op(binary.op, &lhs, &rhs)
        }
        NodeKind::Cond(cond) => {
            if eval(tree, cond.test, env).truthy() {
                eval(tree, cond.then, env)
            } else {
                eval(tree, cond.otherwise, env)
            }
        }
        NodeKind::CallableCheck(check) => {
            let object = eval(tree, check.object, env);
            Value::Bool(read_property(&object, check.property.as_str()).is_callable())
        }
        other => panic!("cannot evaluate statement node {:?}", other),
    }
}

pub fn call_value(tree: &Tree, callee: &Value, args: &[Value]) -> Value {
    match callee {
        Value::Native(f) => f(args),
        Value::Closure {
            params, body, env, ..
        } => {
            let frame = child_env(env);
            for (param, arg) in params.iter().zip(args.iter()) {
                define(&frame, param, arg.clone());
            }
            if let NodeKind::Block(_) = tree.kind(*body) {
                exec_block(tree, *body, &frame).unwrap_or(Value::Null)
            } else {
                eval(tree, *body, &frame)
            }
        }
        other => panic!("not callable: {:?}", other),
    }
}

fn read_property(object: &Value, name: &str) -> Value {
    match object {
        Value::Object(fields) => fields
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or(Value::Null),
        other => panic!("no property {name} on {:?}", other),
    }
}

fn binary_op(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    match op {
        BinaryOp::Add => match (lhs, rhs) {
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                Value::Str(format!("{}{}", lhs.display(), rhs.display()))
            }
            (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
            _ => panic!("bad operands for +"),
        },
        BinaryOp::Sub => int_op(lhs, rhs, |a, b| Value::Int(a - b)),
        BinaryOp::Mul => int_op(lhs, rhs, |a, b| Value::Int(a * b)),
        BinaryOp::Eq => Value::Bool(lhs == rhs),
        BinaryOp::Lt => int_op(lhs, rhs, |a, b| Value::Bool(a < b)),
        BinaryOp::Gt => int_op(lhs, rhs, |a, b| Value::Bool(a > b)),
    }
}

fn int_op(lhs: &Value, rhs: &Value, f: impl Fn(i64, i64) -> Value) -> Value {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => f(*a, *b),
        _ => panic!("expected integer operands"),
    }
}

/// Runs block statements; `Some` means a `return` fired with that value.
fn exec_block(tree: &Tree, block: NodeId, env: &Env) -> Option<Value> {
    let stmts = match tree.kind(block) {
        NodeKind::Block(b) => b.stmts.clone(),
        other => panic!("expected block, got {:?}", other),
    };
    for stmt in stmts {
        match tree.kind(stmt) {
            NodeKind::Let(decl) => {
                let init = decl
                    .init
                    .map(|e| eval(tree, e, env))
                    .unwrap_or(Value::Null);
                define(env, decl.name.as_str(), init);
            }
            NodeKind::Assign(assign) => {
                let value = eval(tree, assign.value, env);
                set(env, assign.name.as_str(), value);
            }
            NodeKind::ExprStmt(expr) => {
                eval(tree, expr.expr, env);
            }
            NodeKind::If(if_stmt) => {
                if eval(tree, if_stmt.test, env).truthy() {
                    if let Some(returned) = exec_block(tree, if_stmt.then_block, env) {
                        return Some(returned);
                    }
                }
            }
            NodeKind::Return(ret) => {
                return Some(eval(tree, ret.expr, env));
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }
    None
}
