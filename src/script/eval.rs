//! Evaluation of parsed expressions against a page's symbol table

use std::collections::HashMap;
use std::fmt;

use swc_ecma_ast::{BinaryOp, Expr, Lit, UnaryOp};
use tracing::{debug, warn};

use super::parse::parse_assignment;
use super::ScriptError;

/// Deepest expression tree the evaluator walks
const MAX_TREE_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Variable bindings a page defines once and every row reads
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    vars: HashMap<String, Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a page's setup script: `;`-separated assignments, in order.
    ///
    /// A fragment that does not parse or evaluate is logged and skipped;
    /// later fragments still run.
    pub fn from_setup(script: &str) -> Self {
        let mut table = Self::new();

        for fragment in script.split(';') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }

            let result = parse_assignment(fragment)
                .and_then(|assignment| Ok((assignment.name, table.eval(&assignment.value)?)));
            match result {
                Ok((name, value)) => {
                    debug!("setup: {} = {}", name, value);
                    table.set(name, value);
                }
                Err(e) => warn!("skipping setup statement {:?}: {}", fragment, e),
            }
        }

        table
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Evaluate integer and string literals, variables, parentheses, unary
    /// minus and `+ - * % ^`. Every other node is rejected.
    pub fn eval(&self, expr: &Expr) -> Result<Value, ScriptError> {
        self.eval_at(expr, 0)
    }

    fn eval_at(&self, expr: &Expr, depth: usize) -> Result<Value, ScriptError> {
        if depth > MAX_TREE_DEPTH {
            return Err(ScriptError::TooDeep);
        }

        match expr {
            Expr::Lit(Lit::Num(n)) => integer(n.value).map(Value::Int),
            Expr::Lit(Lit::Str(s)) => s
                .value
                .as_str()
                .map(|s| Value::Str(s.to_string()))
                .ok_or(ScriptError::Unsupported("string literal")),
            Expr::Ident(ident) => {
                let name = ident.sym.as_str();
                self.get(name)
                    .cloned()
                    .ok_or_else(|| ScriptError::UnknownVariable(name.to_string()))
            }
            Expr::Paren(paren) => self.eval_at(&paren.expr, depth + 1),
            Expr::Unary(unary) if unary.op == UnaryOp::Minus => {
                match self.eval_at(&unary.arg, depth + 1)? {
                    Value::Int(n) => n.checked_neg().map(Value::Int).ok_or(ScriptError::Overflow),
                    Value::Str(_) => Err(ScriptError::TypeMismatch("-")),
                }
            }
            Expr::Bin(bin) => {
                let op = BinOp::from_swc(bin.op).ok_or(ScriptError::Unsupported("operator"))?;
                let lhs = self.eval_at(&bin.left, depth + 1)?;
                let rhs = self.eval_at(&bin.right, depth + 1)?;
                apply(op, lhs, rhs)
            }
            _ => Err(ScriptError::Unsupported("expression")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Rem,
    Xor,
}

impl BinOp {
    fn from_swc(op: BinaryOp) -> Option<Self> {
        match op {
            BinaryOp::Add => Some(BinOp::Add),
            BinaryOp::Sub => Some(BinOp::Sub),
            BinaryOp::Mul => Some(BinOp::Mul),
            BinaryOp::Mod => Some(BinOp::Rem),
            BinaryOp::BitXor => Some(BinOp::Xor),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Rem => "%",
            BinOp::Xor => "^",
        }
    }
}

/// Number literals must be whole and fit an `i64`
fn integer(value: f64) -> Result<i64, ScriptError> {
    if value.fract() != 0.0 {
        return Err(ScriptError::Unsupported("non-integer number"));
    }
    if !(i64::MIN as f64..i64::MAX as f64).contains(&value) {
        return Err(ScriptError::Overflow);
    }
    Ok(value as i64)
}

fn apply(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, ScriptError> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(op, a, b).map(Value::Int),
        // Any string operand turns `+` into concatenation
        (lhs, rhs) if op == BinOp::Add => Ok(Value::Str(format!("{}{}", lhs, rhs))),
        _ => Err(ScriptError::TypeMismatch(op.symbol())),
    }
}

fn int_op(op: BinOp, a: i64, b: i64) -> Result<i64, ScriptError> {
    match op {
        BinOp::Add => a.checked_add(b).ok_or(ScriptError::Overflow),
        BinOp::Sub => a.checked_sub(b).ok_or(ScriptError::Overflow),
        BinOp::Mul => a.checked_mul(b).ok_or(ScriptError::Overflow),
        BinOp::Rem if b == 0 => Err(ScriptError::DivisionByZero),
        BinOp::Rem => a.checked_rem(b).ok_or(ScriptError::Overflow),
        BinOp::Xor => Ok(a ^ b),
    }
}
