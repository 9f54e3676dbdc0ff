//! Port reconstruction from page-embedded script
//!
//! Some list pages hide each port behind a page-wide setup script that
//! assigns computed values to variables, plus a per-row
//! `document.write("<markup>"+term+term...)` whose terms, rendered and
//! joined, spell the port's digits. This module parses that micro-language
//! with swc, accepts only literals, variables and `+ - * % ^`, and never
//! executes page content.

mod eval;
mod parse;

pub use eval::{SymbolTable, Value};
pub use parse::{concat_terms, parse_assignment, parse_expr, write_argument, Assignment};

use swc_ecma_ast::{Expr, Lit};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unsupported {0}")]
    Unsupported(&'static str),
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("script too long ({0} bytes)")]
    TooLong(usize),
    #[error("integer overflow")]
    Overflow,
    #[error("unknown variable {0:?}")]
    UnknownVariable(String),
    #[error("operator {0} needs integer operands")]
    TypeMismatch(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("{0:?} is not a port number")]
    NotAPort(String),
    #[error("script is not a document.write(\"...\"+...) call: {0:?}")]
    CallShape(String),
}

/// Evaluate a `+`-chain term by term and read the joined text as a port.
///
/// Each top-level term is evaluated on its own and rendered, so
/// `"10" + a + b` with `a=1`, `b=2` gives `1012`, never `13`.
pub fn port_from_chain(chain: &str, symbols: &SymbolTable) -> Result<u64, ScriptError> {
    let expr = parse_expr(chain)?;
    port_from_terms(&concat_terms(&expr), symbols)
}

/// Port from a row's `document.write("<markup>"+...)` script.
///
/// The leading string literal is the visible separator markup and is
/// dropped; the remaining terms go through [`port_from_chain`] rules.
pub fn port_from_write_call(script: &str, symbols: &SymbolTable) -> Result<u64, ScriptError> {
    let call = parse_expr(script)?;
    let shape_error = || ScriptError::CallShape(script.trim().to_string());
    let argument = write_argument(&call).ok_or_else(shape_error)?;

    match concat_terms(argument).split_first() {
        Some((Expr::Lit(Lit::Str(_)), rest)) if !rest.is_empty() => port_from_terms(rest, symbols),
        _ => Err(shape_error()),
    }
}

fn port_from_terms(terms: &[&Expr], symbols: &SymbolTable) -> Result<u64, ScriptError> {
    let mut digits = String::new();
    for term in terms {
        digits.push_str(&symbols.eval(term)?.to_string());
    }

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScriptError::NotAPort(digits));
    }
    digits.parse().map_err(|_| ScriptError::NotAPort(digits))
}
