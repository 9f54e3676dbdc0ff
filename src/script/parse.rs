//! Page script parsing via swc
//!
//! Sources are parsed as ES scripts, then narrowed to the shapes the port
//! obfuscation uses: single assignments for setup fragments and single
//! expressions for row calls. Anything else is rejected before evaluation.

use swc_common::{sync::Lrc, FileName, SourceMap};
use swc_ecma_ast::*;
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax};

use super::ScriptError;

/// Deepest bracket nesting accepted in a source
pub const MAX_DEPTH: usize = 64;

/// Longest source accepted, in bytes
pub const MAX_SOURCE_LEN: usize = 1024;

/// `name = value` from a setup fragment
#[derive(Debug, Clone)]
pub struct Assignment {
    pub name: String,
    pub value: Box<Expr>,
}

/// Parse a source holding exactly one expression statement
pub fn parse_expr(source: &str) -> Result<Box<Expr>, ScriptError> {
    let mut body = parse_script(source)?.body;
    match (body.pop(), body.is_empty()) {
        (Some(Stmt::Expr(stmt)), true) => Ok(stmt.expr),
        _ => Err(ScriptError::Unsupported("statement")),
    }
}

/// Parse `name = expr`, or a single `var`/`let`/`const` declarator
pub fn parse_assignment(source: &str) -> Result<Assignment, ScriptError> {
    let script = parse_script(source)?;
    let [stmt] = script.body.as_slice() else {
        return Err(ScriptError::Unsupported("statement"));
    };

    match stmt {
        Stmt::Expr(expr_stmt) => match &*expr_stmt.expr {
            Expr::Assign(assign) if assign.op == AssignOp::Assign => match &assign.left {
                AssignTarget::Simple(SimpleAssignTarget::Ident(ident)) => Ok(Assignment {
                    name: ident.sym.as_str().to_string(),
                    value: assign.right.clone(),
                }),
                _ => Err(ScriptError::Unsupported("assignment target")),
            },
            _ => Err(ScriptError::Unsupported("expression statement")),
        },
        Stmt::Decl(Decl::Var(var_decl)) => match var_decl.decls.as_slice() {
            [decl] => match (&decl.name, &decl.init) {
                (Pat::Ident(ident), Some(init)) => Ok(Assignment {
                    name: ident.sym.as_str().to_string(),
                    value: init.clone(),
                }),
                _ => Err(ScriptError::Unsupported("declaration")),
            },
            _ => Err(ScriptError::Unsupported("declaration")),
        },
        _ => Err(ScriptError::Unsupported("statement")),
    }
}

/// Terms of the top-level `+` chain, left to right.
///
/// `"10" + a + (b + c)` gives `["10", a, (b + c)]`: parenthesized sums
/// stay whole.
pub fn concat_terms(expr: &Expr) -> Vec<&Expr> {
    let mut terms = Vec::new();
    let mut current = expr;

    while let Expr::Bin(bin) = current {
        if bin.op != BinaryOp::Add {
            break;
        }
        terms.push(&*bin.right);
        current = &bin.left;
    }
    terms.push(current);

    terms.reverse();
    terms
}

/// The single argument of a `document.write(...)` call
pub fn write_argument(expr: &Expr) -> Option<&Expr> {
    let Expr::Call(call) = expr else {
        return None;
    };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = &**callee else {
        return None;
    };
    let Expr::Ident(object) = &*member.obj else {
        return None;
    };
    let MemberProp::Ident(prop) = &member.prop else {
        return None;
    };
    if object.sym.as_str() != "document" || prop.sym.as_str() != "write" {
        return None;
    }

    match call.args.as_slice() {
        [arg] if arg.spread.is_none() => Some(&*arg.expr),
        _ => None,
    }
}

fn parse_script(source: &str) -> Result<Script, ScriptError> {
    if source.len() > MAX_SOURCE_LEN {
        return Err(ScriptError::TooLong(source.len()));
    }
    if nesting_depth(source) > MAX_DEPTH {
        return Err(ScriptError::TooDeep);
    }

    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Anon.into(), source.to_string());

    let lexer = Lexer::new(
        Syntax::Es(Default::default()),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );

    let mut parser = Parser::new_from(lexer);
    let script = parser
        .parse_script()
        .map_err(|e| ScriptError::Syntax(format!("{:?}", e)))?;

    // Recovered errors still count
    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(ScriptError::Syntax(format!("{:?}", e)));
    }

    Ok(script)
}

fn nesting_depth(source: &str) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0;

    for c in source.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    deepest
}
