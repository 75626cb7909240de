#![forbid(unsafe_code)]

//!
//! A tiny arithmetic scripting language: integer literals, unary minus,
//! `+ - * / % ^`, parentheses and `;`-terminated statements.
//!
//! Source is lexed into raw tokens, folded in place by the [`reduce`] engine
//! into a [`StatementList`](ast::stmt::StatementList), and evaluated
//! statement by statement.
//!

pub mod ast;
pub mod diag;
pub mod error;
pub mod lex;
pub mod reduce;
pub mod token;
pub mod value;

use ast::{stmt::StatementList, Context, Eval, Outcome};
use error::Error;
use std::fmt;

pub mod prelude {
    pub use crate::ast::{expr::Expr, stmt::StatementList, Context, Eval, Node, Outcome};
    pub use crate::diag::Report;
    pub use crate::error::{Error, Fault, Reason};
    pub use crate::lex::Lexer;
    pub use crate::reduce::{Reducer, Rule};
    pub use crate::token::{SourcePosition, Token, TokenKind};
    pub use crate::value::Number;
}

///
/// Lex and reduce a whole script.
///
/// `file` only labels positions for diagnostics.
///
pub fn parse(source: &str, file: &str) -> Result<StatementList, Error> {
    reduce::parse_tokens(lex::tokenize(source, file)?)
}

///
/// Parse and evaluate a script, writing `<line>: <value>` per statement to
/// `out`.
///
/// Nothing is evaluated unless the whole script parses; evaluation stops at
/// the first numeric error.
///
pub fn run<W: fmt::Write>(source: &str, file: &str, out: W) -> Result<Vec<Outcome>, Error> {
    let statements = parse(source, file)?;
    let mut ctx = Context::new(out);
    statements.eval(&mut ctx)?;

    Ok(ctx.into_parts().1)
}
