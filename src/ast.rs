use crate::error::Error;
use crate::value::Number;
use std::fmt;

pub mod expr;
pub mod stmt;

///
/// An evaluatable AST node.
///
/// Expressions produce a [`Number`]; a statement list produces nothing and
/// reports each statement through the [`Context`] instead.
///
pub trait Eval {
    type Output;

    fn eval<W: fmt::Write>(&self, ctx: &mut Context<W>) -> Result<Self::Output, Error>;
}

///
/// The tree a promoted token carries.
///
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Expr(expr::Expr),
    List(stmt::StatementList),
}

///
/// One printed statement result.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub line: u32,
    pub value: Number,
}

///
/// Where statement results go: an output sink plus a record of what was
/// written to it.
///
#[derive(Debug)]
pub struct Context<W> {
    out: W,
    outcomes: Vec<Outcome>,
}

impl<W: fmt::Write> Context<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            outcomes: Vec::new(),
        }
    }

    ///
    /// Print `<line>: <value>` and remember it.
    ///
    pub fn record(&mut self, line: u32, value: Number) -> Result<(), Error> {
        writeln!(self.out, "{line}: {value}")?;
        self.outcomes.push(Outcome { line, value });
        Ok(())
    }

    #[must_use]
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn into_parts(self) -> (W, Vec<Outcome>) {
        (self.out, self.outcomes)
    }
}

impl Eval for Node {
    type Output = Option<Number>;

    fn eval<W: fmt::Write>(&self, ctx: &mut Context<W>) -> Result<Option<Number>, Error> {
        match self {
            Self::Expr(expr) => expr.eval(ctx).map(Some),
            Self::List(list) => list.eval(ctx).map(|()| None),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expr(expr) => expr.fmt(f),
            Self::List(list) => list.fmt(f),
        }
    }
}
