use super::{expr::Expr, Context, Eval};
use crate::error::Error;
use crate::token::SourcePosition;
use std::fmt;

///
/// An ordered run of `;`-terminated statements.
///
/// Evaluating it prints `<line>: <value>` for every statement, in order.
///
#[derive(Debug, Clone, PartialEq)]
pub struct StatementList {
    pub pos: Option<SourcePosition>,
    pub children: Vec<Expr>,
}

impl StatementList {
    #[must_use]
    pub fn new(pos: Option<SourcePosition>) -> Self {
        Self {
            pos,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, child: Expr) -> Self {
        self.push(child);
        self
    }

    pub fn push(&mut self, child: Expr) {
        self.children.push(child);
    }

    pub fn append(&mut self, other: Self) {
        self.children.extend(other.children);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Eval for StatementList {
    type Output = ();

    fn eval<W: fmt::Write>(&self, ctx: &mut Context<W>) -> Result<(), Error> {
        for child in &self.children {
            let value = child.eval(ctx)?;
            ctx.record(child.pos.line, value)?;
        }

        Ok(())
    }
}

impl fmt::Display for StatementList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "statements ({})", self.children.len())?;
        for child in &self.children {
            writeln!(f, "  line {}:", child.pos.line)?;
            child.fmt_tree(f, 2)?;
        }

        Ok(())
    }
}
