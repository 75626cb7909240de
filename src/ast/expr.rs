//
// Arithmetic expressions represented in the AST.
//

use super::{Context, Eval};
use crate::error::{Error, Fault};
use crate::token::SourcePosition;
use crate::value::Number;
use derive_more::Display;
use std::fmt;

///
/// An expression, positioned at its leftmost token.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub pos: SourcePosition,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Number(Number),
    Paren(Box<Expr>),
    Binary {
        op: BinOp,
        op_pos: SourcePosition,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    #[display("sum")]
    Sum,
    #[display("sub")]
    Sub,
    #[display("mul")]
    Mul,
    #[display("div")]
    Div,
    #[display("exp")]
    Exp,
    #[display("mod")]
    Mod,
}

impl BinOp {
    pub fn apply(self, lhs: Number, rhs: Number) -> Result<Number, Fault> {
        match self {
            Self::Sum => Ok(lhs + rhs),
            Self::Sub => Ok(lhs - rhs),
            Self::Mul => Ok(lhs * rhs),
            Self::Div => lhs.div(rhs),
            Self::Exp => lhs.pow(rhs),
            Self::Mod => lhs.rem(rhs),
        }
    }
}

impl Expr {
    #[must_use]
    pub fn number(value: Number, pos: SourcePosition) -> Self {
        Self {
            pos,
            kind: ExprKind::Number(value),
        }
    }

    #[must_use]
    pub fn paren(inner: Self, pos: SourcePosition) -> Self {
        Self {
            pos,
            kind: ExprKind::Paren(Box::new(inner)),
        }
    }

    ///
    /// Combine two operands; the result sits at the left operand's position.
    ///
    #[must_use]
    pub fn binary(op: BinOp, op_pos: SourcePosition, lhs: Self, rhs: Self) -> Self {
        Self {
            pos: lhs.pos.clone(),
            kind: ExprKind::Binary {
                op,
                op_pos,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        }
    }

    pub(crate) fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = depth * 2;
        match &self.kind {
            ExprKind::Number(n) => writeln!(f, "{:indent$}number {n}", ""),
            ExprKind::Paren(inner) => {
                writeln!(f, "{:indent$}paren", "")?;
                inner.fmt_tree(f, depth + 1)
            }
            ExprKind::Binary { op, lhs, rhs, .. } => {
                writeln!(f, "{:indent$}{op}", "")?;
                lhs.fmt_tree(f, depth + 1)?;
                rhs.fmt_tree(f, depth + 1)
            }
        }
    }
}

impl Eval for Expr {
    type Output = Number;

    fn eval<W: fmt::Write>(&self, ctx: &mut Context<W>) -> Result<Number, Error> {
        match &self.kind {
            ExprKind::Number(n) => Ok(*n),
            ExprKind::Paren(inner) => inner.eval(ctx),
            ExprKind::Binary {
                op,
                op_pos,
                lhs,
                rhs,
            } => {
                let lhs = lhs.eval(ctx)?;
                let rhs = rhs.eval(ctx)?;
                op.apply(lhs, rhs).map_err(|fault| Error::Numeric {
                    fault,
                    pos: op_pos.clone(),
                })
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
