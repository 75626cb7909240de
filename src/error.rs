use crate::token::{SourcePosition, TokenKind};
use derive_more::Display;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("unexpected character `{found}`")]
    Lex { found: char, pos: SourcePosition },

    #[error("syntax error: {reason}")]
    Syntax {
        reason: Reason,
        pos: Option<SourcePosition>,
    },

    #[error("{fault}")]
    Numeric { fault: Fault, pos: SourcePosition },

    #[error("failed to write output")]
    Output,
}

///
/// Why a token sequence could not be reduced.
///
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    #[display("unexpected {_0}")]
    Unexpected(TokenKind),
    #[display("expected `;` after expression")]
    MissingSemicolon,
    #[display("expected `)`")]
    UnclosedParen,
}

///
/// Why evaluating an operator failed.
///
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[display("division by zero")]
    DivisionByZero,
    #[display("result is not a real number")]
    NotReal,
}

impl Error {
    ///
    /// Where in the source the error points, if anywhere.
    ///
    #[must_use]
    pub fn position(&self) -> Option<&SourcePosition> {
        match self {
            Self::Lex { pos, .. } | Self::Numeric { pos, .. } => Some(pos),
            Self::Syntax { pos, .. } => pos.as_ref(),
            Self::Output => None,
        }
    }
}

impl From<std::fmt::Error> for Error {
    fn from(_: std::fmt::Error) -> Self {
        Self::Output
    }
}
