use crate::ast::{expr::Expr, stmt::StatementList, Node};
use crate::error::{Error, Reason};
use derive_more::Display;
use std::{fmt, sync::Arc};

///
/// Where a lexical element came from.
///
/// Lines and columns are 1-based; `span` counts characters.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
    pub span: u32,
    pub file: Arc<str>,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[display("number")]
    Number,
    #[display("keyword")]
    Keyword,
    #[display("`(`")]
    OpenParen,
    #[display("`)`")]
    CloseParen,
    #[display("`;`")]
    Semicolon,
    #[display("`+`")]
    Sum,
    #[display("`-`")]
    Sub,
    #[display("`*`")]
    Mul,
    #[display("`/`")]
    Div,
    #[display("`^`")]
    Exp,
    #[display("`%`")]
    Mod,

    #[display("expression")]
    Expr,
    #[display("statement")]
    Stmt,
    #[display("statement list")]
    StmtList,

    #[display("end of input")]
    Eof,
}

///
/// What a token carries: source text while raw, a tree once promoted.
///
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Node(Node),
}

///
/// A token in the sequence the reducer rewrites.
///
/// The payload is [`Payload::Text`] exactly when the kind is raw; the
/// constructors and [`Token::promote`] keep it that way.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    payload: Payload,
    position: Option<SourcePosition>,
}

impl SourcePosition {
    #[must_use]
    pub fn new(line: u32, column: u32, span: u32, file: Arc<str>) -> Self {
        Self {
            line,
            column,
            span,
            file,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

impl TokenKind {
    ///
    /// Map a one-character symbol to its kind.
    ///
    #[must_use]
    pub fn from_symbol(text: &str) -> Option<Self> {
        Some(match text {
            "(" => Self::OpenParen,
            ")" => Self::CloseParen,
            ";" => Self::Semicolon,
            "+" => Self::Sum,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "^" => Self::Exp,
            "%" => Self::Mod,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn is_raw(self) -> bool {
        !self.is_promoted() && !matches!(self, Self::Eof)
    }

    #[must_use]
    pub const fn is_promoted(self) -> bool {
        matches!(self, Self::Expr | Self::Stmt | Self::StmtList)
    }
}

impl Token {
    ///
    /// A raw token straight from the lexer.
    ///
    #[must_use]
    pub fn raw(kind: TokenKind, text: impl Into<String>, position: SourcePosition) -> Self {
        debug_assert!(kind.is_raw(), "{kind} is not a raw token kind");
        Self {
            kind,
            payload: Payload::Text(text.into()),
            position: Some(position),
        }
    }

    #[must_use]
    pub fn expr(expr: Expr) -> Self {
        let position = Some(expr.pos.clone());
        Self {
            kind: TokenKind::Expr,
            payload: Payload::Node(Node::Expr(expr)),
            position,
        }
    }

    ///
    /// A finished statement: an expression that was followed by `;`.
    ///
    #[must_use]
    pub fn stmt(expr: Expr) -> Self {
        let position = Some(expr.pos.clone());
        Self {
            kind: TokenKind::Stmt,
            payload: Payload::Node(Node::Expr(expr)),
            position,
        }
    }

    #[must_use]
    pub fn list(list: StatementList) -> Self {
        let position = list.pos.clone();
        Self {
            kind: TokenKind::StmtList,
            payload: Payload::Node(Node::List(list)),
            position,
        }
    }

    ///
    /// The synthetic token past either end of the sequence.
    ///
    #[must_use]
    pub fn eof() -> Self {
        Self {
            kind: TokenKind::Eof,
            payload: Payload::Text(String::new()),
            position: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    #[must_use]
    pub const fn position(&self) -> Option<&SourcePosition> {
        self.position.as_ref()
    }

    ///
    /// The source text of a raw token, `None` once promoted.
    ///
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            Payload::Node(_) => None,
        }
    }

    ///
    /// Rewrite this token in place into a promoted kind carrying `node`.
    ///
    /// The position is kept.
    ///
    pub fn promote(&mut self, kind: TokenKind, node: Node) {
        debug_assert!(kind.is_promoted(), "{kind} is not a promoted token kind");
        self.kind = kind;
        self.payload = Payload::Node(node);
    }

    ///
    /// Take the expression out of an `EXPR` or `STMT` token.
    ///
    pub fn into_expr(self) -> Result<Expr, Error> {
        match self.payload {
            Payload::Node(Node::Expr(expr)) => Ok(expr),
            _ => Err(self.unexpected()),
        }
    }

    ///
    /// Take the list out of a `STMT_LIST` token.
    ///
    pub fn into_list(self) -> Result<StatementList, Error> {
        match self.payload {
            Payload::Node(Node::List(list)) => Ok(list),
            _ => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> Error {
        Error::Syntax {
            reason: Reason::Unexpected(self.kind),
            pos: self.position.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.payload, self.kind) {
            (Payload::Text(text), TokenKind::Number | TokenKind::Keyword) => {
                write!(f, "{}({text})", self.kind)
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}
