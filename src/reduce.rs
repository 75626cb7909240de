//
// The reduction engine.
//
// Tokens are folded in place: a rule matches a short window starting at
// `start`, replaces it with one promoted token, and scanning restarts at the
// same index. Right operands are reduced first by a nested call whose
// `min_match` floor keeps looser operators from capturing them.
//

use crate::ast::{
    expr::{BinOp, Expr},
    stmt::StatementList,
    Node,
};
use crate::error::{Error, Reason};
use crate::token::{Token, TokenKind};
use crate::value::Number;
use derive_more::Display;
use std::mem;

///
/// A reduction rule, listed in the order the engine attempts them.
///
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    #[display("number")]
    Number,
    #[display("negation")]
    Negation,
    #[display("paren")]
    Paren,
    #[display("sum")]
    Sum,
    #[display("sub")]
    Sub,
    #[display("mul")]
    Mul,
    #[display("div")]
    Div,
    #[display("mod")]
    Mod,
    #[display("exp")]
    Exp,
    #[display("statement")]
    Statement,
    #[display("list start")]
    ListStart,
    #[display("list continue")]
    ListContinue,
}

type Hook<'h> = Box<dyn FnMut(Rule, &[Token]) + 'h>;

///
/// Owns the token sequence and folds it down to a single statement list.
///
pub struct Reducer<'h> {
    tokens: Vec<Token>,
    hook: Option<Hook<'h>>,
}

impl Rule {
    pub const ALL: [Self; 12] = [
        Self::Number,
        Self::Negation,
        Self::Paren,
        Self::Sum,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Exp,
        Self::Statement,
        Self::ListStart,
        Self::ListContinue,
    ];

    ///
    /// The highest `min_match` under which this rule may fire.
    ///
    #[must_use]
    pub const fn gate(self) -> Option<u8> {
        match self {
            Self::Number | Self::Negation | Self::Paren => None,
            Self::Sum | Self::Sub | Self::Statement => Some(1),
            Self::Mul | Self::Div | Self::Mod => Some(2),
            Self::Exp => Some(3),
            Self::ListStart | Self::ListContinue => Some(0),
        }
    }

    ///
    /// Operator token, node operator and right operand floor of a binary rule.
    ///
    #[must_use]
    pub const fn binary(self) -> Option<(TokenKind, BinOp, u8)> {
        Some(match self {
            Self::Sum => (TokenKind::Sum, BinOp::Sum, 2),
            Self::Sub => (TokenKind::Sub, BinOp::Sub, 2),
            Self::Mul => (TokenKind::Mul, BinOp::Mul, 3),
            Self::Div => (TokenKind::Div, BinOp::Div, 3),
            Self::Mod => (TokenKind::Mod, BinOp::Mod, 3),
            // `^` recurses at its own level, so it groups to the right
            Self::Exp => (TokenKind::Exp, BinOp::Exp, 3),
            _ => return None,
        })
    }

    const fn allowed(self, min_match: u8) -> bool {
        match self.gate() {
            Some(gate) => min_match <= gate,
            None => true,
        }
    }
}

impl<'h> Reducer<'h> {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, hook: None }
    }

    ///
    /// Call `hook` after every rewrite with the rule that fired and the
    /// resulting sequence.
    ///
    #[must_use]
    pub fn on_reduce(mut self, hook: impl FnMut(Rule, &[Token]) + 'h) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    ///
    /// Fold the sequence from `start` until no rule allowed under
    /// `min_match` matches there.
    ///
    /// A raw token where a right operand must be is a syntax error and
    /// abandons the whole sequence.
    ///
    pub fn reduce(&mut self, start: usize, min_match: u8) -> Result<(), Error> {
        if self.peek(start) == TokenKind::Eof {
            return Ok(());
        }

        'scan: loop {
            for rule in Rule::ALL {
                if rule.allowed(min_match) && self.apply(rule, start)? {
                    if let Some(hook) = self.hook.as_mut() {
                        hook(rule, self.tokens.as_slice());
                    }
                    continue 'scan;
                }
            }

            return Ok(());
        }
    }

    ///
    /// Reduce the whole sequence and unwrap the statement list it folds into.
    ///
    /// A lone statement becomes a one-element list; an empty sequence an
    /// empty one.
    ///
    pub fn into_statements(mut self) -> Result<StatementList, Error> {
        self.reduce(0, 0)?;

        match (self.tokens.len(), self.peek(0)) {
            (0, _) => Ok(StatementList::new(None)),
            (1, TokenKind::StmtList) => self.take(0).into_list(),
            (1, TokenKind::Stmt) => {
                let stmt = self.take(0).into_expr()?;
                Ok(StatementList::new(Some(stmt.pos.clone())).with(stmt))
            }
            (1, _) => Err(self.stray(0)),
            (_, first) if !first.is_promoted() => Err(self.stray(0)),
            _ => Err(self.stray(1)),
        }
    }

    fn peek(&self, at: usize) -> TokenKind {
        self.tokens.get(at).map_or(TokenKind::Eof, Token::kind)
    }

    fn peek_before(&self, at: usize) -> TokenKind {
        at.checked_sub(1).map_or(TokenKind::Eof, |i| self.peek(i))
    }

    fn take(&mut self, at: usize) -> Token {
        mem::replace(&mut self.tokens[at], Token::eof())
    }

    ///
    /// Replace `len` tokens at `start` with `token`.
    ///
    fn fold(&mut self, start: usize, len: usize, token: Token) {
        self.tokens[start] = token;
        self.tokens.drain(start + 1..start + len);
    }

    fn error_at(&self, at: usize, reason: Reason) -> Error {
        // past the end, point at the last real token
        let pos = self
            .tokens
            .get(at)
            .and_then(Token::position)
            .or_else(|| self.tokens.last().and_then(Token::position))
            .cloned();

        Error::Syntax { reason, pos }
    }

    fn stray(&self, at: usize) -> Error {
        let reason = match self.peek(at) {
            TokenKind::Expr => Reason::MissingSemicolon,
            TokenKind::OpenParen => Reason::UnclosedParen,
            kind => Reason::Unexpected(kind),
        };

        self.error_at(at, reason)
    }

    fn expect_operand(&self, at: usize) -> Result<(), Error> {
        match self.peek(at) {
            kind if kind.is_promoted() => Ok(()),
            kind => Err(self.error_at(at, Reason::Unexpected(kind))),
        }
    }

    fn apply(&mut self, rule: Rule, start: usize) -> Result<bool, Error> {
        match rule {
            Rule::Number => self.number(start),
            Rule::Negation => self.negation(start),
            Rule::Paren => self.paren(start),
            Rule::Statement => self.statement(start),
            Rule::ListStart => self.list_start(start),
            Rule::ListContinue => self.list_continue(start),
            Rule::Sum | Rule::Sub | Rule::Mul | Rule::Div | Rule::Mod | Rule::Exp => {
                match rule.binary() {
                    Some((kind, op, floor)) => self.binary(start, kind, op, floor),
                    None => Ok(false),
                }
            }
        }
    }

    fn literal(&self, at: usize) -> Result<Number, Error> {
        self.tokens[at]
            .text()
            .and_then(|text| {
                text.parse::<i64>()
                    .map(Number::Int)
                    .or_else(|_| text.parse::<f64>().map(Number::Real))
                    .ok()
            })
            .ok_or_else(|| self.error_at(at, Reason::Unexpected(TokenKind::Number)))
    }

    fn number(&mut self, start: usize) -> Result<bool, Error> {
        if self.peek(start) != TokenKind::Number {
            return Ok(false);
        }

        let value = self.literal(start)?;
        let Some(pos) = self.tokens[start].position().cloned() else {
            return Err(self.error_at(start, Reason::Unexpected(TokenKind::Number)));
        };
        self.tokens[start].promote(TokenKind::Expr, Node::Expr(Expr::number(value, pos)));

        Ok(true)
    }

    fn negation(&mut self, start: usize) -> Result<bool, Error> {
        // after a finished expression `-` is binary
        if self.peek_before(start) == TokenKind::Expr
            || self.peek(start) != TokenKind::Sub
            || self.peek(start + 1) != TokenKind::Number
        {
            return Ok(false);
        }

        let value = -self.literal(start + 1)?;
        let Some(pos) = self.tokens[start].position().cloned() else {
            return Err(self.error_at(start, Reason::Unexpected(TokenKind::Sub)));
        };
        self.fold(start, 2, Token::expr(Expr::number(value, pos)));

        Ok(true)
    }

    fn paren(&mut self, start: usize) -> Result<bool, Error> {
        if self.peek(start) != TokenKind::OpenParen {
            return Ok(false);
        }

        self.reduce(start + 1, 0)?;
        self.expect_operand(start + 1)?;

        if self.peek(start + 1) != TokenKind::Expr
            || self.peek(start + 2) != TokenKind::CloseParen
        {
            return Ok(false);
        }

        let Some(pos) = self.tokens[start].position().cloned() else {
            return Err(self.error_at(start, Reason::UnclosedParen));
        };
        let inner = self.take(start + 1).into_expr()?;
        self.fold(start, 3, Token::expr(Expr::paren(inner, pos)));

        Ok(true)
    }

    fn binary(
        &mut self,
        start: usize,
        kind: TokenKind,
        op: BinOp,
        floor: u8,
    ) -> Result<bool, Error> {
        if self.peek(start) != TokenKind::Expr || self.peek(start + 1) != kind {
            return Ok(false);
        }

        self.reduce(start + 2, floor)?;
        self.expect_operand(start + 2)?;

        if self.peek(start + 2) != TokenKind::Expr {
            return Ok(false);
        }

        let Some(op_pos) = self.tokens[start + 1].position().cloned() else {
            return Err(self.error_at(start + 1, Reason::Unexpected(kind)));
        };
        let lhs = self.take(start).into_expr()?;
        let rhs = self.take(start + 2).into_expr()?;
        self.fold(start, 3, Token::expr(Expr::binary(op, op_pos, lhs, rhs)));

        Ok(true)
    }

    fn statement(&mut self, start: usize) -> Result<bool, Error> {
        if self.peek(start) != TokenKind::Expr || self.peek(start + 1) != TokenKind::Semicolon {
            return Ok(false);
        }

        let expr = self.take(start).into_expr()?;
        self.fold(start, 2, Token::stmt(expr));

        Ok(true)
    }

    fn list_start(&mut self, start: usize) -> Result<bool, Error> {
        if self.peek(start) != TokenKind::Stmt {
            return Ok(false);
        }

        self.reduce(start + 1, 1)?;

        if self.peek(start + 1) != TokenKind::Stmt {
            return Ok(false);
        }

        let first = self.take(start).into_expr()?;
        let second = self.take(start + 1).into_expr()?;
        let list = StatementList::new(Some(first.pos.clone()))
            .with(first)
            .with(second);
        self.fold(start, 2, Token::list(list));

        Ok(true)
    }

    fn list_continue(&mut self, start: usize) -> Result<bool, Error> {
        if self.peek(start) != TokenKind::StmtList {
            return Ok(false);
        }

        self.reduce(start + 1, 1)?;

        let next = match self.peek(start + 1) {
            TokenKind::StmtList | TokenKind::Stmt => self.take(start + 1),
            _ => return Ok(false),
        };
        let mut list = self.take(start).into_list()?;
        if next.kind() == TokenKind::StmtList {
            list.append(next.into_list()?);
        } else {
            list.push(next.into_expr()?);
        }
        self.fold(start, 2, Token::list(list));

        Ok(true)
    }
}

///
/// Fold a lexed token sequence into its statement list.
///
pub fn parse_tokens(tokens: Vec<Token>) -> Result<StatementList, Error> {
    Reducer::new(tokens).into_statements()
}

#[cfg(test)]
mod test {
    use super::{parse_tokens, Reducer, Rule};
    use crate::ast::{
        expr::{BinOp, ExprKind},
        stmt::StatementList,
        Context, Eval,
    };
    use crate::error::{Error, Reason};
    use crate::lex::tokenize;
    use crate::token::{Token, TokenKind};
    use crate::value::Number;

    fn parse(src: &str) -> Result<StatementList, Error> {
        parse_tokens(tokenize(src, "test").expect("input should lex"))
    }

    fn values(src: &str) -> Vec<String> {
        let list = parse(src).expect("input should parse");
        let mut ctx = Context::new(String::new());
        list.eval(&mut ctx).expect("input should evaluate");
        ctx.outcomes().iter().map(|o| o.value.to_string()).collect()
    }

    fn syntax_error(src: &str) -> (Reason, u32, u32) {
        match parse(src) {
            Err(Error::Syntax {
                reason,
                pos: Some(pos),
            }) => (reason, pos.line, pos.column),
            other => panic!("expected a positioned syntax error, got {other:?}"),
        }
    }

    ///
    /// Declares a test case evaluating one script to its statement values.
    ///
    macro_rules! eval_case {
        ($name:ident, $input:expr, $expected:expr $(,)?) => {
            #[test]
            fn $name() {
                let expected: &[&str] = &$expected;
                assert_eq!(values($input), expected);
            }
        };
    }

    eval_case!(precedence, "2 + 3 * 4;", ["14"]);
    eval_case!(exponent_groups_right, "2 ^ 3 ^ 2;", ["512"]);
    eval_case!(subtraction_groups_left, "10 - 3 - 2;", ["5"]);
    eval_case!(division_groups_left, "64 / 4 / 2;", ["8.0"]);
    eval_case!(mixed_level_two, "7 * 4 % 5 / 2;", ["1.5"]);
    eval_case!(negation, "-3 + 4;", ["1"]);
    eval_case!(negated_right_operand, "5 - -2;", ["7"]);
    eval_case!(negation_after_tighter_operator, "2 * -3;", ["-6"]);
    eval_case!(negation_after_exponent, "2 ^ -1;", ["0.5"]);
    eval_case!(negation_binds_before_exponent, "-3 ^ 2;", ["9"]);
    eval_case!(binary_minus_without_space, "1 -2;", ["-1"]);
    eval_case!(parens, "(2 + 3) * 4;", ["20"]);
    eval_case!(nested_parens, "((1 + 2) * (3 - 1)) ^ 2;", ["36"]);
    eval_case!(negation_in_parens, "(-3) * 2;", ["-6"]);
    eval_case!(exponent_before_product, "2 ^ 3 * 4;", ["32"]);
    eval_case!(product_before_sum_on_left, "2 * 3 + 4;", ["10"]);
    eval_case!(real_division, "7 / 2;", ["3.5"]);
    eval_case!(exact_division_is_real, "8 / 2;", ["4.0"]);
    eval_case!(floored_modulo, "-7 % 3;", ["2"]);
    eval_case!(negated_zero, "-0;", ["0"]);
    eval_case!(zero_times_negative, "0 * -1;", ["0"]);
    eval_case!(modulo_to_zero, "-5 % 5;", ["0"]);
    eval_case!(real_operand_stays_real, "4 ^ (1 / 2) + 1;", ["3.0"]);
    eval_case!(statements, "1 + 1; 2 + 2; 3;", ["2", "4", "3"]);
    eval_case!(negation_after_statement, "1; -2;", ["1", "-2"]);

    #[test]
    fn statement_count() {
        assert_eq!(parse("").map(|l| l.len()), Ok(0));
        assert_eq!(parse("1;").map(|l| l.len()), Ok(1));
        assert_eq!(parse("1; 2;").map(|l| l.len()), Ok(2));
        assert_eq!(parse("1; (2); 3 ^ 4; 5 % 6 - 7;").map(|l| l.len()), Ok(4));
    }

    #[test]
    fn binary_node_positions() {
        let list = parse("\n  12 /\n 3;").expect("input should parse");
        let stmt = &list.children[0];

        assert_eq!((stmt.pos.line, stmt.pos.column), (2, 3));
        let ExprKind::Binary { op, op_pos, .. } = &stmt.kind else {
            panic!("expected a binary node, got {stmt:?}");
        };
        assert_eq!(*op, BinOp::Div);
        assert_eq!((op_pos.line, op_pos.column), (2, 6));
    }

    #[test]
    fn missing_operand() {
        assert_eq!(
            syntax_error("2 + ;"),
            (Reason::Unexpected(TokenKind::Semicolon), 1, 5)
        );
    }

    #[test]
    fn operand_at_end_of_input() {
        assert_eq!(
            syntax_error("1;\n2 *"),
            (Reason::Unexpected(TokenKind::Eof), 2, 3)
        );
    }

    #[test]
    fn empty_parens() {
        assert_eq!(
            syntax_error("();"),
            (Reason::Unexpected(TokenKind::CloseParen), 1, 2)
        );
    }

    #[test]
    fn unclosed_paren() {
        assert_eq!(syntax_error("(1 + 2;"), (Reason::UnclosedParen, 1, 1));
    }

    #[test]
    fn missing_semicolon() {
        assert_eq!(syntax_error("1 + 2"), (Reason::MissingSemicolon, 1, 1));
        assert_eq!(syntax_error("1;\n 2"), (Reason::MissingSemicolon, 2, 2));
    }

    #[test]
    fn keyword_is_never_reduced() {
        assert_eq!(
            syntax_error("2 + x;"),
            (Reason::Unexpected(TokenKind::Keyword), 1, 5)
        );
        assert_eq!(
            syntax_error("let;"),
            (Reason::Unexpected(TokenKind::Keyword), 1, 1)
        );
    }

    #[test]
    fn double_negation() {
        assert_eq!(
            syntax_error("- -3;"),
            (Reason::Unexpected(TokenKind::Sub), 1, 1)
        );
    }

    #[test]
    fn reduce_is_idempotent() {
        let tokens = tokenize("1; 2 * 3;", "test").expect("input should lex");
        let mut reducer = Reducer::new(tokens);

        reducer.reduce(0, 0).expect("input should parse");
        let once = reducer.tokens().to_vec();
        assert_eq!(once.len(), 1);
        assert_eq!(once[0].kind(), TokenKind::StmtList);

        reducer.reduce(0, 0).expect("reduced input should stay reduced");
        assert_eq!(reducer.tokens(), once.as_slice());
    }

    #[test]
    fn hook_sees_every_rewrite() {
        let tokens = tokenize("1 + 2;", "test").expect("input should lex");
        let mut fired = Vec::new();
        let mut lengths = Vec::new();

        let list = Reducer::new(tokens)
            .on_reduce(|rule, tokens| {
                fired.push(rule);
                lengths.push(tokens.len());
            })
            .into_statements()
            .expect("input should parse");

        assert_eq!(list.len(), 1);
        assert_eq!(
            fired,
            [Rule::Number, Rule::Number, Rule::Sum, Rule::Statement]
        );
        assert_eq!(lengths, [4, 4, 2, 1]);
    }

    #[test]
    fn rule_gates() {
        let allowed = |min_match| {
            Rule::ALL
                .into_iter()
                .filter(|rule| rule.allowed(min_match))
                .count()
        };

        assert_eq!(allowed(0), 12);
        assert_eq!(allowed(1), 10);
        assert_eq!(allowed(2), 7);
        assert_eq!(allowed(3), 4);
    }

    #[test]
    fn numbers_are_exact() {
        let list = parse("9007199254740993;").expect("input should parse");
        assert_eq!(
            list.children[0].kind,
            ExprKind::Number(Number::int(9_007_199_254_740_993))
        );
        assert_eq!(values("9007199254740993 + 1;"), ["9007199254740994"]);
    }

    #[test]
    fn oversized_literal_is_real() {
        let list = parse("99999999999999999999;").expect("input should parse");
        assert_eq!(
            list.children[0].kind,
            ExprKind::Number(Number::real(1e20))
        );
    }

    #[test]
    fn adjacent_lists_merge() {
        let tokens = tokenize("1; 2;", "test").expect("input should lex");
        let first = parse_tokens(tokens[..2].to_vec()).expect("input should parse");
        let second = parse_tokens(tokens[2..].to_vec()).expect("input should parse");

        let mut reducer =
            Reducer::new(vec![Token::list(first.clone()), Token::list(second.clone())]);
        reducer.reduce(0, 0).expect("lists should merge");

        let merged = reducer.tokens();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].kind(), TokenKind::StmtList);

        let list = merged[0].clone().into_list().expect("token should hold a list");
        let expected: Vec<_> = first.children.into_iter().chain(second.children).collect();
        assert_eq!(list.children, expected);
    }
}
