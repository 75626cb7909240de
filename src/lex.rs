use crate::error::Error;
use crate::token::{SourcePosition, Token, TokenKind};
use std::sync::Arc;

pub type Result<'src, O> = nom::IResult<&'src str, O>;

///
/// Splits source text into raw [`Token`]s, tracking line and column.
///
/// Yields an error for the first character no token starts with, then stops.
///
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    src: &'src str,
    file: Arc<str>,
    line: u32,
    column: u32,
}

///
/// Parse the kind and text of one raw token, assuming no preceding whitespace.
///
#[allow(clippy::missing_errors_doc)]
pub fn raw(src: &str) -> Result<(TokenKind, &str)> {
    use nom::{
        branch::alt,
        bytes::complete::take_while1,
        character::complete::{anychar, digit1},
        combinator::{map, map_opt, recognize},
    };

    fn symbol(src: &str) -> Result<(TokenKind, &str)> {
        map_opt(recognize(anychar), |text: &str| {
            TokenKind::from_symbol(text).map(|kind| (kind, text))
        })(src)
    }

    alt((
        map(digit1, |text| (TokenKind::Number, text)),
        map(
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            |text| (TokenKind::Keyword, text),
        ),
        symbol,
    ))(src)
}

impl<'src> Lexer<'src> {
    #[must_use]
    pub fn new(src: &'src str) -> Self {
        Self::with_file(src, "<input>")
    }

    #[must_use]
    pub fn with_file(src: &'src str, file: impl Into<Arc<str>>) -> Self {
        Self {
            src,
            file: file.into(),
            line: 1,
            column: 1,
        }
    }

    fn advance(&mut self, consumed: &str) {
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.src = &self.src[consumed.len()..];
    }

    fn locate(&self, text: &str) -> SourcePosition {
        let span = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        SourcePosition::new(self.line, self.column, span, Arc::clone(&self.file))
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = std::result::Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, blank) =
            nom::bytes::complete::take_while::<_, _, nom::error::Error<_>>(
                char::is_whitespace,
            )(self.src)
            .ok()?;
        self.advance(blank);

        let found = self.src.chars().next()?;
        if let Ok((_, (kind, text))) = raw(self.src) {
            let token = Token::raw(kind, text, self.locate(text));
            self.advance(text);
            Some(Ok(token))
        } else {
            let pos = self.locate(&self.src[..found.len_utf8()]);
            self.src = "";
            Some(Err(Error::Lex { found, pos }))
        }
    }
}

///
/// Lex a whole source, stopping at the first bad character.
///
pub fn tokenize(src: &str, file: impl Into<Arc<str>>) -> std::result::Result<Vec<Token>, Error> {
    Lexer::with_file(src, file).collect()
}

#[cfg(test)]
mod test {
    use super::{tokenize, Lexer};
    use crate::error::Error;
    use crate::token::{SourcePosition, TokenKind};

    ///
    /// Declares a test case with a name, given input and expected kinds and texts.
    ///
    macro_rules! test_case {
        ($name:ident, $input:expr, $expected:expr $(,)?) => {
            #[test]
            fn $name() {
                let expected: &[(TokenKind, &str)] = &$expected;

                let mut tokens = 0;
                for (i, token) in Lexer::new($input).enumerate() {
                    let token = token.expect("input should lex");
                    assert_eq!((token.kind(), token.text().unwrap_or("")), expected[i]);
                    tokens += 1;
                }

                assert_eq!(tokens, expected.len());
            }
        };
    }

    test_case!(
        general,
        "(12 + 3) * -4 ^ 2 % 5 / 6;",
        [
            (TokenKind::OpenParen, "("),
            (TokenKind::Number, "12"),
            (TokenKind::Sum, "+"),
            (TokenKind::Number, "3"),
            (TokenKind::CloseParen, ")"),
            (TokenKind::Mul, "*"),
            (TokenKind::Sub, "-"),
            (TokenKind::Number, "4"),
            (TokenKind::Exp, "^"),
            (TokenKind::Number, "2"),
            (TokenKind::Mod, "%"),
            (TokenKind::Number, "5"),
            (TokenKind::Div, "/"),
            (TokenKind::Number, "6"),
            (TokenKind::Semicolon, ";"),
        ],
    );

    test_case!(
        digits_then_word,
        "12abc x_1 9",
        [
            (TokenKind::Number, "12"),
            (TokenKind::Keyword, "abc"),
            (TokenKind::Keyword, "x_1"),
            (TokenKind::Number, "9"),
        ],
    );

    test_case!(blank, " \n\t ", []);

    #[test]
    fn positions() {
        let tokens = tokenize("1 +\n  23;", "a.math").expect("input should lex");
        let positions: Vec<_> = tokens
            .iter()
            .filter_map(|t| t.position().map(|p| (p.line, p.column, p.span)))
            .collect();

        assert_eq!(positions, [(1, 1, 1), (1, 3, 1), (2, 3, 2), (2, 5, 1)]);
        assert_eq!(
            tokens[2].position().map(ToString::to_string),
            Some("a.math:2:3".into())
        );
    }

    #[test]
    fn bad_character() {
        let mut lexer = Lexer::with_file("1 $ 2", "a.math");

        assert!(matches!(lexer.next(), Some(Ok(_))));
        assert_eq!(
            lexer.next(),
            Some(Err(Error::Lex {
                found: '$',
                pos: SourcePosition::new(1, 3, 1, "a.math".into()),
            }))
        );
        assert_eq!(lexer.next(), None);
    }
}
