//
// Rendering errors against the source they came from.
//

use crate::error::Error;
use owo_colors::{OwoColorize, Style};
use std::fmt;

///
/// An error rendered with its message, location, the offending source line
/// and a caret underline.
///
/// ```text
/// error: syntax error: unexpected `;`
///   --> script.math:1:5
///    |
///  1 | 2 + ;
///    |     ^
/// ```
///
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub error: &'a Error,
    pub source: &'a str,
    pub color: bool,
}

impl<'a> Report<'a> {
    #[must_use]
    pub const fn new(error: &'a Error, source: &'a str) -> Self {
        Self {
            error,
            source,
            color: false,
        }
    }

    #[must_use]
    pub const fn colored(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn paint(
        &self,
        f: &mut fmt::Formatter<'_>,
        text: impl fmt::Display,
        style: Style,
    ) -> fmt::Result {
        if self.color {
            write!(f, "{}", text.style(style))
        } else {
            write!(f, "{text}")
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let red = Style::new().red().bold();
        let blue = Style::new().blue();

        self.paint(f, "error", red)?;
        writeln!(f, ": {}", self.error)?;

        let Some(pos) = self.error.position() else {
            return Ok(());
        };

        let gutter = pos.line.to_string().len() + 1;
        write!(f, "{:gutter$}", "")?;
        self.paint(f, "-->", blue)?;
        writeln!(f, " {pos}")?;

        let Some(line) = self
            .source
            .lines()
            .nth(pos.line.saturating_sub(1) as usize)
        else {
            return Ok(());
        };

        write!(f, "{:gutter$}", "")?;
        self.paint(f, "|", blue)?;
        writeln!(f)?;

        self.paint(f, format_args!("{:>width$} |", pos.line, width = gutter - 1), blue)?;
        writeln!(f, " {line}")?;

        let pad = pos.column.saturating_sub(1) as usize;
        let tail = "~".repeat(pos.span.saturating_sub(1) as usize);
        write!(f, "{:gutter$}", "")?;
        self.paint(f, "|", blue)?;
        write!(f, " {:pad$}", "")?;
        self.paint(f, format_args!("^{tail}"), red)?;
        writeln!(f)
    }
}
