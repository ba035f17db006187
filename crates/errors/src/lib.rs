use std::fmt;
use text_size::{TextRange, TextSize};
use thiserror::Error as ThisError;
use token::TokenKind;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    pub range: TextRange,
}

impl Error {
    pub fn new(kind: ErrorKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    pub fn display(&self, input: &str) -> Vec<String> {
        const PADDING: &str = "  ";
        const POINTER_UP: &str = "^";

        let start = text_size_to_line_column(self.range.start(), input);
        let header = format!("{} at {}: {}", self.kind.category(), start, self.kind);

        let line = input.lines().nth(start.line).unwrap_or_default();

        // the underline stops at the end of the line the error starts on,
        // and empty ranges (the end of input) still get a single pointer
        let underlined = {
            let rest: String = line.chars().skip(start.column).collect();
            let start_idx = usize::from(self.range.start());
            let end_idx = usize::from(self.range.end()).min(input.len());
            let len = input.get(start_idx..end_idx).map_or(0, |s| s.chars().count());
            len.min(rest.chars().count()).max(1)
        };

        // tabs are kept so the pointer lines up however the terminal expands them
        let indent: String = line
            .chars()
            .take(start.column)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();

        vec![
            header,
            format!("{}{}", PADDING, line),
            format!("{}{}{}", PADDING, indent, POINTER_UP.repeat(underlined)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ErrorKind {
    #[error("unrecognized character `{0}`")]
    Lexical(char),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer literal too large")]
    IntLiteralTooLarge,
    #[error("integer overflow")]
    Overflow,
}

impl ErrorKind {
    pub fn category(&self) -> Category {
        match self {
            ErrorKind::Lexical(_) => Category::Lexical,
            ErrorKind::Syntax(_) | ErrorKind::IntLiteralTooLarge => Category::Syntax,
            ErrorKind::DivisionByZero | ErrorKind::Overflow => Category::Arithmetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum SyntaxError {
    #[error("expected {expected} but found {found}")]
    UnexpectedToken { expected: TokenKind, found: TokenKind },
    #[error("unmatched parenthesis: expected `)` but found {found}")]
    UnmatchedParen { found: TokenKind },
    #[error("expected operand but found {found}")]
    OperandExpected { found: TokenKind },
    #[error("unexpected trailing input: {found}")]
    TrailingInput { found: TokenKind },
    #[error("expression nested more than {max_depth} levels deep")]
    TooDeep { max_depth: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexical,
    Syntax,
    Arithmetic,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Lexical => write!(f, "lexical error"),
            Category::Syntax => write!(f, "syntax error"),
            Category::Arithmetic => write!(f, "arithmetic error"),
        }
    }
}

fn text_size_to_line_column(text_size: TextSize, input: &str) -> LineColumn {
    let offset = usize::from(text_size).min(input.len());
    let before = input.get(..offset).unwrap_or(input);

    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let column = before[line_start..].chars().count();

    LineColumn { line, column }
}

#[derive(Debug)]
struct LineColumn {
    line: usize,
    column: usize,
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}
