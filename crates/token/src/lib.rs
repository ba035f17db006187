use std::fmt;
use text_size::{TextRange, TextSize};

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The literal's value for [`TokenKind::Number`], zero for every other kind.
    pub value: i64,
    pub range: TextRange,
}

impl Token {
    pub fn new(kind: TokenKind, range: TextRange) -> Self {
        Self { kind, value: 0, range }
    }

    pub fn number(value: i64, range: TextRange) -> Self {
        Self { kind: TokenKind::Number, value, range }
    }

    pub fn end(at: TextSize) -> Self {
        Self::new(TokenKind::End, TextRange::empty(at))
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::End
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}@{}..{}",
            self.kind,
            u32::from(self.range.start()),
            u32::from(self.range.end()),
        )?;

        if self.kind == TokenKind::Number {
            write!(f, " {}", self.value)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    Number,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Number => "integer literal",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::End => "end of input",
        };

        f.write_str(s)
    }
}
