use errors::{Error, ErrorKind};
use logos::Logos;
use std::ops::Range as StdRange;
use text_size::{TextRange, TextSize};
use token::{Token, TokenKind};

/// Scans one line of input into [`Token`]s on demand.
///
/// The cursor only ever moves forward. Once the text is exhausted every call
/// to [`Tokenizer::next_token`] returns an end token.
pub struct Tokenizer<'a> {
    inner: logos::Lexer<'a, LexerTokenKind>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { inner: LexerTokenKind::lexer(text) }
    }

    pub fn next_token(&mut self) -> Result<Token, Error> {
        let kind = match self.inner.next() {
            Some(kind) => kind,
            None => return Ok(Token::end(text_size(self.inner.source().len()))),
        };

        let token = match kind {
            Ok(LexerTokenKind::Number) => {
                let range = self.range();
                let value = self
                    .inner
                    .slice()
                    .parse()
                    .map_err(|_| Error::new(ErrorKind::IntLiteralTooLarge, range))?;

                Token::number(value, range)
            }
            Ok(kind) => Token::new(kind.into(), self.range()),
            Err(()) => return Err(self.unrecognized_char()),
        };

        tracing::trace!(?token, "lexed token");

        Ok(token)
    }

    fn range(&self) -> TextRange {
        let StdRange { start, end } = self.inner.span();
        TextRange::new(text_size(start), text_size(end))
    }

    // logos may stop an error span partway through a multi-byte character,
    // so the offending character is decoded from the source instead
    fn unrecognized_char(&self) -> Error {
        let start = self.inner.span().start;
        let c = self
            .inner
            .source()
            .get(start..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        let range = TextRange::at(text_size(start), TextSize::of(c));

        tracing::trace!(%c, ?range, "unrecognized character");

        Error::new(ErrorKind::Lexical(c), range)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(token) if token.is_end() => None,
            result => Some(result),
        }
    }
}

fn text_size(offset: usize) -> TextSize {
    // input lines are read whole into memory, so they never reach 4 GiB
    TextSize::try_from(offset).expect("line is longer than u32::MAX bytes")
}

#[derive(Debug, Clone, Copy, PartialEq, Logos)]
#[logos(skip r"[ \t\n\x0B\x0C\r]+")]
enum LexerTokenKind {
    #[regex("[0-9]+")]
    Number,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,
}

impl From<LexerTokenKind> for TokenKind {
    fn from(kind: LexerTokenKind) -> Self {
        match kind {
            LexerTokenKind::Number => TokenKind::Number,
            LexerTokenKind::Plus => TokenKind::Plus,
            LexerTokenKind::Minus => TokenKind::Minus,
            LexerTokenKind::Star => TokenKind::Star,
            LexerTokenKind::Slash => TokenKind::Slash,
            LexerTokenKind::LParen => TokenKind::LParen,
            LexerTokenKind::RParen => TokenKind::RParen,
        }
    }
}
