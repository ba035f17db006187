//! Parses and evaluates one line of integer arithmetic in a single pass.
//!
//! ```text
//! expr   := term ( ('+' | '-') term )*
//! term   := factor ( ('*' | '/') factor )*
//! factor := NUMBER | '(' expr ')' | '-' factor
//! ```
//!
//! Values are computed as the grammar is recognised; no tree is built. All
//! arithmetic is checked, so a result that does not fit in an `i64` is
//! reported as [`ErrorKind::Overflow`] instead of wrapping.

use errors::{Error, ErrorKind, SyntaxError};
use lexer::Tokenizer;
use std::mem;
use text_size::TextRange;
use token::{Token, TokenKind};

/// How many parentheses and unary minuses may enclose an operand.
pub const DEFAULT_MAX_DEPTH: usize = 256;

pub fn parse(line: &str) -> Result<i64, Error> {
    parse_with_max_depth(line, DEFAULT_MAX_DEPTH)
}

pub fn parse_with_max_depth(line: &str, max_depth: usize) -> Result<i64, Error> {
    tracing::debug!(line, "evaluating");

    let result = Evaluator::new(line).and_then(|evaluator| evaluator.max_depth(max_depth).parse());

    match &result {
        Ok(value) => tracing::debug!(value, "evaluated"),
        Err(error) => tracing::debug!(%error, range = ?error.range, "evaluation failed"),
    }

    result
}

pub struct Evaluator<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(line: &'a str) -> Result<Self, Error> {
        let mut tokenizer = Tokenizer::new(line);
        let current = tokenizer.next_token()?;

        Ok(Self { tokenizer, current, max_depth: DEFAULT_MAX_DEPTH })
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(mut self) -> Result<i64, Error> {
        let value = self.parse_expr(0)?;

        if !self.at(TokenKind::End) {
            return Err(self.error(SyntaxError::TrailingInput { found: self.current.kind }));
        }

        Ok(value)
    }

    fn parse_expr(&mut self, depth: usize) -> Result<i64, Error> {
        let mut value = self.parse_term(depth)?;

        while let Some(op) = self.additive_op() {
            let range = self.bump()?.range;
            let rhs = self.parse_term(depth)?;
            value = op.apply(value, rhs, range)?;
        }

        Ok(value)
    }

    fn parse_term(&mut self, depth: usize) -> Result<i64, Error> {
        let mut value = self.parse_factor(depth)?;

        while let Some(op) = self.multiplicative_op() {
            let range = self.bump()?.range;
            let rhs = self.parse_factor(depth)?;
            value = op.apply(value, rhs, range)?;
        }

        Ok(value)
    }

    fn parse_factor(&mut self, depth: usize) -> Result<i64, Error> {
        match self.current.kind {
            TokenKind::Number => Ok(self.eat(TokenKind::Number)?.value),

            TokenKind::LParen => {
                let depth = self.nest(depth)?;
                self.eat(TokenKind::LParen)?;

                let value = self.parse_expr(depth)?;

                if !self.at(TokenKind::RParen) {
                    return Err(self.error(SyntaxError::UnmatchedParen { found: self.current.kind }));
                }
                self.eat(TokenKind::RParen)?;

                Ok(value)
            }

            TokenKind::Minus => {
                let depth = self.nest(depth)?;
                let minus = self.eat(TokenKind::Minus)?;

                let value = self.parse_factor(depth)?;

                value.checked_neg().ok_or_else(|| Error::new(ErrorKind::Overflow, minus.range))
            }

            found => Err(self.error(SyntaxError::OperandExpected { found })),
        }
    }

    fn eat(&mut self, expected: TokenKind) -> Result<Token, Error> {
        if !self.at(expected) {
            return Err(
                self.error(SyntaxError::UnexpectedToken { expected, found: self.current.kind })
            );
        }

        self.bump()
    }

    /// Consumes the lookahead token and returns it.
    fn bump(&mut self) -> Result<Token, Error> {
        let next = self.tokenizer.next_token()?;
        Ok(mem::replace(&mut self.current, next))
    }

    fn additive_op(&self) -> Option<BinOp> {
        match self.current.kind {
            TokenKind::Plus => Some(BinOp::Add),
            TokenKind::Minus => Some(BinOp::Sub),
            _ => None,
        }
    }

    fn multiplicative_op(&self) -> Option<BinOp> {
        match self.current.kind {
            TokenKind::Star => Some(BinOp::Mul),
            TokenKind::Slash => Some(BinOp::Div),
            _ => None,
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn nest(&self, depth: usize) -> Result<usize, Error> {
        if depth >= self.max_depth {
            return Err(self.error(SyntaxError::TooDeep { max_depth: self.max_depth }));
        }

        Ok(depth + 1)
    }

    fn error(&self, error: SyntaxError) -> Error {
        Error::new(error.into(), self.current.range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// `range` is the operator's position, used for any error it reports.
    fn apply(self, lhs: i64, rhs: i64, range: TextRange) -> Result<i64, Error> {
        let result = match self {
            BinOp::Add => lhs.checked_add(rhs),
            BinOp::Sub => lhs.checked_sub(rhs),
            BinOp::Mul => lhs.checked_mul(rhs),
            BinOp::Div if rhs == 0 => return Err(Error::new(ErrorKind::DivisionByZero, range)),
            BinOp::Div => lhs.checked_div(rhs),
        };

        result.ok_or_else(|| Error::new(ErrorKind::Overflow, range))
    }
}
