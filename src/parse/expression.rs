//! Arithmetic expressions in tuning config text
//!
//! Grammar (whitespace ignored):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('^' unary)?
//! primary := number | '(' expr ')'
//! ```
//!
//! `^` is exponentiation and is right associative. Only finite results
//! are accepted.

use crate::errors::ExpressionError;

/// Evaluate an arithmetic expression to a finite float
pub fn evaluate(input: &str) -> Result<f64, ExpressionError> {
    let mut parser = ExprParser::new(input);
    parser.skip_ws();
    if parser.at_end() {
        return Err(ExpressionError::Empty);
    }

    let value = parser.expr()?;
    parser.skip_ws();
    if let Some(ch) = parser.peek() {
        return Err(if ch == ')' {
            ExpressionError::UnbalancedParen(parser.pos)
        } else {
            ExpressionError::UnexpectedChar { ch, pos: parser.pos }
        });
    }

    if !value.is_finite() {
        return Err(ExpressionError::NotFinite);
    }
    Ok(value)
}

struct ExprParser {
    chars: Vec<char>,
    pos: usize,
}

impl ExprParser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Consume `ch` if it is the next non-whitespace character
    fn eat(&mut self, ch: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.term()?;
        loop {
            if self.eat('+') {
                value += self.term()?;
            } else if self.eat('-') {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> Result<f64, ExpressionError> {
        let mut value = self.unary()?;
        loop {
            if self.eat('*') {
                value *= self.unary()?;
            } else if self.eat('/') {
                value /= self.unary()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> Result<f64, ExpressionError> {
        if self.eat('-') {
            return Ok(-self.unary()?);
        }
        if self.eat('+') {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<f64, ExpressionError> {
        let base = self.primary()?;
        if self.eat('^') {
            let exponent = self.unary()?;
            return Ok(base.powf(exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64, ExpressionError> {
        self.skip_ws();
        match self.peek() {
            None => Err(ExpressionError::UnexpectedEnd),
            Some('(') => {
                let open = self.pos;
                self.pos += 1;
                let value = self.expr()?;
                if !self.eat(')') {
                    return Err(ExpressionError::UnbalancedParen(open));
                }
                Ok(value)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(ch) => Err(ExpressionError::UnexpectedChar { ch, pos: self.pos }),
        }
    }

    fn number(&mut self) -> Result<f64, ExpressionError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }

        // Optional exponent, only consumed when digits follow
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.pos += 1;
            }
            if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = mark;
            }
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        literal
            .parse::<f64>()
            .map_err(|_| ExpressionError::InvalidNumber(literal))
    }
}
