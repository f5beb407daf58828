//! Recursive-descent expression evaluator (§4.5): assignment, relational,
//! additive, multiplicative, unary, primary, atom, lowest precedence first.
//!
//! Every level assumes `self.token` already holds the next unconsumed
//! token on entry and leaves it holding the first token it didn't
//! consume, exactly like the original's global `token`/`tok` pair.

use super::Interpreter;
use crate::error::{Diagnostic, InterpreterError};
use crate::token::{Code, TokenKind};

use super::builtins::Builtin;

impl Interpreter {
    /// Entry point: consumes one token, handles the empty-expression and
    /// end-of-input cases, then defers to the assignment level. Always
    /// ends with exactly one `putback()` so callers re-read the
    /// terminator (`;`, `)`, `,`, ...).
    pub(super) fn eval_exp(&mut self) -> Result<i64, Diagnostic> {
        self.get_token()?;
        if self.current().code == Code::Finished {
            return Err(self.err(InterpreterError::NoExpressionPresent));
        }
        if self.current().is_delim(';') {
            self.putback();
            return Ok(0);
        }
        let value = self.eval_exp0()?;
        self.putback();
        Ok(value)
    }

    /// Assignment (right-associative). Only identifiers that already name
    /// a variable are assignment candidates; anything else falls through
    /// to the relational level.
    fn eval_exp0(&mut self) -> Result<i64, Diagnostic> {
        if self.current().kind == TokenKind::Identifier && self.is_var(&self.current().lexeme) {
            let ident = self.current().clone();
            self.get_token()?;
            if self.current().is_delim('=') {
                self.get_token()?;
                let value = self.eval_exp0()?;
                self.assign_var(&ident.lexeme, value)?;
                return Ok(value);
            }
            self.putback();
            self.restore_token(ident);
        }
        self.eval_exp1()
    }

    /// Relational: one optional binary comparison, not chained.
    fn eval_exp1(&mut self) -> Result<i64, Diagnostic> {
        let value = self.eval_exp2()?;
        let op = self.current().code;
        if op.is_relational() {
            self.get_token()?;
            let rhs = self.eval_exp2()?;
            return Ok(match op {
                Code::Lt => (value < rhs) as i64,
                Code::Le => (value <= rhs) as i64,
                Code::Gt => (value > rhs) as i64,
                Code::Ge => (value >= rhs) as i64,
                Code::Eq => (value == rhs) as i64,
                Code::Ne => (value != rhs) as i64,
                _ => unreachable!(),
            });
        }
        Ok(value)
    }

    /// Left-associative `+`/`-`.
    fn eval_exp2(&mut self) -> Result<i64, Diagnostic> {
        let mut value = self.eval_exp3()?;
        loop {
            if self.current().is_delim('+') {
                self.get_token()?;
                value += self.eval_exp3()?;
            } else if self.current().is_delim('-') {
                self.get_token()?;
                value -= self.eval_exp3()?;
            } else {
                break;
            }
        }
        Ok(value)
    }

    /// Left-associative `*`, `/`, `%`. `%` is `a - (a/b)*b` on truncated
    /// division, matching C's semantics for negative operands.
    fn eval_exp3(&mut self) -> Result<i64, Diagnostic> {
        let mut value = self.eval_exp4()?;
        loop {
            if self.current().is_delim('*') {
                self.get_token()?;
                value *= self.eval_exp4()?;
            } else if self.current().is_delim('/') {
                self.get_token()?;
                let rhs = self.eval_exp4()?;
                if rhs == 0 {
                    return Err(self.err(InterpreterError::DivByZero));
                }
                value /= rhs;
            } else if self.current().is_delim('%') {
                self.get_token()?;
                let rhs = self.eval_exp4()?;
                if rhs == 0 {
                    return Err(self.err(InterpreterError::DivByZero));
                }
                let t = value / rhs;
                value -= t * rhs;
            } else {
                break;
            }
        }
        Ok(value)
    }

    /// Optional leading unary `+`/`-`.
    fn eval_exp4(&mut self) -> Result<i64, Diagnostic> {
        let mut negate = false;
        if self.current().is_delim('+') {
            self.get_token()?;
        } else if self.current().is_delim('-') {
            negate = true;
            self.get_token()?;
        }
        let value = self.eval_exp5()?;
        Ok(if negate { -value } else { value })
    }

    /// `(` expr `)`, or an atom.
    fn eval_exp5(&mut self) -> Result<i64, Diagnostic> {
        if self.current().is_delim('(') {
            self.get_token()?;
            let value = self.eval_exp0()?;
            if !self.current().is_delim(')') {
                return Err(self.err(InterpreterError::ParenExpected));
            }
            self.get_token()?;
            Ok(value)
        } else {
            self.atom()
        }
    }

    /// Leaf of the grammar: a built-in call, a user-function call, a
    /// variable read, a number literal, or a character literal.
    fn atom(&mut self) -> Result<i64, Diagnostic> {
        match self.current().kind {
            TokenKind::Identifier => {
                let name = self.current().lexeme.clone();
                let value = if let Some(builtin) = Builtin::lookup(&name) {
                    self.call_builtin(builtin)?
                } else if self.find_function(&name).is_some() {
                    self.call(&name)?;
                    self.ret_value
                } else {
                    self.find_var(&name)?
                };
                self.get_token()?;
                Ok(value)
            }
            TokenKind::Number => {
                let value = parse_decimal(&self.current().lexeme);
                self.get_token()?;
                Ok(value)
            }
            TokenKind::Delimiter if self.current().is_delim('\'') => {
                // Character literals do not process escapes: the raw byte
                // after the quote is the value, verbatim.
                let value = self.byte_at(self.cursor) as i64;
                self.cursor += 1;
                if self.byte_at(self.cursor) != b'\'' {
                    return Err(self.err(InterpreterError::QuoteExpected));
                }
                self.cursor += 1;
                self.get_token()?;
                Ok(value)
            }
            TokenKind::Delimiter if self.current().is_delim(')') => {
                // Empty expression, e.g. a call with no arguments; leave
                // the `)` token in place for the caller to see.
                Ok(0)
            }
            _ => Err(self.err(InterpreterError::Syntax)),
        }
    }
}

/// `atoi`-equivalent: parses a leading run of decimal digits and stops at
/// the first non-digit rather than erroring, matching `atoi`'s behaviour
/// on a lexeme the lexer guarantees starts with a digit.
fn parse_decimal(s: &str) -> i64 {
    let mut value: i64 = 0;
    for c in s.chars() {
        match c.to_digit(10) {
            Some(d) => value = value * 10 + d as i64,
            None => break,
        }
    }
    value
}

/// `atoi`-equivalent with an optional leading sign and whitespace, used
/// for `getnum`'s line-oriented input rather than a guaranteed-digit
/// lexeme.
pub(super) fn parse_signed_decimal(s: &str) -> i64 {
    let s = s.trim_start();
    let (neg, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let value = parse_decimal(rest);
    if neg { -value } else { value }
}
