//! The fixed table of callables implemented outside the evaluator (§4.8).
//!
//! Each one parses its own argument list by walking the source cursor
//! directly rather than going through the evaluator's generic call
//! machinery — a deliberate quirk of the original, preserved here for
//! compatibility (see `DESIGN.md`).

use std::io::{self, BufRead, Read, Write};

use super::Interpreter;
use crate::error::{Diagnostic, InterpreterError};
use crate::token::TokenKind;

use super::eval::parse_signed_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Builtin {
    Getche,
    Putch,
    Puts,
    Print,
    Getnum,
}

impl Builtin {
    pub(super) fn lookup(name: &str) -> Option<Builtin> {
        Some(match name {
            "getche" => Builtin::Getche,
            "putch" => Builtin::Putch,
            "puts" => Builtin::Puts,
            "print" => Builtin::Print,
            "getnum" => Builtin::Getnum,
            _ => return None,
        })
    }
}

impl Interpreter {
    pub(super) fn call_builtin(&mut self, builtin: Builtin) -> Result<i64, Diagnostic> {
        match builtin {
            Builtin::Getche => self.builtin_getche(),
            Builtin::Putch => self.builtin_putch(),
            Builtin::Puts => self.builtin_puts(),
            Builtin::Print => self.builtin_print(),
            Builtin::Getnum => self.builtin_getnum(),
        }
    }

    /// Advances the cursor past the next `)`, ignoring everything in
    /// between. Matches the original's raw `while (*prog != ')') prog++;`
    /// — it does not tokenize, so comments or nested parens inside the
    /// (nonexistent) argument list are not handled specially.
    fn skip_to_close_paren(&mut self) {
        while !matches!(self.byte_at(self.cursor), b')' | 0) {
            self.cursor += 1;
        }
        if self.byte_at(self.cursor) == b')' {
            self.cursor += 1;
        }
    }

    fn builtin_getche(&mut self) -> Result<i64, Diagnostic> {
        let mut buf = [0u8; 1];
        let ch = match io::stdin().read_exact(&mut buf) {
            Ok(()) => buf[0] as i64,
            Err(_) => 0,
        };
        self.skip_to_close_paren();
        Ok(ch)
    }

    fn builtin_putch(&mut self) -> Result<i64, Diagnostic> {
        let value = self.eval_exp()?;
        io::stdout().write_all(&[value as u8]).ok();
        io::stdout().flush().ok();
        Ok(value)
    }

    fn builtin_puts(&mut self) -> Result<i64, Diagnostic> {
        self.get_token()?;
        if !self.current().is_delim('(') {
            return Err(self.err(InterpreterError::ParenExpected));
        }
        self.get_token()?;
        if self.current().kind != TokenKind::String {
            return Err(self.err(InterpreterError::QuoteExpected));
        }
        let s = self.current().lexeme.clone();
        println!("{s}");
        self.get_token()?;
        if !self.current().is_delim(')') {
            return Err(self.err(InterpreterError::ParenExpected));
        }
        self.get_token()?;
        if !self.current().is_delim(';') {
            return Err(self.err(InterpreterError::SemiExpected));
        }
        self.putback();
        io::stdout().flush().ok();
        Ok(0)
    }

    fn builtin_print(&mut self) -> Result<i64, Diagnostic> {
        self.get_token()?;
        if !self.current().is_delim('(') {
            return Err(self.err(InterpreterError::ParenExpected));
        }
        self.get_token()?;
        if self.current().kind == TokenKind::String {
            print!("{} ", self.current().lexeme);
        } else {
            self.putback();
            let value = self.eval_exp()?;
            print!("{value} ");
        }
        self.get_token()?;
        if !self.current().is_delim(')') {
            return Err(self.err(InterpreterError::ParenExpected));
        }
        self.get_token()?;
        if !self.current().is_delim(';') {
            return Err(self.err(InterpreterError::SemiExpected));
        }
        self.putback();
        io::stdout().flush().ok();
        Ok(0)
    }

    fn builtin_getnum(&mut self) -> Result<i64, Diagnostic> {
        let mut line = String::new();
        let value = match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => 0,
            Ok(_) => parse_signed_decimal(&line),
        };
        self.skip_to_close_paren();
        Ok(value)
    }
}
