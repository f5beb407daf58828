//! The interpretation core: a character-level lexer, a recursive-descent
//! expression evaluator, a statement interpreter, and the dual-scope
//! variable model, all sharing a single cursor into the loaded source.
//!
//! The [`Interpreter`] struct plays the role the original program's global
//! state played (`prog`, `token`, `lvartos`, `functos`, ...): every method
//! across the sibling modules in this directory is an inherent method on
//! it, split by concern rather than by file-per-struct.

mod builtins;
mod eval;
mod lexer;
mod prescan;
mod stmt;
#[cfg(test)]
mod tests;
mod vars;

use crate::error::{diagnose, Diagnostic, InterpreterError, RunError};
use crate::token::{Function, Token, TokenKind, Variable};

pub const NUM_FUNC: usize = 100;
pub const NUM_GLOBAL_VARS: usize = 100;
pub const NUM_LOCAL_VARS: usize = 200;
pub const FUNC_CALLS: usize = 31;
pub const PROG_SIZE: usize = 10_000;

/// What a block execution encountered, so loops and the call protocol know
/// whether to keep going. Threaded as `ret_occurring`/`break_occurring` in
/// the original; kept here as the same sticky flags (see `DESIGN.md` for
/// why the flag form was kept over a tri-valued result), plus a third
/// `continue_occurring` flag the original doesn't have — needed so a
/// `continue` nested inside an `if` correctly skips the rest of the loop
/// body instead of falling through to the statements after it (see
/// `DESIGN.md`).
pub struct Interpreter {
    buf: Vec<u8>,
    cursor: usize,
    token: Token,
    last_token_start: usize,

    globals: Vec<Variable>,
    locals: Vec<Variable>,
    lvartos: usize,
    call_stack: Vec<usize>,
    functos: usize,

    functions: Vec<Function>,

    pub(crate) ret_value: i64,
    pub(crate) ret_occurring: bool,
    pub(crate) break_occurring: bool,
    pub(crate) continue_occurring: bool,
}

impl Interpreter {
    /// Loads a program buffer. A trailing legacy `0x1A` EOF marker is
    /// replaced with a null terminator; otherwise one is appended.
    pub fn new(mut source: Vec<u8>) -> Interpreter {
        if source.last() == Some(&0x1A) {
            *source.last_mut().unwrap() = 0;
        } else {
            source.push(0);
        }

        Interpreter {
            buf: source,
            cursor: 0,
            token: Token::finished(),
            last_token_start: 0,
            globals: Vec::new(),
            locals: Vec::new(),
            lvartos: 0,
            call_stack: Vec::new(),
            functos: 0,
            functions: Vec::new(),
            ret_value: 0,
            ret_occurring: false,
            break_occurring: false,
            continue_occurring: false,
        }
    }

    fn byte_at(&self, pos: usize) -> u8 {
        self.buf.get(pos).copied().unwrap_or(0)
    }

    fn err(&self, kind: InterpreterError) -> Diagnostic {
        diagnose(&self.buf, self.cursor, kind)
    }

    /// Overwrites the current lookahead token without touching the
    /// cursor, used by the assignment rule to restore an identifier it
    /// peeked past while checking for `=`.
    pub(super) fn restore_token(&mut self, token: Token) {
        self.token = token;
    }

    /// Runs `prescan`, locates `main`, and drives the call protocol on it.
    /// Returns the exit code to use on a clean run (the original always
    /// uses 0; `end;` inside the program terminates the process directly
    /// from within [`Interpreter::interp_block`]).
    pub fn run(&mut self) -> Result<(), RunError> {
        self.prescan()?;
        self.cursor = 0;
        self.lvartos = 0;
        self.functos = 0;
        self.break_occurring = false;
        self.continue_occurring = false;

        if self.find_function("main").is_none() {
            return Err(RunError::MainNotFound);
        }

        self.token = Token {
            kind: TokenKind::Identifier,
            lexeme: "main".to_string(),
            code: crate::token::Code::None,
        };
        Ok(self.call("main")?)
    }
}
