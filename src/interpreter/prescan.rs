//! One-pass indexing of every top-level function and global variable
//! before any user code runs (§4.4).

use super::Interpreter;
use crate::error::{Diagnostic, InterpreterError};
use crate::token::{Code, Function, TokenKind, VarKind};

impl Interpreter {
    pub(super) fn prescan(&mut self) -> Result<(), Diagnostic> {
        let saved = self.cursor;
        self.cursor = 0;

        let mut brace = 0usize;
        loop {
            while brace > 0 {
                let tok = self.get_token()?;
                if tok.is_block('{') {
                    brace += 1;
                }
                if tok.is_block('}') {
                    brace -= 1;
                }
                if tok.code == Code::Finished {
                    break;
                }
            }

            let decl_start = self.cursor;
            let tok = self.get_token()?;

            if matches!(tok.code, Code::Char | Code::Int) {
                let datatype = VarKind::from_code(tok.code);
                let name_tok = self.get_token()?;
                if name_tok.kind == TokenKind::Identifier {
                    let name = name_tok.lexeme.clone();
                    let next = self.get_token()?;
                    if next.is_delim('(') {
                        let entry = self.last_token_start;
                        self.push_function(Function {
                            name,
                            ret_kind: datatype,
                            entry,
                        })?;
                        // Raw byte scan to the matching ')' on the same
                        // line, mirroring the original's direct cursor
                        // walk rather than a token loop.
                        while !matches!(self.byte_at(self.cursor), b')' | 0) {
                            self.cursor += 1;
                        }
                        self.cursor += 1;
                        // The next top-level token will be the opening
                        // `{`, which the `else if` arm below counts.
                    } else {
                        self.cursor = decl_start;
                        self.decl_global()?;
                    }
                }
            } else if tok.is_block('{') {
                brace += 1;
            }

            if self.current().code == Code::Finished {
                break;
            }
        }

        self.cursor = saved;
        Ok(())
    }

    /// `int`/`char name, name, ...;` at top level (§4.4, reusing the same
    /// comma-list shape as local declarations).
    fn decl_global(&mut self) -> Result<(), Diagnostic> {
        let type_tok = self.get_token()?;
        let kind = VarKind::from_code(type_tok.code);

        loop {
            let name_tok = self.get_token()?;
            self.push_global(name_tok.lexeme, kind)?;
            let sep = self.get_token()?;
            if !sep.is_delim(',') {
                if !sep.is_delim(';') {
                    return Err(self.err(InterpreterError::SemiExpected));
                }
                break;
            }
        }
        Ok(())
    }
}
