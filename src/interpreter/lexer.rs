//! `get_token` / `putback`: the character-level lexer.
//!
//! Unlike the original's fixed 80-byte scratch buffer, tokens are owned
//! `String`s here — the fixed-capacity lexeme buffer was an artifact of C's
//! manual memory management, not an observable behaviour, so it is not
//! reproduced (see `DESIGN.md`).

use super::Interpreter;
use crate::error::{Diagnostic, InterpreterError};
use crate::token::{Code, Token, TokenKind};

/// Fixed delimiter set used to terminate identifiers and numbers.
fn is_delim(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'\t'
            | b'\r'
            | b'\n'
            | 0
            | b'!'
            | b';'
            | b','
            | b'+'
            | b'-'
            | b'<'
            | b'>'
            | b'\''
            | b'/'
            | b'*'
            | b'%'
            | b'^'
            | b'='
            | b'('
            | b')'
    )
}

fn is_white(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

const SINGLE_DELIMS: &[u8] = b"+-*^/%=;(),'";

impl Interpreter {
    /// Rewinds the cursor so the next `get_token` re-reads the token just
    /// returned. Valid once per `get_token` call.
    pub(super) fn putback(&mut self) {
        self.cursor = self.last_token_start;
    }

    pub(super) fn current(&self) -> &Token {
        &self.token
    }

    /// Advances past whitespace, CR/LF (any combination), and comments.
    fn skip_trivia(&mut self) {
        loop {
            while is_white(self.byte_at(self.cursor)) {
                self.cursor += 1;
            }

            if self.byte_at(self.cursor) == b'\r' {
                self.cursor += 1;
                if self.byte_at(self.cursor) == b'\n' {
                    self.cursor += 1;
                }
                continue;
            }
            if self.byte_at(self.cursor) == b'\n' {
                self.cursor += 1;
                continue;
            }

            if self.byte_at(self.cursor) == b'/' && self.byte_at(self.cursor + 1) == b'*' {
                self.cursor += 2;
                loop {
                    let c = self.byte_at(self.cursor);
                    if c == 0 {
                        break;
                    }
                    if c == b'*' && self.byte_at(self.cursor + 1) == b'/' {
                        self.cursor += 2;
                        break;
                    }
                    self.cursor += 1;
                }
                continue;
            }

            if self.byte_at(self.cursor) == b'/' && self.byte_at(self.cursor + 1) == b'/' {
                self.cursor += 2;
                while !matches!(self.byte_at(self.cursor), b'\r' | b'\n' | 0) {
                    self.cursor += 1;
                }
                continue;
            }

            break;
        }
    }

    pub(super) fn get_token(&mut self) -> Result<Token, Diagnostic> {
        let tok = self.get_token_inner()?;
        if cfg!(feature = "verbose") {
            println!("[LOG] TOKEN {:?} at {}", tok, self.last_token_start);
        }
        Ok(tok)
    }

    fn get_token_inner(&mut self) -> Result<Token, Diagnostic> {
        self.skip_trivia();
        self.last_token_start = self.cursor;

        let c = self.byte_at(self.cursor);

        if c == 0 {
            self.token = Token::finished();
            return Ok(self.token.clone());
        }

        if c == b'{' || c == b'}' {
            self.cursor += 1;
            self.token = Token {
                kind: TokenKind::Block,
                lexeme: (c as char).to_string(),
                code: Code::None,
            };
            return Ok(self.token.clone());
        }

        if let Some(tok) = self.try_relational()? {
            self.token = tok;
            return Ok(self.token.clone());
        }

        if SINGLE_DELIMS.contains(&c) {
            self.cursor += 1;
            self.token = Token {
                kind: TokenKind::Delimiter,
                lexeme: (c as char).to_string(),
                code: Code::None,
            };
            return Ok(self.token.clone());
        }

        if c == b'"' {
            self.token = self.read_string()?;
            return Ok(self.token.clone());
        }

        if c.is_ascii_digit() {
            self.token = self.read_number();
            return Ok(self.token.clone());
        }

        if c.is_ascii_alphabetic() {
            self.token = self.read_word();
            return Ok(self.token.clone());
        }

        Err(self.err(InterpreterError::Syntax))
    }

    fn try_relational(&mut self) -> Result<Option<Token>, Diagnostic> {
        let c = self.byte_at(self.cursor);
        let c1 = self.byte_at(self.cursor + 1);

        let two = match (c, c1) {
            (b'=', b'=') => Some((Code::Eq, "==")),
            (b'!', b'=') => Some((Code::Ne, "!=")),
            (b'<', b'=') => Some((Code::Le, "<=")),
            (b'>', b'=') => Some((Code::Ge, ">=")),
            _ => None,
        };
        if let Some((code, lexeme)) = two {
            self.cursor += 2;
            return Ok(Some(Token {
                kind: TokenKind::Delimiter,
                lexeme: lexeme.to_string(),
                code,
            }));
        }

        if c == b'<' {
            self.cursor += 1;
            return Ok(Some(Token {
                kind: TokenKind::Delimiter,
                lexeme: "<".to_string(),
                code: Code::Lt,
            }));
        }
        if c == b'>' {
            self.cursor += 1;
            return Ok(Some(Token {
                kind: TokenKind::Delimiter,
                lexeme: ">".to_string(),
                code: Code::Gt,
            }));
        }
        if c == b'!' {
            return Err(self.err(InterpreterError::Syntax));
        }

        Ok(None)
    }

    fn read_string(&mut self) -> Result<Token, Diagnostic> {
        self.cursor += 1; // opening quote
        let mut raw = Vec::new();
        loop {
            let c = self.byte_at(self.cursor);
            if c == b'\r' || c == b'\n' || c == 0 {
                return Err(self.err(InterpreterError::Syntax));
            }
            if c == b'"' && raw.last() != Some(&b'\\') {
                break;
            }
            raw.push(c);
            self.cursor += 1;
        }
        self.cursor += 1; // closing quote

        Ok(Token {
            kind: TokenKind::String,
            lexeme: String::from_utf8_lossy(&apply_escapes(raw)).into_owned(),
            code: Code::None,
        })
    }

    fn read_number(&mut self) -> Token {
        let start = self.cursor;
        while !is_delim(self.byte_at(self.cursor)) {
            self.cursor += 1;
        }
        let lexeme = String::from_utf8_lossy(&self.buf[start..self.cursor]).into_owned();
        Token {
            kind: TokenKind::Number,
            lexeme,
            code: Code::None,
        }
    }

    fn read_word(&mut self) -> Token {
        let start = self.cursor;
        while !is_delim(self.byte_at(self.cursor)) {
            self.cursor += 1;
        }
        let raw = String::from_utf8_lossy(&self.buf[start..self.cursor]).into_owned();
        let lowered = raw.to_ascii_lowercase();
        match Code::keyword(&lowered) {
            Some(code) => Token {
                kind: TokenKind::Keyword,
                lexeme: lowered,
                code,
            },
            None => Token {
                kind: TokenKind::Identifier,
                lexeme: raw,
                code: Code::None,
            },
        }
    }
}

/// Sequential escape replacement, in the documented order, so that `\\n`
/// is not double-transformed by an earlier `\n` pass.
fn apply_escapes(buf: Vec<u8>) -> Vec<u8> {
    const TABLE: [(u8, u8); 10] = [
        (b'a', 0x07),
        (b'b', 0x08),
        (b'f', 0x0C),
        (b'n', b'\n'),
        (b'r', b'\r'),
        (b't', b'\t'),
        (b'v', 0x0B),
        (b'\\', b'\\'),
        (b'\'', b'\''),
        (b'"', b'"'),
    ];

    let mut out = buf;
    for (escaped, replacement) in TABLE {
        out = replace_pair(&out, escaped, replacement);
    }
    out
}

fn replace_pair(buf: &[u8], escaped: u8, replacement: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(buf.len());
    let mut i = 0;
    while i < buf.len() {
        if buf[i] == b'\\' && i + 1 < buf.len() && buf[i + 1] == escaped {
            out.push(replacement);
            i += 2;
        } else {
            out.push(buf[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::Interpreter;

    fn lex_all(src: &str) -> Vec<Token> {
        let mut interp = Interpreter::new(src.as_bytes().to_vec());
        let mut out = Vec::new();
        loop {
            let t = interp.get_token().unwrap();
            let finished = t.code == Code::Finished;
            out.push(t);
            if finished {
                break;
            }
        }
        out
    }

    #[test]
    fn pushback_round_trips_every_token() {
        let mut interp = Interpreter::new(b"int x = 1 + 2;".to_vec());
        loop {
            let before = interp.cursor;
            let first = interp.get_token().unwrap();
            interp.putback();
            let second = interp.get_token().unwrap();
            assert_eq!(first, second);
            if first.code == Code::Finished {
                assert_eq!(interp.cursor, before);
                break;
            }
        }
    }

    #[test]
    fn relational_operators_get_distinct_codes() {
        let toks = lex_all("< <= > >= == !=");
        let codes: Vec<Code> = toks.iter().map(|t| t.code).collect();
        assert_eq!(
            codes,
            vec![
                Code::Lt,
                Code::Le,
                Code::Gt,
                Code::Ge,
                Code::Eq,
                Code::Ne,
                Code::Finished
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive_identifiers_are_not() {
        let toks = lex_all("IF foo Foo");
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[0].code, Code::If);
        assert_eq!(toks[1].kind, TokenKind::Identifier);
        assert_eq!(toks[1].lexeme, "foo");
        assert_eq!(toks[2].lexeme, "Foo");
        assert_ne!(toks[1].lexeme, toks[2].lexeme);
    }

    #[test]
    fn string_escapes_apply_in_fixed_order() {
        let toks = lex_all(r#""a\nb\\nc""#);
        assert_eq!(toks[0].kind, TokenKind::String);
        assert_eq!(toks[0].lexeme, "a\nb\\nc");
    }

    #[test]
    fn line_comment_is_skipped() {
        let toks = lex_all("1 // comment\n+ 2");
        assert_eq!(toks[0].lexeme, "1");
        assert_eq!(toks[1].lexeme, "+");
        assert_eq!(toks[2].lexeme, "2");
    }

    #[test]
    fn block_comment_is_skipped() {
        let toks = lex_all("1 /* comment */ + 2");
        assert_eq!(toks[0].lexeme, "1");
        assert_eq!(toks[1].lexeme, "+");
    }
}
