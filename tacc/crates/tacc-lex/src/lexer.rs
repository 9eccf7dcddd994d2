//! Indentation-sensitive lexer.
//!
//! Dispatch-by-character design grounded on the teacher's
//! `faxc_lex::lexer::core::Lexer` (a `next_token` that matches on
//! `cursor.current_char()` and falls through to `lex_*` helpers); the
//! indentation-stack INDENT/DEDENT machinery in spec.md §4.1 has no teacher
//! equivalent (the teacher's source language is brace-delimited) and is
//! built fresh here, driving the same cursor.

use crate::cursor::Cursor;
use crate::token::{keyword, Token, TokenKind};
use tacc_util::{LexerError, Symbol};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    /// Stack of indentation widths seen so far; starts at `[0]` per spec.md.
    indent_stack: Vec<u32>,
    /// Depth of unmatched `(`/`[`/`{`; while positive, newlines are not
    /// layout-significant.
    bracket_depth: i32,
    at_line_start: bool,
    /// DEDENTs still owed from the last indentation decrease, beyond the
    /// one already returned — popping the whole stack distance happens
    /// once per logical line, not once per token request.
    pending_dedents: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
            pending_dedents: 0,
        }
    }

    /// Lex the entire source into a token vector terminated by `Eof`.
    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, LexerError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    fn line(&self) -> u32 {
        self.cursor.line()
    }

    fn error(&self, message: impl Into<String>) -> LexerError {
        LexerError::new(self.line(), message)
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        if self.pending_dedents > 0 {
            self.pending_dedents -= 1;
            return Ok(Token::new(TokenKind::Dedent, self.line()));
        }

        if self.at_line_start && self.bracket_depth == 0 {
            if let Some(tok) = self.handle_line_start()? {
                return Ok(tok);
            }
        }

        self.skip_intraline_whitespace_and_comments();

        let line = self.line();
        let c = self.cursor.current_char();

        if c == '\0' {
            return self.finish_at_eof();
        }

        if c == '\n' {
            self.cursor.advance();
            if self.bracket_depth == 0 {
                self.at_line_start = true;
                return Ok(Token::new(TokenKind::Newline, line));
            }
            return self.next_token();
        }

        if c.is_ascii_digit() {
            return self.lex_number(line);
        }
        if c == '"' || c == '\'' {
            return self.lex_string(line, c);
        }
        if c.is_alphabetic() || c == '_' {
            return self.lex_identifier(line);
        }

        self.lex_punctuation(line, c)
    }

    /// At the start of a logical line: measure indentation, skip blank and
    /// comment-only lines, and emit INDENT/DEDENT as the stack requires.
    /// Returns `Some(token)` if an INDENT/DEDENT/EOF token was produced;
    /// `None` once the cursor sits on the first real token of the line.
    fn handle_line_start(&mut self) -> Result<Option<Token>, LexerError> {
        loop {
            let mut width = 0u32;
            loop {
                match self.cursor.current_char() {
                    ' ' => {
                        width += 1;
                        self.cursor.advance();
                    }
                    '\t' => {
                        width += 1;
                        self.cursor.advance();
                    }
                    _ => break,
                }
            }

            match self.cursor.current_char() {
                '\0' => {
                    self.at_line_start = false;
                    return Ok(Some(self.finish_at_eof()?));
                }
                '\n' => {
                    // Blank line: no layout event, try the next line.
                    self.cursor.advance();
                    continue;
                }
                '#' => {
                    self.skip_comment();
                    if self.cursor.current_char() == '\n' {
                        self.cursor.advance();
                    }
                    continue;
                }
                _ => {}
            }

            let line = self.line();
            let top = *self.indent_stack.last().unwrap();
            if width > top {
                self.indent_stack.push(width);
                self.at_line_start = false;
                return Ok(Some(Token::new(TokenKind::Indent, line)));
            }
            if width < top {
                let mut popped = 0u32;
                while width < *self.indent_stack.last().unwrap() {
                    self.indent_stack.pop();
                    popped += 1;
                }
                if width != *self.indent_stack.last().unwrap() {
                    return Err(self.error(format!(
                        "nivel de indentación inconsistente: {width}"
                    )));
                }
                self.at_line_start = false;
                self.pending_dedents = popped - 1;
                return Ok(Some(Token::new(TokenKind::Dedent, line)));
            }

            self.at_line_start = false;
            return Ok(None);
        }
    }

    fn finish_at_eof(&mut self) -> Result<Token, LexerError> {
        if self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            return Ok(Token::new(TokenKind::Dedent, self.line()));
        }
        Ok(Token::new(TokenKind::Eof, self.line()))
    }

    fn skip_intraline_whitespace_and_comments(&mut self) {
        loop {
            match self.cursor.current_char() {
                ' ' | '\t' | '\r' => {
                    self.cursor.advance();
                }
                '#' => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while self.cursor.current_char() != '\n' && self.cursor.current_char() != '\0' {
            self.cursor.advance();
        }
    }

    fn lex_number(&mut self, line: u32) -> Result<Token, LexerError> {
        let start = self.cursor.position();
        let mut is_float = false;

        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.current_char() == '.' && self.cursor.peek_char().is_ascii_digit() {
            is_float = true;
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let text = self.cursor.slice_from(start);
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| self.error(format!("número de punto flotante inválido: {text}")))?;
            Ok(Token::new(TokenKind::Float(value), line))
        } else {
            let value: i64 = text
                .parse()
                .map_err(|_| self.error(format!("número entero inválido: {text}")))?;
            Ok(Token::new(TokenKind::Int(value), line))
        }
    }

    fn lex_string(&mut self, line: u32, quote: char) -> Result<Token, LexerError> {
        self.cursor.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.cursor.current_char() {
                '\0' | '\n' => {
                    return Err(self.error("cadena de texto sin terminar"));
                }
                c if c == quote => {
                    self.cursor.advance();
                    break;
                }
                '\\' => {
                    self.cursor.advance();
                    let escaped = match self.cursor.current_char() {
                        'n' => '\n',
                        't' => '\t',
                        '\\' => '\\',
                        '"' => '"',
                        '\'' => '\'',
                        other => {
                            return Err(self.error(format!(
                                "secuencia de escape desconocida: \\{other}"
                            )))
                        }
                    };
                    value.push(escaped);
                    self.cursor.advance();
                }
                c => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::Str(value), line))
    }

    fn lex_identifier(&mut self, line: u32) -> Result<Token, LexerError> {
        let start = self.cursor.position();
        while {
            let c = self.cursor.current_char();
            c.is_alphanumeric() || c == '_'
        } {
            self.cursor.advance();
        }
        let text = self.cursor.slice_from(start);
        let kind = keyword(text).unwrap_or_else(|| TokenKind::Ident(Symbol::intern(text)));
        Ok(Token::new(kind, line))
    }

    fn lex_punctuation(&mut self, line: u32, c: char) -> Result<Token, LexerError> {
        macro_rules! advance_with {
            ($kind:expr) => {{
                self.cursor.advance();
                Ok(Token::new($kind, line))
            }};
        }

        match c {
            '(' => {
                self.bracket_depth += 1;
                advance_with!(TokenKind::LParen)
            }
            ')' => {
                self.bracket_depth -= 1;
                advance_with!(TokenKind::RParen)
            }
            '[' => {
                self.bracket_depth += 1;
                advance_with!(TokenKind::LBracket)
            }
            ']' => {
                self.bracket_depth -= 1;
                advance_with!(TokenKind::RBracket)
            }
            '{' => {
                self.bracket_depth += 1;
                advance_with!(TokenKind::LBrace)
            }
            '}' => {
                self.bracket_depth -= 1;
                advance_with!(TokenKind::RBrace)
            }
            ':' => advance_with!(TokenKind::Colon),
            ',' => advance_with!(TokenKind::Comma),
            '.' => advance_with!(TokenKind::Dot),
            '+' => advance_with!(TokenKind::Plus),
            '-' => advance_with!(TokenKind::Minus),
            '*' => advance_with!(TokenKind::Star),
            '/' => advance_with!(TokenKind::Slash),
            '%' => advance_with!(TokenKind::Percent),
            '=' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(Token::new(TokenKind::Eq, line))
                } else {
                    Ok(Token::new(TokenKind::Assign, line))
                }
            }
            '!' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(Token::new(TokenKind::Ne, line))
                } else {
                    Err(self.error("carácter inesperado: '!'"))
                }
            }
            '<' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(Token::new(TokenKind::Le, line))
                } else {
                    Ok(Token::new(TokenKind::Lt, line))
                }
            }
            '>' => {
                self.cursor.advance();
                if self.cursor.match_char('=') {
                    Ok(Token::new(TokenKind::Ge, line))
                } else {
                    Ok(Token::new(TokenKind::Gt, line))
                }
            }
            other => Err(self.error(format!("carácter inesperado: '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn simple_assignment_and_print() {
        let ks = kinds("x = 1 + 2\nprint(x)\n");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident(Symbol::intern("x")),
                TokenKind::Assign,
                TokenKind::Int(1),
                TokenKind::Plus,
                TokenKind::Int(2),
                TokenKind::Newline,
                TokenKind::Print,
                TokenKind::LParen,
                TokenKind::Ident(Symbol::intern("x")),
                TokenKind::RParen,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn ends_with_eof() {
        let ks = kinds("x = 1\n");
        assert_eq!(ks.last(), Some(&TokenKind::Eof));
    }

    #[test]
    fn indent_and_dedent_around_block() {
        let ks = kinds("if x:\n    print(1)\nprint(2)\n");
        assert!(ks.contains(&TokenKind::Indent));
        assert!(ks.contains(&TokenKind::Dedent));
    }

    #[test]
    fn blank_and_comment_lines_produce_no_layout_events() {
        let ks = kinds("x = 1\n\n# a comment\ny = 2\n");
        let newline_count = ks.iter().filter(|k| **k == TokenKind::Newline).count();
        assert_eq!(newline_count, 2);
    }

    #[test]
    fn mismatched_dedent_is_an_error() {
        let err = Lexer::tokenize("if x:\n  print(1)\n print(2)\n").unwrap_err();
        assert_eq!(err.line, 3);
    }

    #[test]
    fn string_escapes_are_decoded() {
        let ks = kinds("\"a\\nb\"");
        assert_eq!(ks[0], TokenKind::Str("a\nb".to_string()));
    }

    #[test]
    fn float_literal_requires_fractional_digit() {
        let ks = kinds("3.14");
        assert_eq!(ks[0], TokenKind::Float(3.14));
    }

    #[test]
    fn two_char_operators_are_not_confused_with_assign() {
        let ks = kinds("a == b != c <= d >= e");
        assert_eq!(
            ks,
            vec![
                TokenKind::Ident(Symbol::intern("a")),
                TokenKind::Eq,
                TokenKind::Ident(Symbol::intern("b")),
                TokenKind::Ne,
                TokenKind::Ident(Symbol::intern("c")),
                TokenKind::Le,
                TokenKind::Ident(Symbol::intern("d")),
                TokenKind::Ge,
                TokenKind::Ident(Symbol::intern("e")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newlines_inside_brackets_are_not_layout_significant() {
        let ks = kinds("x = [1,\n2,\n3]\n");
        let newline_count = ks.iter().filter(|k| **k == TokenKind::Newline).count();
        assert_eq!(newline_count, 1);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(Lexer::tokenize("\"abc").is_err());
    }
}
