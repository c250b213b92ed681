//! Lexer for the Go subset
//!
//! Converts source text into a stream of tokens. Comments are dropped,
//! line breaks are kept as `Newline` tokens because interface method lists
//! and function bodies are line oriented.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::Span;

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current line (1-based)
    line: usize,
    /// Line the current token started on
    start_line: usize,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            start_line: 1,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c == Some('\n') {
            self.line += 1;
        }
        self.pos += 1;
        c
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Create a token spanning from start to the current position
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos, self.start_line))
    }

    /// Text of the current token
    fn lexeme(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    /// Skip spaces and comments, stopping at line breaks
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                // Line comment; the newline itself is still emitted
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    self.advance();
                    self.advance();
                    while !self.is_at_end() {
                        if self.peek() == Some('*') && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme();
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident(text));
        self.make_token(kind)
    }

    /// Read a number literal (integer or float), keeping its raw text
    fn read_number(&mut self) -> Token {
        let mut is_float = false;

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                if matches!(c, 'e' | 'E') && !self.lexeme().starts_with("0x") {
                    is_float = true;
                    self.advance();
                    if matches!(self.peek(), Some('+') | Some('-')) {
                        self.advance();
                    }
                    continue;
                }
                self.advance();
            } else if c == '.' && !is_float && self.peek_next().map_or(true, |n| n != '.') {
                is_float = true;
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme();
        if is_float {
            self.make_token(TokenKind::Float(text))
        } else {
            self.make_token(TokenKind::Int(text))
        }
    }

    /// Read a quoted literal delimited by `quote`; backslash escapes are kept verbatim
    fn read_quoted(&mut self, quote: char) -> Token {
        self.advance(); // opening quote

        while let Some(c) = self.peek() {
            if c == quote {
                self.advance();
                break;
            } else if c == '\\' && quote != '`' {
                self.advance();
                self.advance();
            } else if c == '\n' && quote != '`' {
                // Unterminated literal
                break;
            } else {
                self.advance();
            }
        }

        let text = self.lexeme();
        match quote {
            '\'' => self.make_token(TokenKind::Rune(text)),
            _ => self.make_token(TokenKind::Str(text)),
        }
    }

    /// Read an operator made of symbol characters, longest match first
    fn read_operator(&mut self, c: char) -> TokenKind {
        const OPERATORS: [&str; 33] = [
            "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=",
            ":=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-",
            "/", "%", "|", "^", "<", ">",
        ];

        let rest: String = self.source[self.start..].iter().take(3).collect();
        for op in OPERATORS {
            if rest.starts_with(op) {
                for _ in 1..op.len() {
                    self.advance();
                }
                return match op {
                    "..." => TokenKind::Ellipsis,
                    "<-" => TokenKind::Arrow,
                    ":=" => TokenKind::Define,
                    _ => TokenKind::Op(op.to_string()),
                };
            }
        }

        match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '*' => TokenKind::Star,
            '&' => TokenKind::Amp,
            '=' => TokenKind::Assign,
            '!' | '~' => TokenKind::Op(c.to_string()),
            _ => TokenKind::Unknown(c),
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;
        self.start_line = self.line;

        let Some(c) = self.peek() else {
            return Token::eof(Span::new(self.pos, self.pos, self.line));
        };

        if c.is_alphabetic() || c == '_' {
            return self.read_identifier();
        }

        if c.is_ascii_digit() || (c == '.' && self.peek_next().map_or(false, |n| n.is_ascii_digit())) {
            return self.read_number();
        }

        if matches!(c, '"' | '`' | '\'') {
            return self.read_quoted(c);
        }

        self.advance();
        if c == '\n' {
            return self.make_token(TokenKind::Newline);
        }

        let kind = self.read_operator(c);
        self.make_token(kind)
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_interface_tokens() {
        let tokens = kinds("type Repo interface {\n\tGet(id string) error\n}");

        assert!(matches!(tokens[0], TokenKind::Type));
        assert!(matches!(tokens[1], TokenKind::Ident(ref s) if s == "Repo"));
        assert!(matches!(tokens[2], TokenKind::Interface));
        assert!(matches!(tokens[3], TokenKind::LBrace));
        assert!(matches!(tokens[4], TokenKind::Newline));
        assert!(matches!(tokens[5], TokenKind::Ident(ref s) if s == "Get"));
        assert!(matches!(tokens[6], TokenKind::LParen));
        assert!(matches!(tokens.last(), Some(TokenKind::Eof)));
    }

    #[test]
    fn test_comments_are_dropped_but_lines_kept() {
        let tokens = kinds("a // trailing\n/* block\ncomment */ b");

        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Newline,
                TokenKind::Ident("b".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_longest_match() {
        let tokens = kinds("x := <-ch ... != &^= &v *p");

        assert!(matches!(tokens[1], TokenKind::Define));
        assert!(matches!(tokens[2], TokenKind::Arrow));
        assert!(matches!(tokens[4], TokenKind::Ellipsis));
        assert!(matches!(tokens[5], TokenKind::Op(ref s) if s == "!="));
        assert!(matches!(tokens[6], TokenKind::Op(ref s) if s == "&^="));
        assert!(matches!(tokens[7], TokenKind::Amp));
        assert!(matches!(tokens[9], TokenKind::Star));
    }

    #[test]
    fn test_literals_keep_raw_text() {
        let tokens = kinds(r#""a\"b" `raw` 'x' 42 3.5 1e9"#);

        assert!(matches!(tokens[0], TokenKind::Str(ref s) if s == r#""a\"b""#));
        assert!(matches!(tokens[1], TokenKind::Str(ref s) if s == "`raw`"));
        assert!(matches!(tokens[2], TokenKind::Rune(ref s) if s == "'x'"));
        assert!(matches!(tokens[3], TokenKind::Int(ref s) if s == "42"));
        assert!(matches!(tokens[4], TokenKind::Float(ref s) if s == "3.5"));
        assert!(matches!(tokens[5], TokenKind::Float(ref s) if s == "1e9"));
    }

    #[test]
    fn test_spans_track_lines() {
        let tokens = Lexer::new("a\n  b").tokenize();
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[2].span.line, 2);
        assert_eq!(tokens[2].span.start, 4);
    }
}
