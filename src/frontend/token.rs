//! Token definitions for the Go subset understood by the generator

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }
}

/// Token kinds
///
/// Literals keep their raw source text so that function bodies can be
/// printed back exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    /// package
    Package,
    /// import
    Import,
    /// type
    Type,
    /// interface
    Interface,
    /// struct
    Struct,
    /// func
    Func,
    /// map
    Map,
    /// chan
    Chan,
    /// var
    Var,
    /// const
    Const,

    // ============ Literals ============
    /// Identifier (including the keywords only bodies use, e.g. `return`)
    Ident(String),
    /// Integer literal, raw text
    Int(String),
    /// Floating point literal, raw text
    Float(String),
    /// String literal with its quotes, raw text
    Str(String),
    /// Rune literal with its quotes, raw text
    Rune(String),

    // ============ Punctuation ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ,
    Comma,
    /// .
    Dot,
    /// ...
    Ellipsis,
    /// ;
    Semicolon,
    /// :
    Colon,
    /// *
    Star,
    /// &
    Amp,
    /// <-
    Arrow,
    /// =
    Assign,
    /// :=
    Define,
    /// Any other operator, raw text
    Op(String),

    // ============ Special ============
    /// Line break; significant inside interface and function bodies
    Newline,
    /// End of input
    Eof,
    /// Character the lexer does not understand
    Unknown(char),
}

impl TokenKind {
    /// Convert a keyword string to TokenKind
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "package" => Some(TokenKind::Package),
            "import" => Some(TokenKind::Import),
            "type" => Some(TokenKind::Type),
            "interface" => Some(TokenKind::Interface),
            "struct" => Some(TokenKind::Struct),
            "func" => Some(TokenKind::Func),
            "map" => Some(TokenKind::Map),
            "chan" => Some(TokenKind::Chan),
            "var" => Some(TokenKind::Var),
            "const" => Some(TokenKind::Const),
            _ => None,
        }
    }

    /// Source text of the token
    pub fn text(&self) -> String {
        match self {
            TokenKind::Package => "package".into(),
            TokenKind::Import => "import".into(),
            TokenKind::Type => "type".into(),
            TokenKind::Interface => "interface".into(),
            TokenKind::Struct => "struct".into(),
            TokenKind::Func => "func".into(),
            TokenKind::Map => "map".into(),
            TokenKind::Chan => "chan".into(),
            TokenKind::Var => "var".into(),
            TokenKind::Const => "const".into(),
            TokenKind::Ident(s)
            | TokenKind::Int(s)
            | TokenKind::Float(s)
            | TokenKind::Str(s)
            | TokenKind::Rune(s)
            | TokenKind::Op(s) => s.clone(),
            TokenKind::LParen => "(".into(),
            TokenKind::RParen => ")".into(),
            TokenKind::LBrace => "{".into(),
            TokenKind::RBrace => "}".into(),
            TokenKind::LBracket => "[".into(),
            TokenKind::RBracket => "]".into(),
            TokenKind::Comma => ",".into(),
            TokenKind::Dot => ".".into(),
            TokenKind::Ellipsis => "...".into(),
            TokenKind::Semicolon => ";".into(),
            TokenKind::Colon => ":".into(),
            TokenKind::Star => "*".into(),
            TokenKind::Amp => "&".into(),
            TokenKind::Arrow => "<-".into(),
            TokenKind::Assign => "=".into(),
            TokenKind::Define => ":=".into(),
            TokenKind::Newline => "\n".into(),
            TokenKind::Eof => String::new(),
            TokenKind::Unknown(c) => c.to_string(),
        }
    }

    /// Opening bracket of any kind
    pub fn is_open(&self) -> bool {
        matches!(self, TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket)
    }

    /// Closing bracket of any kind
    pub fn is_close(&self) -> bool {
        matches!(self, TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket)
    }

    /// Whether this token can begin a type expression
    pub fn starts_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Arrow
                | TokenKind::Func
                | TokenKind::Interface
                | TokenKind::Struct
        )
    }
}
