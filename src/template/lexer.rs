//! Placeholder lexer
//!
//! Splits a template into literal text and `{{name}}` placeholders.

use crate::utils::{Error, Result};

/// A piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split `template` into pieces
///
/// A single `{` is ordinary text. Everything between `{{` and the next
/// `}}` must be an identifier.
pub fn pieces(template: &str) -> Result<Vec<Piece<'_>>> {
    let mut pieces = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            pieces.push(Piece::Literal(&rest[..open]));
        }

        let inner_start = open + 2;
        let Some(close) = rest[inner_start..].find('}') else {
            return Err(Error::UnterminatedPlaceholder { offset: offset + open });
        };
        let name = &rest[inner_start..inner_start + close];
        let after = inner_start + close;

        if !rest[after..].starts_with("}}") {
            return Err(Error::InvalidPlaceholder { text: rest[open..=after].to_string() });
        }
        if !is_identifier(name) {
            return Err(Error::InvalidPlaceholder { text: rest[open..after + 2].to_string() });
        }

        pieces.push(Piece::Placeholder(name));
        offset += after + 2;
        rest = &rest[after + 2..];
    }

    if !rest.is_empty() {
        pieces.push(Piece::Literal(rest));
    }
    Ok(pieces)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(pieces("plain text").unwrap(), vec![Piece::Literal("plain text")]);
        assert!(pieces("").unwrap().is_empty());
    }

    #[test]
    fn test_placeholders_between_text() {
        assert_eq!(
            pieces("func New({{Arg}}) *{{Type}} {").unwrap(),
            vec![
                Piece::Literal("func New("),
                Piece::Placeholder("Arg"),
                Piece::Literal(") *"),
                Piece::Placeholder("Type"),
                Piece::Literal(" {"),
            ]
        );
    }

    #[test]
    fn test_single_braces_are_literal() {
        assert_eq!(
            pieces("struct{}{} {x}").unwrap(),
            vec![Piece::Literal("struct{}{} {x}")]
        );
    }

    #[test]
    fn test_unterminated_placeholder() {
        assert!(matches!(
            pieces("abc {{name"),
            Err(Error::UnterminatedPlaceholder { offset: 4 })
        ));
    }

    #[test]
    fn test_invalid_placeholders() {
        assert!(matches!(pieces("{{a b}}"), Err(Error::InvalidPlaceholder { .. })));
        assert!(matches!(pieces("{{}}"), Err(Error::InvalidPlaceholder { .. })));
        assert!(matches!(pieces("{{name}x"), Err(Error::InvalidPlaceholder { .. })));
    }
}
