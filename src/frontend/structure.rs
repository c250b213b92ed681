//! Structural parsing of user input
//!
//! The input is either a full interface declaration or a bare function
//! type. Each is tried by wrapping the raw text in a synthetic file; the
//! first wrapping that parses wins.

use log::debug;

use crate::frontend::ast::{Node, SourceFile};
use crate::frontend::parser::parse_source;
use crate::signature::InterfaceDescriptor;
use crate::template::{render, Env};
use crate::utils::{Error, Result, ValidationError};

/// Wrapping templates, tried in order
const TEMPLATES: [&str; 2] = [
    "package whatever\n\n{{TEXT}}\n",
    "package whatever\n\ntype xxx {{TEXT}}\n",
];

/// Parse raw input into a source file
pub fn parse_structure(text: &str) -> Result<SourceFile> {
    let mut last_error = None;

    for (index, template) in TEMPLATES.iter().enumerate() {
        let source = render(&Env::new().set("TEXT", text), template)?;
        match parse_source(&source) {
            Ok(file) => {
                debug!("input parsed with template {}", index);
                return Ok(file);
            }
            Err(err) => {
                debug!("template {} rejected input: {}", index, err);
                last_error = Some(err);
            }
        }
    }

    Err(Error::NoTemplateParsed {
        source: Box::new(last_error.unwrap_or(Error::Io("no templates".into()))),
    })
}

/// Parse raw input into the first interface or function type it declares
pub fn parse_descriptor(text: &str) -> Result<InterfaceDescriptor> {
    let file = parse_structure(text)?;
    file.nodes()
        .into_iter()
        .find_map(|node| match node {
            Node::TypeSpec(spec) => InterfaceDescriptor::from_type_spec(spec),
            _ => None,
        })
        .ok_or_else(|| ValidationError::NothingToImplement.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::InterfaceKind;
    use crate::utils::Tier;

    #[test]
    fn test_interface_block() {
        let desc = parse_descriptor(
            "type UserRepo interface {\n\tGet(ctx context.Context, id string) (User, error)\n\tDelete(id string) error\n}",
        )
        .unwrap();

        assert_eq!(desc.name, "UserRepo");
        assert_eq!(desc.kind, InterfaceKind::Interface);
        let names: Vec<_> = desc.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Get", "Delete"]);
        assert!(desc.methods[0].takes_context());
        assert!(desc.methods[1].returns_error());
    }

    #[test]
    fn test_bare_function_type() {
        let desc = parse_descriptor("func(path string) (Config, error)").unwrap();

        assert_eq!(desc.name, "xxx");
        assert_eq!(desc.kind, InterfaceKind::Function);
        assert_eq!(desc.methods.len(), 1);
        assert!(desc.methods[0].returns_error());
    }

    #[test]
    fn test_bare_interface_type() {
        let desc = parse_descriptor("interface { Ping() error }").unwrap();
        assert_eq!(desc.methods[0].name, "Ping");
    }

    #[test]
    fn test_empty_interface_parses() {
        let desc = parse_descriptor("type Nothing interface{}").unwrap();
        assert!(desc.methods.is_empty());
    }

    #[test]
    fn test_garbage_is_a_parse_failure() {
        let err = parse_structure("this is not go").unwrap_err();
        assert!(matches!(err, Error::NoTemplateParsed { .. }));
        assert_eq!(err.tier(), Tier::Parse);
    }

    #[test]
    fn test_placeholder_syntax_in_input_is_not_expanded() {
        // Input text is substituted, never lexed for placeholders
        let err = parse_structure("type X interface { {{Y}} }").unwrap_err();
        assert_eq!(err.tier(), Tier::Parse);
    }
}
