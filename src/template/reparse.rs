//! Re-parsing rendered templates
//!
//! Rendered text is wrapped in a throwaway file and handed back to the
//! parser. Failures here mean a template is broken, not the user input.

use crate::frontend::ast::{Decl, Expr, TypeExpr};
use crate::frontend::parser::parse_source;
use crate::template::{render, Env};
use crate::types::TypeShape;
use crate::utils::{Error, Result};

fn reparse_error(kind: &'static str, text: &str, source: Error) -> Error {
    Error::Reparse {
        kind,
        text: text.to_string(),
        source: Box::new(source),
    }
}

/// Parse exactly one top-level declaration
pub fn to_decl(text: &str) -> Result<Decl> {
    let file = parse_source(&format!("package abc\n\n{}\n", text))
        .map_err(|e| reparse_error("declaration", text, e))?;

    let count = file.decls.len();
    let mut decls = file.decls.into_iter();
    match (decls.next(), count) {
        (Some(decl), 1) => Ok(decl),
        _ => Err(reparse_error(
            "declaration",
            text,
            Error::UnexpectedToken {
                expected: "exactly one declaration".into(),
                got: format!("{} declarations", count),
                span: Default::default(),
            },
        )),
    }
}

/// Parse a type expression
pub fn to_type(text: &str) -> Result<TypeShape> {
    let decl = to_decl(&format!("type abc {}", text)).map_err(|e| match e {
        Error::Reparse { source, .. } => reparse_error("type", text, *source),
        other => other,
    })?;

    match decl {
        Decl::Type(spec) => match spec.ty {
            TypeExpr::Shape(shape) => Ok(shape),
            TypeExpr::Interface(iface) if iface.methods.is_empty() && iface.embedded.is_empty() => Ok(TypeShape::Any),
            TypeExpr::Struct(st) if st.fields.is_empty() => Ok(TypeShape::EmptyStruct),
            other => Err(reparse_error(
                "type",
                text,
                Error::UnsupportedType { what: format!("{:?}", other), span: Default::default() },
            )),
        },
        _ => Err(reparse_error(
            "type",
            text,
            Error::ExpectedType { got: text.to_string(), span: Default::default() },
        )),
    }
}

/// Parse an expression
pub fn to_expr(text: &str) -> Result<Expr> {
    let decl = to_decl(&format!("var abc = {}", text)).map_err(|e| match e {
        Error::Reparse { source, .. } => reparse_error("expression", text, *source),
        other => other,
    })?;

    match decl {
        Decl::Var(var) => var.value.ok_or_else(|| {
            reparse_error(
                "expression",
                text,
                Error::UnexpectedToken {
                    expected: "expression".into(),
                    got: "nothing".into(),
                    span: Default::default(),
                },
            )
        }),
        _ => Err(reparse_error(
            "expression",
            text,
            Error::UnexpectedToken {
                expected: "expression".into(),
                got: text.to_string(),
                span: Default::default(),
            },
        )),
    }
}

/// Render `template` with `env` and parse the result as a declaration
pub fn render_decl(env: &Env, template: &str) -> Result<Decl> {
    to_decl(render(env, template)?.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Tier;

    #[test]
    fn test_to_decl_single_declaration() {
        let decl = to_decl("type Cache struct {\n\tcache *cache.Cache\n}").unwrap();
        assert!(matches!(decl, Decl::Type(ref spec) if spec.name == "Cache"));
    }

    #[test]
    fn test_to_decl_rejects_two_declarations() {
        let err = to_decl("var a = 1\nvar b = 2").unwrap_err();
        assert_eq!(err.tier(), Tier::Template);
    }

    #[test]
    fn test_to_type_and_expr() {
        assert_eq!(to_type("[]*models.User").unwrap().to_string(), "[]*models.User");
        assert_eq!(to_type("interface{}").unwrap(), TypeShape::Any);
        assert_eq!(to_expr("errors.New(\"x\")").unwrap(), Expr::call("errors.New", vec![Expr::Lit("\"x\"".into())]));
    }

    #[test]
    fn test_unparsable_output_is_a_template_defect() {
        let err = to_decl("func (c *Cache) Get( {").unwrap_err();
        assert!(matches!(err, Error::Reparse { kind: "declaration", .. }));
        assert_eq!(err.tier(), Tier::Template);

        let err = to_expr("1 +").unwrap_err();
        assert!(matches!(err, Error::Reparse { kind: "expression", .. }));
    }

    #[test]
    fn test_render_decl() {
        let env = Env::new().set("Name", "ErrThrottled");
        let decl = render_decl(&env, "var {{Name}} = errors.New(\"rate limit exceeded\")").unwrap();
        assert!(matches!(decl, Decl::Var(ref v) if v.name == "ErrThrottled"));
    }
}
