//! Template substitution engine
//!
//! Implementors build declarations by filling `{{name}}` placeholders with
//! typed values and re-parsing the result. Bindings are checked in both
//! directions: every placeholder must be bound and every binding must be
//! used, so a drifting template fails loudly instead of emitting bad code.

pub mod lexer;
pub mod reparse;

use log::debug;

use crate::frontend::ast::{Decl, Expr};
use crate::types::{Param, TypeShape};
use crate::utils::{Error, Result};
use lexer::Piece;

/// A syntax node that can be interpolated
#[derive(Debug, Clone, PartialEq)]
pub enum Snippet {
    Type(TypeShape),
    Param(Param),
    Expr(Expr),
    Decl(Decl),
}

/// A bound template value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Node(Snippet),
    /// Rendered and joined with `", "`
    List(Vec<Snippet>),
}

impl Value {
    fn render(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::Node(snippet) => snippet.to_string(),
            Value::List(items) => items.iter().map(Snippet::to_string).collect::<Vec<_>>().join(", "),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<TypeShape> for Value {
    fn from(shape: TypeShape) -> Self {
        Value::Node(Snippet::Type(shape))
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        Value::Node(Snippet::Expr(expr))
    }
}

impl From<Decl> for Value {
    fn from(decl: Decl) -> Self {
        Value::Node(Snippet::Decl(decl))
    }
}

impl From<Vec<Expr>> for Value {
    fn from(exprs: Vec<Expr>) -> Self {
        Value::List(exprs.into_iter().map(Snippet::Expr).collect())
    }
}

impl From<Vec<Param>> for Value {
    fn from(params: Vec<Param>) -> Self {
        Value::List(params.into_iter().map(Snippet::Param).collect())
    }
}

/// Ordered set of template bindings
#[derive(Debug, Clone, Default)]
pub struct Env {
    entries: Vec<(String, Value)>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key`, replacing an earlier binding of the same key
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
        self
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

/// Substitute every placeholder in `template` from `env`
pub fn render(env: &Env, template: &str) -> Result<String> {
    let pieces = lexer::pieces(template)?;
    let mut used = vec![false; env.entries.len()];
    let mut out = String::with_capacity(template.len());

    for piece in pieces {
        match piece {
            Piece::Literal(text) => out.push_str(text),
            Piece::Placeholder(key) => {
                let Some(index) = env.entries.iter().position(|(k, _)| k == key) else {
                    return Err(Error::MissingKey { key: key.to_string() });
                };
                used[index] = true;
                out.push_str(&env.entries[index].1.render());
            }
        }
    }

    if let Some(index) = used.iter().position(|u| !u) {
        return Err(Error::UnusedKey { key: env.entries[index].0.clone() });
    }

    debug!("rendered template with {} bindings", env.entries.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_bindings_is_identity() {
        assert_eq!(render(&Env::new(), "plain text").unwrap(), "plain text");
        assert_eq!(render(&Env::new(), "struct{}{}").unwrap(), "struct{}{}");
    }

    #[test]
    fn test_render_single_binding() {
        let env = Env::new().set("x", "A");
        assert_eq!(render(&env, "{{x}}").unwrap(), "A");
    }

    #[test]
    fn test_unused_binding_is_an_error() {
        let env = Env::new().set("x", "A").set("y", "B");
        assert!(matches!(render(&env, "{{x}}"), Err(Error::UnusedKey { ref key }) if key == "y"));
    }

    #[test]
    fn test_missing_binding_is_an_error() {
        let env = Env::new().set("x", "A");
        assert!(matches!(render(&env, "{{x}} {{z}}"), Err(Error::MissingKey { ref key }) if key == "z"));
    }

    #[test]
    fn test_repeated_placeholder_uses_one_binding() {
        let env = Env::new().set("r", "c");
        assert_eq!(render(&env, "{{r}}.mu.Lock(); {{r}}.mu.Unlock()").unwrap(), "c.mu.Lock(); c.mu.Unlock()");
    }

    #[test]
    fn test_typed_values_are_printed() {
        let params = vec![
            Param::named("ctx", TypeShape::Context),
            Param::named("ids", TypeShape::slice(TypeShape::from_ident("string"))),
        ];
        let env = Env::new()
            .set("Params", params)
            .set("Result", TypeShape::pointer(TypeShape::named(Some("models"), "User")))
            .set("Args", vec![Expr::ident("ctx"), Expr::Spread(Box::new(Expr::ident("ids")))]);

        assert_eq!(
            render(&env, "({{Params}}) {{Result}} -> f({{Args}})").unwrap(),
            "(ctx context.Context, ids []string) *models.User -> f(ctx, ids...)"
        );
    }

    #[test]
    fn test_rebinding_replaces_value() {
        let env = Env::new().set("x", "A").set("x", "B");
        assert_eq!(env.keys().count(), 1);
        assert_eq!(render(&env, "{{x}}").unwrap(), "B");
    }
}
