//! Result caching decorator
//!
//! Wraps every method in a lookup against a `go-cache` store. Methods must
//! return a value and an error; only successful results are cached.

use crate::frontend::ast::{Decl, Expr};
use crate::signature::{InterfaceDescriptor, MethodSignature};
use crate::template::reparse::render_decl;
use crate::template::Env;
use crate::types::{Primitive, TypeShape};
use crate::utils::Result;

use super::support::{delegate, expect_value_and_error, field_name, prepare, wrapped};
use super::{Check, Pattern};

const STRUCT: &str = r#"
type Cache struct {
	{{Field}} {{Iface}}
	cache *cache.Cache
}
"#;

const CONSTRUCTOR: &str = r#"
func New({{Field}} {{Iface}}, expiration time.Duration, cleanupInterval time.Duration) *Cache {
	return &Cache{
		{{Field}}: {{Field}},
		cache: cache.New(expiration, cleanupInterval),
	}
}
"#;

const METHOD: &str = r#"
func (c *Cache) {{Method}}{{Signature}} {
	if cached, found := c.cache.Get({{Key}}); found {
		if {{Value}}, ok := cached.({{Result}}); ok {
			return {{Value}}, nil
		}
	}

	{{Value}}, err := {{Call}}
	if err != nil {
		return {{Zero}}, err
	}

	c.cache.Set({{Key}}, {{Value}}, cache.DefaultExpiration)
	return {{Value}}, nil
}
"#;

/// Names the generated method body uses for itself
const LOCALS: [&str; 6] = ["c", "cached", "found", "ok", "err", "cache"];

/// Key shared by every call that has no single string parameter
const FALLBACK_KEY: &str = "\"key\"";

pub struct Cache {
    package: String,
}

impl Cache {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string() }
    }

    fn method(&self, field: &str, method: &MethodSignature) -> Result<Decl> {
        let (method, mut alloc) = prepare(method, &self.package, &LOCALS);
        let result = method.results[0].shape.clone();
        let value = alloc.allocate_for(&result);

        let env = Env::new()
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Key", cache_key(&method))
            .set("Value", value)
            .set("Result", result)
            .set("Call", delegate("c", field, &method, method.call_args()))
            .set("Zero", method.zero_results());
        render_decl(&env, METHOD)
    }
}

/// The lone string parameter, or the shared fallback key
fn cache_key(method: &MethodSignature) -> Expr {
    match method.payload_params() {
        [param] if param.shape == TypeShape::Primitive(Primitive::String) && !param.variadic => {
            Expr::ident(param.name.as_deref().unwrap_or("_"))
        }
        _ => Expr::Lit(FALLBACK_KEY.to_string()),
    }
}

impl Pattern for Cache {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn description(&self) -> &'static str {
        "Cache results of wrapped interface"
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        desc.methods.iter().try_for_each(expect_value_and_error)
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let field = field_name(desc, &["cache", "expiration", "cleanupInterval", "time"]);
        let env = Env::new().set("Field", field.as_str()).set("Iface", wrapped(&self.package, desc));

        let mut decls = vec![render_decl(&env, STRUCT)?, render_decl(&env, CONSTRUCTOR)?];
        for method in &desc.methods {
            decls.push(self.method(&field, method)?);
        }
        Ok(decls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementations::testing::{generate, rejection};
    use crate::utils::ValidationError;
    use pretty_assertions::assert_eq;

    const REPO: &str = "type UserRepo interface {\n\tGet(ctx context.Context, id string) (User, error)\n\tFind(name string, limit int) ([]*User, error)\n}";

    #[test]
    fn test_string_param_is_the_key() {
        let out = generate(Cache::new("models"), REPO).unwrap();
        assert!(out.contains("if cached, found := c.cache.Get(id); found {"));
        assert!(out.contains("c.cache.Set(id, user, cache.DefaultExpiration)"));
        assert!(out.contains("user, err := c.userRepo.Get(ctx, id)"));
    }

    #[test]
    fn test_other_signatures_share_fallback_key() {
        let out = generate(Cache::new("models"), REPO).unwrap();
        assert!(out.contains("c.cache.Get(\"key\")"));
        assert!(out.contains("if users, ok := cached.([]*models.User); ok {"));
    }

    #[test]
    fn test_generated_method() {
        let out = generate(
            Cache::new("models"),
            "type Repo interface {\n\tGet(id string) (*User, error)\n}",
        )
        .unwrap();

        assert!(out.starts_with("type Cache struct {\n\trepo  models.Repo\n\tcache *cache.Cache\n}"));
        assert!(out.contains(
            "func New(repo models.Repo, expiration time.Duration, cleanupInterval time.Duration) *Cache {\n\treturn &Cache{\n\t\trepo:  repo,\n\t\tcache: cache.New(expiration, cleanupInterval),\n\t}\n}"
        ));
        assert!(out.contains(
            "\tuser, err := c.repo.Get(id)\n\tif err != nil {\n\t\treturn nil, err\n\t}\n"
        ));
    }

    #[test]
    fn test_rejects_single_result() {
        let err = rejection(Cache::new("models"), "type R interface { Get(id string) User }");
        assert_eq!(
            err,
            ValidationError::ResultCount { method: "Get".into(), expected: "2 (value, error)", found: 1 }
        );
    }

    #[test]
    fn test_rejects_function_type() {
        let err = rejection(Cache::new("models"), "func(id string) (User, error)");
        assert!(matches!(err, ValidationError::NotAnInterface { .. }));
    }
}
