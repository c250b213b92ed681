//! Result filtering decorator
//!
//! Calls the wrapped method and drops the elements of its first result that
//! fail a predicate. Error results are passed through untouched.

use crate::frontend::ast::{Decl, Expr};
use crate::signature::{InterfaceDescriptor, MethodSignature};
use crate::template::reparse::render_decl;
use crate::template::Env;
use crate::types::{Param, TypeShape};
use crate::utils::{Result, ValidationError};

use super::filter::{wrapper, Collection, FIELDS};
use super::support::{delegate, predicate, prepare, single_method};
use super::{Check, Pattern};

const METHOD: &str = r#"
func (f *Filter) {{Method}}{{Signature}} {
	{{Results}} := {{Call}}
{{Guards}}
	{{Kept}} := {{Empty}}
OUTER:
	for {{Range}} := range {{Source}} {
		for _, filter := range f.filters {
			if !filter({{Item}}) {
				continue OUTER
			}
		}
		{{Keep}}
	}

	return {{Returns}}
}
"#;

pub struct FilterReturn {
    package: String,
}

impl FilterReturn {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string() }
    }
}

fn target(method: &MethodSignature) -> std::result::Result<Collection, ValidationError> {
    let result = method.results.first().ok_or_else(|| ValidationError::NotEnumerable {
        method: method.name.clone(),
        what: "first result",
    })?;
    Collection::of(&result.shape, &method.name, "first result")
}

/// Early returns taken before filtering
fn guards(collection: &Collection, results: &[Expr], err: Option<&str>, source: &str) -> String {
    let passthrough: Vec<String> = results.iter().map(Expr::to_string).collect();
    let passthrough = passthrough.join(", ");

    let mut conditions = Vec::new();
    if let Some(err) = err {
        conditions.push(format!("{} != nil", err));
    }
    if collection.is_pointer() {
        conditions.push(format!("{} == nil", source));
    }

    conditions
        .iter()
        .map(|cond| format!("\tif {} {{\n\t\treturn {}\n\t}}\n", cond, passthrough))
        .collect()
}

impl Pattern for FilterReturn {
    fn name(&self) -> &'static str {
        "filter-return"
    }

    fn description(&self) -> &'static str {
        "Filter collection that is returned using list of given functions"
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        target(single_method(desc)?).map(|_| ())
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let (method, mut alloc) = prepare(single_method(desc)?, &self.package, &FIELDS);
        let collection = target(&method)?;

        let element = collection.element();
        let filters = TypeShape::slice(predicate(vec![Param::unnamed(element.clone())])?);
        let (field, mut decls) = wrapper(&self.package, desc, filters)?;

        let mut results: Vec<Expr> = method.result_names(&mut alloc).into_iter().map(Expr::ident).collect();
        let err = method.returns_error().then(|| alloc.allocate("err"));
        if let Some(err) = &err {
            results.push(Expr::ident(err.clone()));
        }
        let source = results[0].to_string();
        let kept = alloc.allocate("filtered");
        let item = alloc.allocate_for(&element);
        let key = if collection.is_map() { alloc.allocate("key") } else { String::new() };

        let mut returns = results.clone();
        returns[0] = collection.result(&kept);

        let env = Env::new()
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Call", delegate("f", &field, &method, method.call_args()))
            .set("Guards", guards(&collection, &results, err.as_deref(), &source))
            .set("Returns", returns)
            .set("Results", results);
        let env = collection.loop_env(env, &source, &kept, &item, &key);
        decls.push(render_decl(&env, METHOD)?);
        Ok(decls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementations::testing::{generate, last_func, rejection};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filters_returned_slice() {
        let out = generate(
            FilterReturn::new("models"),
            "type Lister interface {\n\tList(ctx context.Context) ([]User, error)\n}",
        )
        .unwrap();

        assert_eq!(
            last_func(&out),
            "func (f *Filter) List(ctx context.Context) ([]models.User, error) {\n\tusers, err := f.lister.List(ctx)\n\tif err != nil {\n\t\treturn users, err\n\t}\n\n\tfiltered := []models.User{}\nOUTER:\n\tfor _, user := range users {\n\t\tfor _, filter := range f.filters {\n\t\t\tif !filter(user) {\n\t\t\t\tcontinue OUTER\n\t\t\t}\n\t\t}\n\t\tfiltered = append(filtered, user)\n\t}\n\n\treturn filtered, err\n}"
        );
    }

    #[test]
    fn test_pointer_result_guards_nil() {
        let out = generate(FilterReturn::new("models"), "type Lister interface { All() *map[int]Item }").unwrap();

        assert!(out.contains("\titems := f.lister.All()\n\tif items == nil {\n\t\treturn items\n\t}\n"));
        assert!(out.contains("\tfor key, item := range *items {\n"));
        assert!(out.contains("\treturn &filtered\n}"));
    }

    #[test]
    fn test_error_guard_uses_bound_name() {
        let out = generate(
            FilterReturn::new("models"),
            "type Lister interface {\n\tList(err string) ([]User, error)\n}",
        )
        .unwrap();

        assert!(out.contains("\tusers, err2 := f.lister.List(err)\n\tif err2 != nil {\n\t\treturn users, err2\n\t}\n"));
        assert!(out.contains("\treturn filtered, err2\n}"));
        assert!(!out.contains("if err != nil"));
    }

    #[test]
    fn test_rejects_scalar_result() {
        let err = rejection(FilterReturn::new("models"), "type Lister interface { Count() (int, error) }");
        assert_eq!(err, ValidationError::NotEnumerable { method: "Count".into(), what: "first result" });
    }
}
