//! File-backed getter
//!
//! For a function type returning a value and an error, generates a
//! constructor producing a function of that type that reads a JSON file.

use crate::backend::printer;
use crate::frontend::ast::{Decl, Expr};
use crate::signature::{InterfaceDescriptor, InterfaceKind};
use crate::template::reparse::render_decl;
use crate::template::Env;
use crate::types::naming::NameAllocator;
use crate::types::{FuncShape, Param, TypeShape};
use crate::utils::Result;

use super::support::{expect_value_and_error, single_method};
use super::{Check, Pattern};

const GETTER: &str = r#"
func FileGetter(path string) {{FuncType}} {
	return func({{Params}}){{Results}} {
		data, err := os.ReadFile(path)
		if err != nil {
			return {{Zero}}, err
		}

		var {{Value}} {{Target}}
		if err := json.Unmarshal(data, &{{Value}}); err != nil {
			return {{Zero}}, err
		}

		return {{Loaded}}, nil
	}
}
"#;

pub struct FileGetter {
    package: String,
}

impl FileGetter {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string() }
    }
}

impl Pattern for FileGetter {
    fn name(&self) -> &'static str {
        "file-getter"
    }

    fn description(&self) -> &'static str {
        "Return a function of the given type that loads its result from a JSON file"
    }

    fn accepts(&self) -> InterfaceKind {
        InterfaceKind::Function
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        expect_value_and_error(single_method(desc)?)
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let method = single_method(desc)?.qualified(&self.package);
        let result = method.results[0].shape.clone();

        // decode into the pointee and hand out its address
        let (target, loaded_ptr) = match &result {
            TypeShape::Pointer(inner) => (inner.as_ref().clone(), true),
            other => (other.clone(), false),
        };

        let mut alloc = NameAllocator::with_reserved(&["path", "data", "err", "os", "json"]);
        alloc.reserve(&self.package);
        let value = alloc.allocate_for(&target);
        let loaded = if loaded_ptr {
            Expr::Unary { op: "&".into(), expr: Box::new(Expr::ident(&value)) }
        } else {
            Expr::ident(&value)
        };

        let unnamed: Vec<Param> = method.params.iter().map(|p| Param { name: None, ..p.clone() }).collect();
        let blank: Vec<Param> = method.params.iter().map(|p| Param { name: Some("_".into()), ..p.clone() }).collect();

        let env = Env::new()
            .set("FuncType", TypeShape::Function(FuncShape::new(unnamed, method.results.clone())))
            .set("Params", blank)
            .set("Results", printer::results(&method.results))
            .set("Zero", method.zero_results())
            .set("Value", value.as_str())
            .set("Target", target)
            .set("Loaded", loaded);
        Ok(vec![render_decl(&env, GETTER)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementations::testing::{generate, rejection};
    use crate::utils::ValidationError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_named_result() {
        let out = generate(FileGetter::new("config"), "func(ctx context.Context) (Settings, error)").unwrap();
        assert_eq!(
            out,
            "func FileGetter(path string) func(context.Context) (config.Settings, error) {\n\treturn func(_ context.Context) (config.Settings, error) {\n\t\tdata, err := os.ReadFile(path)\n\t\tif err != nil {\n\t\t\treturn config.Settings{}, err\n\t\t}\n\n\t\tvar settings config.Settings\n\t\tif err := json.Unmarshal(data, &settings); err != nil {\n\t\t\treturn config.Settings{}, err\n\t\t}\n\n\t\treturn settings, nil\n\t}\n}"
        );
    }

    #[test]
    fn test_pointer_result() {
        let out = generate(FileGetter::new("config"), "type Loader func() (*Settings, error)").unwrap();
        assert!(out.starts_with("func FileGetter(path string) func() (*config.Settings, error) {"));
        assert!(out.contains("\t\t\treturn nil, err\n"));
        assert!(out.contains("\t\tvar settings config.Settings\n"));
        assert!(out.contains("\t\treturn &settings, nil\n"));
    }

    #[test]
    fn test_rejects_interfaces() {
        let err = rejection(FileGetter::new("config"), "type R interface { Get() (int, error) }");
        assert!(matches!(err, ValidationError::NotAFunctionType { .. }));
    }

    #[test]
    fn test_rejects_missing_error() {
        let err = rejection(FileGetter::new("config"), "func() Settings");
        assert!(matches!(err, ValidationError::ResultCount { found: 1, .. }));
    }
}
