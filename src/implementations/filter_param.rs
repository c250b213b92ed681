//! Argument filtering decorator
//!
//! Drops the elements of the first non-context argument that fail a
//! predicate before the wrapped method sees them.

use crate::frontend::ast::{Decl, Expr};
use crate::signature::{InterfaceDescriptor, MethodSignature};
use crate::template::reparse::render_decl;
use crate::template::Env;
use crate::types::{Param, TypeShape};
use crate::utils::{Result, ValidationError};

use super::filter::{wrapper, Collection, FIELDS};
use super::support::{delegate, forward, predicate, prepare, single_method};
use super::{Check, Pattern};

const METHOD: &str = r#"
func (f *Filter) {{Method}}{{Signature}} {
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

	{{Forward}}
}
"#;

pub struct FilterParam {
    package: String,
}

impl FilterParam {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string() }
    }
}

/// Index of the filtered parameter and the collection it holds
fn target(method: &MethodSignature) -> std::result::Result<(usize, Collection), ValidationError> {
    let index = usize::from(method.takes_context());
    let param = method.params.get(index).ok_or_else(|| ValidationError::NotEnumerable {
        method: method.name.clone(),
        what: "first parameter",
    })?;
    let collection = Collection::of(&param.body_shape(), &method.name, "first parameter")?;
    Ok((index, collection))
}

impl Pattern for FilterParam {
    fn name(&self) -> &'static str {
        "filter-param"
    }

    fn description(&self) -> &'static str {
        "Filter collection that is passed by function parameters using list of given functions"
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        target(single_method(desc)?).map(|_| ())
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let (method, mut alloc) = prepare(single_method(desc)?, &self.package, &FIELDS);
        let (index, collection) = target(&method)?;

        let element = collection.element();
        let filters = TypeShape::slice(predicate(vec![Param::unnamed(element.clone())])?);
        let (field, mut decls) = wrapper(&self.package, desc, filters)?;

        let source = method.params[index].name.clone().unwrap_or_default();
        let kept = alloc.allocate("filtered");
        let item = alloc.allocate_for(&element);
        let key = if collection.is_map() { alloc.allocate("key") } else { String::new() };

        let mut args = method.call_args();
        args[index] = if method.params[index].variadic {
            Expr::Spread(Box::new(Expr::ident(&kept)))
        } else {
            collection.result(&kept)
        };
        let call = delegate("f", &field, &method, args);

        let env = Env::new()
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Forward", forward(call, &method));
        let env = collection.loop_env(env, &source, &kept, &item, &key);
        decls.push(render_decl(&env, METHOD)?);
        Ok(decls)
    }
}
