//! Call filtering decorator
//!
//! A call reaches the wrapped method only when every predicate accepts its
//! arguments.

use crate::frontend::ast::{Decl, Expr};
use crate::signature::InterfaceDescriptor;
use crate::template::reparse::{render_decl, to_decl};
use crate::template::Env;
use crate::types::zero::zero_value;
use crate::types::TypeShape;
use crate::utils::{Result, ValidationError};

use super::support::{
    delegate, expect_at_most_error, expect_only_error, field_name, forward, predicate, prepare, single_method, wrapped,
};
use super::{Check, Pattern};

/// How a filtered call is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Nothing, or a nil error
    NoError,
    /// `ErrFiltered`
    WithError,
}

const SENTINEL: &str = r#"var ErrFiltered = errors.New("filtered")"#;

/// Shared by every filter flavour
const STRUCT: &str = r#"
type Filter struct {
	{{Field}} {{Iface}}
	filters {{Filters}}
}
"#;

const CONSTRUCTOR: &str = r#"
func New({{Field}} {{Iface}}, filters {{Filters}}) *Filter {
	return &Filter{
		{{Field}}: {{Field}},
		filters: filters,
	}
}
"#;

const METHOD: &str = r#"
func (f *Filter) {{Method}}{{Signature}} {
	for _, filter := range f.filters {
		if !filter({{Args}}) {
			return {{Rejected}}
		}
	}

	{{Forward}}
}
"#;

/// Names of the wrapper's own fields and constructor parameters
pub(crate) const FIELDS: [&str; 3] = ["filters", "f", "filter"];

/// Struct and constructor holding predicates of type `filters`
pub(crate) fn wrapper(package: &str, desc: &InterfaceDescriptor, filters: TypeShape) -> Result<(String, Vec<Decl>)> {
    let field = field_name(desc, &FIELDS);
    let env = Env::new()
        .set("Field", field.as_str())
        .set("Iface", wrapped(package, desc))
        .set("Filters", filters);
    let decls = vec![render_decl(&env, STRUCT)?, render_decl(&env, CONSTRUCTOR)?];
    Ok((field, decls))
}

/// A slice or map being filtered, possibly behind one pointer
pub(crate) struct Collection {
    shape: TypeShape,
    pointer: bool,
}

impl Collection {
    pub(crate) fn of(shape: &TypeShape, method: &str, what: &'static str) -> std::result::Result<Self, ValidationError> {
        let (inner, pointer) = match shape {
            TypeShape::Pointer(inner) => (inner.as_ref(), true),
            other => (other, false),
        };
        match inner {
            TypeShape::Slice(_) | TypeShape::Map { .. } => Ok(Self { shape: inner.clone(), pointer }),
            _ => Err(ValidationError::NotEnumerable { method: method.to_string(), what }),
        }
    }

    pub(crate) fn is_pointer(&self) -> bool {
        self.pointer
    }

    pub(crate) fn is_map(&self) -> bool {
        matches!(self.shape, TypeShape::Map { .. })
    }

    /// What the predicates are applied to
    pub(crate) fn element(&self) -> TypeShape {
        match &self.shape {
            TypeShape::Slice(elem) => elem.as_ref().clone(),
            TypeShape::Map { value, .. } => value.as_ref().clone(),
            other => other.clone(),
        }
    }

    /// `kept := []T{}` and the filtering loop over `source`
    ///
    /// `key` is only read for maps.
    pub(crate) fn loop_env(&self, env: Env, source: &str, kept: &str, item: &str, key: &str) -> Env {
        let (range, keep) = if self.is_map() {
            (format!("{}, {}", key, item), format!("{}[{}] = {}", kept, key, item))
        } else {
            (format!("_, {}", item), format!("{} = append({}, {})", kept, kept, item))
        };
        let source = if self.pointer { format!("*{}", source) } else { source.to_string() };

        env.set("Kept", kept)
            .set("Empty", zero_value(&self.shape))
            .set("Range", range)
            .set("Source", source)
            .set("Item", item)
            .set("Keep", keep)
    }

    /// The filtered collection in the shape the caller expects
    pub(crate) fn result(&self, kept: &str) -> Expr {
        if self.pointer {
            Expr::Unary { op: "&".into(), expr: Box::new(Expr::ident(kept)) }
        } else {
            Expr::ident(kept)
        }
    }
}

pub struct Filter {
    package: String,
    mode: Mode,
}

impl Filter {
    pub fn new(package: &str, mode: Mode) -> Self {
        Self { package: package.to_string(), mode }
    }
}

impl Pattern for Filter {
    fn name(&self) -> &'static str {
        match self.mode {
            Mode::NoError => "filter",
            Mode::WithError => "filter-error",
        }
    }

    fn description(&self) -> &'static str {
        match self.mode {
            Mode::NoError => "Stop processing call if any of the filter functions return false, don't return error",
            Mode::WithError => "Stop processing call if any of the filter functions return false, returns error",
        }
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        let method = single_method(desc)?;
        match self.mode {
            Mode::NoError => expect_at_most_error(method),
            Mode::WithError => expect_only_error(method),
        }
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let (method, _) = prepare(single_method(desc)?, &self.package, &FIELDS);
        let filters = TypeShape::slice(predicate(method.params.clone())?);
        let (field, mut decls) = wrapper(&self.package, desc, filters)?;

        let rejected = match self.mode {
            Mode::NoError if method.results.is_empty() => Vec::new(),
            Mode::NoError => vec![Expr::nil()],
            Mode::WithError => vec![Expr::ident("ErrFiltered")],
        };
        let call = delegate("f", &field, &method, method.call_args());

        let env = Env::new()
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Args", method.call_args())
            .set("Rejected", rejected)
            .set("Forward", forward(call, &method));
        decls.push(render_decl(&env, METHOD)?);

        if self.mode == Mode::WithError {
            decls.insert(0, to_decl(SENTINEL)?);
        }
        Ok(decls)
    }
}
