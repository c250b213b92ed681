//! Signature model
//!
//! The parsed interface reduced to what implementors work with: an ordered
//! list of methods with their parameters and results.

use log::warn;

use crate::backend::printer;
use crate::frontend::ast::{Expr, TypeExpr, TypeSpec};
use crate::types::naming::NameAllocator;
use crate::types::zero::zero_value;
use crate::types::{FuncShape, Param};

/// What kind of declaration the descriptor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Interface,
    /// A named function type; its single "method" carries the type name
    Function,
}

/// A named interface and its methods in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub kind: InterfaceKind,
    pub methods: Vec<MethodSignature>,
}

impl InterfaceDescriptor {
    /// Describe a type spec, if it declares an interface or a function type
    pub fn from_type_spec(spec: &TypeSpec) -> Option<Self> {
        match &spec.ty {
            TypeExpr::Interface(iface) => {
                for embedded in &iface.embedded {
                    warn!("{}: ignoring embedded interface {}", spec.name, embedded);
                }
                Some(Self {
                    name: spec.name.clone(),
                    kind: InterfaceKind::Interface,
                    methods: iface
                        .methods
                        .iter()
                        .map(|m| MethodSignature::new(&m.name, &m.func))
                        .collect(),
                })
            }
            TypeExpr::Shape(crate::types::TypeShape::Function(func)) => Some(Self {
                name: spec.name.clone(),
                kind: InterfaceKind::Function,
                methods: vec![MethodSignature::new(&spec.name, func)],
            }),
            _ => None,
        }
    }
}

/// One method: name, parameters, results
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    returns_error: bool,
    takes_context: bool,
}

impl MethodSignature {
    pub fn new(name: &str, func: &FuncShape) -> Self {
        Self {
            name: name.to_string(),
            params: func.params.clone(),
            results: func.results.clone(),
            returns_error: func.results.last().map_or(false, |r| r.shape.is_error()),
            takes_context: func.params.first().map_or(false, |p| p.shape.is_context()),
        }
    }

    /// Last result is `error`
    pub fn returns_error(&self) -> bool {
        self.returns_error
    }

    /// First parameter is `context.Context`
    pub fn takes_context(&self) -> bool {
        self.takes_context
    }

    pub fn func(&self) -> FuncShape {
        FuncShape::new(self.params.clone(), self.results.clone())
    }

    /// `(params) results` as printed after the method name
    pub fn signature(&self) -> String {
        printer::signature(&self.func())
    }

    /// Qualify exported names with the source package and drop result names
    pub fn qualified(&self, package: &str) -> Self {
        let func = self.func().qualify(package);
        let results = func.results.into_iter().map(|r| Param { name: None, ..r }).collect::<Vec<_>>();
        Self::new(&self.name, &FuncShape::new(func.params, results))
    }

    /// Give every parameter a usable name
    ///
    /// Explicit names are kept unless the allocator already holds them;
    /// unnamed and blank (`_`) parameters get a name derived from their type.
    pub fn with_param_names(&self, alloc: &mut NameAllocator) -> Self {
        let kept: Vec<bool> = self
            .params
            .iter()
            .map(|p| match p.name.as_deref() {
                Some(name) if name != "_" => alloc.reserve(name),
                _ => false,
            })
            .collect();

        let params = self
            .params
            .iter()
            .zip(kept)
            .map(|(p, kept)| {
                let name = if kept {
                    p.name.clone()
                } else {
                    Some(alloc.allocate_for(&p.body_shape()))
                };
                Param { name, ..p.clone() }
            })
            .collect::<Vec<_>>();

        Self { params, ..self.clone() }
    }

    /// The context parameter's name, when the method takes one
    pub fn context_name(&self) -> Option<&str> {
        if self.takes_context {
            self.params.first().and_then(|p| p.name.as_deref())
        } else {
            None
        }
    }

    /// Parameters other than the leading context
    pub fn payload_params(&self) -> &[Param] {
        if self.takes_context {
            &self.params[1..]
        } else {
            &self.params
        }
    }

    /// Results other than the trailing error
    pub fn value_results(&self) -> &[Param] {
        if self.returns_error {
            &self.results[..self.results.len() - 1]
        } else {
            &self.results
        }
    }

    /// Arguments forwarding every parameter, spreading a variadic one
    pub fn call_args(&self) -> Vec<Expr> {
        self.params
            .iter()
            .map(|p| {
                let ident = Expr::ident(p.name.as_deref().unwrap_or("_"));
                if p.variadic {
                    Expr::Spread(Box::new(ident))
                } else {
                    ident
                }
            })
            .collect()
    }

    /// Zero values for the value results
    pub fn zero_results(&self) -> Vec<Expr> {
        self.value_results().iter().map(|r| zero_value(&r.shape)).collect()
    }

    /// Fresh local names for the value results
    pub fn result_names(&self, alloc: &mut NameAllocator) -> Vec<String> {
        self.value_results().iter().map(|r| alloc.allocate_for(&r.shape)).collect()
    }
}
