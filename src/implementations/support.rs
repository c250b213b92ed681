//! Building blocks shared by the decorators

use crate::frontend::ast::{Expr, TypeSpec};
use crate::signature::{InterfaceDescriptor, InterfaceKind, MethodSignature};
use crate::types::naming::{variable_name, NameAllocator};
use crate::template::reparse::to_type;
use crate::types::{Param, TypeShape};
use crate::utils::{Result, ValidationError};

use super::Check;

/// Descriptor for `spec` if it has the declaration kind a pattern expects
pub fn describe(spec: &TypeSpec, kind: InterfaceKind) -> std::result::Result<InterfaceDescriptor, ValidationError> {
    let desc = InterfaceDescriptor::from_type_spec(spec).filter(|d| d.kind == kind);
    match (desc, kind) {
        (Some(desc), InterfaceKind::Interface) if desc.methods.is_empty() => {
            Err(ValidationError::NoMethods { name: desc.name })
        }
        (Some(desc), _) => Ok(desc),
        (None, InterfaceKind::Interface) => Err(ValidationError::NotAnInterface { name: spec.name.clone() }),
        (None, InterfaceKind::Function) => Err(ValidationError::NotAFunctionType { name: spec.name.clone() }),
    }
}

/// The one method of a single-method interface
pub fn single_method(desc: &InterfaceDescriptor) -> std::result::Result<&MethodSignature, ValidationError> {
    match desc.methods.as_slice() {
        [method] => Ok(method),
        methods => Err(ValidationError::NotSingleMethod {
            name: desc.name.clone(),
            count: methods.len(),
        }),
    }
}

// ==================== Result checks ====================

/// Nothing, or a lone error
pub fn expect_at_most_error(method: &MethodSignature) -> Check {
    match method.results.len() {
        0 => Ok(()),
        1 if method.returns_error() => Ok(()),
        1 => Err(ValidationError::MissingError { method: method.name.clone() }),
        found => Err(ValidationError::ResultCount {
            method: method.name.clone(),
            expected: "0 or 1 (error)",
            found,
        }),
    }
}

/// Exactly one error
pub fn expect_only_error(method: &MethodSignature) -> Check {
    match method.results.len() {
        1 if method.returns_error() => Ok(()),
        1 => Err(ValidationError::MissingError { method: method.name.clone() }),
        found => Err(ValidationError::ResultCount {
            method: method.name.clone(),
            expected: "1 (error)",
            found,
        }),
    }
}

/// A value followed by an error
pub fn expect_value_and_error(method: &MethodSignature) -> Check {
    match method.results.len() {
        2 if method.returns_error() => Ok(()),
        2 => Err(ValidationError::MissingError { method: method.name.clone() }),
        found => Err(ValidationError::ResultCount {
            method: method.name.clone(),
            expected: "2 (value, error)",
            found,
        }),
    }
}

/// Trailing error result
pub fn expect_error(method: &MethodSignature) -> Check {
    if method.returns_error() {
        Ok(())
    } else {
        Err(ValidationError::MissingError { method: method.name.clone() })
    }
}

// ==================== Naming ====================

/// The wrapped interface as referenced from generated code
pub fn wrapped(package: &str, desc: &InterfaceDescriptor) -> TypeShape {
    TypeShape::named(Some(package), &desc.name)
}

/// Struct field holding the wrapped interface, clear of the decorator's own names
pub fn field_name(desc: &InterfaceDescriptor, taken: &[&str]) -> String {
    NameAllocator::with_reserved(taken).allocate(&variable_name(&TypeShape::named(None, &desc.name)))
}

/// Qualify a method and name its parameters around the decorator's locals
///
/// The returned allocator holds every name in use, for further locals.
pub fn prepare(method: &MethodSignature, package: &str, reserved: &[&str]) -> (MethodSignature, NameAllocator) {
    let mut alloc = NameAllocator::with_reserved(reserved);
    alloc.reserve(package);
    let method = method.qualified(package).with_param_names(&mut alloc);
    (method, alloc)
}

/// `recv.field.Method(args)`
pub fn delegate(recv: &str, field: &str, method: &MethodSignature, args: Vec<Expr>) -> Expr {
    Expr::Call {
        func: Box::new(Expr::ident(format!("{}.{}.{}", recv, field, method.name))),
        args,
    }
}

/// Return the delegated call's results, or just make the call
pub fn forward(call: Expr, method: &MethodSignature) -> String {
    if method.results.is_empty() {
        call.to_string()
    } else {
        format!("return {}", call)
    }
}

/// `func(params) bool` over the given parameter types
pub fn predicate(params: Vec<Param>) -> Result<TypeShape> {
    let params: Vec<String> = params.into_iter().map(|p| Param { name: None, ..p }.to_string()).collect();
    to_type(&format!("func({}) bool", params.join(", ")))
}

/// `UserRepo` + `GetAll` -> `user_repo_get_all`
pub fn measure_name(iface: &str, method: &str) -> String {
    format!("{}_{}", snake_case(iface), snake_case(method))
}

fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let after_lower = i > 0 && chars[i - 1].is_lowercase();
            let before_lower = i > 0 && chars.get(i + 1).map_or(false, |n| n.is_lowercase());
            if after_lower || (before_lower && chars[i - 1].is_uppercase()) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::structure::parse_descriptor;

    #[test]
    fn test_snake_case() {
        assert_eq!(measure_name("UserRepo", "GetAll"), "user_repo_get_all");
        assert_eq!(measure_name("HTTPClient", "Do"), "http_client_do");
        assert_eq!(measure_name("repo", "getID"), "repo_get_id");
    }

    #[test]
    fn test_field_name_avoids_taken() {
        let desc = parse_descriptor("type Cache interface { Get(id string) (string, error) }").unwrap();
        assert_eq!(field_name(&desc, &["ticker"]), "cache");
        assert_eq!(field_name(&desc, &["cache"]), "cache2");
    }

    #[test]
    fn test_result_checks() {
        let desc = parse_descriptor(
            "type R interface {\n\tA()\n\tB() error\n\tC() int\n\tD() (int, error)\n\tE() (int, bool)\n}",
        )
        .unwrap();
        let m = &desc.methods;

        assert!(expect_at_most_error(&m[0]).is_ok());
        assert!(expect_at_most_error(&m[1]).is_ok());
        assert!(matches!(expect_at_most_error(&m[2]), Err(ValidationError::MissingError { .. })));
        assert!(matches!(expect_at_most_error(&m[3]), Err(ValidationError::ResultCount { found: 2, .. })));

        assert!(expect_only_error(&m[1]).is_ok());
        assert!(expect_only_error(&m[0]).is_err());

        assert!(expect_value_and_error(&m[3]).is_ok());
        assert!(matches!(expect_value_and_error(&m[4]), Err(ValidationError::MissingError { .. })));
        assert!(matches!(expect_value_and_error(&m[1]), Err(ValidationError::ResultCount { found: 1, .. })));
    }

    #[test]
    fn test_prepare_reserves_package_and_locals() {
        let desc = parse_descriptor("type R interface { Get(models string, c int) error }").unwrap();
        let (method, alloc) = prepare(&desc.methods[0], "models", &["c"]);

        let names: Vec<_> = method.params.iter().map(|p| p.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["str", "i"]);
        assert!(alloc.is_taken("models"));
    }

    #[test]
    fn test_forward_without_results() {
        let desc = parse_descriptor("type R interface { Ping(n int) }").unwrap();
        let (method, _) = prepare(&desc.methods[0], "p", &[]);
        let call = delegate("t", "r", &method, method.call_args());

        assert_eq!(forward(call.clone(), &method), "t.r.Ping(n)");
        assert_eq!(predicate(method.params.clone()).unwrap().to_string(), "func(int) bool");
    }

    #[test]
    fn test_predicate_over_every_param() {
        let desc = parse_descriptor("type R interface { Find(ctx context.Context, ids ...string) error }").unwrap();
        let (method, _) = prepare(&desc.methods[0], "p", &[]);

        assert_eq!(
            predicate(method.params.clone()).unwrap().to_string(),
            "func(context.Context, ...string) bool"
        );
    }
}
