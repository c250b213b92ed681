//! Zero values
//!
//! The expression a generated function returns in place of a real value,
//! e.g. when a call is throttled or the wrapped call failed.

use crate::frontend::ast::Expr;
use crate::types::{Primitive, TypeShape};

/// Zero value expression for `shape`
///
/// Slices and maps get an empty literal of the same container kind rather
/// than `nil`, so callers can range over the result directly.
pub fn zero_value(shape: &TypeShape) -> Expr {
    match shape {
        TypeShape::Primitive(Primitive::String) => Expr::Lit("\"\"".into()),
        TypeShape::Primitive(Primitive::Bool) => Expr::ident("false"),
        TypeShape::Primitive(Primitive::Error) => Expr::nil(),
        TypeShape::Primitive(prim) if prim.is_float() || prim.is_complex() => Expr::Lit("0.0".into()),
        TypeShape::Primitive(_) => Expr::Lit("0".into()),
        TypeShape::Slice(_) | TypeShape::Map { .. } | TypeShape::Named { .. } | TypeShape::EmptyStruct => {
            Expr::Composite(shape.clone())
        }
        TypeShape::Pointer(_)
        | TypeShape::Function(_)
        | TypeShape::Chan { .. }
        | TypeShape::Context
        | TypeShape::Any => Expr::nil(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> TypeShape {
        TypeShape::from_ident(name)
    }

    #[test]
    fn test_primitive_zero_values() {
        assert_eq!(zero_value(&ident("string")), Expr::Lit("\"\"".into()));
        assert_eq!(zero_value(&ident("int32")), Expr::Lit("0".into()));
        assert_eq!(zero_value(&ident("float64")), Expr::Lit("0.0".into()));
        assert_eq!(zero_value(&ident("bool")), Expr::ident("false"));
        assert_eq!(zero_value(&ident("error")), Expr::nil());
    }

    #[test]
    fn test_reference_types_are_nil() {
        assert_eq!(zero_value(&TypeShape::pointer(ident("User"))), Expr::nil());
        assert_eq!(zero_value(&TypeShape::Context), Expr::nil());
        assert_eq!(zero_value(&TypeShape::Any), Expr::nil());
    }

    #[test]
    fn test_collections_zero_to_empty_literal_of_same_kind() {
        let shapes = vec![
            TypeShape::slice(ident("User")),
            TypeShape::slice(TypeShape::slice(ident("int"))),
            TypeShape::slice(TypeShape::pointer(ident("User"))),
            TypeShape::Map { key: Box::new(ident("string")), value: Box::new(ident("User")) },
            TypeShape::Map {
                key: Box::new(ident("int")),
                value: Box::new(TypeShape::slice(ident("string"))),
            },
        ];

        for shape in shapes {
            match zero_value(&shape) {
                Expr::Composite(lit) => assert_eq!(lit, shape),
                other => panic!("expected empty literal for {:?}, got {:?}", shape, other),
            }
        }
    }

    #[test]
    fn test_named_zero_value_is_empty_literal() {
        let shape = TypeShape::named(Some("models"), "User");
        assert_eq!(zero_value(&shape), Expr::Composite(shape.clone()));
    }
}
