//! Type shapes
//!
//! A `TypeShape` is the structural description of a parameter or result
//! type. It carries no semantic information beyond what can be read off
//! the type expression itself.

/// Predeclared Go types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Byte,
    Rune,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Error,
}

impl Primitive {
    /// Look up a predeclared type by name
    pub fn from_name(name: &str) -> Option<Self> {
        let prim = match name {
            "bool" => Primitive::Bool,
            "string" => Primitive::String,
            "int" => Primitive::Int,
            "int8" => Primitive::Int8,
            "int16" => Primitive::Int16,
            "int32" => Primitive::Int32,
            "int64" => Primitive::Int64,
            "uint" => Primitive::Uint,
            "uint8" => Primitive::Uint8,
            "uint16" => Primitive::Uint16,
            "uint32" => Primitive::Uint32,
            "uint64" => Primitive::Uint64,
            "uintptr" => Primitive::Uintptr,
            "byte" => Primitive::Byte,
            "rune" => Primitive::Rune,
            "float32" => Primitive::Float32,
            "float64" => Primitive::Float64,
            "complex64" => Primitive::Complex64,
            "complex128" => Primitive::Complex128,
            "error" => Primitive::Error,
            _ => return None,
        };
        Some(prim)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::Int => "int",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Uint => "uint",
            Primitive::Uint8 => "uint8",
            Primitive::Uint16 => "uint16",
            Primitive::Uint32 => "uint32",
            Primitive::Uint64 => "uint64",
            Primitive::Uintptr => "uintptr",
            Primitive::Byte => "byte",
            Primitive::Rune => "rune",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::Complex64 => "complex64",
            Primitive::Complex128 => "complex128",
            Primitive::Error => "error",
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Primitive::Int | Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64 | Primitive::Rune
        )
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            Primitive::Uint
                | Primitive::Uint8
                | Primitive::Uint16
                | Primitive::Uint32
                | Primitive::Uint64
                | Primitive::Uintptr
                | Primitive::Byte
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Primitive::Float32 | Primitive::Float64)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Primitive::Complex64 | Primitive::Complex128)
    }
}

/// Channel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    /// chan T
    Both,
    /// chan<- T
    Send,
    /// <-chan T
    Recv,
}

/// Structural type description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Primitive(Primitive),
    Pointer(Box<TypeShape>),
    /// Named type, optionally package qualified
    Named {
        qualifier: Option<String>,
        name: String,
    },
    Slice(Box<TypeShape>),
    Map {
        key: Box<TypeShape>,
        value: Box<TypeShape>,
    },
    Function(FuncShape),
    /// context.Context
    Context,
    /// interface{} / any
    Any,
    Chan {
        dir: ChanDir,
        elem: Box<TypeShape>,
    },
    /// struct{}
    EmptyStruct,
}

/// Parameters and results of a function type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FuncShape {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

/// A parameter or result
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: Option<String>,
    pub shape: TypeShape,
    pub variadic: bool,
}

impl Param {
    /// Named parameter
    pub fn named(name: impl Into<String>, shape: TypeShape) -> Self {
        Self { name: Some(name.into()), shape, variadic: false }
    }

    /// Unnamed parameter or result
    pub fn unnamed(shape: TypeShape) -> Self {
        Self { name: None, shape, variadic: false }
    }

    /// The type as seen inside the function body (`...T` is `[]T`)
    pub fn body_shape(&self) -> TypeShape {
        if self.variadic {
            TypeShape::Slice(Box::new(self.shape.clone()))
        } else {
            self.shape.clone()
        }
    }
}

impl TypeShape {
    /// Shape for a bare identifier in type position
    pub fn from_ident(name: &str) -> Self {
        if name == "any" {
            return TypeShape::Any;
        }
        match Primitive::from_name(name) {
            Some(prim) => TypeShape::Primitive(prim),
            None => TypeShape::Named { qualifier: None, name: name.to_string() },
        }
    }

    /// Shape for a qualified identifier `pkg.Name`
    pub fn from_qualified(qualifier: &str, name: &str) -> Self {
        if qualifier == "context" && name == "Context" {
            return TypeShape::Context;
        }
        TypeShape::Named { qualifier: Some(qualifier.to_string()), name: name.to_string() }
    }

    pub fn named(qualifier: Option<&str>, name: &str) -> Self {
        TypeShape::Named { qualifier: qualifier.map(str::to_string), name: name.to_string() }
    }

    pub fn pointer(inner: TypeShape) -> Self {
        TypeShape::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeShape) -> Self {
        TypeShape::Slice(Box::new(elem))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TypeShape::Primitive(Primitive::Error))
    }

    pub fn is_context(&self) -> bool {
        matches!(self, TypeShape::Context)
    }

    /// Collections that can be ranged over and filtered; pointers are transparent
    pub fn is_enumerable(&self) -> bool {
        match self {
            TypeShape::Slice(_) | TypeShape::Map { .. } => true,
            TypeShape::Pointer(inner) => inner.is_enumerable(),
            _ => false,
        }
    }

    /// Strip every pointer layer
    pub fn strip_pointers(&self) -> &TypeShape {
        match self {
            TypeShape::Pointer(inner) => inner.strip_pointers(),
            other => other,
        }
    }

    /// Element type of an enumerable shape (map values for maps)
    pub fn element(&self) -> Option<&TypeShape> {
        match self.strip_pointers() {
            TypeShape::Slice(elem) => Some(&**elem),
            TypeShape::Map { value, .. } => Some(&**value),
            _ => None,
        }
    }

    /// Prefix unqualified exported names with `package`
    ///
    /// Types declared next to the input interface are referenced from a
    /// different package in generated code.
    pub fn qualify(&self, package: &str) -> TypeShape {
        match self {
            TypeShape::Named { qualifier: None, name } if is_exported(name) => {
                TypeShape::Named { qualifier: Some(package.to_string()), name: name.clone() }
            }
            TypeShape::Pointer(inner) => TypeShape::Pointer(Box::new(inner.qualify(package))),
            TypeShape::Slice(elem) => TypeShape::Slice(Box::new(elem.qualify(package))),
            TypeShape::Map { key, value } => TypeShape::Map {
                key: Box::new(key.qualify(package)),
                value: Box::new(value.qualify(package)),
            },
            TypeShape::Chan { dir, elem } => TypeShape::Chan { dir: *dir, elem: Box::new(elem.qualify(package)) },
            TypeShape::Function(func) => TypeShape::Function(func.qualify(package)),
            other => other.clone(),
        }
    }
}

impl FuncShape {
    pub fn new(params: Vec<Param>, results: Vec<Param>) -> Self {
        Self { params, results }
    }

    pub fn qualify(&self, package: &str) -> FuncShape {
        let requalify = |params: &[Param]| {
            params
                .iter()
                .map(|p| Param { shape: p.shape.qualify(package), ..p.clone() })
                .collect()
        };
        FuncShape { params: requalify(&self.params), results: requalify(&self.results) }
    }
}

/// Go exports identifiers that start with an upper-case letter
pub fn is_exported(name: &str) -> bool {
    name.chars().next().map_or(false, char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<TypeShape> {
        vec![
            TypeShape::from_ident("string"),
            TypeShape::from_ident("User"),
            TypeShape::from_qualified("context", "Context"),
            TypeShape::Any,
            TypeShape::EmptyStruct,
            TypeShape::slice(TypeShape::from_ident("int")),
            TypeShape::Map {
                key: Box::new(TypeShape::from_ident("string")),
                value: Box::new(TypeShape::from_ident("User")),
            },
            TypeShape::pointer(TypeShape::slice(TypeShape::from_ident("User"))),
            TypeShape::Function(FuncShape::default()),
            TypeShape::Chan { dir: ChanDir::Recv, elem: Box::new(TypeShape::EmptyStruct) },
        ]
    }

    #[test]
    fn test_enumerable_sees_through_pointers() {
        for shape in samples() {
            let pointer = TypeShape::pointer(shape.clone());
            assert_eq!(shape.is_enumerable(), pointer.is_enumerable(), "{:?}", shape);
            assert_eq!(
                shape.is_enumerable(),
                TypeShape::pointer(pointer).is_enumerable(),
                "{:?}",
                shape
            );
        }
    }

    #[test]
    fn test_enumerable_only_for_collections() {
        assert!(TypeShape::slice(TypeShape::Any).is_enumerable());
        assert!(!TypeShape::from_ident("string").is_enumerable());
        assert!(!TypeShape::from_ident("Users").is_enumerable());
    }

    #[test]
    fn test_ident_resolution() {
        assert_eq!(TypeShape::from_ident("any"), TypeShape::Any);
        assert_eq!(TypeShape::from_ident("error"), TypeShape::Primitive(Primitive::Error));
        assert_eq!(TypeShape::from_qualified("context", "Context"), TypeShape::Context);
        assert_eq!(TypeShape::from_qualified("time", "Time"), TypeShape::named(Some("time"), "Time"));
    }

    #[test]
    fn test_qualify_exported_names_only() {
        let shape = TypeShape::Map {
            key: Box::new(TypeShape::from_ident("ID")),
            value: Box::new(TypeShape::pointer(TypeShape::from_ident("user"))),
        };
        let qualified = shape.qualify("models");

        assert_eq!(
            qualified,
            TypeShape::Map {
                key: Box::new(TypeShape::named(Some("models"), "ID")),
                value: Box::new(TypeShape::pointer(TypeShape::from_ident("user"))),
            }
        );
        assert_eq!(TypeShape::Context.qualify("models"), TypeShape::Context);
        assert_eq!(
            TypeShape::named(Some("time"), "Time").qualify("models"),
            TypeShape::named(Some("time"), "Time")
        );
    }

    #[test]
    fn test_element_of_pointer_to_map() {
        let shape = TypeShape::pointer(TypeShape::Map {
            key: Box::new(TypeShape::from_ident("string")),
            value: Box::new(TypeShape::from_ident("User")),
        });
        assert_eq!(shape.element(), Some(&TypeShape::from_ident("User")));
    }
}
