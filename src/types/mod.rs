//! Type shapes and the inference built on them

mod shape;
pub mod naming;
pub mod zero;

pub use shape::{is_exported, ChanDir, FuncShape, Param, Primitive, TypeShape};
