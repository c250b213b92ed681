//! Backend module - rendering declarations back to Go text

pub mod printer;
