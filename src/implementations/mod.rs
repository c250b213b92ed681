//! Decorator implementations
//!
//! Each decorator is a `Pattern`: it checks an interface descriptor against
//! its preconditions and renders the wrapper declarations. `Plugin` adapts
//! a pattern to the node-walking `Implementor` contract and owns its
//! validation error slot.

pub mod support;

pub mod cache;
pub mod file_getter;
pub mod filter;
pub mod filter_param;
pub mod filter_return;
pub mod metrics;
pub mod semaphore;
pub mod slog;
pub mod store;
pub mod throttle;
pub mod tracing;

use crate::frontend::ast::{Decl, Node};
use crate::generator::{Implementor, Visit};
use crate::signature::{InterfaceDescriptor, InterfaceKind};
use crate::utils::{Result, ValidationError};

/// Outcome of a precondition check
pub type Check = std::result::Result<(), ValidationError>;

/// A decorator that can be generated for an interface
pub trait Pattern {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;

    /// Declaration kind this pattern is written for
    fn accepts(&self) -> InterfaceKind {
        InterfaceKind::Interface
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check;

    /// Render the declarations; only called on descriptors that validated
    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>>;
}

/// Runs a pattern against the first type declaration of the input
pub struct Plugin<P> {
    pattern: P,
    error: Option<ValidationError>,
}

impl<P: Pattern> Plugin<P> {
    pub fn new(pattern: P) -> Self {
        Self { pattern, error: None }
    }

    pub fn boxed(pattern: P) -> Box<dyn Implementor>
    where
        P: 'static,
    {
        Box::new(Self::new(pattern))
    }
}

impl<P: Pattern> Implementor for Plugin<P> {
    fn name(&self) -> &'static str {
        self.pattern.name()
    }

    fn description(&self) -> &'static str {
        self.pattern.description()
    }

    fn visit(&mut self, node: Node<'_>) -> Result<Visit> {
        let Node::TypeSpec(spec) = node else {
            return Ok(Visit::Continue);
        };

        let checked = support::describe(spec, self.pattern.accepts()).and_then(|desc| {
            self.pattern.validate(&desc)?;
            Ok(desc)
        });

        match checked {
            Ok(desc) => Ok(Visit::Stop(self.pattern.generate(&desc)?)),
            Err(err) => {
                self.error.get_or_insert(err);
                Ok(Visit::Stop(Vec::new()))
            }
        }
    }

    fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }
}
