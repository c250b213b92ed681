//! Implementor registry
//!
//! An ordered list of constructors. Every lookup builds a fresh implementor
//! so no validation state leaks between runs.

use crate::generator::Implementor;
use crate::implementations::cache::Cache;
use crate::implementations::file_getter::FileGetter;
use crate::implementations::filter::{self, Filter};
use crate::implementations::filter_param::FilterParam;
use crate::implementations::filter_return::FilterReturn;
use crate::implementations::metrics::{Backend, Metrics};
use crate::implementations::semaphore::Semaphore;
use crate::implementations::slog::Slog;
use crate::implementations::store::{self, Store};
use crate::implementations::throttle::{self, Throttle};
use crate::implementations::tracing::Tracing;
use crate::implementations::Plugin;

/// Builds an implementor for a source package
pub type Factory = fn(&str) -> Box<dyn Implementor>;

pub struct Registry {
    factories: Vec<Factory>,
}

impl Registry {
    pub fn empty() -> Self {
        Self { factories: Vec::new() }
    }

    /// Every shipped implementor, in listing order
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(|pkg| Plugin::boxed(Metrics::new(pkg, Backend::Prometheus)));
        registry.register(|pkg| Plugin::boxed(Metrics::new(pkg, Backend::Statsd)));
        registry.register(|pkg| Plugin::boxed(Slog::new(pkg)));
        registry.register(|pkg| Plugin::boxed(Tracing::new(pkg)));
        registry.register(|pkg| Plugin::boxed(FileGetter::new(pkg)));
        registry.register(|pkg| Plugin::boxed(Store::new(pkg, store::Mode::Panic)));
        registry.register(|pkg| Plugin::boxed(Store::new(pkg, store::Mode::WithError)));
        registry.register(|pkg| Plugin::boxed(Cache::new(pkg)));
        registry.register(|pkg| Plugin::boxed(Semaphore::new(pkg)));
        registry.register(|pkg| Plugin::boxed(Throttle::new(pkg, throttle::Mode::NoError)));
        registry.register(|pkg| Plugin::boxed(Throttle::new(pkg, throttle::Mode::WithError)));
        registry.register(|pkg| Plugin::boxed(Filter::new(pkg, filter::Mode::NoError)));
        registry.register(|pkg| Plugin::boxed(Filter::new(pkg, filter::Mode::WithError)));
        registry.register(|pkg| Plugin::boxed(FilterParam::new(pkg)));
        registry.register(|pkg| Plugin::boxed(FilterReturn::new(pkg)));
        registry
    }

    pub fn register(&mut self, factory: Factory) {
        self.factories.push(factory);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Fresh instances of every implementor
    pub fn build_all(&self, package: &str) -> Vec<Box<dyn Implementor>> {
        self.factories.iter().map(|factory| factory(package)).collect()
    }

    /// A fresh instance of the implementor called `name`
    pub fn build(&self, name: &str, package: &str) -> Option<Box<dyn Implementor>> {
        self.build_all(package).into_iter().find(|i| i.name() == name)
    }
}
