//! Dispatch and probing
//!
//! Runs one named implementor against parsed input, or tries every
//! registered implementor and reports the ones that accept the input.

pub mod registry;
pub mod sandbox;

use log::{debug, info, warn};

use crate::feedback::ImplementorSummary;
use crate::frontend::ast::{Decl, Node, SourceFile};
use crate::frontend::structure::parse_structure;
use crate::utils::{Error, Result, Tier, ValidationError};
pub use registry::Registry;

/// What an implementor wants after seeing a node
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// Keep walking
    Continue,
    /// Stop the walk; these are the generated declarations
    Stop(Vec<Decl>),
}

/// A decorator generator
///
/// `visit` is called for every node of the input in depth-first order
/// until it returns `Visit::Stop`. Unsupported input is reported by
/// recording a validation error and stopping with no declarations;
/// `Err` is reserved for defects in the generator's own templates.
pub trait Implementor {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn visit(&mut self, node: Node<'_>) -> Result<Visit>;
    /// Validation error recorded during the last walk
    fn error(&self) -> Option<&ValidationError>;
}

/// Walk `file` with `implementor` and collect its output
pub fn run(implementor: &mut dyn Implementor, file: &SourceFile) -> Result<Vec<Decl>> {
    let mut output = None;
    for node in file.nodes() {
        if let Visit::Stop(decls) = implementor.visit(node)? {
            output = Some(decls);
            break;
        }
    }

    if let Some(err) = implementor.error() {
        return Err(err.clone().into());
    }
    output.ok_or_else(|| ValidationError::NothingToImplement.into())
}

/// Front door used by the command line
pub struct Generator {
    registry: Registry,
    package: String,
}

impl Generator {
    /// Generator over the standard registry; `package` qualifies source types
    pub fn new(package: &str) -> Self {
        Self::with_registry(Registry::standard(), package)
    }

    pub fn with_registry(registry: Registry, package: &str) -> Self {
        Self { registry, package: package.to_string() }
    }

    /// Generate declarations with the implementor called `name`
    pub fn implement(&self, source: &str, name: &str) -> Result<Vec<Decl>> {
        let mut implementor = self
            .registry
            .build(name, &self.package)
            .ok_or_else(|| Error::UnknownImplementor { name: name.to_string() })?;

        let file = parse_structure(source)?;
        info!("implementing {} for package {}", implementor.name(), self.package);
        let decls = run(implementor.as_mut(), &file)?;
        info!("{} generated {} declarations", implementor.name(), decls.len());
        Ok(decls)
    }

    /// Every registered implementor
    pub fn list_all(&self) -> Vec<ImplementorSummary> {
        self.registry
            .build_all(&self.package)
            .iter()
            .map(|i| ImplementorSummary::of(i.as_ref()))
            .collect()
    }

    /// Implementors that accept `source`
    ///
    /// Implementors that reject the input, or panic while trying, are left
    /// out. A broken template aborts the whole probe.
    pub fn list_available(&self, source: &str) -> Result<Vec<ImplementorSummary>> {
        let file = parse_structure(source)?;
        let mut available = Vec::new();

        for mut implementor in self.registry.build_all(&self.package) {
            let name = implementor.name();
            match sandbox::guard(|| run(implementor.as_mut(), &file)) {
                Ok(Ok(_)) => available.push(ImplementorSummary::of(implementor.as_ref())),
                Ok(Err(err)) if err.tier() == Tier::Template => return Err(err),
                Ok(Err(err)) => debug!("{} excluded: {}", name, err),
                Err(panic) => warn!("{} panicked while probing: {}", name, panic),
            }
        }

        Ok(available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO: &str = "type UserRepo interface {\n\tGet(ctx context.Context, id string) (User, error)\n}";

    /// Implementor that panics on any interface
    struct Exploding;

    impl Implementor for Exploding {
        fn name(&self) -> &'static str {
            "exploding"
        }
        fn description(&self) -> &'static str {
            "always panics"
        }
        fn visit(&mut self, node: Node<'_>) -> Result<Visit> {
            if let Node::TypeSpec(spec) = node {
                panic!("cannot handle {}", spec.name);
            }
            Ok(Visit::Continue)
        }
        fn error(&self) -> Option<&ValidationError> {
            None
        }
    }

    /// Implementor whose template is broken
    struct BrokenTemplate;

    impl Implementor for BrokenTemplate {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn description(&self) -> &'static str {
            "renders an unbound placeholder"
        }
        fn visit(&mut self, _node: Node<'_>) -> Result<Visit> {
            let decl = crate::template::reparse::render_decl(
                &crate::template::Env::new(),
                "type {{Missing}} struct{}",
            )?;
            Ok(Visit::Stop(vec![decl]))
        }
        fn error(&self) -> Option<&ValidationError> {
            None
        }
    }

    fn registry_with(extra: fn(&str) -> Box<dyn Implementor>) -> Registry {
        let mut registry = Registry::standard();
        registry.register(extra);
        registry
    }

    #[test]
    fn test_unknown_implementor() {
        let err = Generator::new("models").implement(REPO, "nope").unwrap_err();
        assert!(matches!(err, Error::UnknownImplementor { ref name } if name == "nope"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_parse_failure_is_fatal() {
        let err = Generator::new("models").implement("not go at all", "cache").unwrap_err();
        assert_eq!(err.tier(), Tier::Parse);
    }

    #[test]
    fn test_validation_failure_is_fatal_in_single_mode() {
        let err = Generator::new("models")
            .implement("type R interface { Get(id string) User }", "cache")
            .unwrap_err();
        assert_eq!(err.tier(), Tier::Validation);
    }

    #[test]
    fn test_list_all_in_registration_order() {
        let names: Vec<_> = Generator::new("models").list_all().into_iter().map(|s| s.name).collect();
        assert_eq!(names.first().map(String::as_str), Some("prometheus"));
        assert_eq!(names.len(), Registry::standard().len());
    }

    #[test]
    fn test_probe_excludes_rejecting_and_panicking_implementors() {
        let generator = Generator::with_registry(registry_with(|_| Box::new(Exploding)), "models");
        let names: Vec<_> = generator
            .list_available(REPO)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();

        assert!(names.contains(&"cache".to_string()));
        assert!(names.contains(&"semaphore".to_string()));
        assert!(!names.contains(&"store".to_string()));
        assert!(!names.contains(&"exploding".to_string()));
    }

    #[test]
    fn test_probe_surfaces_template_defects() {
        let generator = Generator::with_registry(registry_with(|_| Box::new(BrokenTemplate)), "models");
        let err = generator.list_available(REPO).unwrap_err();
        assert!(matches!(err, Error::MissingKey { ref key } if key == "Missing"));
    }

    #[test]
    fn test_function_type_probe() {
        let names: Vec<_> = Generator::new("models")
            .list_available("func(path string) (Config, error)")
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["file-getter".to_string()]);
    }
}
