//! Periodically reloaded store
//!
//! Wraps a single getter. The value is loaded once when the store is built
//! and refreshed on an interval by a background loop; readers are served
//! from memory under a read lock.

use crate::frontend::ast::Decl;
use crate::signature::InterfaceDescriptor;
use crate::template::reparse::{render_decl, to_expr};
use crate::template::Env;
use crate::types::naming::NameAllocator;
use crate::utils::{Result, ValidationError};

use super::support::{expect_value_and_error, prepare, single_method, wrapped};
use super::{Check, Pattern};

/// What happens when the first load fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The constructor panics
    Panic,
    /// The constructor returns the error
    WithError,
}

const STRUCT: &str = r#"
type Store struct {
	repo {{Iface}}
	interval time.Duration
	{{Lock}} sync.RWMutex
	{{Value}} {{Result}}
}
"#;

const CONSTRUCTOR: &str = r#"
func New(repo {{Iface}}, interval time.Duration) *Store {
	s := &Store{
		repo: repo,
		interval: interval,
	}

	if err := s.load(); err != nil {
		panic(fmt.Sprintf("loading store failed: %v", err))
	}

	go s.loop()
	return s
}
"#;

const CONSTRUCTOR_WITH_ERROR: &str = r#"
func New(repo {{Iface}}, interval time.Duration) (*Store, error) {
	s := &Store{
		repo: repo,
		interval: interval,
	}

	if err := s.load(); err != nil {
		return nil, fmt.Errorf("loading store failed: %w", err)
	}

	go s.loop()
	return s, nil
}
"#;

const LOOP: &str = r#"
func (s *Store) loop() {
	for {
		time.Sleep(s.interval)
		if err := s.load(); err != nil {
			log.Println("reloading store failed:", err)
		}
	}
}
"#;

const LOAD: &str = r#"
func (s *Store) load() error {
	{{Value}}, err := s.repo.{{Method}}({{Args}})
	if err != nil {
		return err
	}

	s.{{Lock}}.Lock()
	s.{{Value}} = {{Value}}
	s.{{Lock}}.Unlock()
	return nil
}
"#;

const GETTER: &str = r#"
func (s *Store) {{Method}}{{Signature}} {
	s.{{Lock}}.RLock()
	defer s.{{Lock}}.RUnlock()

	return s.{{Value}}, nil
}
"#;

/// Identifiers the generated code uses besides the value and its lock
const RESERVED: [&str; 10] = [
    "s", "repo", "interval", "err", "load", "loop", "time", "sync", "log", "fmt",
];

pub struct Store {
    package: String,
    mode: Mode,
}

impl Store {
    pub fn new(package: &str, mode: Mode) -> Self {
        Self { package: package.to_string(), mode }
    }
}

impl Pattern for Store {
    fn name(&self) -> &'static str {
        match self.mode {
            Mode::Panic => "store",
            Mode::WithError => "store-error",
        }
    }

    fn description(&self) -> &'static str {
        match self.mode {
            Mode::Panic => "Keep the result of a getter in memory and refresh it periodically, panic if the first load fails",
            Mode::WithError => "Keep the result of a getter in memory and refresh it periodically, return an error if the first load fails",
        }
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        let method = single_method(desc)?;
        if !method.payload_params().is_empty() {
            return Err(ValidationError::UnexpectedParams { method: method.name.clone() });
        }
        expect_value_and_error(method)
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let (method, _) = prepare(single_method(desc)?, &self.package, &RESERVED);

        let result = method.results[0].shape.clone();
        let mut fields = NameAllocator::with_reserved(&RESERVED);
        fields.reserve(&self.package);
        let value = fields.allocate_for(&result);
        let lock = fields.allocate(&format!("{}Lock", value));

        let args = if method.takes_context() {
            vec![to_expr("context.Background()")?]
        } else {
            Vec::new()
        };

        let env = Env::new()
            .set("Iface", wrapped(&self.package, desc))
            .set("Lock", lock.as_str())
            .set("Value", value.as_str())
            .set("Result", result);
        let structure = render_decl(&env, STRUCT)?;

        let constructor = match self.mode {
            Mode::Panic => CONSTRUCTOR,
            Mode::WithError => CONSTRUCTOR_WITH_ERROR,
        };
        let constructor = render_decl(&Env::new().set("Iface", wrapped(&self.package, desc)), constructor)?;

        let load = Env::new()
            .set("Value", value.as_str())
            .set("Lock", lock.as_str())
            .set("Method", method.name.as_str())
            .set("Args", args);

        let getter = Env::new()
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Lock", lock.as_str())
            .set("Value", value.as_str());

        Ok(vec![
            structure,
            constructor,
            render_decl(&Env::new(), LOOP)?,
            render_decl(&load, LOAD)?,
            render_decl(&getter, GETTER)?,
        ])
    }
}
