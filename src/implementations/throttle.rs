//! Rate limiting decorator
//!
//! At most one call passes per ticker interval. `Mode` decides what a
//! rejected call looks like to the caller.

use crate::frontend::ast::{Decl, Expr};
use crate::signature::{InterfaceDescriptor, MethodSignature};
use crate::template::reparse::{render_decl, to_decl};
use crate::template::Env;
use crate::utils::Result;

use super::support::{delegate, expect_at_most_error, expect_error, field_name, forward, prepare, wrapped};
use super::{Check, Pattern};

/// How a throttled call is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Silently dropped; methods return nothing or a nil error
    NoError,
    /// Zero values and `ErrThrottled`
    WithError,
}

const SENTINEL: &str = r#"var ErrThrottled = errors.New("rate limit exceeded")"#;

const STRUCT: &str = r#"
type Throttle struct {
	{{Field}} {{Iface}}
	ticker *time.Ticker
	mu sync.Mutex
	alreadyCalled bool
}
"#;

const CONSTRUCTOR: &str = r#"
func New({{Field}} {{Iface}}, passesPerSecond int) *Throttle {
	t := &Throttle{
		{{Field}}: {{Field}},
		ticker: time.NewTicker(time.Second / time.Duration(passesPerSecond)),
	}

	go t.resetCounter()
	return t
}
"#;

const RESET: &str = r#"
func (t *Throttle) resetCounter() {
	for range t.ticker.C {
		t.mu.Lock()
		t.alreadyCalled = false
		t.mu.Unlock()
	}
}
"#;

const METHOD: &str = r#"
func (t *Throttle) {{Method}}{{Signature}} {
	t.mu.Lock()
	if t.alreadyCalled {
		t.mu.Unlock()
		return {{Rejected}}
	}
	t.alreadyCalled = true
	t.mu.Unlock()

	{{Forward}}
}
"#;

pub struct Throttle {
    package: String,
    mode: Mode,
}

impl Throttle {
    pub fn new(package: &str, mode: Mode) -> Self {
        Self { package: package.to_string(), mode }
    }

    /// What a rejected call returns
    fn rejected(&self, method: &MethodSignature) -> Vec<Expr> {
        match self.mode {
            Mode::NoError if method.results.is_empty() => Vec::new(),
            Mode::NoError => vec![Expr::nil()],
            Mode::WithError => {
                let mut values = method.zero_results();
                values.push(Expr::ident("ErrThrottled"));
                values
            }
        }
    }

    fn method(&self, field: &str, method: &MethodSignature) -> Result<Decl> {
        let (method, _) = prepare(method, &self.package, &["t"]);
        let call = delegate("t", field, &method, method.call_args());

        let env = Env::new()
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Rejected", self.rejected(&method))
            .set("Forward", forward(call, &method));
        render_decl(&env, METHOD)
    }
}

impl Pattern for Throttle {
    fn name(&self) -> &'static str {
        match self.mode {
            Mode::NoError => "throttle",
            Mode::WithError => "throttle-error",
        }
    }

    fn description(&self) -> &'static str {
        match self.mode {
            Mode::NoError => "Process at most n requests per second, on throttled call return no error",
            Mode::WithError => "Process at most n requests per second, on throttled call return an error",
        }
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        match self.mode {
            Mode::NoError => desc.methods.iter().try_for_each(expect_at_most_error),
            Mode::WithError => desc.methods.iter().try_for_each(expect_error),
        }
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let field = field_name(desc, &["ticker", "mu", "alreadyCalled", "t", "passesPerSecond", "time"]);
        let env = Env::new().set("Field", field.as_str()).set("Iface", wrapped(&self.package, desc));

        let mut decls = Vec::new();
        if self.mode == Mode::WithError {
            decls.push(to_decl(SENTINEL)?);
        }
        decls.push(render_decl(&env, STRUCT)?);
        decls.push(render_decl(&env, CONSTRUCTOR)?);
        decls.push(to_decl(RESET.trim())?);
        for method in &desc.methods {
            decls.push(self.method(&field, method)?);
        }
        Ok(decls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementations::testing::{generate, last_func, rejection};
    use crate::utils::ValidationError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_second_call_in_tick_is_rejected() {
        let out = generate(
            Throttle::new("app", Mode::NoError),
            "type Processor interface {\n\tProcess(n int) error\n}",
        )
        .unwrap();

        assert_eq!(
            last_func(&out),
            "func (t *Throttle) Process(n int) error {\n\tt.mu.Lock()\n\tif t.alreadyCalled {\n\t\tt.mu.Unlock()\n\t\treturn nil\n\t}\n\tt.alreadyCalled = true\n\tt.mu.Unlock()\n\n\treturn t.processor.Process(n)\n}"
        );
    }

    #[test]
    fn test_tick_clears_flag() {
        let out = generate(Throttle::new("app", Mode::NoError), "type P interface { Ping() }").unwrap();
        assert!(out.contains(
            "func (t *Throttle) resetCounter() {\n\tfor range t.ticker.C {\n\t\tt.mu.Lock()\n\t\tt.alreadyCalled = false\n\t\tt.mu.Unlock()\n\t}\n}"
        ));
        assert!(out.contains("\tgo t.resetCounter()\n"));
        assert!(out.contains("\t\treturn\n\t}"));
        assert!(out.contains("\tt.p.Ping()\n}"));
    }

    #[test]
    fn test_error_mode_returns_sentinel() {
        let out = generate(
            Throttle::new("app", Mode::WithError),
            "type Repo interface {\n\tGet(id string) (*User, int, error)\n}",
        )
        .unwrap();

        assert!(out.starts_with("var ErrThrottled = errors.New(\"rate limit exceeded\")\n\n"));
        assert!(out.contains("\t\treturn nil, 0, ErrThrottled\n"));
        assert!(out.contains("func (t *Throttle) Get(id string) (*app.User, int, error) {"));
    }

    #[test]
    fn test_no_error_mode_rejects_values() {
        let err = rejection(Throttle::new("app", Mode::NoError), "type R interface { Get() (int, error) }");
        assert!(matches!(err, ValidationError::ResultCount { found: 2, .. }));
    }

    #[test]
    fn test_error_mode_needs_error() {
        let err = rejection(Throttle::new("app", Mode::WithError), "type R interface { Ping() }");
        assert_eq!(err, ValidationError::MissingError { method: "Ping".into() });
    }

    #[test]
    fn test_receiver_name_is_not_reused() {
        let out = generate(Throttle::new("app", Mode::NoError), "type R interface { Do(t string) }").unwrap();
        assert!(out.contains("func (t *Throttle) Do(str string) {"));
    }
}
