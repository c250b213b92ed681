//! Metrics decorator
//!
//! Counts calls, observes their duration and counts failed calls through an
//! observability package exposing `Increment` and `ObserveDuration`.

use crate::frontend::ast::Decl;
use crate::signature::{InterfaceDescriptor, MethodSignature};
use crate::template::reparse::render_decl;
use crate::template::Env;
use crate::utils::Result;

use super::support::{delegate, field_name, forward, measure_name, prepare, wrapped};
use super::{Check, Pattern};

/// Metrics client packages the decorator can be generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Prometheus,
    Statsd,
}

impl Backend {
    fn package(self) -> &'static str {
        match self {
            Backend::Prometheus => "prometheus",
            Backend::Statsd => "statsd",
        }
    }
}

const STRUCT: &str = r#"
type {{Type}} struct {
	{{Field}} {{Iface}}
}
"#;

const CONSTRUCTOR: &str = r#"
func New{{Type}}({{Field}} {{Iface}}) *{{Type}} {
	return &{{Type}}{
		{{Field}}: {{Field}},
	}
}
"#;

const METHOD: &str = r#"
func ({{Recv}} *{{Type}}) {{Method}}{{Signature}} {
	{{Backend}}.Increment("{{Measure}}")
	defer {{Backend}}.ObserveDuration("{{Measure}}_seconds", time.Now())

	{{Forward}}
}
"#;

const ERROR_METHOD: &str = r#"
func ({{Recv}} *{{Type}}) {{Method}}{{Signature}} {
	{{Backend}}.Increment("{{Measure}}")
	defer {{Backend}}.ObserveDuration("{{Measure}}_seconds", time.Now())

	{{Results}} := {{Call}}
	if err != nil {
		{{Backend}}.Increment("{{Measure}}_error")
	}

	return {{Results}}
}
"#;

pub struct Metrics {
    package: String,
    backend: Backend,
}

impl Metrics {
    pub fn new(package: &str, backend: Backend) -> Self {
        Self { package: package.to_string(), backend }
    }

    fn method(&self, desc: &InterfaceDescriptor, recv: &str, field: &str, method: &MethodSignature) -> Result<Decl> {
        let backend = self.backend.package();
        let (method, mut alloc) = prepare(method, &self.package, &[recv, backend, "time", "err"]);
        let call = delegate(recv, field, &method, method.call_args());

        let env = Env::new()
            .set("Recv", recv)
            .set("Type", desc.name.as_str())
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Backend", backend)
            .set("Measure", measure_name(&desc.name, &method.name));

        if !method.returns_error() {
            return render_decl(&env.set("Forward", forward(call, &method)), METHOD);
        }

        let mut results = method.result_names(&mut alloc);
        results.push("err".to_string());
        let env = env.set("Results", results.join(", ")).set("Call", call);
        render_decl(&env, ERROR_METHOD)
    }
}

impl Pattern for Metrics {
    fn name(&self) -> &'static str {
        self.backend.package()
    }

    fn description(&self) -> &'static str {
        "Generates observability metrics for a given interface"
    }

    fn validate(&self, _desc: &InterfaceDescriptor) -> Check {
        Ok(())
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let recv = receiver(&desc.name);
        let field = field_name(desc, &[self.backend.package(), "time"]);
        let env = Env::new()
            .set("Type", desc.name.as_str())
            .set("Field", field.as_str())
            .set("Iface", wrapped(&self.package, desc));

        let mut decls = vec![render_decl(&env, STRUCT)?, render_decl(&env, CONSTRUCTOR)?];
        for method in &desc.methods {
            decls.push(self.method(desc, &recv, &field, method)?);
        }
        Ok(decls)
    }
}

/// Lower-cased first letter of the wrapper type
fn receiver(type_name: &str) -> String {
    type_name.chars().next().map_or_else(|| "m".to_string(), |c| c.to_lowercase().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementations::testing::{generate, last_func};
    use pretty_assertions::assert_eq;

    const REPO: &str = "type UserRepo interface {\n\tGet(ctx context.Context, id string) (*User, error)\n\tTouch(id string)\n}";

    #[test]
    fn test_counts_errors() {
        let out = generate(Metrics::new("models", Backend::Prometheus), REPO).unwrap();

        assert!(out.starts_with("type UserRepo struct {\n\tuserRepo models.UserRepo\n}"));
        assert!(out.contains("func NewUserRepo(userRepo models.UserRepo) *UserRepo {"));
        assert!(out.contains(
            "func (u *UserRepo) Get(ctx context.Context, id string) (*models.User, error) {\n\tprometheus.Increment(\"user_repo_get\")\n\tdefer prometheus.ObserveDuration(\"user_repo_get_seconds\", time.Now())\n\n\tuser, err := u.userRepo.Get(ctx, id)\n\tif err != nil {\n\t\tprometheus.Increment(\"user_repo_get_error\")\n\t}\n\n\treturn user, err\n}"
        ));
    }

    #[test]
    fn test_without_error_forwards() {
        let out = generate(Metrics::new("models", Backend::Statsd), REPO).unwrap();
        assert_eq!(
            last_func(&out),
            "func (u *UserRepo) Touch(id string) {\n\tstatsd.Increment(\"user_repo_touch\")\n\tdefer statsd.ObserveDuration(\"user_repo_touch_seconds\", time.Now())\n\n\tu.userRepo.Touch(id)\n}"
        );
    }

    #[test]
    fn test_names_follow_backend() {
        assert_eq!(Metrics::new("m", Backend::Prometheus).name(), "prometheus");
        assert_eq!(Metrics::new("m", Backend::Statsd).name(), "statsd");
    }
}
