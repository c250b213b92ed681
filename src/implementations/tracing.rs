//! OpenTelemetry tracing decorator
//!
//! Starts a span per call from the incoming context and records the
//! outcome on it. Every method needs a leading context and a trailing error.

use crate::frontend::ast::{Decl, Expr};
use crate::signature::{InterfaceDescriptor, MethodSignature};
use crate::template::reparse::render_decl;
use crate::template::Env;
use crate::utils::{Result, ValidationError};

use super::support::{delegate, expect_error, field_name, prepare, wrapped};
use super::{Check, Pattern};

const STRUCT: &str = r#"
type {{Type}} struct {
	{{Field}} {{Iface}}
	tracer trace.Tracer
}
"#;

const CONSTRUCTOR: &str = r#"
func New{{Type}}({{Field}} {{Iface}}) *{{Type}} {
	return &{{Type}}{
		{{Field}}: {{Field}},
		tracer: otel.Tracer("{{Scope}}"),
	}
}
"#;

const METHOD: &str = r#"
func (t *{{Type}}) {{Method}}{{Signature}} {
	spanCtx, span := t.tracer.Start({{Ctx}}, "{{Span}}")
	defer span.End()

	{{Results}} := {{Call}}
	if err != nil {
		span.SetStatus(codes.Error, "{{Span}} failed")
		span.RecordError(err)
		return {{Results}}
	}

	span.AddEvent("{{Span}} succeeded")
	return {{Results}}
}
"#;

const LOCALS: [&str; 7] = ["t", "span", "spanCtx", "err", "codes", "otel", "trace"];

pub struct Tracing {
    package: String,
}

impl Tracing {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string() }
    }

    fn method(&self, desc: &InterfaceDescriptor, type_name: &str, field: &str, method: &MethodSignature) -> Result<Decl> {
        let (method, mut alloc) = prepare(method, &self.package, &LOCALS);
        let ctx = method.context_name().unwrap_or("ctx").to_string();

        let mut args = method.call_args();
        args[0] = Expr::ident("spanCtx");

        let mut results = method.result_names(&mut alloc);
        results.push("err".to_string());

        let env = Env::new()
            .set("Type", type_name)
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Ctx", ctx)
            .set("Span", format!("{}.{}", desc.name, method.name))
            .set("Results", results.join(", "))
            .set("Call", delegate("t", field, &method, args));
        render_decl(&env, METHOD)
    }
}

impl Pattern for Tracing {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn description(&self) -> &'static str {
        "Generate traceing wrapper"
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        desc.methods.iter().try_for_each(|m| {
            if !m.takes_context() {
                return Err(ValidationError::MissingContext { method: m.name.clone() });
            }
            expect_error(m)
        })
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let type_name = format!("{}Tracer", desc.name);
        let field = field_name(desc, &["tracer", "otel", "trace"]);
        let env = Env::new()
            .set("Type", type_name.as_str())
            .set("Field", field.as_str())
            .set("Iface", wrapped(&self.package, desc));
        let scope = format!("{}.{}", self.package, desc.name);

        let mut decls = vec![
            render_decl(&env, STRUCT)?,
            render_decl(&env.set("Scope", scope), CONSTRUCTOR)?,
        ];
        for method in &desc.methods {
            decls.push(self.method(desc, &type_name, &field, method)?);
        }
        Ok(decls)
    }
}
