//! Logging stub
//!
//! An implementation that only logs each call and its arguments with
//! `log/slog`. Useful as a placeholder while the real implementation is
//! being written.

use crate::frontend::ast::{Decl, Expr};
use crate::signature::{InterfaceDescriptor, MethodSignature};
use crate::template::reparse::render_decl;
use crate::template::Env;
use crate::utils::Result;

use super::support::{expect_at_most_error, measure_name, prepare};
use super::{Check, Pattern};

const STRUCT: &str = "type {{Type}} struct{}";

const CONSTRUCTOR: &str = r#"
func New{{Type}}() *{{Type}} {
	return &{{Type}}{}
}
"#;

const METHOD: &str = r#"
func (l *{{Type}}) {{Method}}{{Signature}} {
	{{Log}}
	{{Return}}
}
"#;

pub struct Slog {
    package: String,
}

impl Slog {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string() }
    }

    fn method(&self, desc: &InterfaceDescriptor, method: &MethodSignature) -> Result<Decl> {
        let (method, _) = prepare(method, &self.package, &["l", "slog"]);

        let mut args = Vec::new();
        let func = match method.context_name() {
            Some(ctx) => {
                args.push(Expr::ident(ctx));
                "slog.InfoContext"
            }
            None => "slog.Info",
        };
        args.push(Expr::Lit(format!("\"{}\"", measure_name(&desc.name, &method.name))));
        for param in method.payload_params() {
            let name = param.name.as_deref().unwrap_or("_");
            args.push(Expr::Lit(format!("\"{}\"", name)));
            args.push(Expr::ident(name));
        }

        let ret = if method.results.is_empty() { "" } else { "return nil" };
        let env = Env::new()
            .set("Type", desc.name.as_str())
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Log", Expr::call(func, args))
            .set("Return", ret);
        render_decl(&env, METHOD)
    }
}

impl Pattern for Slog {
    fn name(&self) -> &'static str {
        "slog"
    }

    fn description(&self) -> &'static str {
        "Generates slog stdout for a given interface, expect only single return errors in methods."
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        desc.methods.iter().try_for_each(expect_at_most_error)
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let env = Env::new().set("Type", desc.name.as_str());
        let mut decls = vec![render_decl(&env, STRUCT)?, render_decl(&env, CONSTRUCTOR)?];
        for method in &desc.methods {
            decls.push(self.method(desc, method)?);
        }
        Ok(decls)
    }
}
