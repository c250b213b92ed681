//! Bounded concurrency decorator
//!
//! A buffered channel holds one token per call in flight. Methods whose
//! first parameter is a context stop waiting when it is cancelled.

use crate::frontend::ast::{Decl, Expr};
use crate::signature::{InterfaceDescriptor, MethodSignature};
use crate::template::reparse::{render_decl, to_expr};
use crate::template::Env;
use crate::utils::Result;

use super::support::{delegate, expect_error, field_name, forward, prepare, wrapped};
use super::{Check, Pattern};

const STRUCT: &str = r#"
type Semaphore struct {
	{{Field}} {{Iface}}
	slots chan struct{}
}
"#;

const CONSTRUCTOR: &str = r#"
func New({{Field}} {{Iface}}, allowedParallelExecutions int) *Semaphore {
	return &Semaphore{
		{{Field}}: {{Field}},
		slots: make(chan struct{}, allowedParallelExecutions),
	}
}
"#;

const METHOD: &str = r#"
func (s *Semaphore) {{Method}}{{Signature}} {
	s.slots <- struct{}{}
	defer func() { <-s.slots }()

	{{Forward}}
}
"#;

const CONTEXT_METHOD: &str = r#"
func (s *Semaphore) {{Method}}{{Signature}} {
	if err := {{Ctx}}.Err(); err != nil {
		return {{Cancelled}}
	}

	select {
	case s.slots <- struct{}{}:
		defer func() { <-s.slots }()
		{{Forward}}
	case <-{{Ctx}}.Done():
		return {{Aborted}}
	}
}
"#;

pub struct Semaphore {
    package: String,
}

impl Semaphore {
    pub fn new(package: &str) -> Self {
        Self { package: package.to_string() }
    }

    fn method(&self, field: &str, method: &MethodSignature) -> Result<Decl> {
        let (method, _) = prepare(method, &self.package, &["s", "err"]);
        let call = delegate("s", field, &method, method.call_args());

        let env = Env::new()
            .set("Method", method.name.as_str())
            .set("Signature", method.signature())
            .set("Forward", forward(call, &method));

        let Some(ctx) = method.context_name() else {
            return render_decl(&env, METHOD);
        };

        let with_error = |err: Expr| {
            let mut values = method.zero_results();
            values.push(err);
            values
        };
        let env = env
            .set("Ctx", ctx)
            .set("Cancelled", with_error(Expr::ident("err")))
            .set("Aborted", with_error(to_expr(&format!("{}.Err()", ctx))?));
        render_decl(&env, CONTEXT_METHOD)
    }
}

impl Pattern for Semaphore {
    fn name(&self) -> &'static str {
        "semaphore"
    }

    fn description(&self) -> &'static str {
        "Simple semaphore implementation"
    }

    fn validate(&self, desc: &InterfaceDescriptor) -> Check {
        desc.methods
            .iter()
            .filter(|m| m.takes_context())
            .try_for_each(expect_error)
    }

    fn generate(&self, desc: &InterfaceDescriptor) -> Result<Vec<Decl>> {
        let field = field_name(desc, &["slots", "s", "allowedParallelExecutions"]);
        let env = Env::new().set("Field", field.as_str()).set("Iface", wrapped(&self.package, desc));

        let mut decls = vec![render_decl(&env, STRUCT)?, render_decl(&env, CONSTRUCTOR)?];
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
    fn test_cancelled_context_short_circuits() {
        let out = generate(
            Semaphore::new("jobs"),
            "type Materializer interface {\n\tMaterialize(ctx context.Context, seg Segment) (int, error)\n}",
        )
        .unwrap();

        assert_eq!(
            last_func(&out),
            "func (s *Semaphore) Materialize(ctx context.Context, seg jobs.Segment) (int, error) {\n\tif err := ctx.Err(); err != nil {\n\t\treturn 0, err\n\t}\n\n\tselect {\n\tcase s.slots <- struct{}{}:\n\t\tdefer func() { <-s.slots }()\n\t\treturn s.materializer.Materialize(ctx, seg)\n\tcase <-ctx.Done():\n\t\treturn 0, ctx.Err()\n\t}\n}"
        );
    }

    #[test]
    fn test_without_context_blocks_for_a_slot() {
        let out = generate(Semaphore::new("jobs"), "type Worker interface { Work(n int) }").unwrap();

        assert_eq!(
            last_func(&out),
            "func (s *Semaphore) Work(n int) {\n\ts.slots <- struct{}{}\n\tdefer func() { <-s.slots }()\n\n\ts.worker.Work(n)\n}"
        );
        assert!(out.contains("\t\tslots:  make(chan struct{}, allowedParallelExecutions),\n"));
    }

    #[test]
    fn test_unnamed_context_gets_a_name() {
        let out = generate(Semaphore::new("jobs"), "type W interface { Work(context.Context) error }").unwrap();
        assert!(out.contains("func (s *Semaphore) Work(ctx context.Context) error {"));
        assert!(out.contains("\t\treturn ctx.Err()\n"));
    }

    #[test]
    fn test_context_methods_need_error() {
        let err = rejection(Semaphore::new("jobs"), "type W interface { Work(ctx context.Context) }");
        assert_eq!(err, ValidationError::MissingError { method: "Work".into() });
    }
}
