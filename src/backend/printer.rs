//! Declaration printer
//!
//! Renders AST nodes back to Go source. Output is stable: printing a
//! declaration, parsing it, and printing again yields the same text.

use std::fmt::{self, Display};

use crate::frontend::ast::*;
use crate::frontend::token::TokenKind;
use crate::template::Snippet;
use crate::types::{ChanDir, FuncShape, Param, TypeShape};

/// Render declarations separated by blank lines
pub fn print_decls(decls: &[Decl]) -> String {
    decls.iter().map(Decl::to_string).collect::<Vec<_>>().join("\n\n")
}

/// `(params) results` as written after a function name
pub fn signature(func: &FuncShape) -> String {
    format!("({}){}", join(&func.params), results(&func.results))
}

/// Result list including its leading space; empty when there are none
pub fn results(results: &[Param]) -> String {
    match results {
        [] => String::new(),
        [single] if single.name.is_none() => format!(" {}", single),
        many => format!(" ({})", join(many)),
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items.iter().map(T::to_string).collect::<Vec<_>>().join(", ")
}

// ==================== Types ====================

impl Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Primitive(prim) => f.write_str(prim.as_str()),
            TypeShape::Pointer(inner) => write!(f, "*{}", inner),
            TypeShape::Named { qualifier: Some(q), name } => write!(f, "{}.{}", q, name),
            TypeShape::Named { qualifier: None, name } => f.write_str(name),
            TypeShape::Slice(elem) => write!(f, "[]{}", elem),
            TypeShape::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeShape::Function(func) => write!(f, "func{}", signature(func)),
            TypeShape::Context => f.write_str("context.Context"),
            TypeShape::Any => f.write_str("interface{}"),
            TypeShape::Chan { dir: ChanDir::Both, elem } => write!(f, "chan {}", elem),
            TypeShape::Chan { dir: ChanDir::Send, elem } => write!(f, "chan<- {}", elem),
            TypeShape::Chan { dir: ChanDir::Recv, elem } => write!(f, "<-chan {}", elem),
            TypeShape::EmptyStruct => f.write_str("struct{}"),
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{} ", name)?;
        }
        if self.variadic {
            f.write_str("...")?;
        }
        write!(f, "{}", self.shape)
    }
}

// ==================== Expressions ====================

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => f.write_str(name),
            Expr::Lit(text) => f.write_str(text),
            Expr::Composite(shape) => write!(f, "{}{{}}", shape),
            Expr::Unary { op, expr } => write!(f, "{}{}", op, expr),
            Expr::Call { func, args } => write!(f, "{}({})", func, join(args)),
            Expr::Spread(inner) => write!(f, "{}...", inner),
        }
    }
}

// ==================== Declarations ====================

impl Display for Decl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Type(spec) => write!(f, "type {} {}", spec.name, spec.ty),
            Decl::Func(func) => func.fmt(f),
            Decl::Var(var) => {
                write!(f, "var {}", var.name)?;
                if let Some(shape) = &var.shape {
                    write!(f, " {}", shape)?;
                }
                if let Some(value) = &var.value {
                    write!(f, " = {}", value)?;
                }
                Ok(())
            }
        }
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Shape(shape) => shape.fmt(f),
            TypeExpr::Interface(iface) if iface.methods.is_empty() && iface.embedded.is_empty() => {
                f.write_str("interface{}")
            }
            TypeExpr::Interface(iface) => {
                f.write_str("interface {\n")?;
                for embedded in &iface.embedded {
                    writeln!(f, "\t{}", embedded)?;
                }
                for method in &iface.methods {
                    writeln!(f, "\t{}{}", method.name, signature(&method.func))?;
                }
                f.write_str("}")
            }
            TypeExpr::Struct(st) if st.fields.is_empty() => f.write_str("struct{}"),
            TypeExpr::Struct(st) => {
                let width = st.fields.iter().map(|field| field.name.chars().count()).max().unwrap_or(0);
                f.write_str("struct {\n")?;
                for field in &st.fields {
                    writeln!(f, "\t{:<width$} {}", field.name, field.shape, width = width)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Display for FuncDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("func ")?;
        if let Some(recv) = &self.recv {
            write!(f, "({}) ", recv)?;
        }
        write!(f, "{}{} {{\n", self.name, signature(&self.func))?;
        f.write_str(&print_body(&self.body))?;
        f.write_str("}")
    }
}

impl Display for Snippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snippet::Type(shape) => shape.fmt(f),
            Snippet::Param(param) => param.fmt(f),
            Snippet::Expr(expr) => expr.fmt(f),
            Snippet::Decl(decl) => decl.fmt(f),
        }
    }
}

// ==================== Bodies ====================

/// Print body lines, indenting by bracket nesting
///
/// A line that opens several brackets at once (`go func() {`) indents the
/// following lines by a single level; that level closes when the bracket
/// depth drops back below where the line started.
fn print_body(block: &Block) -> String {
    let mut lines: Vec<Option<BodyLine>> = Vec::with_capacity(block.lines.len());
    let mut depth = 0usize;
    // bracket depth at which each open indentation level started
    let mut levels: Vec<usize> = Vec::new();

    for line in &block.lines {
        if line.is_empty() {
            lines.push(None);
            continue;
        }

        let leading_closers = line.iter().take_while(|t| t.kind.is_close()).count();
        let line_depth = depth.saturating_sub(leading_closers);
        let mut indent = 1 + levels.iter().filter(|&&d| d < line_depth).count();
        if is_outdented(line) {
            indent = indent.saturating_sub(1);
        }

        let mut lowest = depth;
        for token in line {
            if token.kind.is_open() {
                depth += 1;
            } else if token.kind.is_close() {
                depth = depth.saturating_sub(1);
                lowest = lowest.min(depth);
            }
        }
        levels.retain(|&d| d < lowest);
        if depth > lowest {
            levels.push(lowest);
        }

        lines.push(Some(BodyLine::new(indent, line)));
    }

    align_keys(&mut lines);
    let mut out = String::new();
    for line in &lines {
        if let Some(line) = line {
            for _ in 0..line.indent {
                out.push('\t');
            }
            if let Some(key) = &line.key {
                out.push_str(key);
                out.push(':');
                for _ in 0..line.pad {
                    out.push(' ');
                }
            }
            out.push_str(&line.text);
        }
        out.push('\n');
    }

    out
}

/// One printed body line; keyed elements keep their key apart for alignment
struct BodyLine {
    indent: usize,
    key: Option<String>,
    pad: usize,
    text: String,
}

impl BodyLine {
    fn new(indent: usize, line: &[BodyToken]) -> Self {
        let (key, rest) = match keyed_element(line) {
            Some(key) => (Some(key), &line[2..]),
            None => (None, line),
        };

        let mut text = String::new();
        for (i, token) in rest.iter().enumerate() {
            if i > 0 && token.spaced {
                text.push(' ');
            }
            text.push_str(&token.kind.text());
        }
        Self { indent, key, pad: 1, text }
    }
}

/// `key: value,` as written inside a multi-line composite literal
fn keyed_element(line: &[BodyToken]) -> Option<String> {
    match line {
        [BodyToken { kind: TokenKind::Ident(key), .. }, BodyToken { kind: TokenKind::Colon, .. }, rest @ ..]
            if !rest.is_empty() && key != "case" && key != "default" =>
        {
            matches!(rest.last(), Some(BodyToken { kind: TokenKind::Comma, .. })).then(|| key.clone())
        }
        _ => None,
    }
}

/// Line up the values of consecutive keyed elements at one indentation
fn align_keys(lines: &mut [Option<BodyLine>]) {
    let mut start = 0;
    while start < lines.len() {
        let indent = match &lines[start] {
            Some(BodyLine { key: Some(_), indent, .. }) => *indent,
            _ => {
                start += 1;
                continue;
            }
        };

        let end = start
            + lines[start..]
                .iter()
                .take_while(|line| matches!(line, Some(BodyLine { key: Some(_), indent: i, .. }) if *i == indent))
                .count();
        let width = lines[start..end]
            .iter()
            .flatten()
            .filter_map(|line| line.key.as_ref())
            .map(|key| key.chars().count())
            .max()
            .unwrap_or(0);
        for line in lines[start..end].iter_mut().flatten() {
            if let Some(key) = &line.key {
                line.pad = 1 + width - key.chars().count();
            }
        }
        start = end;
    }
}

/// `case x:`, `default:` and labels sit one level left of their block
fn is_outdented(line: &[BodyToken]) -> bool {
    let ends_with_colon = matches!(line.last(), Some(BodyToken { kind: TokenKind::Colon, .. }));
    match line.first().map(|t| &t.kind) {
        Some(TokenKind::Ident(word)) if word == "case" || word == "default" => ends_with_colon,
        Some(TokenKind::Ident(_)) => line.len() == 2 && ends_with_colon,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::reparse::to_decl;
    use pretty_assertions::assert_eq;

    fn roundtrip(text: &str) {
        let decl = to_decl(text).unwrap();
        let printed = decl.to_string();
        let reparsed = to_decl(&printed).unwrap();

        assert_eq!(decl, reparsed);
        assert_eq!(printed, reparsed.to_string());
    }

    #[test]
    fn test_type_display() {
        let shape = TypeShape::Map {
            key: Box::new(TypeShape::from_ident("string")),
            value: Box::new(TypeShape::slice(TypeShape::pointer(TypeShape::named(Some("models"), "User")))),
        };
        assert_eq!(shape.to_string(), "map[string][]*models.User");
        assert_eq!(
            TypeShape::Chan { dir: ChanDir::Both, elem: Box::new(TypeShape::EmptyStruct) }.to_string(),
            "chan struct{}"
        );
    }

    #[test]
    fn test_signature_results() {
        let func = FuncShape::new(
            vec![Param::named("id", TypeShape::from_ident("string"))],
            vec![Param::unnamed(TypeShape::from_ident("User")), Param::unnamed(TypeShape::from_ident("error"))],
        );
        assert_eq!(signature(&func), "(id string) (User, error)");

        let single = FuncShape::new(vec![], vec![Param::unnamed(TypeShape::from_ident("error"))]);
        assert_eq!(signature(&single), "() error");
        assert_eq!(signature(&FuncShape::default()), "()");
    }

    #[test]
    fn test_struct_fields_are_aligned() {
        let decl = to_decl("type Throttle struct {\nrepo models.Repo\nmu sync.Mutex\nalreadyCalled bool\n}").unwrap();
        assert_eq!(
            decl.to_string(),
            "type Throttle struct {\n\trepo          models.Repo\n\tmu            sync.Mutex\n\talreadyCalled bool\n}"
        );
    }

    #[test]
    fn test_body_indentation() {
        let decl = to_decl(
            "func (t *Throttle) resetCounter() {\nfor range t.ticker.C {\nt.mu.Lock()\nt.alreadyCalled = false\nt.mu.Unlock()\n}\n}",
        )
        .unwrap();
        assert_eq!(
            decl.to_string(),
            "func (t *Throttle) resetCounter() {\n\tfor range t.ticker.C {\n\t\tt.mu.Lock()\n\t\tt.alreadyCalled = false\n\t\tt.mu.Unlock()\n\t}\n}"
        );
    }

    #[test]
    fn test_select_cases_and_closures() {
        let decl = to_decl(
            "func f() error {\nselect {\ncase s.slots <- struct{}{}:\ngo func() {\nwork()\n}()\ncase <-ctx.Done():\nreturn ctx.Err()\n}\nreturn nil\n}",
        )
        .unwrap();
        assert_eq!(
            decl.to_string(),
            "func f() error {\n\tselect {\n\tcase s.slots <- struct{}{}:\n\t\tgo func() {\n\t\t\twork()\n\t\t}()\n\tcase <-ctx.Done():\n\t\treturn ctx.Err()\n\t}\n\treturn nil\n}"
        );
    }

    #[test]
    fn test_labels_and_else() {
        let decl = to_decl(
            "func f() {\nOUTER:\nfor _, x := range xs {\nif x {\ncontinue OUTER\n} else {\nbreak\n}\n}\n}",
        )
        .unwrap();
        assert_eq!(
            decl.to_string(),
            "func f() {\nOUTER:\n\tfor _, x := range xs {\n\t\tif x {\n\t\t\tcontinue OUTER\n\t\t} else {\n\t\t\tbreak\n\t\t}\n\t}\n}"
        );
    }

    #[test]
    fn test_keyed_elements_are_aligned() {
        let decl = to_decl(
            "func New(repo models.Repo, interval time.Duration) *Store {\ns := &Store{\nrepo: repo,\ninterval: interval,\n}\nswitch {\ncase ok:\n}\n}",
        )
        .unwrap();
        assert_eq!(
            decl.to_string(),
            "func New(repo models.Repo, interval time.Duration) *Store {\n\ts := &Store{\n\t\trepo:     repo,\n\t\tinterval: interval,\n\t}\n\tswitch {\n\tcase ok:\n\t}\n}"
        );
    }

    #[test]
    fn test_generated_declarations_roundtrip() {
        roundtrip("type Cache struct {\n\trepo models.Repo\n\tcache *cache.Cache\n}");
        roundtrip("type Repo interface {\n\tGet(ctx context.Context, id string) (*User, error)\n\tClose()\n}");
        roundtrip("var ErrThrottled = errors.New(\"rate limit exceeded\")");
        roundtrip("func New(repo models.Repo, slots int) *Semaphore {\n\treturn &Semaphore{\n\t\trepo:  repo,\n\t\tslots: make(chan struct{}, slots),\n\t}\n}");
        roundtrip("func (s *Store) load() {\n\tuser, err := s.repo.Get(context.Background())\n\n\n\tif err != nil {\n\t\tlog.Println(err)\n\t\treturn\n\t}\n}");
        roundtrip("type F func(a, b string, rest ...int) (n int, err error)");
    }
}
