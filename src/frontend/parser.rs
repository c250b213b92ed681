//! Parser for the Go subset
//!
//! Recursive descent over the token stream. Type expressions are parsed
//! into `TypeShape`s; function bodies are only checked for balance and
//! kept as token lines.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::types::{ChanDir, FuncShape, Param, TypeShape};
use crate::utils::{Error, Result, Span};

/// Parse a complete source file
pub fn parse_source(source: &str) -> Result<SourceFile> {
    Parser::new(source).parse_file()
}

/// One entry of a parameter list before grouping is resolved
enum ParamEntry {
    /// A lone identifier: either a name waiting for a type or a type itself
    Ident(String, Span),
    /// A type with no name
    Type(TypeShape, bool),
    /// `name T` or `name ...T`
    Named(String, TypeShape, bool),
}

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser for the given source text
    pub fn new(source: &str) -> Self {
        Self {
            tokens: Lexer::new(source).tokenize(),
            pos: 0,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // tokenize() always ends with Eof, so the last token exists
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("{:?}", expected)))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::UnexpectedToken {
            expected: expected.to_string(),
            got: format!("{:?}", self.current_kind()),
            span: self.current().span,
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.current_kind(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn at_separator(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }

    fn parse_ident(&mut self) -> Result<String> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(Error::ExpectedIdent {
                got: format!("{:?}", other),
                span: self.current().span,
            }),
        }
    }

    // ==================== Declarations ====================

    /// Parse a complete file: package clause, imports, declarations
    pub fn parse_file(&mut self) -> Result<SourceFile> {
        self.skip_separators();
        self.expect(TokenKind::Package)?;
        let package = self.parse_ident()?;

        let mut decls = Vec::new();
        loop {
            self.skip_separators();
            if self.is_at_end() {
                break;
            }

            match self.current_kind() {
                TokenKind::Import => self.parse_import()?,
                TokenKind::Type => decls.extend(self.parse_type_decl()?),
                TokenKind::Func => decls.push(Decl::Func(self.parse_func_decl()?)),
                TokenKind::Var => decls.push(Decl::Var(self.parse_var_spec()?)),
                _ => return Err(self.unexpected("declaration (type, func, var)")),
            }

            if !self.at_separator() {
                return Err(self.unexpected("end of declaration"));
            }
        }

        Ok(SourceFile { package, decls })
    }

    /// Imports carry no information the generator needs; skip them
    fn parse_import(&mut self) -> Result<()> {
        self.expect(TokenKind::Import)?;
        if self.consume(&TokenKind::LParen) {
            while !self.consume(&TokenKind::RParen) {
                if self.is_at_end() {
                    return Err(Error::UnbalancedBlock { span: self.current().span });
                }
                self.advance();
            }
            return Ok(());
        }
        self.consume(&TokenKind::Ident(String::new()));
        self.expect(TokenKind::Str(String::new()))?;
        Ok(())
    }

    /// `type X ...` or a parenthesized group of specs
    fn parse_type_decl(&mut self) -> Result<Vec<Decl>> {
        self.expect(TokenKind::Type)?;

        if !self.consume(&TokenKind::LParen) {
            return Ok(vec![Decl::Type(self.parse_type_spec()?)]);
        }

        let mut specs = Vec::new();
        loop {
            self.skip_separators();
            if self.consume(&TokenKind::RParen) {
                break;
            }
            specs.push(Decl::Type(self.parse_type_spec()?));
            if !self.at_separator() && !self.check(&TokenKind::RParen) {
                return Err(self.unexpected("end of type spec"));
            }
        }
        Ok(specs)
    }

    /// Parse `Name [=] TypeExpr`
    fn parse_type_spec(&mut self) -> Result<TypeSpec> {
        let name = self.parse_ident()?;

        if self.check(&TokenKind::LBracket) && !matches!(self.peek_kind(), Some(TokenKind::RBracket)) {
            return Err(Error::UnsupportedType {
                what: "type parameters".into(),
                span: self.current().span,
            });
        }
        self.consume(&TokenKind::Assign);

        let ty = match self.current_kind() {
            TokenKind::Interface => {
                self.advance();
                self.expect(TokenKind::LBrace)?;
                TypeExpr::Interface(self.parse_interface_body()?)
            }
            TokenKind::Struct => {
                self.advance();
                self.expect(TokenKind::LBrace)?;
                TypeExpr::Struct(self.parse_struct_body()?)
            }
            _ => TypeExpr::Shape(self.parse_type()?),
        };

        Ok(TypeSpec { name, ty })
    }

    /// Method and embedded-interface lines up to the closing brace
    fn parse_interface_body(&mut self) -> Result<InterfaceType> {
        let mut iface = InterfaceType::default();

        loop {
            self.skip_separators();
            if self.consume(&TokenKind::RBrace) {
                break;
            }
            if self.is_at_end() {
                return Err(Error::UnbalancedBlock { span: self.current().span });
            }

            let span = self.current().span;
            let name = self.parse_ident()?;
            if self.check(&TokenKind::LParen) {
                let func = self.parse_signature()?;
                iface.methods.push(MethodSpec { name, func });
            } else if self.consume(&TokenKind::Dot) {
                let inner = self.parse_ident()?;
                iface.embedded.push(TypeShape::from_qualified(&name, &inner));
            } else {
                iface.embedded.push(TypeShape::from_ident(&name));
            }

            if !self.at_separator() && !self.check(&TokenKind::RBrace) {
                return Err(Error::UnsupportedType {
                    what: "type constraints in interface".into(),
                    span,
                });
            }
        }

        Ok(iface)
    }

    /// Named field lines up to the closing brace
    fn parse_struct_body(&mut self) -> Result<StructType> {
        let mut fields = Vec::new();

        loop {
            self.skip_separators();
            if self.consume(&TokenKind::RBrace) {
                break;
            }
            if self.is_at_end() {
                return Err(Error::UnbalancedBlock { span: self.current().span });
            }

            let span = self.current().span;
            let mut names = vec![self.parse_ident()?];
            while self.consume(&TokenKind::Comma) {
                names.push(self.parse_ident()?);
            }
            if self.at_separator() || self.check(&TokenKind::RBrace) || self.check(&TokenKind::Dot) {
                return Err(Error::UnsupportedType { what: "embedded field".into(), span });
            }

            let shape = self.parse_type()?;
            fields.extend(names.into_iter().map(|name| Field { name, shape: shape.clone() }));
        }

        Ok(StructType { fields })
    }

    /// Parse `func [(recv)] Name(params) results { body }`
    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        self.expect(TokenKind::Func)?;

        let recv = if self.check(&TokenKind::LParen) {
            let span = self.advance().span;
            let mut list = self.parse_param_list()?;
            if list.len() != 1 {
                return Err(Error::UnexpectedToken {
                    expected: "single receiver".into(),
                    got: format!("{} receivers", list.len()),
                    span,
                });
            }
            list.pop()
        } else {
            None
        };

        let name = self.parse_ident()?;
        let func = self.parse_signature()?;
        let body = self.parse_block()?;

        Ok(FuncDecl { recv, name, func, body })
    }

    /// Parse `var name [Type] [= value]`
    fn parse_var_spec(&mut self) -> Result<VarSpec> {
        self.expect(TokenKind::Var)?;
        let name = self.parse_ident()?;

        let shape = if self.check(&TokenKind::Assign) || self.at_separator() {
            None
        } else {
            Some(self.parse_type()?)
        };
        let value = if self.consume(&TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(VarSpec { name, shape, value })
    }

    // ==================== Bodies ====================

    /// Collect balanced token lines up to the matching closing brace
    fn parse_block(&mut self) -> Result<Block> {
        let open = self.expect(TokenKind::LBrace)?.span;

        let mut lines = Vec::new();
        let mut line: Vec<BodyToken> = Vec::new();
        let mut prev: Option<Span> = None;
        let mut depth = 0usize;

        loop {
            let token = self.advance();
            match token.kind {
                TokenKind::Eof => return Err(Error::UnbalancedBlock { span: open }),
                TokenKind::Newline => {
                    lines.push(std::mem::take(&mut line));
                    prev = None;
                    continue;
                }
                TokenKind::RBrace if depth == 0 => {
                    lines.push(line);
                    break;
                }
                ref kind if kind.is_close() => {
                    if depth == 0 {
                        return Err(Error::UnbalancedBlock { span: token.span });
                    }
                    depth -= 1;
                }
                ref kind if kind.is_open() => depth += 1,
                _ => {}
            }

            let spaced = prev.map_or(false, |p| !p.touches(&token.span));
            prev = Some(token.span);
            line.push(BodyToken { kind: token.kind, spaced });
        }

        Ok(Block::from_lines(lines))
    }

    // ==================== Types ====================

    /// Parse a type expression
    pub fn parse_type(&mut self) -> Result<TypeShape> {
        let span = self.current().span;

        match self.current_kind().clone() {
            TokenKind::Star => {
                self.advance();
                Ok(TypeShape::pointer(self.parse_type()?))
            }
            TokenKind::LBracket => {
                self.advance();
                if !self.consume(&TokenKind::RBracket) {
                    return Err(Error::UnsupportedType { what: "array".into(), span });
                }
                Ok(TypeShape::slice(self.parse_type()?))
            }
            TokenKind::Map => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBracket)?;
                let value = self.parse_type()?;
                Ok(TypeShape::Map { key: Box::new(key), value: Box::new(value) })
            }
            TokenKind::Chan => {
                self.advance();
                let dir = if self.consume(&TokenKind::Arrow) { ChanDir::Send } else { ChanDir::Both };
                let elem = self.parse_type()?;
                Ok(TypeShape::Chan { dir, elem: Box::new(elem) })
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(TokenKind::Chan)?;
                let elem = self.parse_type()?;
                Ok(TypeShape::Chan { dir: ChanDir::Recv, elem: Box::new(elem) })
            }
            TokenKind::Func => {
                self.advance();
                Ok(TypeShape::Function(self.parse_signature()?))
            }
            TokenKind::Interface => {
                self.advance();
                self.expect_empty_braces("inline interface with methods", span)?;
                Ok(TypeShape::Any)
            }
            TokenKind::Struct => {
                self.advance();
                self.expect_empty_braces("inline struct with fields", span)?;
                Ok(TypeShape::EmptyStruct)
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.parse_type()?;
                self.skip_newlines();
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                self.advance();
                let shape = if self.consume(&TokenKind::Dot) {
                    let inner = self.parse_ident()?;
                    TypeShape::from_qualified(&name, &inner)
                } else {
                    TypeShape::from_ident(&name)
                };
                if self.check(&TokenKind::LBracket) {
                    return Err(Error::UnsupportedType { what: "generic instantiation".into(), span });
                }
                Ok(shape)
            }
            other => Err(Error::ExpectedType { got: format!("{:?}", other), span }),
        }
    }

    fn expect_empty_braces(&mut self, what: &str, span: Span) -> Result<()> {
        self.expect(TokenKind::LBrace)?;
        self.skip_newlines();
        if self.consume(&TokenKind::RBrace) {
            Ok(())
        } else {
            Err(Error::UnsupportedType { what: what.to_string(), span })
        }
    }

    /// Parse `(params) results`
    fn parse_signature(&mut self) -> Result<FuncShape> {
        self.expect(TokenKind::LParen)?;
        let params = self.parse_param_list()?;

        let results = if self.consume(&TokenKind::LParen) {
            self.parse_param_list()?
        } else if self.current_kind().starts_type() {
            vec![Param::unnamed(self.parse_type()?)]
        } else {
            Vec::new()
        };

        Ok(FuncShape::new(params, results))
    }

    /// Parse a parameter list after its opening paren, consuming the closing one
    ///
    /// Go allows `a, b string` groups, so a lone identifier is a name when
    /// any entry of the list is named and a type otherwise.
    fn parse_param_list(&mut self) -> Result<Vec<Param>> {
        let mut entries = Vec::new();

        loop {
            self.skip_newlines();
            if self.consume(&TokenKind::RParen) {
                break;
            }

            let variadic = self.consume(&TokenKind::Ellipsis);
            let entry = match self.current_kind().clone() {
                TokenKind::Ident(name) if !variadic && !matches!(self.peek_kind(), Some(TokenKind::Dot)) => {
                    let span = self.advance().span;
                    if matches!(
                        self.current_kind(),
                        TokenKind::Comma | TokenKind::RParen | TokenKind::Newline
                    ) {
                        ParamEntry::Ident(name, span)
                    } else {
                        let variadic = self.consume(&TokenKind::Ellipsis);
                        ParamEntry::Named(name, self.parse_type()?, variadic)
                    }
                }
                _ => ParamEntry::Type(self.parse_type()?, variadic),
            };
            entries.push(entry);

            self.skip_newlines();
            if !self.consume(&TokenKind::Comma) {
                self.expect(TokenKind::RParen)?;
                break;
            }
        }

        resolve_params(entries)
    }

    // ==================== Expressions ====================

    /// Parse the small expression language used by package-level vars
    pub fn parse_expr(&mut self) -> Result<Expr> {
        let op = match self.current_kind() {
            TokenKind::Amp | TokenKind::Star | TokenKind::Arrow => Some(self.current_kind().text()),
            TokenKind::Op(op) if matches!(op.as_str(), "-" | "+" | "!" | "^") => Some(op.clone()),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.parse_expr()?;
            return Ok(Expr::Unary { op, expr: Box::new(expr) });
        }

        let primary = self.parse_primary()?;
        self.parse_calls(primary)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let span = self.current().span;

        match self.current_kind().clone() {
            TokenKind::Int(text) | TokenKind::Float(text) | TokenKind::Str(text) | TokenKind::Rune(text) => {
                self.advance();
                Ok(Expr::Lit(text))
            }
            TokenKind::LBracket | TokenKind::Map | TokenKind::Struct => {
                let shape = self.parse_type()?;
                self.expect(TokenKind::LBrace)?;
                self.expect(TokenKind::RBrace)?;
                Ok(Expr::Composite(shape))
            }
            TokenKind::Ident(name) => {
                self.advance();
                let mut path = vec![name];
                while self.check(&TokenKind::Dot) && matches!(self.peek_kind(), Some(TokenKind::Ident(_))) {
                    self.advance();
                    path.push(self.parse_ident()?);
                }

                if !self.consume(&TokenKind::LBrace) {
                    return Ok(Expr::Ident(path.join(".")));
                }
                self.expect(TokenKind::RBrace)?;
                let shape = match path.as_slice() {
                    [name] => TypeShape::from_ident(name),
                    [qualifier, name] => TypeShape::from_qualified(qualifier, name),
                    _ => return Err(Error::ExpectedType { got: path.join("."), span }),
                };
                Ok(Expr::Composite(shape))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_calls(&mut self, mut expr: Expr) -> Result<Expr> {
        while self.consume(&TokenKind::LParen) {
            let mut args = Vec::new();
            loop {
                self.skip_newlines();
                if self.consume(&TokenKind::RParen) {
                    break;
                }
                let mut arg = self.parse_expr()?;
                if self.consume(&TokenKind::Ellipsis) {
                    arg = Expr::Spread(Box::new(arg));
                }
                args.push(arg);

                self.skip_newlines();
                if !self.consume(&TokenKind::Comma) {
                    self.expect(TokenKind::RParen)?;
                    break;
                }
            }
            expr = Expr::Call { func: Box::new(expr), args };
        }
        Ok(expr)
    }
}

/// Resolve `a, b string` grouping into one `Param` per name
fn resolve_params(entries: Vec<ParamEntry>) -> Result<Vec<Param>> {
    let any_named = entries.iter().any(|e| matches!(e, ParamEntry::Named(..)));

    if !any_named {
        return Ok(entries
            .into_iter()
            .map(|entry| match entry {
                ParamEntry::Ident(name, _) => Param::unnamed(TypeShape::from_ident(&name)),
                ParamEntry::Type(shape, variadic) => Param { name: None, shape, variadic },
                ParamEntry::Named(..) => unreachable!("no named entries"),
            })
            .collect());
    }

    let mut params = Vec::with_capacity(entries.len());
    let mut group: Option<(TypeShape, bool)> = None;
    for entry in entries.into_iter().rev() {
        match entry {
            ParamEntry::Named(name, shape, variadic) => {
                params.push(Param { name: Some(name), shape: shape.clone(), variadic });
                group = Some((shape, variadic));
            }
            ParamEntry::Ident(name, span) => match &group {
                Some((shape, variadic)) => {
                    params.push(Param { name: Some(name), shape: shape.clone(), variadic: *variadic })
                }
                None => return Err(Error::ExpectedType { got: name, span }),
            },
            ParamEntry::Type(shape, _) => {
                return Err(Error::ExpectedIdent { got: format!("{:?}", shape), span: Span::dummy() })
            }
        }
    }
    params.reverse();
    Ok(params)
}
