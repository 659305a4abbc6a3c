//! Top-level and nested declarations: functions, variables, structs and
//! extern functions. Each builds an [`Obj`] and inserts it into the current
//! scope as soon as its header is parsed, per the data model's description
//! of how declarations populate a scope while still being parsed.

use ilc_ast::{Attribute, Obj, ScopeId, ScopeKind, StmtKind, StmtNode, Type};
use ilc_diagnostics::AstString;
use ilc_lexer::Token;

use crate::Parser;

impl<'a, 'ast> Parser<'a, 'ast> {
    pub(crate) fn parse_fn_decl(&mut self) -> Option<()> {
        let loc = self.peek_location();
        self.advance(); // `fn`
        let name = self.expect_ident("expected a function name after `fn`")?;

        let declaring_scope = self.current_scope;
        let fn_scope = self.scopes.push_scope(declaring_scope, ScopeKind::Block);

        self.consume(&Token::LParen, "expected `(` after function name")?;
        let parameters = self.parse_parameter_list(fn_scope)?;
        self.consume(&Token::RParen, "expected `)` after parameters")?;

        let return_type = if self.match_token(&Token::Arrow) {
            self.parse_type()?
        } else {
            self.types.void
        };

        self.current_scope = fn_scope;
        let saved_defers = std::mem::take(&mut self.current_defers);
        let body = self.parse_block_in_scope(fn_scope);
        let defers = std::mem::replace(&mut self.current_defers, saved_defers);
        self.current_scope = declaring_scope;
        let body = body?;

        let obj = self.arena.alloc_obj(Obj::new_fn(name, loc, parameters, body));
        obj.set_return_type(return_type);
        for defer in defers {
            obj.push_defer(defer);
        }
        self.declare(declaring_scope, obj, "function");
        Some(())
    }

    pub(crate) fn parse_top_level_var_decl(&mut self) -> Option<()> {
        let stmt = self.parse_var_decl_stmt(self.current_scope)?;
        self.globals.push(stmt);
        Some(())
    }

    pub(crate) fn parse_struct_decl(&mut self) -> Option<()> {
        let loc = self.peek_location();
        self.advance(); // `struct`
        let name = self.expect_ident("expected a struct name after `struct`")?;

        let declaring_scope = self.current_scope;
        let struct_scope = self.scopes.push_scope(declaring_scope, ScopeKind::Struct);
        let obj = self.arena.alloc_obj(Obj::new_struct(name, loc, struct_scope));
        self.declare(declaring_scope, obj, "struct");

        let ty = self.types.intern(ilc_ast::TypeKind::Struct { obj });
        obj.data_type.set(Some(ty));

        self.consume(&Token::LBrace, "expected `{` after struct name")?;
        self.current_scope = struct_scope;
        while !self.check(&Token::RBrace) && !self.at_eof() {
            let parsed = if self.check(&Token::Fn) {
                self.parse_fn_decl()
            } else {
                self.parse_struct_field()
            };
            if parsed.is_none() {
                self.synchronize_struct_member();
            }
        }
        self.current_scope = declaring_scope;
        self.consume(&Token::RBrace, "expected `}` after struct body")?;
        Some(())
    }

    fn parse_struct_field(&mut self) -> Option<()> {
        let loc = self.peek_location();
        let name = self.expect_ident("expected a field name")?;
        self.consume(&Token::Colon, "expected `:` after field name")?;
        let ty = self.parse_type()?;
        self.consume(&Token::Semicolon, "expected `;` after field declaration")?;
        let obj = self.arena.alloc_obj(Obj::new_var(name, loc));
        obj.data_type.set(Some(ty));
        self.declare(self.current_scope, obj, "field");
        Some(())
    }

    fn synchronize_struct_member(&mut self) {
        if !self.at_eof() {
            self.advance();
        }
        while !self.at_eof() && !self.check(&Token::RBrace) && !self.check(&Token::Fn) {
            self.advance();
        }
    }

    pub(crate) fn parse_extern_fn_decl(&mut self) -> Option<()> {
        let loc = self.peek_location();
        self.advance(); // `extern`
        self.consume(&Token::Fn, "expected `fn` after `extern`")?;
        let name = self.expect_ident("expected a function name after `extern fn`")?;

        self.consume(&Token::LParen, "expected `(` after function name")?;
        let parameters = self.parse_unscoped_parameter_list()?;
        self.consume(&Token::RParen, "expected `)` after parameters")?;

        let return_type = if self.match_token(&Token::Arrow) {
            self.parse_type()?
        } else {
            self.types.void
        };

        let source_attr = self.parse_source_attribute()?;
        self.consume(&Token::Semicolon, "expected `;` after extern function declaration")?;

        let obj = self
            .arena
            .alloc_obj(Obj::new_extern_fn(name, loc, parameters, source_attr));
        obj.set_return_type(return_type);
        self.declare(self.current_scope, obj, "extern function");
        Some(())
    }

    /// `#[source("name")]`, already lexed whole as a single [`Token::Attribute`].
    fn parse_source_attribute(&mut self) -> Option<Attribute> {
        let loc = self.peek_location();
        let Token::Attribute(raw) = *self.peek() else {
            self.error_here("expected a `#[source(\"...\")]` attribute");
            return None;
        };
        self.advance();
        let inner = {
            let text = self.strings.resolve(raw);
            text.split_once('(')
                .and_then(|(_, rest)| rest.rsplit_once(')'))
                .map(|(inner, _)| inner.trim().trim_matches('"').to_string())
        };
        let Some(inner) = inner else {
            self.diagnostics.error(loc, "malformed attribute");
            return None;
        };
        let value = self.strings.intern(&inner);
        Some(Attribute::Source(AstString::new(loc, value)))
    }

    fn parse_parameter_list(&mut self, scope: ScopeId) -> Option<Vec<&'ast Obj<'ast>>> {
        let mut params = Vec::new();
        if self.check(&Token::RParen) {
            return Some(params);
        }
        loop {
            let loc = self.peek_location();
            let name = self.expect_ident("expected a parameter name")?;
            self.consume(&Token::Colon, "expected `:` after parameter name")?;
            let ty = self.parse_type()?;
            let obj = self.arena.alloc_obj(Obj::new_var(name, loc));
            obj.data_type.set(Some(ty));
            self.declare(scope, obj, "parameter");
            params.push(obj);
            if !self.match_token(&Token::Comma) {
                break;
            }
            if self.check(&Token::RParen) {
                self.error_here("expected a parameter after `,`");
                return None;
            }
        }
        Some(params)
    }

    /// Extern function parameters are signature-only: they are never looked
    /// up from a body, so they are arena-allocated but never inserted into
    /// any scope.
    fn parse_unscoped_parameter_list(&mut self) -> Option<Vec<&'ast Obj<'ast>>> {
        let mut params = Vec::new();
        if self.check(&Token::RParen) {
            return Some(params);
        }
        loop {
            let loc = self.peek_location();
            let name = self.expect_ident("expected a parameter name")?;
            self.consume(&Token::Colon, "expected `:` after parameter name")?;
            let ty = self.parse_type()?;
            let obj = self.arena.alloc_obj(Obj::new_var(name, loc));
            obj.data_type.set(Some(ty));
            params.push(obj);
            if !self.match_token(&Token::Comma) {
                break;
            }
            if self.check(&Token::RParen) {
                self.error_here("expected a parameter after `,`");
                return None;
            }
        }
        Some(params)
    }

    /// `var NAME (: TYPE)? (= EXPR)? ;`, shared between top-level globals and
    /// local variable statements.
    pub(crate) fn parse_var_decl_stmt(&mut self, scope: ScopeId) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        self.advance(); // `var`
        let name = self.expect_ident("expected a variable name after `var`")?;
        let declared_type = if self.match_token(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let initializer = if self.match_token(&Token::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.consume(&Token::Semicolon, "expected `;` after variable declaration")?;

        let obj = self.arena.alloc_obj(Obj::new_var(name, loc));
        if let Some(ty) = declared_type {
            obj.data_type.set(Some(ty));
        }
        self.declare(scope, obj, "variable");
        Some(self.arena.alloc_stmt(StmtNode::new(
            loc,
            StmtKind::VarDecl {
                variable: obj,
                initializer,
            },
        )))
    }

    pub(crate) fn parse_type(&mut self) -> Option<Type> {
        if self.match_token(&Token::Tilde) {
            let inner = self.parse_type()?;
            return Some(self.types.intern(ilc_ast::TypeKind::Pointer(inner)));
        }
        match self.peek() {
            Token::Void => {
                self.advance();
                Some(self.types.void)
            }
            Token::I32 => {
                self.advance();
                Some(self.types.i32_)
            }
            Token::U32 => {
                self.advance();
                Some(self.types.u32_)
            }
            Token::Bool => {
                self.advance();
                Some(self.types.bool_)
            }
            Token::Str => {
                self.advance();
                Some(self.types.str_)
            }
            Token::Ident(name) => {
                let name = *name;
                let loc = self.peek_location();
                self.advance();
                Some(
                    self.types
                        .intern(ilc_ast::TypeKind::Identifier(AstString::new(loc, name))),
                )
            }
            _ => {
                self.error_here("expected a type");
                None
            }
        }
    }

    fn expect_ident(&mut self, message: &str) -> Option<AstString> {
        let loc = self.peek_location();
        let Token::Ident(name) = *self.peek() else {
            self.error_here(message);
            return None;
        };
        self.advance();
        Some(AstString::new(loc, name))
    }

    /// Inserts `obj` into `scope`, reporting a duplicate-definition
    /// diagnostic (rather than silently shadowing) if its namespace already
    /// holds that name in this scope.
    fn declare(&mut self, scope: ScopeId, obj: &'ast Obj<'ast>, kind_label: &str) {
        if !self.scopes.insert(scope, obj) {
            self.diagnostics.error(
                obj.location,
                format!(
                    "duplicate definition of {} `{}`",
                    kind_label,
                    self.strings.resolve(obj.name.value)
                ),
            );
        } else {
            log::debug!("declared {} `{}`", kind_label, self.strings.resolve(obj.name.value));
        }
    }
}
