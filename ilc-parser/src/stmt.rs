//! Statement parsing: blocks, control flow, `return`, `defer`, `expect`, and
//! expression statements. `for` is lowered into an enclosing block holding
//! the loop's initializer plus a `While` node, matching the data model's
//! note that `While`'s shape already covers both loop forms.

use ilc_ast::{ControlFlow, ScopeId, ScopeKind, StmtKind, StmtNode};
use ilc_lexer::Token;

use crate::Parser;

impl<'a, 'ast> Parser<'a, 'ast> {
    /// Parses a `{ ... }` block as a fresh child scope of the current one.
    /// Used for nested blocks, `if`/`while`/`for` bodies — anything that
    /// isn't a function's own top scope.
    pub(crate) fn parse_block(&mut self) -> Option<&'ast StmtNode<'ast>> {
        let outer = self.current_scope;
        let scope = self.scopes.push_scope(outer, ScopeKind::Block);
        self.current_scope = scope;
        let result = self.parse_block_in_scope(scope);
        self.current_scope = outer;
        result
    }

    /// Parses a `{ ... }` block into an already-pushed scope, without
    /// pushing a new one of its own. Used for a function body, whose scope
    /// is shared with its parameters.
    pub(crate) fn parse_block_in_scope(&mut self, scope: ScopeId) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        self.consume(&Token::LBrace, "expected `{`")?;
        let mut nodes = Vec::new();
        let mut flow = ControlFlow::None;
        while !self.check(&Token::RBrace) && !self.at_eof() {
            match self.parse_statement() {
                Some(stmt) => {
                    flow = sequence(flow, statement_control_flow(stmt));
                    nodes.push(stmt);
                }
                None => self.synchronize_statement(),
            }
        }
        self.consume(&Token::RBrace, "expected `}` to close block")?;
        let block = self.arena.alloc_stmt(StmtNode::new_block(loc, scope, nodes));
        block.set_control_flow(flow);
        Some(block)
    }

    fn synchronize_statement(&mut self) {
        if !self.at_eof() {
            self.advance();
        }
        while !self.at_eof() && !self.check(&Token::RBrace) && !self.starts_statement() {
            self.advance();
        }
    }

    fn starts_statement(&self) -> bool {
        matches!(
            self.peek(),
            Token::Var
                | Token::If
                | Token::While
                | Token::For
                | Token::Return
                | Token::Defer
                | Token::Expect
                | Token::LBrace
        )
    }

    fn parse_statement(&mut self) -> Option<&'ast StmtNode<'ast>> {
        match self.peek() {
            Token::Var => self.parse_var_decl_stmt(self.current_scope),
            Token::LBrace => self.parse_block(),
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::For => self.parse_for(),
            Token::Return => self.parse_return(),
            Token::Defer => self.parse_defer(),
            Token::Expect => self.parse_expect(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_if(&mut self) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        self.advance(); // `if`
        let condition = self.parse_expression()?;
        let then = self.parse_block()?;
        let else_ = if self.match_token(&Token::Else) {
            if self.check(&Token::If) {
                Some(self.parse_if()?)
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Some(
            self.arena
                .alloc_stmt(StmtNode::new(loc, StmtKind::If { condition, then, else_ })),
        )
    }

    fn parse_while(&mut self) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        self.advance(); // `while`
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Some(self.arena.alloc_stmt(StmtNode::new(
            loc,
            StmtKind::While {
                condition,
                increment: None,
                initializer: None,
                body,
            },
        )))
    }

    /// `for INIT? ; COND ; INC? BODY` lowers to an outer block holding `INIT`
    /// followed by a `While` node carrying `COND`/`INCR`/`BODY` — the data
    /// model gives `While` an `initializer`/`increment` pair specifically so
    /// this lowering doesn't need its own statement kind. Unlike C, the
    /// clauses are not parenthesized; the block's opening `{` is what ends
    /// the increment clause.
    fn parse_for(&mut self) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        self.advance(); // `for`
        let outer = self.current_scope;
        let outer_block_scope = self.scopes.push_scope(outer, ScopeKind::Block);
        self.current_scope = outer_block_scope;

        let initializer = if self.check(&Token::Semicolon) {
            self.advance();
            None
        } else {
            Some(self.parse_var_decl_stmt(outer_block_scope)?)
        };
        let condition = self.parse_expression()?;
        self.consume(&Token::Semicolon, "expected `;` after loop condition")?;
        let increment = if self.check(&Token::LBrace) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let body = self.parse_block()?;
        let while_stmt = self.arena.alloc_stmt(StmtNode::new(
            loc,
            StmtKind::While {
                condition,
                increment,
                initializer: None,
                body,
            },
        ));
        self.current_scope = outer;

        let mut nodes = Vec::new();
        if let Some(init) = initializer {
            nodes.push(init);
        }
        nodes.push(while_stmt);
        let flow = nodes
            .iter()
            .fold(ControlFlow::None, |acc, n| sequence(acc, statement_control_flow(n)));
        let block = self.arena.alloc_stmt(StmtNode::new_block(loc, outer_block_scope, nodes));
        block.set_control_flow(flow);
        Some(block)
    }

    fn parse_return(&mut self) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        self.advance(); // `return`
        let expr = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(&Token::Semicolon, "expected `;` after return statement")?;
        Some(self.arena.alloc_stmt(StmtNode::new(loc, StmtKind::Return { expr })))
    }

    /// Enqueues `body` onto the enclosing function's defer list as well as
    /// returning its own statement node, matching the data model's note that
    /// a function's `defers` accumulate in encounter order as the body is
    /// parsed (lowering later reverses them).
    fn parse_defer(&mut self) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        self.advance(); // `defer`
        let body = self.parse_statement()?;
        let stmt = self.arena.alloc_stmt(StmtNode::new(loc, StmtKind::Defer { body }));
        self.current_defers.push(stmt);
        Some(stmt)
    }

    fn parse_expect(&mut self) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        self.advance(); // `expect`
        let condition = self.parse_expression()?;
        let then = if self.check(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        self.consume(&Token::Semicolon, "expected `;` after `expect` statement")?;
        Some(
            self.arena
                .alloc_stmt(StmtNode::new(loc, StmtKind::Expect { condition, then })),
        )
    }

    fn parse_expr_stmt(&mut self) -> Option<&'ast StmtNode<'ast>> {
        let loc = self.peek_location();
        let expr = self.parse_expression()?;
        self.consume(&Token::Semicolon, "expected `;` after expression statement")?;
        Some(self.arena.alloc_stmt(StmtNode::new(loc, StmtKind::ExprStmt { expr })))
    }
}

/// Local contribution of a single statement to its enclosing block's control
/// flow.
fn statement_control_flow(stmt: &StmtNode<'_>) -> ControlFlow {
    match &stmt.kind {
        StmtKind::Return { .. } => ControlFlow::AlwaysReturns,
        StmtKind::Block { .. } => stmt.control_flow().unwrap_or(ControlFlow::None),
        StmtKind::If { then, else_, .. } => {
            let then_cf = statement_control_flow(then);
            match else_ {
                Some(e) => then_cf.join(statement_control_flow(e)),
                // No `else` means control can always fall through, so this
                // can never rise above `MayReturn`.
                None => then_cf.min_to_may(),
            }
        }
        StmtKind::While { body, .. } => {
            // A loop might not execute at all, so it never "always" returns
            // purely by virtue of its body returning.
            match statement_control_flow(body) {
                ControlFlow::None => ControlFlow::None,
                _ => ControlFlow::MayReturn,
            }
        }
        StmtKind::Expect { .. } | StmtKind::VarDecl { .. } | StmtKind::ExprStmt { .. } | StmtKind::Defer { .. } => {
            ControlFlow::None
        }
    }
}

/// Sequential composition of two statements' control-flow contributions
/// within one block, as distinct from [`ControlFlow::join`], which merges
/// two *alternative* branches (the two arms of an `if`). `join` alone isn't
/// enough for a statement list: once something always returns, everything
/// textually after it is unreachable and shouldn't dilute that back down to
/// `MayReturn`.
fn sequence(prev: ControlFlow, next: ControlFlow) -> ControlFlow {
    if prev == ControlFlow::AlwaysReturns {
        return ControlFlow::AlwaysReturns;
    }
    if prev == ControlFlow::None {
        return next;
    }
    prev.join(next)
}

trait MinToMay {
    fn min_to_may(self) -> ControlFlow;
}

impl MinToMay for ControlFlow {
    /// An `if` with no `else` can fall through without returning, so its
    /// overall contribution can never exceed `MayReturn`.
    fn min_to_may(self) -> ControlFlow {
        match self {
            ControlFlow::AlwaysReturns => ControlFlow::MayReturn,
            other => other,
        }
    }
}
