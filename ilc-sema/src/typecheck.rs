//! Type compatibility checking.
//!
//! Everything here consumes the `data_type` [`ilc_ast::ExprNode`]s and
//! [`ilc_ast::Obj`]s already carry once [`crate::validator::validate`] has
//! run; nothing here computes a type from scratch, it only verifies the
//! combinations the resolved types were used in are legal. An expression
//! whose `data_type` is still `None` already has a diagnostic on it from
//! validation and is skipped rather than re-reported here.

use ilc_ast::{BinaryOp, ExprKind, ExprNode, Module, ObjKind, ScopeId, StmtKind, StmtNode, Type, UnaryOp};
use ilc_diagnostics::{DiagnosticEngine, StringTable};

pub fn check<'ast>(module: &Module<'ast>, strings: &StringTable, diagnostics: &mut DiagnosticEngine) {
    let mut checker = TypeChecker {
        types: &module.types,
        scopes: &module.scopes,
        strings,
        diagnostics,
        current_return_type: module.types.void,
    };
    checker.check_entry_point();
    checker.check_fns_in_scope(module.scopes.root());
}

struct TypeChecker<'a, 'ast> {
    types: &'a ilc_ast::TypeRegistry<'ast>,
    scopes: &'a ilc_ast::ScopeTree<'ast>,
    strings: &'a StringTable,
    diagnostics: &'a mut DiagnosticEngine,
    current_return_type: Type,
}

impl<'a, 'ast> TypeChecker<'a, 'ast> {
    fn check_entry_point(&mut self) {
        let has_main = self
            .scopes
            .scope(self.scopes.root())
            .fns()
            .any(|f| self.strings.resolve(f.name.value) == "main");
        if !has_main {
            self.diagnostics.error_no_location("no `main` function found");
        }
    }

    fn check_fns_in_scope(&mut self, scope: ScopeId) {
        let objects = self.scopes.scope(scope).objects().to_vec();
        for obj in objects {
            if let ObjKind::Fn { return_type, body, .. } = &obj.kind {
                self.current_return_type = return_type.get().unwrap_or(self.types.void);
                self.check_stmt(body);
                log::debug!("type-checked function `{}`", self.strings.resolve(obj.name.value));
            }
        }
        let children = self.scopes.scope(scope).children.clone();
        for child in children {
            self.check_fns_in_scope(child);
        }
    }

    fn check_stmt(&mut self, stmt: &'ast StmtNode<'ast>) {
        match &stmt.kind {
            StmtKind::VarDecl { variable, initializer } => {
                if let Some(init) = initializer {
                    self.check_expr(init);
                    if let (Some(var_ty), Some(init_ty)) = (variable.data_type.get(), init.data_type.get()) {
                        if !self.types.types_equal(var_ty, init_ty) {
                            self.diagnostics.error(
                                init.location,
                                format!(
                                    "cannot initialize `{}` with a value of a different type",
                                    self.strings.resolve(variable.name.value)
                                ),
                            );
                        }
                    }
                }
            }
            StmtKind::Block { nodes, .. } => {
                for n in nodes {
                    self.check_stmt(n);
                }
            }
            StmtKind::If { condition, then, else_ } => {
                self.check_condition(condition);
                self.check_stmt(then);
                if let Some(e) = else_ {
                    self.check_stmt(e);
                }
            }
            StmtKind::Expect { condition, then } => {
                self.check_condition(condition);
                if let Some(t) = then {
                    self.check_stmt(t);
                }
            }
            StmtKind::While {
                condition,
                increment,
                initializer,
                body,
            } => {
                if let Some(init) = initializer {
                    self.check_stmt(init);
                }
                self.check_condition(condition);
                if let Some(inc) = increment {
                    self.check_expr(inc);
                }
                self.check_stmt(body);
            }
            StmtKind::Return { expr } => self.check_return(stmt, *expr),
            StmtKind::ExprStmt { expr } => self.check_expr(expr),
            StmtKind::Defer { body } => self.check_stmt(body),
        }
    }

    fn check_condition(&mut self, condition: &'ast ExprNode<'ast>) {
        self.check_expr(condition);
        if let Some(ty) = condition.data_type.get() {
            if !self.types.is_bool(ty) {
                self.diagnostics.error(condition.location, "condition must be a `bool` expression");
            }
        }
    }

    fn check_return(&mut self, stmt: &'ast StmtNode<'ast>, expr: Option<&'ast ExprNode<'ast>>) {
        let returns_void = self.types.is_void(self.current_return_type);
        match (expr, returns_void) {
            (None, true) => {}
            (None, false) => self
                .diagnostics
                .error(stmt.location, "missing return value in a function that does not return `void`"),
            (Some(e), true) => {
                self.check_expr(e);
                self.diagnostics.error(e.location, "cannot return a value from a function returning `void`");
            }
            (Some(e), false) => {
                self.check_expr(e);
                if let Some(ty) = e.data_type.get() {
                    if !self.types.types_equal(ty, self.current_return_type) {
                        self.diagnostics
                            .error(e.location, "returned value does not match the function's return type");
                    }
                }
            }
        }
    }

    fn check_expr(&mut self, expr: &'ast ExprNode<'ast>) {
        match expr.kind() {
            ExprKind::NumberConstant(_)
            | ExprKind::StringConstant(_)
            | ExprKind::BooleanConstant(_)
            | ExprKind::Variable(_)
            | ExprKind::Function(_)
            | ExprKind::Identifier(_) => {}
            ExprKind::Unary { op, operand } => {
                self.check_expr(operand);
                self.check_unary(expr, op, operand);
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.check_expr(lhs);
                self.check_expr(rhs);
                self.check_binary(expr, op, lhs, rhs);
            }
            ExprKind::Assign { lhs, rhs } => {
                self.check_expr(lhs);
                self.check_expr(rhs);
                if !lhs.is_lvalue() {
                    self.diagnostics.error(lhs.location, "left-hand side of assignment is not a variable or field");
                }
                if let (Some(lty), Some(rty)) = (lhs.data_type.get(), rhs.data_type.get()) {
                    if !self.types.types_equal(lty, rty) {
                        self.diagnostics.error(expr.location, "assigned value does not match the target's type");
                    }
                }
            }
            ExprKind::PropertyAccess { lhs, .. } => self.check_expr(lhs),
            ExprKind::Call { callee, arguments } => {
                self.check_expr(callee);
                for arg in arguments {
                    self.check_expr(arg);
                }
                self.check_call(expr, callee, arguments);
            }
        }
    }

    fn check_unary(&mut self, expr: &'ast ExprNode<'ast>, op: UnaryOp, operand: &'ast ExprNode<'ast>) {
        let Some(ty) = operand.data_type.get() else { return };
        match op {
            UnaryOp::Negate if !self.types.is_signed_numeric(ty) => {
                self.diagnostics.error(operand.location, "unary `-` requires a signed numeric operand");
            }
            UnaryOp::Not if !self.types.is_bool(ty) => {
                self.diagnostics.error(operand.location, "unary `!` requires a `bool` operand");
            }
            UnaryOp::AddrOf if !operand.is_lvalue() => {
                self.diagnostics.error(operand.location, "cannot take the address of a non-variable expression");
            }
            UnaryOp::Deref if !self.types.is_pointer(ty) => {
                self.diagnostics.error(expr.location, "cannot dereference a non-pointer expression");
            }
            _ => {}
        }
    }

    fn check_binary(&mut self, expr: &'ast ExprNode<'ast>, op: BinaryOp, lhs: &'ast ExprNode<'ast>, rhs: &'ast ExprNode<'ast>) {
        let (Some(lty), Some(rty)) = (lhs.data_type.get(), rhs.data_type.get()) else {
            return;
        };
        match op {
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => {
                if !self.types.is_numeric(lty) || !self.types.is_numeric(rty) || !self.types.types_equal(lty, rty) {
                    self.diagnostics
                        .error(expr.location, "arithmetic operators require two operands of the same numeric type");
                }
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                if !self.types.is_numeric(lty) || !self.types.is_numeric(rty) || !self.types.types_equal(lty, rty) {
                    self.diagnostics
                        .error(expr.location, "comparison operators require two operands of the same numeric type");
                }
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                if !self.types.types_equal(lty, rty) {
                    self.diagnostics.error(expr.location, "`==`/`!=` require two operands of the same type");
                }
            }
        }
    }

    fn check_call(&mut self, expr: &'ast ExprNode<'ast>, callee: &'ast ExprNode<'ast>, arguments: &'ast [&'ast ExprNode<'ast>]) {
        let Some(callee_ty) = callee.data_type.get() else { return };
        let Some((_, parameter_types)) = self.types.as_function(callee_ty) else {
            self.diagnostics.error(callee.location, "called expression is not a function");
            return;
        };
        if arguments.len() != parameter_types.len() {
            self.diagnostics.error(
                expr.location,
                format!("expected {} argument(s), found {}", parameter_types.len(), arguments.len()),
            );
            return;
        }
        for (arg, expected) in arguments.iter().zip(parameter_types) {
            if let Some(arg_ty) = arg.data_type.get() {
                if !self.types.types_equal(arg_ty, *expected) {
                    self.diagnostics.error(arg.location, "argument does not match the parameter's type");
                }
            }
        }
    }
}
