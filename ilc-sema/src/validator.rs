//! Name and type resolution.
//!
//! Duplicate-definition checking at a single scope is already handled at
//! parse time, by [`ilc_ast::ScopeTree::insert`] and the diagnostic its
//! caller raises on a `false` return — this walk never repeats that check.
//! What is left for here: every declared type gets resolved (eliminating
//! `TypeKind::Identifier`
//! placeholders), every `Identifier` expression is rewritten in place into
//! `Variable`/`Function`, property accesses get a type by looking up their
//! name in the left side's struct scope, struct definitions are checked for
//! containment cycles, and module-level globals are restricted to constant
//! initializers.

use ilc_ast::{
    BinaryOp, ExprKind, ExprNode, Module, Obj, ObjKind, ObjNamespace, ScopeId, StmtKind, StmtNode,
    Type, TypeKind,
};
use ilc_diagnostics::{did_you_mean, AstString, DiagnosticEngine, StringTable};

pub fn validate<'ast>(module: &mut Module<'ast>, strings: &StringTable, diagnostics: &mut DiagnosticEngine) {
    let globals = module.globals.clone();
    let mut v = Validator {
        types: &mut module.types,
        scopes: &module.scopes,
        strings,
        diagnostics,
    };
    let root = v.scopes.root();
    v.resolve_types_in_scope(root);
    v.resolve_bodies_in_scope(root);
    v.check_struct_cycles();
    for global in globals {
        v.check_global(global);
    }
}

struct Validator<'a, 'ast> {
    types: &'a mut ilc_ast::TypeRegistry<'ast>,
    scopes: &'a ilc_ast::ScopeTree<'ast>,
    strings: &'a StringTable,
    diagnostics: &'a mut DiagnosticEngine,
}

impl<'a, 'ast> Validator<'a, 'ast> {
    /// Resolves every object's declared type across the whole scope tree,
    /// depth-first. Done as its own pass, separate from body-walking, so
    /// that a variable referencing a struct declared later in the same
    /// module scope still resolves correctly.
    fn resolve_types_in_scope(&mut self, scope: ScopeId) {
        let objects = self.scopes.scope(scope).objects().to_vec();
        for obj in objects {
            self.resolve_obj_type(obj, scope);
        }
        let children = self.scopes.scope(scope).children.clone();
        for child in children {
            self.resolve_types_in_scope(child);
        }
    }

    fn resolve_obj_type(&mut self, obj: &'ast Obj<'ast>, scope: ScopeId) {
        match &obj.kind {
            ObjKind::Var => {
                if let Some(ty) = obj.data_type.get() {
                    let resolved = self.resolve_type(ty, scope);
                    obj.data_type.set(Some(resolved));
                }
                // A `var` with neither a declared type nor an initializer is
                // left `None` here; `check_stmt`'s `VarDecl` arm below fills
                // it in from the initializer, or reports the inference
                // failure if there is none.
            }
            ObjKind::Fn {
                parameters,
                return_type,
                ..
            }
            | ObjKind::ExternFn {
                parameters,
                return_type,
                ..
            } => {
                for param in parameters.clone() {
                    self.resolve_obj_type(param, scope);
                }
                let resolved_ret = return_type.get().unwrap_or(self.types.void);
                let resolved_ret = self.resolve_type(resolved_ret, scope);
                return_type.set(Some(resolved_ret));

                // Every call site looks up a callee's type as a `Function`
                // handle, the same way it looks up a variable's declared
                // type — so the function itself needs one too, not just its
                // return type.
                let parameter_types = parameters
                    .iter()
                    .map(|p| p.data_type.get().unwrap_or(self.types.void))
                    .collect();
                let fn_type = self.types.intern(TypeKind::Function {
                    return_type: resolved_ret,
                    parameter_types,
                });
                obj.data_type.set(Some(fn_type));
            }
            ObjKind::Struct { .. } => {
                // Its own `data_type` is already `TypeKind::Struct` as set at
                // parse time; field/method types are resolved when recursion
                // reaches the struct's own scope.
            }
        }
    }

    /// Builds an "unknown `kind` `name`" message, appending a "did you mean"
    /// suggestion when some name visible from `scope` is a close typo match.
    fn unknown_name_message(&self, kind: &str, name: AstString, scope: ScopeId, ns: Option<ObjNamespace>) -> String {
        let spelled = self.strings.resolve(name.value);
        let candidates = self.scopes.visible_names(scope, ns);
        let candidates = candidates.iter().map(|n| self.strings.resolve(*n));
        match did_you_mean(spelled, candidates) {
            Some(suggestion) => format!("unknown {kind} `{spelled}`, did you mean `{suggestion}`?"),
            None => format!("unknown {kind} `{spelled}`"),
        }
    }

    /// Eliminates `TypeKind::Identifier` placeholders, recursing through
    /// `Pointer`. Primitives, already-resolved `Struct`s and `Function`s
    /// pass through unchanged.
    fn resolve_type(&mut self, ty: Type, scope: ScopeId) -> Type {
        let kind = self.types.kind(ty).clone();
        match kind {
            TypeKind::Identifier(name) => match self.scopes.lookup(scope, name.value, Some(ObjNamespace::Struct)) {
                Some(obj) => self.types.intern(TypeKind::Struct { obj }),
                None => {
                    let message = self.unknown_name_message("type", name, scope, Some(ObjNamespace::Struct));
                    self.diagnostics.error(name.location, message);
                    ty
                }
            },
            TypeKind::Pointer(inner) => {
                let resolved = self.resolve_type(inner, scope);
                self.types.intern(TypeKind::Pointer(resolved))
            }
            _ => ty,
        }
    }

    /// For every function found anywhere in the scope tree, resolves the
    /// identifiers and property accesses in its body.
    fn resolve_bodies_in_scope(&mut self, scope: ScopeId) {
        let objects = self.scopes.scope(scope).objects().to_vec();
        for obj in objects {
            if let ObjKind::Fn { body, .. } = &obj.kind {
                self.resolve_stmt(body, scope);
                log::debug!("resolved function `{}`", self.strings.resolve(obj.name.value));
            }
        }
        let children = self.scopes.scope(scope).children.clone();
        for child in children {
            self.resolve_bodies_in_scope(child);
        }
    }

    fn resolve_stmt(&mut self, stmt: &'ast StmtNode<'ast>, scope: ScopeId) {
        match &stmt.kind {
            StmtKind::VarDecl { variable, initializer } => {
                if let Some(init) = initializer {
                    self.resolve_expr(init, scope);
                    if variable.data_type.get().is_none() {
                        variable.data_type.set(init.data_type.get());
                    }
                }
                if variable.data_type.get().is_none() {
                    self.diagnostics.error(
                        variable.location,
                        format!(
                            "cannot infer the type of `{}`: give it a type annotation or an initializer",
                            self.strings.resolve(variable.name.value)
                        ),
                    );
                }
            }
            StmtKind::Block { scope: block_scope, nodes, .. } => {
                for n in nodes {
                    self.resolve_stmt(n, *block_scope);
                }
            }
            StmtKind::If { condition, then, else_ } => {
                self.resolve_expr(condition, scope);
                self.resolve_stmt(then, scope);
                if let Some(e) = else_ {
                    self.resolve_stmt(e, scope);
                }
            }
            StmtKind::Expect { condition, then } => {
                self.resolve_expr(condition, scope);
                if let Some(t) = then {
                    self.resolve_stmt(t, scope);
                }
            }
            StmtKind::While {
                condition,
                increment,
                initializer,
                body,
            } => {
                if let Some(init) = initializer {
                    self.resolve_stmt(init, scope);
                }
                self.resolve_expr(condition, scope);
                if let Some(inc) = increment {
                    self.resolve_expr(inc, scope);
                }
                self.resolve_stmt(body, scope);
            }
            StmtKind::Return { expr } => {
                if let Some(e) = expr {
                    self.resolve_expr(e, scope);
                }
            }
            StmtKind::ExprStmt { expr } => self.resolve_expr(expr, scope),
            StmtKind::Defer { body } => self.resolve_stmt(body, scope),
        }
    }

    fn resolve_expr(&mut self, expr: &'ast ExprNode<'ast>, scope: ScopeId) {
        match expr.kind() {
            ExprKind::NumberConstant(_) => expr.data_type.set(Some(self.types.i32_)),
            ExprKind::StringConstant(_) => expr.data_type.set(Some(self.types.str_)),
            ExprKind::BooleanConstant(_) => expr.data_type.set(Some(self.types.bool_)),
            ExprKind::Variable(obj) | ExprKind::Function(obj) => expr.data_type.set(obj.data_type.get()),
            ExprKind::Identifier(name) => self.resolve_identifier(expr, name, scope),
            ExprKind::Unary { op, operand } => {
                self.resolve_expr(operand, scope);
                self.resolve_unary(expr, op, operand);
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.resolve_expr(lhs, scope);
                self.resolve_expr(rhs, scope);
                self.resolve_binary(expr, op, lhs, rhs);
            }
            ExprKind::Assign { lhs, rhs } => {
                self.resolve_expr(lhs, scope);
                self.resolve_expr(rhs, scope);
                expr.data_type.set(lhs.data_type.get());
            }
            ExprKind::PropertyAccess { lhs, name } => {
                self.resolve_expr(lhs, scope);
                self.resolve_property_access(expr, lhs, name);
            }
            ExprKind::Call { callee, arguments } => {
                self.resolve_expr(callee, scope);
                for arg in arguments {
                    self.resolve_expr(arg, scope);
                }
                let return_type = callee.data_type.get().and_then(|ty| self.types.as_function(ty)).map(|(ret, _)| ret);
                expr.data_type.set(return_type);
            }
        }
    }

    fn resolve_identifier(&mut self, expr: &'ast ExprNode<'ast>, name: AstString, scope: ScopeId) {
        match self.scopes.lookup(scope, name.value, None) {
            Some(obj) if matches!(obj.kind, ObjKind::Var) => {
                expr.resolve_identifier(ExprKind::Variable(obj));
                expr.data_type.set(obj.data_type.get());
            }
            Some(obj) => {
                expr.resolve_identifier(ExprKind::Function(obj));
                expr.data_type.set(obj.data_type.get());
            }
            None => {
                let message = self.unknown_name_message("identifier", name, scope, None);
                self.diagnostics.error(name.location, message);
            }
        }
    }

    fn resolve_unary(&mut self, expr: &'ast ExprNode<'ast>, op: ilc_ast::UnaryOp, operand: &'ast ExprNode<'ast>) {
        use ilc_ast::UnaryOp::*;
        let Some(operand_ty) = operand.data_type.get() else {
            return;
        };
        let result = match op {
            Negate => operand_ty,
            Not => self.types.bool_,
            AddrOf => self.types.intern(TypeKind::Pointer(operand_ty)),
            Deref => match self.types.kind(operand_ty) {
                TypeKind::Pointer(inner) => *inner,
                _ => return,
            },
        };
        expr.data_type.set(Some(result));
    }

    fn resolve_binary(
        &mut self,
        expr: &'ast ExprNode<'ast>,
        op: BinaryOp,
        lhs: &'ast ExprNode<'ast>,
        rhs: &'ast ExprNode<'ast>,
    ) {
        use BinaryOp::*;
        match op {
            Eq | Ne | Lt | Le | Gt | Ge => expr.data_type.set(Some(self.types.bool_)),
            Add | Subtract | Multiply | Divide => expr.data_type.set(lhs.data_type.get().or(rhs.data_type.get())),
        }
    }

    fn resolve_property_access(&mut self, expr: &'ast ExprNode<'ast>, lhs: &'ast ExprNode<'ast>, name: AstString) {
        let Some(lhs_ty) = lhs.data_type.get() else {
            return;
        };
        let Some(struct_obj) = self.types.as_struct(lhs_ty) else {
            self.diagnostics.error(name.location, "left side of `.` is not a struct");
            return;
        };
        let Some(struct_scope) = struct_obj.as_struct_scope() else {
            return;
        };
        let field = self.scopes.scope(struct_scope).find_local(name.value, ObjNamespace::Var);
        let method = self.scopes.scope(struct_scope).find_local(name.value, ObjNamespace::Fn);
        match field.or(method) {
            Some(member) => expr.data_type.set(member.data_type.get()),
            None => self.diagnostics.error(
                name.location,
                format!("no field or method named `{}`", self.strings.resolve(name.value)),
            ),
        }
    }

    fn check_struct_cycles(&mut self) {
        let mut all = Vec::new();
        self.collect_structs(self.scopes.root(), &mut all);
        for s in all {
            let mut path = Vec::new();
            self.walk_struct_for_cycle(s, &mut path);
        }
    }

    fn collect_structs(&self, scope: ScopeId, out: &mut Vec<&'ast Obj<'ast>>) {
        out.extend(self.scopes.scope(scope).structs());
        for child in self.scopes.scope(scope).children.clone() {
            self.collect_structs(child, out);
        }
    }

    fn walk_struct_for_cycle(&mut self, s: &'ast Obj<'ast>, path: &mut Vec<*const Obj<'ast>>) {
        let ptr = s as *const Obj<'ast>;
        path.push(ptr);
        let Some(scope) = s.as_struct_scope() else {
            path.pop();
            return;
        };
        let fields = self.scopes.scope(scope).vars().collect::<Vec<_>>();
        for field in fields {
            let Some(ty) = field.data_type.get() else { continue };
            if self.types.is_pointer(ty) {
                continue;
            }
            let Some(field_struct) = self.types.as_struct(ty) else {
                continue;
            };
            let field_ptr = field_struct as *const Obj<'ast>;
            if path.contains(&field_ptr) {
                self.diagnostics.error(
                    field.location,
                    format!(
                        "struct `{}` recursively contains itself through field `{}`",
                        self.strings.resolve(s.name.value),
                        self.strings.resolve(field.name.value)
                    ),
                );
                continue;
            }
            self.walk_struct_for_cycle(field_struct, path);
        }
        path.pop();
    }

    fn check_global(&mut self, global: &'ast StmtNode<'ast>) {
        if let StmtKind::VarDecl { initializer: Some(init), .. } = &global.kind {
            if !is_constant_expr(init) {
                self.diagnostics
                    .error(init.location, "a module-level variable's initializer must be a constant expression");
            }
        }
    }
}

fn is_constant_expr(expr: &ExprNode) -> bool {
    match expr.kind() {
        ExprKind::NumberConstant(_) | ExprKind::StringConstant(_) | ExprKind::BooleanConstant(_) => true,
        ExprKind::Unary { operand, .. } => is_constant_expr(operand),
        ExprKind::Binary { lhs, rhs, .. } => is_constant_expr(lhs) && is_constant_expr(rhs),
        _ => false,
    }
}
