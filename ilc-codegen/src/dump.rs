//! A textual back-end: renders a checked program as nested, indented text
//! for golden-file testing. Every node line carries its kind, its byte-range
//! location, and its operands — a `String` buffer plus an indent counter,
//! rather than a pretty-printing combinator library this front-end has no
//! other use for.

use ilc_ast::{
    BinaryOp, ExprKind, ExprNode, Module, Obj, ObjKind, Program, StmtKind, StmtNode, Type, TypeKind,
    TypeRegistry, UnaryOp,
};
use ilc_diagnostics::StringTable;

use crate::Backend;

/// Renders `program`'s checked AST with [`TextDump`] and returns the result.
pub fn dump_program(program: &Program) -> String {
    let mut dump = TextDump::new();
    crate::drive(&mut dump, program);
    dump.finish()
}

#[derive(Default)]
pub struct TextDump {
    out: String,
    indent: usize,
}

impl TextDump {
    pub fn new() -> Self {
        TextDump::default()
    }

    /// Consumes the dump, returning the rendered text.
    pub fn finish(self) -> String {
        self.out
    }

    fn write_line(&mut self, line: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(line.as_ref());
        self.out.push('\n');
    }

    fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.indent += 1;
        body(self);
        self.indent -= 1;
    }

    fn render_type(types: &TypeRegistry, ty: Type, strings: &StringTable) -> String {
        match types.kind(ty) {
            TypeKind::Void => "void".to_string(),
            TypeKind::I32 => "i32".to_string(),
            TypeKind::U32 => "u32".to_string(),
            TypeKind::Bool => "bool".to_string(),
            TypeKind::Str => "str".to_string(),
            TypeKind::Pointer(inner) => format!("~{}", Self::render_type(types, *inner, strings)),
            TypeKind::Function {
                return_type,
                parameter_types,
            } => {
                let params = parameter_types
                    .iter()
                    .map(|p| Self::render_type(types, *p, strings))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("fn({}) -> {}", params, Self::render_type(types, *return_type, strings))
            }
            TypeKind::Struct { obj } => strings.resolve(obj.name.value).to_string(),
            TypeKind::Identifier(name) => format!("<unresolved {}>", strings.resolve(name.value)),
        }
    }

    fn render_optional_type(types: &TypeRegistry, ty: Option<Type>, strings: &StringTable) -> String {
        match ty {
            Some(ty) => Self::render_type(types, ty, strings),
            None => "?".to_string(),
        }
    }

    fn render_params(types: &TypeRegistry, params: &[&Obj], strings: &StringTable) -> String {
        params
            .iter()
            .map(|p| {
                let ty = Self::render_optional_type(types, p.data_type.get(), strings);
                format!("{}: {}", strings.resolve(p.name.value), ty)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_expr(expr: &ExprNode, strings: &StringTable) -> String {
        match expr.kind() {
            ExprKind::NumberConstant(n) => format!("Number {}", n),
            ExprKind::StringConstant(s) => format!("String {:?}", strings.resolve(s.value)),
            ExprKind::BooleanConstant(b) => format!("Bool {}", b),
            ExprKind::Variable(obj) => format!("Var({})", strings.resolve(obj.name.value)),
            ExprKind::Function(obj) => format!("FnRef({})", strings.resolve(obj.name.value)),
            ExprKind::Identifier(name) => format!("Identifier({})", strings.resolve(name.value)),
            ExprKind::Unary { op, operand } => {
                format!("{}({})", unary_op_name(op), Self::render_expr(operand, strings))
            }
            ExprKind::Binary { op, lhs, rhs } => {
                format!(
                    "{}({}, {})",
                    binary_op_name(op),
                    Self::render_expr(lhs, strings),
                    Self::render_expr(rhs, strings)
                )
            }
            ExprKind::Assign { lhs, rhs } => {
                format!("Assign({}, {})", Self::render_expr(lhs, strings), Self::render_expr(rhs, strings))
            }
            ExprKind::PropertyAccess { lhs, name } => {
                format!("PropertyAccess({}, {})", Self::render_expr(lhs, strings), strings.resolve(name.value))
            }
            ExprKind::Call { callee, arguments } => {
                let args = arguments.iter().map(|a| Self::render_expr(a, strings)).collect::<Vec<_>>().join(", ");
                format!("Call({}, [{}])", Self::render_expr(callee, strings), args)
            }
        }
    }

    fn render_stmt(&mut self, stmt: &StmtNode, types: &TypeRegistry, strings: &StringTable) {
        match &stmt.kind {
            StmtKind::VarDecl { variable, initializer } => {
                let ty = Self::render_optional_type(types, variable.data_type.get(), strings);
                let init = initializer.map(|e| Self::render_expr(e, strings)).unwrap_or_default();
                self.write_line(format!(
                    "VarDecl {}: {} @{}..{} = {}",
                    strings.resolve(variable.name.value),
                    ty,
                    stmt.location.start,
                    stmt.location.end,
                    init
                ));
            }
            StmtKind::Block { nodes, .. } => {
                self.write_line(format!("Block @{}..{}", stmt.location.start, stmt.location.end));
                self.indented(|s| {
                    for n in nodes {
                        s.render_stmt(n, types, strings);
                    }
                });
            }
            StmtKind::If { condition, then, else_ } => {
                self.write_line(format!(
                    "If {} @{}..{}",
                    Self::render_expr(condition, strings),
                    stmt.location.start,
                    stmt.location.end
                ));
                self.indented(|s| s.render_stmt(then, types, strings));
                if let Some(e) = else_ {
                    self.write_line("Else");
                    self.indented(|s| s.render_stmt(e, types, strings));
                }
            }
            StmtKind::Expect { condition, then } => {
                self.write_line(format!(
                    "Expect {} @{}..{}",
                    Self::render_expr(condition, strings),
                    stmt.location.start,
                    stmt.location.end
                ));
                if let Some(t) = then {
                    self.indented(|s| s.render_stmt(t, types, strings));
                }
            }
            StmtKind::While {
                condition,
                increment,
                initializer,
                body,
            } => {
                self.write_line(format!(
                    "While {} @{}..{}",
                    Self::render_expr(condition, strings),
                    stmt.location.start,
                    stmt.location.end
                ));
                self.indented(|s| {
                    if let Some(init) = initializer {
                        s.write_line("Init");
                        s.indented(|s| s.render_stmt(init, types, strings));
                    }
                    if let Some(inc) = increment {
                        s.write_line(format!("Increment {}", Self::render_expr(inc, strings)));
                    }
                    s.render_stmt(body, types, strings);
                });
            }
            StmtKind::Return { expr } => {
                let rendered = expr.map(|e| Self::render_expr(e, strings)).unwrap_or_default();
                self.write_line(format!("Return @{}..{} {}", stmt.location.start, stmt.location.end, rendered));
            }
            StmtKind::ExprStmt { expr } => {
                self.write_line(format!(
                    "ExprStmt @{}..{} {}",
                    stmt.location.start,
                    stmt.location.end,
                    Self::render_expr(expr, strings)
                ));
            }
            StmtKind::Defer { body } => {
                self.write_line(format!("Defer @{}..{}", stmt.location.start, stmt.location.end));
                self.indented(|s| s.render_stmt(body, types, strings));
            }
        }
    }
}

fn unary_op_name(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Negate => "Negate",
        UnaryOp::Not => "Not",
        UnaryOp::AddrOf => "AddrOf",
        UnaryOp::Deref => "Deref",
    }
}

fn binary_op_name(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "Add",
        BinaryOp::Subtract => "Subtract",
        BinaryOp::Multiply => "Multiply",
        BinaryOp::Divide => "Divide",
        BinaryOp::Eq => "Eq",
        BinaryOp::Ne => "Ne",
        BinaryOp::Lt => "Lt",
        BinaryOp::Le => "Le",
        BinaryOp::Gt => "Gt",
        BinaryOp::Ge => "Ge",
    }
}

impl Backend for TextDump {
    fn start_program(&mut self, _program: &Program, _strings: &StringTable) {
        self.out.clear();
        self.indent = 0;
    }

    fn start_module(&mut self, module: &Module, strings: &StringTable) {
        self.write_line(format!("Module {}", strings.resolve(module.name.value)));
    }

    fn struct_decl(&mut self, obj: &Obj, fields: &[&Obj], types: &TypeRegistry, strings: &StringTable) {
        self.write_line(format!(
            "Struct {} @{}..{}",
            strings.resolve(obj.name.value),
            obj.location.start,
            obj.location.end
        ));
        self.indented(|s| {
            for field in fields {
                let ty = Self::render_optional_type(types, field.data_type.get(), strings);
                s.write_line(format!("Field {}: {}", strings.resolve(field.name.value), ty));
            }
        });
    }

    fn var_decl(&mut self, obj: &Obj, types: &TypeRegistry, strings: &StringTable) {
        let ty = Self::render_optional_type(types, obj.data_type.get(), strings);
        self.write_line(format!(
            "Global {}: {} @{}..{}",
            strings.resolve(obj.name.value),
            ty,
            obj.location.start,
            obj.location.end
        ));
    }

    fn extern_fn_decl(&mut self, obj: &Obj, types: &TypeRegistry, strings: &StringTable) {
        let ObjKind::ExternFn { parameters, return_type, .. } = &obj.kind else {
            return;
        };
        let ret = Self::render_optional_type(types, return_type.get(), strings);
        self.write_line(format!(
            "ExternFn {}({}) -> {} @{}..{}",
            strings.resolve(obj.name.value),
            Self::render_params(types, parameters, strings),
            ret,
            obj.location.start,
            obj.location.end
        ));
    }

    fn fn_forward_decl(&mut self, obj: &Obj, types: &TypeRegistry, strings: &StringTable) {
        let ObjKind::Fn { parameters, return_type, .. } = &obj.kind else {
            return;
        };
        let ret = Self::render_optional_type(types, return_type.get(), strings);
        self.write_line(format!(
            "Fn {}({}) -> {} @{}..{}",
            strings.resolve(obj.name.value),
            Self::render_params(types, parameters, strings),
            ret,
            obj.location.start,
            obj.location.end
        ));
    }

    fn fn_body(&mut self, obj: &Obj, types: &TypeRegistry, strings: &StringTable) {
        let ObjKind::Fn { body, .. } = &obj.kind else {
            return;
        };
        self.write_line(format!("FnBody {}", strings.resolve(obj.name.value)));
        self.indented(|s| {
            let defers = ilc_sema::lowered_defers(obj);
            if !defers.is_empty() {
                s.write_line("Defers");
                s.indented(|s| {
                    for d in &defers {
                        s.render_stmt(d, types, strings);
                    }
                });
            }
            s.render_stmt(body, types, strings);
        });
    }

    fn finish_module(&mut self, _module: &Module, _strings: &StringTable) {}

    fn finish_program(&mut self, _program: &Program, _strings: &StringTable) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_ast::{AstArena, ModuleId, ScopeKind};
    use ilc_diagnostics::{AstString, Location};

    fn name(strings: &mut StringTable, s: &str) -> AstString {
        AstString::new(Location::EMPTY, strings.intern(s))
    }

    #[test]
    fn arithmetic_return_dumps_as_nested_calls() {
        let mut program = Program::new();
        let mname = name(&mut program.strings, "root");
        let mut module = Module::new(ModuleId::new(0), mname);
        let arena = AstArena::new();
        let root = module.scopes.root();

        let one = arena.alloc_expr(ExprNode::new(Location::EMPTY, ExprKind::NumberConstant(1)));
        let two = arena.alloc_expr(ExprNode::new(Location::EMPTY, ExprKind::NumberConstant(2)));
        let three = arena.alloc_expr(ExprNode::new(Location::EMPTY, ExprKind::NumberConstant(3)));
        let mul = arena.alloc_expr(ExprNode::new(
            Location::EMPTY,
            ExprKind::Binary {
                op: BinaryOp::Multiply,
                lhs: two,
                rhs: three,
            },
        ));
        let add = arena.alloc_expr(ExprNode::new(
            Location::EMPTY,
            ExprKind::Binary {
                op: BinaryOp::Add,
                lhs: one,
                rhs: mul,
            },
        ));
        let ret = arena.alloc_stmt(StmtNode::new(Location::EMPTY, StmtKind::Return { expr: Some(add) }));
        let body = arena.alloc_stmt(StmtNode::new_block(Location::EMPTY, root, vec![ret]));

        let fname = name(&mut program.strings, "main");
        let f = Obj::new_fn(fname, Location::EMPTY, Vec::new(), body);
        f.data_type.set(Some(module.types.i32_));
        f.set_return_type(module.types.i32_);
        let f_ref: &Obj = Box::leak(Box::new(f));
        module.scopes.insert(root, f_ref);

        program.add_module(module);
        let dump = dump_program(&program);

        assert!(dump.contains("Add(Number 1, Multiply(Number 2, Number 3))"));
        assert!(dump.contains("Fn main() -> i32"));
    }

    #[test]
    fn struct_with_pointer_field_dumps_field_type() {
        let mut program = Program::new();
        let mname = name(&mut program.strings, "root");
        let mut module = Module::new(ModuleId::new(0), mname);
        let root = module.scopes.root();

        let struct_scope = module.scopes.push_scope(root, ScopeKind::Struct);
        let node_name = name(&mut program.strings, "Node");
        let node = Obj::new_struct(node_name, Location::EMPTY, struct_scope);
        let node_ref: &Obj = Box::leak(Box::new(node));
        module.scopes.insert(root, node_ref);
        let node_ty = module.types.intern(TypeKind::Struct { obj: node_ref });
        let ptr_ty = module.types.intern(TypeKind::Pointer(node_ty));

        let next_name = name(&mut program.strings, "next");
        let next = Obj::new_var(next_name, Location::EMPTY);
        next.data_type.set(Some(ptr_ty));
        let next_ref: &Obj = Box::leak(Box::new(next));
        module.scopes.insert(struct_scope, next_ref);

        program.add_module(module);
        let dump = dump_program(&program);
        assert!(dump.contains("Field next: ~Node"));
    }
}
