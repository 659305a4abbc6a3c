//! The back-end interface a checked [`Program`] is handed off to, plus a
//! textual-dump implementation of it.
//!
//! Nothing here mutates the checked program; [`drive`] only reads it,
//! handing each piece to a [`Backend`] in a fixed order so every
//! implementation sees structs before the functions that use them and a
//! function's forward declaration before its body, the same ordering
//! constraint a single LLVM-emitting pass would also have to honor. No such
//! back-end is implemented here — [`dump::TextDump`] is the only consumer of
//! the trait, used for golden-file testing rather than machine code.

mod dump;

pub use dump::{dump_program, TextDump};

use std::collections::HashSet;

use ilc_ast::{Module, Obj, ObjKind, Program, ScopeId, TypeRegistry};
use ilc_diagnostics::StringTable;

/// Callbacks a code generator implements to consume a checked program.
/// [`drive`] is the only caller; implementations should not need to walk the
/// scope tree themselves. `types`/`strings` are threaded through every call
/// that needs them rather than captured once, so an implementation never has
/// to reconcile its own lifetime with a borrow from a single `start_module`
/// call that must then outlive the rest of that module's callbacks.
pub trait Backend {
    fn start_program(&mut self, program: &Program, strings: &StringTable);
    fn start_module(&mut self, module: &Module, strings: &StringTable);
    /// `fields` are the struct's own non-method members, in declaration order.
    fn struct_decl(&mut self, obj: &Obj, fields: &[&Obj], types: &TypeRegistry, strings: &StringTable);
    fn var_decl(&mut self, obj: &Obj, types: &TypeRegistry, strings: &StringTable);
    fn extern_fn_decl(&mut self, obj: &Obj, types: &TypeRegistry, strings: &StringTable);
    fn fn_forward_decl(&mut self, obj: &Obj, types: &TypeRegistry, strings: &StringTable);
    fn fn_body(&mut self, obj: &Obj, types: &TypeRegistry, strings: &StringTable);
    fn finish_module(&mut self, module: &Module, strings: &StringTable);
    fn finish_program(&mut self, program: &Program, strings: &StringTable);
}

/// Walks `program` and drives `backend` through it in the order a back-end
/// is guaranteed to see: per module, structs (topologically sorted so a
/// struct precedes any struct that contains it by value, with their
/// fields), then module-level variables, then every function's forward
/// declaration, then every function's body.
pub fn drive<B: Backend>(backend: &mut B, program: &Program) {
    let strings = &program.strings;
    backend.start_program(program, strings);
    for module in &program.modules {
        backend.start_module(module, strings);

        let structs = topo_sorted_structs(module);
        for s in &structs {
            let fields = struct_fields(module, s);
            backend.struct_decl(s, &fields, &module.types, strings);
        }

        let root = module.scopes.root();
        for obj in module.scopes.scope(root).objects() {
            if matches!(obj.kind, ObjKind::Var) {
                backend.var_decl(obj, &module.types, strings);
            }
        }

        let mut fns = Vec::new();
        collect_fns_in_order(module, root, &mut fns);
        for f in &fns {
            match &f.kind {
                ObjKind::ExternFn { .. } => backend.extern_fn_decl(f, &module.types, strings),
                ObjKind::Fn { .. } => backend.fn_forward_decl(f, &module.types, strings),
                _ => {}
            }
        }
        for f in &fns {
            if matches!(f.kind, ObjKind::Fn { .. }) {
                backend.fn_body(f, &module.types, strings);
            }
        }

        backend.finish_module(module, strings);
    }
    backend.finish_program(program, strings);
}

/// Declaration-order traversal, not the hash-table iteration order `Scope`'s
/// `vars()`/`fns()`/`structs()` give: a back-end's output should not depend
/// on incidental `HashMap` bucket layout.
fn collect_fns_in_order<'ast>(module: &Module<'ast>, scope: ScopeId, out: &mut Vec<&'ast Obj<'ast>>) {
    for obj in module.scopes.scope(scope).objects() {
        if matches!(obj.kind, ObjKind::Fn { .. } | ObjKind::ExternFn { .. }) {
            out.push(obj);
        }
    }
    for child in module.scopes.scope(scope).children.clone() {
        collect_fns_in_order(module, child, out);
    }
}

fn collect_structs_in_order<'ast>(module: &Module<'ast>, scope: ScopeId, out: &mut Vec<&'ast Obj<'ast>>) {
    for obj in module.scopes.scope(scope).objects() {
        if matches!(obj.kind, ObjKind::Struct { .. }) {
            out.push(obj);
        }
    }
    for child in module.scopes.scope(scope).children.clone() {
        collect_structs_in_order(module, child, out);
    }
}

fn struct_fields<'ast>(module: &Module<'ast>, s: &Obj<'ast>) -> Vec<&'ast Obj<'ast>> {
    let Some(scope) = s.as_struct_scope() else {
        return Vec::new();
    };
    module
        .scopes
        .scope(scope)
        .objects()
        .iter()
        .copied()
        .filter(|o| matches!(o.kind, ObjKind::Var))
        .collect()
}

/// Postorder DFS over each struct's non-pointer field types, the same
/// dependency walk `ilc_sema`'s struct-cycle check performs — here assumed
/// acyclic (a cyclic struct never survives validation) and used to order
/// declarations instead of to reject them.
fn topo_sorted_structs<'ast>(module: &Module<'ast>) -> Vec<&'ast Obj<'ast>> {
    let mut declared_order = Vec::new();
    collect_structs_in_order(module, module.scopes.root(), &mut declared_order);

    let mut sorted = Vec::new();
    let mut emitted = HashSet::new();
    for s in declared_order {
        emit_struct_postorder(module, s, &mut sorted, &mut emitted);
    }
    sorted
}

fn emit_struct_postorder<'ast>(
    module: &Module<'ast>,
    s: &'ast Obj<'ast>,
    out: &mut Vec<&'ast Obj<'ast>>,
    emitted: &mut HashSet<*const Obj<'ast>>,
) {
    let ptr = s as *const Obj<'ast>;
    if !emitted.insert(ptr) {
        return;
    }
    if let Some(scope) = s.as_struct_scope() {
        for field in module.scopes.scope(scope).objects() {
            if !matches!(field.kind, ObjKind::Var) {
                continue;
            }
            let Some(ty) = field.data_type.get() else { continue };
            if module.types.is_pointer(ty) {
                continue;
            }
            if let Some(field_struct) = module.types.as_struct(ty) {
                emit_struct_postorder(module, field_struct, out, emitted);
            }
        }
    }
    out.push(s);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_ast::{ModuleId, ScopeKind, TypeKind};
    use ilc_diagnostics::{AstString, FileId, Location, StringTable};

    fn name(strings: &mut StringTable, s: &str) -> AstString {
        AstString::new(Location::EMPTY, strings.intern(s))
    }

    #[test]
    fn structs_are_ordered_contained_before_container() {
        let mut strings = StringTable::new();
        let mut module = Module::new(ModuleId::new(0), name(&mut strings, "root"));
        let root = module.scopes.root();

        let inner_scope = module.scopes.push_scope(root, ScopeKind::Struct);
        let inner = Obj::new_struct(name(&mut strings, "Inner"), Location::EMPTY, inner_scope);
        let inner_ref: &Obj = Box::leak(Box::new(inner));
        module.scopes.insert(root, inner_ref);
        let inner_ty = module.types.intern(TypeKind::Struct { obj: inner_ref });

        let outer_scope = module.scopes.push_scope(root, ScopeKind::Struct);
        let outer = Obj::new_struct(name(&mut strings, "Outer"), Location::EMPTY, outer_scope);
        let outer_ref: &Obj = Box::leak(Box::new(outer));
        module.scopes.insert(root, outer_ref);

        let field = Obj::new_var(name(&mut strings, "inner"), Location::EMPTY);
        field.data_type.set(Some(inner_ty));
        let field_ref: &Obj = Box::leak(Box::new(field));
        module.scopes.insert(outer_scope, field_ref);

        let sorted = topo_sorted_structs(&module);
        let inner_pos = sorted.iter().position(|s| std::ptr::eq(*s, inner_ref)).unwrap();
        let outer_pos = sorted.iter().position(|s| std::ptr::eq(*s, outer_ref)).unwrap();
        assert!(inner_pos < outer_pos);
    }
}
