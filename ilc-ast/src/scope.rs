use std::collections::HashMap;

use ilc_diagnostics::InternedString;

use crate::module::ModuleId;
use crate::obj::{Obj, ObjNamespace};

/// Identifies a scope within its module. `EMPTY` is only used as a
/// placeholder before a real scope id is known (e.g. in tests); it is never
/// produced by [`ScopeTree::push_scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    module: ModuleId,
    index: u32,
}

impl ScopeId {
    pub const EMPTY: ScopeId = ScopeId {
        module: ModuleId::EMPTY,
        index: u32::MAX,
    };

    pub fn module(self) -> ModuleId {
        self.module
    }

    fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The module's own top-level namespace. Always scope index 0.
    Module,
    /// A struct's field/method namespace.
    Struct,
    /// A block: function body, nested block, loop body, if-branch.
    Block,
}

impl ScopeKind {
    /// Which namespaces a scope of this kind may hold declarations in.
    /// Module scopes allow all three; struct scopes allow fields (vars) and
    /// methods (fns) but not nested structs; block scopes allow only
    /// variables.
    pub fn permits(self, ns: ObjNamespace) -> bool {
        match self {
            ScopeKind::Module => true,
            ScopeKind::Struct => matches!(ns, ObjNamespace::Var | ObjNamespace::Fn),
            ScopeKind::Block => matches!(ns, ObjNamespace::Var),
        }
    }
}

/// A lexical container for objects. Lookup tables only cross-reference
/// `objects`; every object appears in exactly one scope's `objects` sequence.
pub struct Scope<'ast> {
    pub kind: ScopeKind,
    pub depth: u32,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    objects: Vec<&'ast Obj<'ast>>,
    vars: HashMap<InternedString, &'ast Obj<'ast>>,
    fns: HashMap<InternedString, &'ast Obj<'ast>>,
    structs: HashMap<InternedString, &'ast Obj<'ast>>,
}

impl<'ast> Scope<'ast> {
    fn new(kind: ScopeKind, depth: u32, parent: Option<ScopeId>) -> Self {
        Scope {
            kind,
            depth,
            parent,
            children: Vec::new(),
            objects: Vec::new(),
            vars: HashMap::new(),
            fns: HashMap::new(),
            structs: HashMap::new(),
        }
    }

    pub fn objects(&self) -> &[&'ast Obj<'ast>] {
        &self.objects
    }

    fn table(&self, ns: ObjNamespace) -> &HashMap<InternedString, &'ast Obj<'ast>> {
        match ns {
            ObjNamespace::Var => &self.vars,
            ObjNamespace::Fn => &self.fns,
            ObjNamespace::Struct => &self.structs,
        }
    }

    fn table_mut(&mut self, ns: ObjNamespace) -> &mut HashMap<InternedString, &'ast Obj<'ast>> {
        match ns {
            ObjNamespace::Var => &mut self.vars,
            ObjNamespace::Fn => &mut self.fns,
            ObjNamespace::Struct => &mut self.structs,
        }
    }

    pub fn find_local(&self, name: InternedString, ns: ObjNamespace) -> Option<&'ast Obj<'ast>> {
        self.table(ns).get(&name).copied()
    }

    pub fn vars(&self) -> impl Iterator<Item = &'ast Obj<'ast>> + '_ {
        self.vars.values().copied()
    }

    pub fn fns(&self) -> impl Iterator<Item = &'ast Obj<'ast>> + '_ {
        self.fns.values().copied()
    }

    pub fn structs(&self) -> impl Iterator<Item = &'ast Obj<'ast>> + '_ {
        self.structs.values().copied()
    }
}

/// A module's tree of scopes, rooted at index 0 (the module scope).
pub struct ScopeTree<'ast> {
    module: ModuleId,
    scopes: Vec<Scope<'ast>>,
}

impl<'ast> ScopeTree<'ast> {
    pub fn new(module: ModuleId) -> Self {
        ScopeTree {
            module,
            scopes: vec![Scope::new(ScopeKind::Module, 0, None)],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId {
            module: self.module,
            index: 0,
        }
    }

    pub fn push_scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        debug_assert_eq!(parent.module, self.module);
        let depth = self.scopes[parent.index()].depth + 1;
        let id = ScopeId {
            module: self.module,
            index: self.scopes.len() as u32,
        };
        self.scopes.push(Scope::new(kind, depth, Some(parent)));
        self.scopes[parent.index()].children.push(id);
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope<'ast> {
        &self.scopes[id.index()]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope<'ast> {
        &mut self.scopes[id.index()]
    }

    /// Inserts `obj` into `scope`'s table for its namespace. Returns `false`
    /// without inserting if a same-namespace object of the same name already
    /// exists in that scope; the caller is responsible for reporting the
    /// duplicate-definition diagnostic.
    pub fn insert(&mut self, scope: ScopeId, obj: &'ast Obj<'ast>) -> bool {
        let ns = obj.namespace();
        let name = obj.name.value;
        let s = &mut self.scopes[scope.index()];
        if s.table(ns).contains_key(&name) {
            return false;
        }
        s.table_mut(ns).insert(name, obj);
        s.objects.push(obj);
        true
    }

    /// Walks from `scope` toward the root. With `ns` given, only that
    /// namespace is consulted; with `ns` absent, variables, then functions,
    /// then structs are tried at each scope in turn before moving to the
    /// parent.
    pub fn lookup(
        &self,
        scope: ScopeId,
        name: InternedString,
        ns: Option<ObjNamespace>,
    ) -> Option<&'ast Obj<'ast>> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            let found = match ns {
                Some(ns) => s.find_local(name, ns),
                None => s
                    .find_local(name, ObjNamespace::Var)
                    .or_else(|| s.find_local(name, ObjNamespace::Fn))
                    .or_else(|| s.find_local(name, ObjNamespace::Struct)),
            };
            if found.is_some() {
                return found;
            }
            current = s.parent;
        }
        None
    }

    /// Every name visible from `scope` toward the root, restricted to `ns`
    /// when given. Not on any lookup hot path — only used to build "did you
    /// mean" suggestions after a lookup has already failed.
    pub fn visible_names(&self, scope: ScopeId, ns: Option<ObjNamespace>) -> Vec<InternedString> {
        let mut names = Vec::new();
        let mut current = Some(scope);
        while let Some(id) = current {
            let s = self.scope(id);
            for obj in s.objects() {
                if ns.map_or(true, |ns| obj.namespace() == ns) {
                    names.push(obj.name.value);
                }
            }
            current = s.parent;
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_diagnostics::{AstString, FileId, Location, StringTable};

    #[test]
    fn module_scope_is_index_zero() {
        let tree = ScopeTree::new(ModuleId::new(0));
        let root = tree.root();
        assert_eq!(tree.scope(root).depth, 0);
        assert_eq!(tree.scope(root).kind, ScopeKind::Module);
    }

    #[test]
    fn duplicate_insert_in_same_namespace_is_rejected() {
        let mut strings = StringTable::new();
        let mut tree = ScopeTree::new(ModuleId::new(0));
        let root = tree.root();
        let loc = Location::new(FileId::EMPTY, 0, 1);
        let name = AstString::new(loc, strings.intern("foo"));
        let a = Obj::new_var(name, loc);
        let b = Obj::new_var(name, loc);
        assert!(tree.insert(root, &a));
        assert!(!tree.insert(root, &b));
    }

    #[test]
    fn lookup_walks_toward_the_root() {
        let mut strings = StringTable::new();
        let mut tree = ScopeTree::new(ModuleId::new(0));
        let root = tree.root();
        let loc = Location::new(FileId::EMPTY, 0, 1);
        let name = AstString::new(loc, strings.intern("outer"));
        let obj = Obj::new_var(name, loc);
        tree.insert(root, &obj);

        let block = tree.push_scope(root, ScopeKind::Block);
        let nested = tree.push_scope(block, ScopeKind::Block);
        let found = tree.lookup(nested, name.value, None);
        assert!(found.is_some());
        assert!(std::ptr::eq(found.unwrap(), &obj));
    }

    #[test]
    fn struct_scope_rejects_nested_struct_namespace() {
        assert!(ScopeKind::Struct.permits(ObjNamespace::Var));
        assert!(ScopeKind::Struct.permits(ObjNamespace::Fn));
        assert!(!ScopeKind::Struct.permits(ObjNamespace::Struct));
    }

    #[test]
    fn block_scope_permits_only_variables() {
        assert!(ScopeKind::Block.permits(ObjNamespace::Var));
        assert!(!ScopeKind::Block.permits(ObjNamespace::Fn));
        assert!(!ScopeKind::Block.permits(ObjNamespace::Struct));
    }
}
