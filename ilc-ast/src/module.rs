use ilc_diagnostics::AstString;

use crate::arena::AstArena;
use crate::scope::ScopeTree;
use crate::stmt::StmtNode;
use crate::ty::TypeRegistry;

/// Dense index into [`crate::program::Program`]'s module vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(u32);

impl ModuleId {
    pub const EMPTY: ModuleId = ModuleId(u32::MAX);

    pub fn new(index: usize) -> Self {
        ModuleId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named container owning one arena, its scope tree, its interned types,
/// and its top-level variable declarations. Each global is kept as its own
/// `VarDecl` statement, not a bare `Obj`, so an initializer expression has
/// somewhere to live. Exactly one `Module` is ever populated by the parser
/// in practice, but the type stays general since nothing here assumes that.
pub struct Module<'ast> {
    pub id: ModuleId,
    pub name: AstString,
    pub arena: AstArena<'ast>,
    pub types: TypeRegistry<'ast>,
    pub scopes: ScopeTree<'ast>,
    pub globals: Vec<&'ast StmtNode<'ast>>,
}

impl<'ast> Module<'ast> {
    pub fn new(id: ModuleId, name: AstString) -> Self {
        Module {
            id,
            name,
            arena: AstArena::new(),
            types: TypeRegistry::with_primitives(),
            scopes: ScopeTree::new(id),
            globals: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_diagnostics::{FileId, Location, StringTable};

    #[test]
    fn new_module_starts_with_an_empty_global_module_scope() {
        let mut strings = StringTable::new();
        let loc = Location::new(FileId::EMPTY, 0, 0);
        let name = AstString::new(loc, strings.intern("root"));
        let module = Module::new(ModuleId::new(0), name);
        assert_eq!(module.scopes.scope(module.scopes.root()).depth, 0);
        assert!(module.globals.is_empty());
    }
}
