use ilc_diagnostics::StringTable;

use crate::module::{Module, ModuleId};

/// Aggregates modules and owns the string table they all share read-only.
/// Downstream code generation walks `modules` in order; single-root-module
/// programs mean `modules` holds exactly one entry in every program this
/// front-end accepts today.
pub struct Program<'ast> {
    pub strings: StringTable,
    pub modules: Vec<Module<'ast>>,
}

impl<'ast> Program<'ast> {
    pub fn new() -> Self {
        Program {
            strings: StringTable::new(),
            modules: Vec::new(),
        }
    }

    pub fn add_module(&mut self, module: Module<'ast>) -> ModuleId {
        let id = module.id;
        self.modules.push(module);
        id
    }

    pub fn module(&self, id: ModuleId) -> &Module<'ast> {
        &self.modules[id.index()]
    }

    pub fn module_mut(&mut self, id: ModuleId) -> &mut Module<'ast> {
        &mut self.modules[id.index()]
    }

    pub fn root(&self) -> &Module<'ast> {
        &self.modules[0]
    }

    pub fn root_mut(&mut self) -> &mut Module<'ast> {
        &mut self.modules[0]
    }
}

impl<'ast> Default for Program<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_diagnostics::{AstString, FileId, Location};

    #[test]
    fn add_module_assigns_sequential_ids() {
        let mut program = Program::new();
        let loc = Location::new(FileId::EMPTY, 0, 0);
        let name = AstString::new(loc, program.strings.intern("root"));
        let module = Module::new(ModuleId::new(0), name);
        let id = program.add_module(module);
        assert_eq!(id.index(), 0);
        assert!(std::ptr::eq(program.module(id), program.root()));
    }
}
