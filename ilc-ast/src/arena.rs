use typed_arena::Arena;

use crate::expr::ExprNode;
use crate::obj::Obj;
use crate::stmt::StmtNode;

/// Per-module bump allocator for every AST node the module owns. Nodes never
/// move once allocated and are never freed individually; the whole arena (and
/// every node in it) drops together with the owning module.
pub struct AstArena<'ast> {
    exprs: Arena<ExprNode<'ast>>,
    stmts: Arena<StmtNode<'ast>>,
    objs: Arena<Obj<'ast>>,
    expr_refs: Arena<&'ast ExprNode<'ast>>,
}

impl<'ast> AstArena<'ast> {
    pub fn new() -> Self {
        AstArena {
            exprs: Arena::new(),
            stmts: Arena::new(),
            objs: Arena::new(),
            expr_refs: Arena::new(),
        }
    }

    pub fn alloc_expr(&'ast self, expr: ExprNode<'ast>) -> &'ast ExprNode<'ast> {
        self.exprs.alloc(expr)
    }

    pub fn alloc_stmt(&'ast self, stmt: StmtNode<'ast>) -> &'ast StmtNode<'ast> {
        self.stmts.alloc(stmt)
    }

    pub fn alloc_obj(&'ast self, obj: Obj<'ast>) -> &'ast Obj<'ast> {
        self.objs.alloc(obj)
    }

    /// Allocates a call's argument list as a contiguous, `Copy`-friendly
    /// slice, so it can live inside an `ExprKind::Call` stored behind a
    /// `Cell`.
    pub fn alloc_expr_slice(
        &'ast self,
        exprs: impl IntoIterator<Item = &'ast ExprNode<'ast>>,
    ) -> &'ast [&'ast ExprNode<'ast>] {
        self.expr_refs.alloc_extend(exprs)
    }
}

impl<'ast> Default for AstArena<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprKind;
    use ilc_diagnostics::Location;

    #[test]
    fn allocated_nodes_are_independently_addressable() {
        let arena = AstArena::new();
        let a = arena.alloc_expr(ExprNode::new(Location::EMPTY, ExprKind::NumberConstant(1)));
        let b = arena.alloc_expr(ExprNode::new(Location::EMPTY, ExprKind::NumberConstant(2)));
        assert!(!std::ptr::eq(a, b));
    }

    #[test]
    fn expr_slice_preserves_order() {
        let arena = AstArena::new();
        let a = arena.alloc_expr(ExprNode::new(Location::EMPTY, ExprKind::NumberConstant(1)));
        let b = arena.alloc_expr(ExprNode::new(Location::EMPTY, ExprKind::NumberConstant(2)));
        let slice = arena.alloc_expr_slice([a, b]);
        assert_eq!(slice.len(), 2);
        assert!(std::ptr::eq(slice[0], a));
        assert!(std::ptr::eq(slice[1], b));
    }
}
