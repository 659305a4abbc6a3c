//! Defer lowering.
//!
//! A function's `defer` bodies are recorded by the parser in enqueue order
//! (see [`ilc_ast::Obj::push_defer`]). Running them in the opposite order at
//! every exit path — the fall-through end of the body, and every `return` —
//! is the only front-end-visible part of lowering a `defer`; the actual
//! exit-label/result-slot machinery that splices these bodies into the
//! control-flow graph at each exit point belongs to code generation, once a
//! back-end beyond the textual dump exists to drive it.

use ilc_ast::{Obj, StmtNode};

/// The bodies registered on `func` via `defer`, in the order they must run:
/// last-deferred, first-run.
pub fn lowered_defers<'ast>(func: &Obj<'ast>) -> Vec<&'ast StmtNode<'ast>> {
    let mut defers = func.defers();
    defers.reverse();
    defers
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_ast::ScopeId;
    use ilc_diagnostics::{AstString, FileId, Location, StringTable};

    #[test]
    fn lowering_reverses_enqueue_order() {
        let mut strings = StringTable::new();
        let loc = Location::new(FileId::EMPTY, 0, 0);
        let name = AstString::new(loc, strings.intern("f"));
        let body = StmtNode::new_block(loc, ScopeId::EMPTY, Vec::new());
        let body_ref: &StmtNode = Box::leak(Box::new(body));
        let func = Obj::new_fn(name, loc, Vec::new(), body_ref);

        let d1 = Box::leak(Box::new(StmtNode::new_block(loc, ScopeId::EMPTY, Vec::new())));
        let d2 = Box::leak(Box::new(StmtNode::new_block(loc, ScopeId::EMPTY, Vec::new())));
        func.push_defer(d1);
        func.push_defer(d2);

        let lowered = lowered_defers(&func);
        assert!(std::ptr::eq(lowered[0], d2 as &StmtNode));
        assert!(std::ptr::eq(lowered[1], d1 as &StmtNode));
    }

    #[test]
    fn a_function_with_no_defers_lowers_to_an_empty_list() {
        let mut strings = StringTable::new();
        let loc = Location::new(FileId::EMPTY, 0, 0);
        let name = AstString::new(loc, strings.intern("f"));
        let body = StmtNode::new_block(loc, ScopeId::EMPTY, Vec::new());
        let body_ref: &StmtNode = Box::leak(Box::new(body));
        let func = Obj::new_fn(name, loc, Vec::new(), body_ref);
        assert!(lowered_defers(&func).is_empty());
    }
}
