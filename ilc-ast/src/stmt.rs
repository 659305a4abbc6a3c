use std::cell::Cell;

use ilc_diagnostics::Location;

use crate::expr::ExprNode;
use crate::obj::Obj;
use crate::scope::ScopeId;

/// The four-valued lattice describing whether a block may, must, or must not
/// reach a `return`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlFlow {
    #[default]
    None,
    NeverReturns,
    MayReturn,
    AlwaysReturns,
}

impl ControlFlow {
    /// Commutative, associative join. `None` is the identity element; this
    /// is a deliberate deviation from the control-flow update this was
    /// modelled on, which treats `None` joined with anything as unreachable.
    pub fn join(self, other: ControlFlow) -> ControlFlow {
        use ControlFlow::*;
        match (self, other) {
            (None, x) | (x, None) => x,
            (a, b) if a == b => a,
            (MayReturn, _) | (_, MayReturn) => MayReturn,
            (NeverReturns, AlwaysReturns) | (AlwaysReturns, NeverReturns) => MayReturn,
        }
    }
}

pub enum StmtKind<'ast> {
    VarDecl {
        variable: &'ast Obj<'ast>,
        initializer: Option<&'ast ExprNode<'ast>>,
    },
    Block {
        scope: ScopeId,
        control_flow: Cell<ControlFlow>,
        nodes: Vec<&'ast StmtNode<'ast>>,
    },
    If {
        condition: &'ast ExprNode<'ast>,
        then: &'ast StmtNode<'ast>,
        else_: Option<&'ast StmtNode<'ast>>,
    },
    /// Runtime assertion. `then` is an optional block run before aborting.
    Expect {
        condition: &'ast ExprNode<'ast>,
        then: Option<&'ast StmtNode<'ast>>,
    },
    /// Shared shape for `while` and `for` (the parser lowers `for` into this
    /// plus an enclosing block holding the initializer).
    While {
        condition: &'ast ExprNode<'ast>,
        increment: Option<&'ast ExprNode<'ast>>,
        initializer: Option<&'ast StmtNode<'ast>>,
        body: &'ast StmtNode<'ast>,
    },
    Return {
        expr: Option<&'ast ExprNode<'ast>>,
    },
    ExprStmt {
        expr: &'ast ExprNode<'ast>,
    },
    /// `body` executes at the enclosing function's exit, in reverse order of
    /// encounter relative to sibling defers.
    Defer {
        body: &'ast StmtNode<'ast>,
    },
}

pub struct StmtNode<'ast> {
    pub location: Location,
    pub kind: StmtKind<'ast>,
}

impl<'ast> StmtNode<'ast> {
    pub fn new(location: Location, kind: StmtKind<'ast>) -> Self {
        StmtNode { location, kind }
    }

    pub fn new_block(location: Location, scope: ScopeId, nodes: Vec<&'ast StmtNode<'ast>>) -> Self {
        StmtNode {
            location,
            kind: StmtKind::Block {
                scope,
                control_flow: Cell::new(ControlFlow::None),
                nodes,
            },
        }
    }

    pub fn control_flow(&self) -> Option<ControlFlow> {
        match &self.kind {
            StmtKind::Block { control_flow, .. } => Some(control_flow.get()),
            _ => None,
        }
    }

    pub fn set_control_flow(&self, cf: ControlFlow) {
        if let StmtKind::Block { control_flow, .. } = &self.kind {
            control_flow.set(cf);
        }
    }

    pub fn block_scope(&self) -> Option<ScopeId> {
        match &self.kind {
            StmtKind::Block { scope, .. } => Some(*scope),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_identity_on_none() {
        use ControlFlow::*;
        assert_eq!(None.join(AlwaysReturns), AlwaysReturns);
        assert_eq!(MayReturn.join(None), MayReturn);
        assert_eq!(None.join(None), None);
    }

    #[test]
    fn join_escalates_never_and_always_to_may() {
        use ControlFlow::*;
        assert_eq!(NeverReturns.join(AlwaysReturns), MayReturn);
        assert_eq!(AlwaysReturns.join(NeverReturns), MayReturn);
    }

    #[test]
    fn join_is_commutative_and_idempotent() {
        use ControlFlow::*;
        let values = [None, NeverReturns, MayReturn, AlwaysReturns];
        for &a in &values {
            for &b in &values {
                assert_eq!(a.join(b), b.join(a));
            }
            assert_eq!(a.join(a), a);
        }
    }

    #[test]
    fn join_is_associative() {
        use ControlFlow::*;
        let values = [None, NeverReturns, MayReturn, AlwaysReturns];
        for &a in &values {
            for &b in &values {
                for &c in &values {
                    assert_eq!(a.join(b).join(c), a.join(b.join(c)));
                }
            }
        }
    }

    #[test]
    fn new_block_starts_with_no_control_flow_information() {
        let block = StmtNode::new_block(Location::EMPTY, ScopeId::EMPTY, Vec::new());
        assert_eq!(block.control_flow(), Some(ControlFlow::None));
    }
}
