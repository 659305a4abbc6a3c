use std::cell::Cell;

use ilc_diagnostics::{AstString, Location};

use crate::obj::Obj;
use crate::ty::Type;

/// The non-lvalue binary operators. `Assign` and `PropertyAccess` get their
/// own [`ExprKind`] variants since each carries validation rules the plain
/// arithmetic/comparison operators do not (lvalue checking, field
/// resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
    AddrOf,
    Deref,
}

/// The shape of an expression node. Every field is `Copy`, which lets
/// [`ExprNode::kind`] live behind a `Cell` so the validator can rewrite an
/// `Identifier` in place into a resolved `Variable`/`Function` without
/// reallocating the node.
#[derive(Clone, Copy)]
pub enum ExprKind<'ast> {
    NumberConstant(u64),
    StringConstant(AstString),
    BooleanConstant(bool),
    /// Post-validation reference to the variable this name resolved to.
    Variable(&'ast Obj<'ast>),
    /// Post-validation reference to the function this name (or the callee of
    /// a call) resolved to.
    Function(&'ast Obj<'ast>),
    /// Parser output only. Must be absent from a successfully validated AST.
    Identifier(AstString),
    Unary {
        op: UnaryOp,
        operand: &'ast ExprNode<'ast>,
    },
    Binary {
        op: BinaryOp,
        lhs: &'ast ExprNode<'ast>,
        rhs: &'ast ExprNode<'ast>,
    },
    Assign {
        lhs: &'ast ExprNode<'ast>,
        rhs: &'ast ExprNode<'ast>,
    },
    /// `lhs.name`. `name` is resolved by the validator to the field/method on
    /// `lhs`'s struct type; until then it is a bare identifier string.
    PropertyAccess {
        lhs: &'ast ExprNode<'ast>,
        name: AstString,
    },
    Call {
        callee: &'ast ExprNode<'ast>,
        arguments: &'ast [&'ast ExprNode<'ast>],
    },
}

/// An expression, tagged with its source location and (once the validator
/// and type checker have run) its resolved type.
pub struct ExprNode<'ast> {
    pub location: Location,
    pub data_type: Cell<Option<Type>>,
    pub kind: Cell<ExprKind<'ast>>,
}

impl<'ast> ExprNode<'ast> {
    pub fn new(location: Location, kind: ExprKind<'ast>) -> Self {
        ExprNode {
            location,
            data_type: Cell::new(None),
            kind: Cell::new(kind),
        }
    }

    pub fn kind(&self) -> ExprKind<'ast> {
        self.kind.get()
    }

    /// Replaces an unresolved `Identifier` with its resolved object
    /// reference. Called exactly once per identifier, by the validator.
    pub fn resolve_identifier(&self, kind: ExprKind<'ast>) {
        debug_assert!(matches!(self.kind.get(), ExprKind::Identifier(_)));
        self.kind.set(kind);
    }

    pub fn is_lvalue(&self) -> bool {
        matches!(
            self.kind.get(),
            ExprKind::Variable(_) | ExprKind::PropertyAccess { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_diagnostics::{FileId, StringTable};

    #[test]
    fn resolving_an_identifier_rewrites_in_place() {
        let mut strings = StringTable::new();
        let loc = Location::new(FileId::EMPTY, 0, 1);
        let name = AstString::new(loc, strings.intern("x"));
        let expr = ExprNode::new(loc, ExprKind::Identifier(name));
        assert!(matches!(expr.kind(), ExprKind::Identifier(_)));

        let var_obj = Obj::new_var(name, loc);
        expr.resolve_identifier(ExprKind::Variable(&var_obj));
        assert!(matches!(expr.kind(), ExprKind::Variable(_)));
        assert!(expr.is_lvalue());
    }

    #[test]
    fn number_constant_is_not_an_lvalue() {
        let loc = Location::EMPTY;
        let expr = ExprNode::new(loc, ExprKind::NumberConstant(42));
        assert!(!expr.is_lvalue());
    }
}
