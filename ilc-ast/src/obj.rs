use std::cell::{Cell, RefCell};

use ilc_diagnostics::{AstString, Location};

use crate::scope::ScopeId;
use crate::stmt::StmtNode;
use crate::ty::Type;

/// `#[source("name")]` on an `extern fn`, currently the only attribute the
/// language has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Source(AstString),
}

/// The three tables a scope indexes objects by. `Fn` and `ExternFn` share a
/// namespace: both are callable, and a struct method or a free function
/// collide the same way a duplicate variable would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjNamespace {
    Var,
    Fn,
    Struct,
}

/// Kind-specific payload for an [`Obj`]. The declared/declared-and-resolved
/// type itself lives on `Obj::data_type`, not here, since every kind has one.
pub enum ObjKind<'ast> {
    Var,
    Fn {
        parameters: Vec<&'ast Obj<'ast>>,
        return_type: Cell<Option<Type>>,
        body: &'ast StmtNode<'ast>,
        /// Populated as `defer` statements are encountered while parsing
        /// this function's body, in enqueue order. Lowering reverses it.
        defers: RefCell<Vec<&'ast StmtNode<'ast>>>,
    },
    Struct {
        scope: ScopeId,
    },
    ExternFn {
        parameters: Vec<&'ast Obj<'ast>>,
        return_type: Cell<Option<Type>>,
        source_attr: Attribute,
    },
}

/// The compile-time descriptor of a variable, parameter, function, struct or
/// extern function. Every object lives in exactly one module's arena and is
/// referenced elsewhere only through `&'ast Obj` or by name lookup through a
/// scope, never copied.
pub struct Obj<'ast> {
    pub name: AstString,
    pub location: Location,
    /// `None` until the validator resolves it; non-null is a universal
    /// invariant of the checked AST.
    pub data_type: Cell<Option<Type>>,
    pub kind: ObjKind<'ast>,
}

impl<'ast> Obj<'ast> {
    pub fn new_var(name: AstString, location: Location) -> Self {
        Obj {
            name,
            location,
            data_type: Cell::new(None),
            kind: ObjKind::Var,
        }
    }

    pub fn new_fn(
        name: AstString,
        location: Location,
        parameters: Vec<&'ast Obj<'ast>>,
        body: &'ast StmtNode<'ast>,
    ) -> Self {
        Obj {
            name,
            location,
            data_type: Cell::new(None),
            kind: ObjKind::Fn {
                parameters,
                return_type: Cell::new(None),
                body,
                defers: RefCell::new(Vec::new()),
            },
        }
    }

    pub fn new_struct(name: AstString, location: Location, scope: ScopeId) -> Self {
        Obj {
            name,
            location,
            data_type: Cell::new(None),
            kind: ObjKind::Struct { scope },
        }
    }

    pub fn new_extern_fn(
        name: AstString,
        location: Location,
        parameters: Vec<&'ast Obj<'ast>>,
        source_attr: Attribute,
    ) -> Self {
        Obj {
            name,
            location,
            data_type: Cell::new(None),
            kind: ObjKind::ExternFn {
                parameters,
                return_type: Cell::new(None),
                source_attr,
            },
        }
    }

    pub fn namespace(&self) -> ObjNamespace {
        match self.kind {
            ObjKind::Var => ObjNamespace::Var,
            ObjKind::Fn { .. } | ObjKind::ExternFn { .. } => ObjNamespace::Fn,
            ObjKind::Struct { .. } => ObjNamespace::Struct,
        }
    }

    pub fn as_struct_scope(&self) -> Option<ScopeId> {
        match self.kind {
            ObjKind::Struct { scope } => Some(scope),
            _ => None,
        }
    }

    pub fn parameters(&self) -> Option<&[&'ast Obj<'ast>]> {
        match &self.kind {
            ObjKind::Fn { parameters, .. } | ObjKind::ExternFn { parameters, .. } => {
                Some(parameters)
            }
            _ => None,
        }
    }

    pub fn return_type(&self) -> Option<Type> {
        match &self.kind {
            ObjKind::Fn { return_type, .. } | ObjKind::ExternFn { return_type, .. } => {
                return_type.get()
            }
            _ => None,
        }
    }

    pub fn set_return_type(&self, ty: Type) {
        match &self.kind {
            ObjKind::Fn { return_type, .. } | ObjKind::ExternFn { return_type, .. } => {
                return_type.set(Some(ty))
            }
            _ => {}
        }
    }

    /// Appends a just-encountered `defer` body to this function's defer
    /// list. No-op (should not be called) on anything but `Fn`.
    pub fn push_defer(&self, stmt: &'ast StmtNode<'ast>) {
        if let ObjKind::Fn { defers, .. } = &self.kind {
            defers.borrow_mut().push(stmt);
        }
    }

    /// The defer list in enqueue order; lowering reverses it.
    pub fn defers(&self) -> Vec<&'ast StmtNode<'ast>> {
        match &self.kind {
            ObjKind::Fn { defers, .. } => defers.borrow().clone(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_diagnostics::{FileId, StringTable};

    fn dummy_name(strings: &mut StringTable) -> AstString {
        let loc = Location::new(FileId::EMPTY, 0, 0);
        AstString::new(loc, strings.intern("x"))
    }

    #[test]
    fn var_namespace_is_var() {
        let mut strings = StringTable::new();
        let obj = Obj::new_var(dummy_name(&mut strings), Location::EMPTY);
        assert_eq!(obj.namespace(), ObjNamespace::Var);
        assert!(obj.data_type.get().is_none());
    }

    #[test]
    fn fn_and_extern_fn_share_the_fn_namespace() {
        let mut strings = StringTable::new();
        let body = StmtNode::new_block(Location::EMPTY, ScopeId::EMPTY, Vec::new());
        let body_ref: &StmtNode = Box::leak(Box::new(body));
        let f = Obj::new_fn(dummy_name(&mut strings), Location::EMPTY, Vec::new(), body_ref);
        let e = Obj::new_extern_fn(
            dummy_name(&mut strings),
            Location::EMPTY,
            Vec::new(),
            Attribute::Source(dummy_name(&mut strings)),
        );
        assert_eq!(f.namespace(), ObjNamespace::Fn);
        assert_eq!(e.namespace(), ObjNamespace::Fn);
    }

    #[test]
    fn defers_are_recorded_in_enqueue_order() {
        let mut strings = StringTable::new();
        let body = StmtNode::new_block(Location::EMPTY, ScopeId::EMPTY, Vec::new());
        let body_ref: &StmtNode = Box::leak(Box::new(body));
        let f = Obj::new_fn(dummy_name(&mut strings), Location::EMPTY, Vec::new(), body_ref);
        let d1 = Box::leak(Box::new(StmtNode::new_block(
            Location::EMPTY,
            ScopeId::EMPTY,
            Vec::new(),
        )));
        let d2 = Box::leak(Box::new(StmtNode::new_block(
            Location::EMPTY,
            ScopeId::EMPTY,
            Vec::new(),
        )));
        f.push_defer(d1);
        f.push_defer(d2);
        assert_eq!(f.defers().len(), 2);
        assert!(std::ptr::eq(f.defers()[0], d1 as &StmtNode));
    }
}
