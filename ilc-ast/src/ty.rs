use std::collections::HashMap;

use ilc_diagnostics::AstString;

use crate::obj::Obj;

/// A handle into a [`TypeRegistry`]. Equality is identity within one
/// registry: the same textual type requested twice from the same registry
/// returns the same `Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type(u32);

impl Type {
    pub(crate) fn new(index: usize) -> Self {
        Type(index as u32)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The shape of an interned type. `Pointer` and `Function` refer to their
/// component types by handle, not by value, so the registry never has to
/// recurse through owned trees to compare two types.
///
/// `PartialEq`/`Eq`/`Hash` are hand-written rather than derived: `Struct`
/// carries a bare `&'ast Obj<'ast>`, and an `Obj` (built from `Cell`s and a
/// `RefCell`) has no sensible structural equality of its own — two struct
/// types are the same type iff they name the same declaring object, so that
/// variant compares and hashes by pointer identity instead.
#[derive(Debug, Clone)]
pub enum TypeKind<'ast> {
    Void,
    I32,
    U32,
    Bool,
    Str,
    Pointer(Type),
    Function {
        return_type: Type,
        parameter_types: Vec<Type>,
    },
    /// Carries the struct's declaring object directly; two struct types are
    /// the same type iff they share the same declaring object.
    Struct { obj: &'ast Obj<'ast> },
    /// Placeholder produced by the parser for a typename it has not yet
    /// resolved. Eliminated by the validator; never reaches the type checker.
    Identifier(AstString),
}

impl<'ast> TypeKind<'ast> {
    fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeKind::Void | TypeKind::I32 | TypeKind::U32 | TypeKind::Bool | TypeKind::Str
        )
    }
}

impl<'ast> PartialEq for TypeKind<'ast> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeKind::Void, TypeKind::Void)
            | (TypeKind::I32, TypeKind::I32)
            | (TypeKind::U32, TypeKind::U32)
            | (TypeKind::Bool, TypeKind::Bool)
            | (TypeKind::Str, TypeKind::Str) => true,
            (TypeKind::Pointer(a), TypeKind::Pointer(b)) => a == b,
            (
                TypeKind::Function {
                    return_type: ra,
                    parameter_types: pa,
                },
                TypeKind::Function {
                    return_type: rb,
                    parameter_types: pb,
                },
            ) => ra == rb && pa == pb,
            (TypeKind::Struct { obj: a }, TypeKind::Struct { obj: b }) => std::ptr::eq(*a, *b),
            (TypeKind::Identifier(a), TypeKind::Identifier(b)) => a == b,
            _ => false,
        }
    }
}

impl<'ast> Eq for TypeKind<'ast> {}

impl<'ast> std::hash::Hash for TypeKind<'ast> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            TypeKind::Void | TypeKind::I32 | TypeKind::U32 | TypeKind::Bool | TypeKind::Str => {}
            TypeKind::Pointer(inner) => inner.hash(state),
            TypeKind::Function {
                return_type,
                parameter_types,
            } => {
                return_type.hash(state);
                parameter_types.hash(state);
            }
            TypeKind::Struct { obj } => (*obj as *const Obj<'ast>).hash(state),
            TypeKind::Identifier(name) => name.hash(state),
        }
    }
}

/// Interns [`TypeKind`]s for a single module, handing back a stable [`Type`]
/// handle. Primitives are installed once by [`TypeRegistry::with_primitives`]
/// and are resolvable by name from any scope; pointer, function and struct
/// shapes are interned lazily on first reference.
///
/// Interning is per-module rather than per-scope, since only a single
/// module is ever populated in practice.
pub struct TypeRegistry<'ast> {
    kinds: Vec<TypeKind<'ast>>,
    lookup: HashMap<TypeKind<'ast>, Type>,
    pub void: Type,
    pub i32_: Type,
    pub u32_: Type,
    pub bool_: Type,
    pub str_: Type,
}

impl<'ast> TypeRegistry<'ast> {
    /// Builds a fresh registry with the five primitives pre-interned.
    pub fn with_primitives() -> Self {
        let mut registry = TypeRegistry {
            kinds: Vec::new(),
            lookup: HashMap::new(),
            void: Type(0),
            i32_: Type(0),
            u32_: Type(0),
            bool_: Type(0),
            str_: Type(0),
        };
        registry.void = registry.intern(TypeKind::Void);
        registry.i32_ = registry.intern(TypeKind::I32);
        registry.u32_ = registry.intern(TypeKind::U32);
        registry.bool_ = registry.intern(TypeKind::Bool);
        registry.str_ = registry.intern(TypeKind::Str);
        registry
    }

    /// Looks up a primitive by keyword (`i32`, `u32`, `bool`, `str`, `void`).
    /// Returns `None` for anything else, including `Struct`/`Pointer` names,
    /// which are resolved by the validator instead.
    pub fn primitive_by_name(&self, name: &str) -> Option<Type> {
        match name {
            "void" => Some(self.void),
            "i32" => Some(self.i32_),
            "u32" => Some(self.u32_),
            "bool" => Some(self.bool_),
            "str" => Some(self.str_),
            _ => None,
        }
    }

    /// Interns `kind`, returning the existing handle if an equal kind was
    /// already interned, or a freshly allocated one otherwise. The caller's
    /// `kind` value is consumed either way.
    pub fn intern(&mut self, kind: TypeKind<'ast>) -> Type {
        if let Some(existing) = self.lookup.get(&kind) {
            return *existing;
        }
        let handle = Type::new(self.kinds.len());
        self.kinds.push(kind.clone());
        self.lookup.insert(kind, handle);
        handle
    }

    pub fn kind(&self, ty: Type) -> &TypeKind<'ast> {
        &self.kinds[ty.index()]
    }

    pub fn is_numeric(&self, ty: Type) -> bool {
        matches!(self.kind(ty), TypeKind::I32 | TypeKind::U32)
    }

    pub fn is_signed_numeric(&self, ty: Type) -> bool {
        matches!(self.kind(ty), TypeKind::I32)
    }

    pub fn is_void(&self, ty: Type) -> bool {
        matches!(self.kind(ty), TypeKind::Void)
    }

    pub fn is_bool(&self, ty: Type) -> bool {
        matches!(self.kind(ty), TypeKind::Bool)
    }

    pub fn is_pointer(&self, ty: Type) -> bool {
        matches!(self.kind(ty), TypeKind::Pointer(_))
    }

    pub fn as_struct(&self, ty: Type) -> Option<&'ast Obj<'ast>> {
        match self.kind(ty) {
            TypeKind::Struct { obj } => Some(obj),
            _ => None,
        }
    }

    pub fn as_function(&self, ty: Type) -> Option<(Type, &[Type])> {
        match self.kind(ty) {
            TypeKind::Function {
                return_type,
                parameter_types,
            } => Some((*return_type, parameter_types)),
            _ => None,
        }
    }

    /// Structural equality: primitives compare by
    /// variant (same handle already guarantees this since they are
    /// pre-interned), pointers compare inner types, functions compare return
    /// and parameter types, structs compare by declaring-object identity.
    pub fn types_equal(&self, a: Type, b: Type) -> bool {
        if a == b {
            return true;
        }
        match (self.kind(a), self.kind(b)) {
            (TypeKind::Pointer(ia), TypeKind::Pointer(ib)) => self.types_equal(*ia, *ib),
            (
                TypeKind::Function {
                    return_type: ra,
                    parameter_types: pa,
                },
                TypeKind::Function {
                    return_type: rb,
                    parameter_types: pb,
                },
            ) => {
                pa.len() == pb.len()
                    && self.types_equal(*ra, *rb)
                    && pa.iter().zip(pb).all(|(x, y)| self.types_equal(*x, *y))
            }
            (TypeKind::Struct { obj: oa }, TypeKind::Struct { obj: ob }) => {
                std::ptr::eq(*oa, *ob)
            }
            (a, b) => a.is_primitive() && b.is_primitive() && a == b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_diagnostics::{FileId, Location};

    #[test]
    fn primitives_are_preinterned_and_identity_stable() {
        let registry = TypeRegistry::with_primitives();
        assert_eq!(registry.primitive_by_name("i32"), Some(registry.i32_));
        assert_eq!(registry.primitive_by_name("bogus"), None);
    }

    #[test]
    fn repeated_intern_of_equal_kind_returns_same_handle() {
        let mut registry = TypeRegistry::with_primitives();
        let p1 = registry.intern(TypeKind::Pointer(registry.i32_));
        let p2 = registry.intern(TypeKind::Pointer(registry.i32_));
        assert_eq!(p1, p2);
    }

    #[test]
    fn pointer_to_different_inner_types_are_distinct() {
        let mut registry = TypeRegistry::with_primitives();
        let p_i32 = registry.intern(TypeKind::Pointer(registry.i32_));
        let p_bool = registry.intern(TypeKind::Pointer(registry.bool_));
        assert_ne!(p_i32, p_bool);
    }

    #[test]
    fn function_types_compare_structurally() {
        let mut registry = TypeRegistry::with_primitives();
        let f1 = registry.intern(TypeKind::Function {
            return_type: registry.i32_,
            parameter_types: vec![registry.i32_, registry.bool_],
        });
        let f2 = registry.intern(TypeKind::Function {
            return_type: registry.i32_,
            parameter_types: vec![registry.i32_, registry.bool_],
        });
        assert_eq!(f1, f2);
        assert!(registry.types_equal(f1, f2));
    }

    #[test]
    fn identifier_placeholder_is_not_a_primitive() {
        let mut registry = TypeRegistry::with_primitives();
        let mut strings = ilc_diagnostics::StringTable::new();
        let loc = Location::new(FileId::EMPTY, 0, 0);
        let ty = registry.intern(TypeKind::Identifier(AstString::new(
            loc,
            strings.intern("Point"),
        )));
        assert!(!matches!(registry.kind(ty), TypeKind::Void));
    }
}
