//! The arena-backed AST shared by the parser, validator and type checker.
//!
//! A single node hierarchy serves both the parsed and checked stages: an
//! expression's `data_type` starts `None` and is filled in by validation, and
//! an `Identifier` expression is rewritten in place into a resolved
//! `Variable`/`Function` once the validator looks it up, rather than being
//! reconstructed into a separate "checked" tree.

mod arena;
mod expr;
mod module;
mod obj;
mod program;
mod scope;
mod stmt;
mod ty;

pub use arena::AstArena;
pub use expr::{BinaryOp, ExprKind, ExprNode, UnaryOp};
pub use module::{Module, ModuleId};
pub use obj::{Attribute, Obj, ObjKind, ObjNamespace};
pub use program::Program;
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
pub use stmt::{ControlFlow, StmtKind, StmtNode};
pub use ty::{Type, TypeKind, TypeRegistry};
