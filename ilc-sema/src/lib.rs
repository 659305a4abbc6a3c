//! Name resolution, type checking and defer lowering over a parsed module.
//!
//! This crate runs after [`ilc_parser::Parser`] has built a module's scope
//! tree and arena: [`validator::validate`] resolves every declared type and
//! identifier and attaches a `data_type` to every expression, then
//! [`typecheck::check`] verifies the combinations those resolved types were
//! used in are legal. [`defer::lowered_defers`] is the one piece of `defer`
//! handling that belongs here rather than in code generation.

mod defer;
mod typecheck;
mod validator;

pub use defer::lowered_defers;

use ilc_ast::Module;
use ilc_diagnostics::{DiagnosticEngine, StringTable};

/// Runs validation followed by type checking. Type checking only runs if
/// validation raised no errors: the checker assumes every object's
/// `data_type` is resolved and every `Identifier` expression has already
/// been rewritten to `Variable`/`Function`, an assumption a validation
/// failure voids, so the driver halts the pipeline between the two phases
/// instead of type-checking a half-resolved tree.
pub fn validate_and_check<'ast>(module: &mut Module<'ast>, strings: &StringTable, diagnostics: &mut DiagnosticEngine) {
    validator::validate(module, strings, diagnostics);
    if diagnostics.had_error() {
        return;
    }
    typecheck::check(module, strings, diagnostics);
}
