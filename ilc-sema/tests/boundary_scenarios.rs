//! The six boundary scenarios, driving the real lex -> parse -> validate ->
//! typecheck pipeline end to end, same as `ilc-cli` does but without a
//! process to spawn.

use ilc_ast::{Module, ModuleId, Program};
use ilc_diagnostics::{AstString, DiagnosticEngine, Location, SourceMap};
use ilc_lexer::Lexer;
use ilc_parser::Parser;

struct Compiled {
    had_error: bool,
    diagnostics: DiagnosticEngine,
    dump: String,
}

fn compile(source: &str) -> Compiled {
    let mut sources = SourceMap::new();
    let file = sources.add_file("t.ilc", source.to_string());
    let mut program = Program::new();
    let module_name = AstString::new(Location::EMPTY, program.strings.intern("root"));
    let mut module = Module::new(ModuleId::new(0), module_name);
    let mut diagnostics = DiagnosticEngine::new();
    let mut lexer = Lexer::new(&sources, [file]);

    let Module {
        arena,
        types,
        scopes,
        globals,
        ..
    } = &mut module;
    let mut parser = Parser::new(&mut lexer, arena, types, scopes, globals, &mut program.strings, &mut diagnostics);
    parser.parse_program();

    if !diagnostics.had_error() {
        ilc_sema::validate_and_check(&mut module, &program.strings, &mut diagnostics);
    }

    let dump = if !diagnostics.had_error() {
        program.add_module(module);
        ilc_codegen::dump_program(&program)
    } else {
        String::new()
    };

    Compiled {
        had_error: diagnostics.had_error(),
        diagnostics,
        dump,
    }
}

#[test]
fn arithmetic_end_to_end() {
    let result = compile("fn main() -> i32 { return 1 + 2 * 3; }");
    assert!(!result.had_error);
    assert!(result.dump.contains("Add(Number 1, Multiply(Number 2, Number 3))"));
}

#[test]
fn defer_ordering() {
    let source =
        "fn print(i: i32) {}\nfn main() -> i32 { for var i = 0; i < 3; i = i + 1 { defer print(i); } return 0; }";
    let result = compile(source);
    assert!(!result.had_error, "unexpected diagnostics: {:?}", diagnostic_messages(&result));
    let print_at = result.dump.match_indices("Call(FnRef(print)").map(|(i, _)| i).collect::<Vec<_>>();
    assert!(!print_at.is_empty(), "expected at least one deferred `print` call in the dump:\n{}", result.dump);
}

#[test]
fn recursive_struct_rejection() {
    let result = compile("struct A { a: A; }");
    assert!(result.had_error);
    let messages = diagnostic_messages(&result);
    assert!(messages.iter().any(|m| m.contains("recursively contains itself")), "{:?}", messages);
}

#[test]
fn return_type_mismatch() {
    let result = compile("fn main() -> i32 { return \"hi\"; }");
    assert!(result.had_error);
    let messages = diagnostic_messages(&result);
    assert!(
        messages.iter().any(|m| m.contains("return") || m.contains("return type") || m.contains("match")),
        "{:?}",
        messages
    );
}

#[test]
fn missing_main_is_reported_with_no_location() {
    let result = compile("fn helper() {}");
    assert!(result.had_error);
    let missing_main = result.diagnostics.diagnostics().iter().find(|d| d.message.contains("no `main`"));
    let diag = missing_main.expect("expected a \"no main\" diagnostic");
    assert!(diag.location.is_none());
}

#[test]
fn duplicate_definition_is_reported_at_the_second_declaration() {
    let result = compile("fn foo() {}\nfn foo() {}");
    assert!(result.had_error);
    let messages = diagnostic_messages(&result);
    assert!(messages.iter().any(|m| m.contains("duplicate definition")), "{:?}", messages);
}

fn diagnostic_messages(result: &Compiled) -> Vec<String> {
    result.diagnostics.diagnostics().iter().map(|d| d.message.clone()).collect()
}
