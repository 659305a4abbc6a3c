use std::path::PathBuf;

use anyhow::Result;
use clap::Parser as ClapParser;

use ilc_ast::{Module, ModuleId, Program};
use ilc_diagnostics::{AstString, DiagnosticEngine, Location, SourceMap};
use ilc_lexer::Lexer;
use ilc_parser::Parser;

/// Front-end driver: lexes, parses, validates and type-checks a single
/// source file, optionally dumping the checked AST.
#[derive(ClapParser)]
#[command(name = "ilc")]
#[command(version)]
#[command(about = "ILC front-end compiler pipeline", long_about = None)]
struct Cli {
    /// Source file to compile
    #[arg(value_name = "PATH", default_value = "test.ilc")]
    path: PathBuf,

    /// Print the checked program in a structured textual form after a
    /// successful validation and type check
    #[arg(short = 'd', long = "dump_ast")]
    dump_ast: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if !run(&cli)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Runs the full pipeline. Returns `Ok(true)` on a clean compile, `Ok(false)`
/// when diagnostics were emitted (already printed to stderr), and `Err` only
/// for internal, non-diagnostic failures (I/O errors loading the source file)
/// that propagate with `?`.
fn run(cli: &Cli) -> Result<bool> {
    let mut sources = SourceMap::new();
    let file = sources.load_file(&cli.path)?;

    let mut program = Program::new();
    let module_name = AstString::new(Location::EMPTY, program.strings.intern(module_stem(&cli.path)));
    let mut module = Module::new(ModuleId::new(0), module_name);

    let mut diagnostics = DiagnosticEngine::new();

    log::info!("lexing {}", cli.path.display());
    let mut lexer = Lexer::new(&sources, [file]);

    log::info!("parsing {}", cli.path.display());
    let Module {
        arena,
        types,
        scopes,
        globals,
        ..
    } = &mut module;
    let mut parser = Parser::new(&mut lexer, arena, types, scopes, globals, &mut program.strings, &mut diagnostics);
    parser.parse_program();
    log::info!("parsing finished: {} diagnostics", diagnostics.diagnostics().len());

    if diagnostics.had_error() {
        diagnostics.print_all(&sources);
        return Ok(false);
    }

    log::info!("validating and type-checking {}", cli.path.display());
    ilc_sema::validate_and_check(&mut module, &program.strings, &mut diagnostics);

    if diagnostics.had_error() {
        diagnostics.print_all(&sources);
        return Ok(false);
    }

    program.add_module(module);

    if cli.dump_ast {
        print!("{}", ilc_codegen::dump_program(&program));
    }

    Ok(true)
}

fn module_stem(path: &std::path::Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("test")
}
