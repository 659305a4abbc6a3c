//! A Pratt expression parser plus recursive descent for declarations and
//! statements, producing a parsed AST whose identifiers are unresolved.
//!
//! Unlike a hand-rolled precedence-climbing parser, expression parsing here
//! is driven by an explicit precedence table per token — see
//! [`expr::infix_precedence`] — mirroring the `ParseRule rules[]` table
//! design of the grammar this language's operators were modelled on.

mod decl;
mod expr;
mod stmt;

use ilc_ast::{AstArena, ScopeId, ScopeTree, StmtNode, TypeRegistry};
use ilc_diagnostics::{DiagnosticEngine, Location, StringTable};
use ilc_lexer::{Lexer, Token};

/// Drives a token stream into a module's scope tree and arena. Declarations
/// and statements insert directly into the current scope as they are parsed;
/// there is no separate "build a tree then resolve names" step — name
/// resolution is the validator's job, not the parser's.
pub struct Parser<'a, 'ast> {
    tokens: Vec<(Token, Location)>,
    current: usize,
    arena: &'ast AstArena<'ast>,
    types: &'a mut TypeRegistry<'ast>,
    scopes: &'a mut ScopeTree<'ast>,
    globals: &'a mut Vec<&'ast StmtNode<'ast>>,
    strings: &'a mut StringTable,
    diagnostics: &'a mut DiagnosticEngine,
    current_scope: ScopeId,
    /// Defer bodies encountered while parsing the function currently in
    /// progress, in encounter order. Drained onto the function's `Obj` once
    /// it is built — functions don't nest, so one buffer is enough.
    current_defers: Vec<&'ast StmtNode<'ast>>,
}

/// The module-level declaration keywords error recovery synchronises to.
const RECOVERY_KEYWORDS: [Token; 5] = [
    Token::Fn,
    Token::Var,
    Token::Struct,
    Token::Extern,
    Token::Import,
];

impl<'a, 'ast> Parser<'a, 'ast> {
    /// Eagerly drains `lexer` into a token buffer (dropping any `Garbage`
    /// token — a diagnostic for it was already pushed by the lexer itself),
    /// then sets up to parse into `scopes`'s root scope.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lexer: &mut Lexer<'_>,
        arena: &'ast AstArena<'ast>,
        types: &'a mut TypeRegistry<'ast>,
        scopes: &'a mut ScopeTree<'ast>,
        globals: &'a mut Vec<&'ast StmtNode<'ast>>,
        strings: &'a mut StringTable,
        diagnostics: &'a mut DiagnosticEngine,
    ) -> Self {
        let mut tokens = Vec::new();
        loop {
            let (tok, loc) = lexer.next_token(strings, diagnostics);
            match tok {
                Token::Garbage => continue,
                Token::Eof => {
                    tokens.push((Token::Eof, loc));
                    break;
                }
                _ => tokens.push((tok, loc)),
            }
        }
        let root = scopes.root();
        Parser {
            tokens,
            current: 0,
            arena,
            types,
            scopes,
            globals,
            strings,
            diagnostics,
            current_scope: root,
            current_defers: Vec::new(),
        }
    }

    /// Parses every declaration up to end of input, inserting each into the
    /// scope tree as it goes. Errors are accumulated; a bad declaration is
    /// skipped over by [`Parser::synchronize`] rather than aborting the run.
    pub fn parse_program(&mut self) {
        while !self.at_eof() {
            if self.parse_declaration().is_none() {
                self.synchronize();
            }
        }
    }

    fn parse_declaration(&mut self) -> Option<()> {
        match self.peek() {
            Token::Fn => self.parse_fn_decl(),
            Token::Var => self.parse_top_level_var_decl(),
            Token::Struct => self.parse_struct_decl(),
            Token::Extern => self.parse_extern_fn_decl(),
            _ => {
                self.error_here("expected a top-level declaration (`fn`, `var`, `struct` or `extern`)");
                None
            }
        }
    }

    fn synchronize(&mut self) {
        if !self.at_eof() {
            self.advance();
        }
        while !self.at_eof() && !RECOVERY_KEYWORDS.contains(self.peek()) {
            self.advance();
        }
    }

    // ---- token helpers ----

    fn peek(&self) -> &Token {
        &self.tokens[self.current].0
    }

    fn peek_location(&self) -> Location {
        self.tokens[self.current].1
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1].0
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn advance(&mut self) -> &Token {
        if !self.at_eof() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, tok: &Token) -> bool {
        self.peek() == tok
    }

    fn match_token(&mut self, tok: &Token) -> bool {
        if self.check(tok) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, tok: &Token, message: &str) -> Option<()> {
        if self.check(tok) {
            self.advance();
            Some(())
        } else {
            self.error_here(message);
            None
        }
    }

    fn error_here(&mut self, message: &str) {
        let loc = self.peek_location();
        self.diagnostics.error(loc, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ilc_ast::{ExprKind, Module, ModuleId, ScopeKind, StmtKind};
    use ilc_diagnostics::{AstString, FileId, SourceMap};

    fn parse(source: &str) -> (bool, String) {
        let mut sources = SourceMap::new();
        let file = sources.add_file("t.ilc", source.to_string());
        let mut diagnostics = DiagnosticEngine::new();
        let name_loc = Location::new(FileId::EMPTY, 0, 0);
        let mut module_name_strings = StringTable::new();
        let module_name = AstString::new(name_loc, module_name_strings.intern("root"));
        let mut module = Module::new(ModuleId::new(0), module_name);
        let mut lexer = Lexer::new(&sources, [file]);
        {
            let Module {
                arena,
                types,
                scopes,
                globals,
                ..
            } = &mut module;
            let mut parser = Parser::new(
                &mut lexer,
                arena,
                types,
                scopes,
                globals,
                &mut module_name_strings,
                &mut diagnostics,
            );
            parser.parse_program();
        }
        let dump = format!(
            "globals={} fns={} structs={}",
            module.globals.len(),
            module.scopes.scope(module.scopes.root()).fns().count(),
            module.scopes.scope(module.scopes.root()).structs().count(),
        );
        (diagnostics.had_error(), dump)
    }

    #[test]
    fn parses_a_function_with_a_body() {
        let (had_error, dump) = parse("fn add(a: i32, b: i32) -> i32 { return a + b; }");
        assert!(!had_error);
        assert_eq!(dump, "globals=0 fns=1 structs=0");
    }

    #[test]
    fn parses_a_top_level_var_and_a_struct() {
        let (had_error, dump) = parse("var x: i32 = 1; struct Point { x: i32; y: i32; }");
        assert!(!had_error);
        assert_eq!(dump, "globals=1 fns=0 structs=1");
    }

    #[test]
    fn garbage_top_level_token_recovers_to_the_next_declaration() {
        let (had_error, dump) = parse("@@@ fn main() -> void {}");
        assert!(had_error);
        assert_eq!(dump, "globals=0 fns=1 structs=0");
    }

    #[test]
    fn binary_expression_parses_with_correct_precedence() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("t.ilc", "fn f() -> i32 { return 1 + 2 * 3; }".to_string());
        let mut diagnostics = DiagnosticEngine::new();
        let mut strings = StringTable::new();
        let name_loc = Location::new(FileId::EMPTY, 0, 0);
        let module_name = AstString::new(name_loc, strings.intern("root"));
        let mut module = Module::new(ModuleId::new(0), module_name);
        let mut lexer = Lexer::new(&sources, [file]);
        let Module {
            arena,
            types,
            scopes,
            globals,
            ..
        } = &mut module;
        let mut parser = Parser::new(&mut lexer, arena, types, scopes, globals, &mut strings, &mut diagnostics);
        parser.parse_program();
        assert!(!diagnostics.had_error());

        let root = module.scopes.scope(module.scopes.root());
        let f = root.fns().next().expect("fn f parsed");
        let ilc_ast::ObjKind::Fn { body, .. } = &f.kind else {
            panic!("expected Fn");
        };
        let StmtKind::Block { nodes, scope, .. } = &body.kind else {
            panic!("expected Block");
        };
        assert_eq!(module.scopes.scope(*scope).kind, ScopeKind::Block);
        let StmtKind::Return { expr } = &nodes[0].kind else {
            panic!("expected Return");
        };
        let ExprKind::Binary { op, .. } = expr.expect("return has a value").kind() else {
            panic!("expected a binary expression at the top");
        };
        assert_eq!(op, ilc_ast::BinaryOp::Add);
    }
}
