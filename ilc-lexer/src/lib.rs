//! Converts source bytes into a token stream with precise locations.
//!
//! Identifiers, numbers and literals are resolved into [`Token`] (interned
//! names, parsed numbers) by [`Lexer::next_token`] on top of a private,
//! borrowed-slice `logos` token alphabet ([`raw::RawToken`]). This keeps the
//! public `Token` free of the source's lifetime, which the parser needs
//! since it holds tokens alongside arena-allocated nodes that outlive any
//! one file's borrow.

mod raw;

use std::collections::VecDeque;

use ilc_diagnostics::{DiagnosticEngine, FileId, InternedString, Location, SourceMap, StringTable};
use logos::Logos;

use raw::RawToken;

/// A lexed token. Punctuation and keywords are unit variants; `Ident`,
/// `Number`, `StringLit`, `CharLit` and `Attribute` carry their resolved
/// payload. `Garbage` stands in for any byte sequence the lexer could not
/// classify — a diagnostic has already been emitted for it by the time it is
/// returned, so the parser is free to discard it silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Fn,
    Var,
    Const,
    If,
    Else,
    While,
    For,
    Return,
    Struct,
    Enum,
    Module,
    Import,
    As,
    Using,
    Typeof,
    Type,
    Null,
    Print,
    True,
    False,
    Extern,
    Defer,
    Expect,

    Void,
    I32,
    U32,
    Bool,
    Str,

    Ident(InternedString),
    Number(u64),
    StringLit(InternedString),
    CharLit(u8),
    /// Raw text of an attribute, e.g. `#[source("c_name")]`, including the
    /// `#[` `]` delimiters. The parser, not the lexer, knows how to read it.
    Attribute(InternedString),

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    Tilde,
    Dot,
    DotDotDot,

    Arrow,
    Minus,
    MinusEq,
    Plus,
    PlusEq,
    Slash,
    SlashEq,
    Star,
    StarEq,
    Bang,
    BangEq,
    FatArrow,
    Eq,
    EqEq,
    Caret,
    CaretEq,
    Pipe,
    PipeEq,
    Amp,
    AmpEq,
    Percent,
    PercentEq,

    Gt,
    GtEq,
    GtGt,
    GtGtEq,
    Lt,
    LtEq,
    LtLt,
    LtLtEq,

    /// Emitted for any byte sequence that matched nothing; a diagnostic has
    /// already been pushed for it.
    Garbage,
    /// Produced once, after every file given to the lexer is exhausted.
    Eof,
}

fn parse_number(text: &str) -> u64 {
    let mut value: u64 = 0;
    for b in text.bytes() {
        if b == b'_' {
            continue;
        }
        value = value.saturating_mul(10).saturating_add((b - b'0') as u64);
    }
    value
}

fn convert(raw: RawToken<'_>, strings: &mut StringTable) -> Token {
    match raw {
        RawToken::Fn => Token::Fn,
        RawToken::Var => Token::Var,
        RawToken::Const => Token::Const,
        RawToken::If => Token::If,
        RawToken::Else => Token::Else,
        RawToken::While => Token::While,
        RawToken::For => Token::For,
        RawToken::Return => Token::Return,
        RawToken::Struct => Token::Struct,
        RawToken::Enum => Token::Enum,
        RawToken::Module => Token::Module,
        RawToken::Import => Token::Import,
        RawToken::As => Token::As,
        RawToken::Using => Token::Using,
        RawToken::Typeof => Token::Typeof,
        RawToken::Type => Token::Type,
        RawToken::Null => Token::Null,
        RawToken::Print => Token::Print,
        RawToken::True => Token::True,
        RawToken::False => Token::False,
        RawToken::Extern => Token::Extern,
        RawToken::Defer => Token::Defer,
        RawToken::Expect => Token::Expect,
        RawToken::Void => Token::Void,
        RawToken::I32 => Token::I32,
        RawToken::U32 => Token::U32,
        RawToken::Bool => Token::Bool,
        RawToken::Str => Token::Str,
        RawToken::Ident(s) => Token::Ident(strings.intern(s)),
        RawToken::Number(s) => Token::Number(parse_number(s)),
        RawToken::StringLiteral(s) => Token::StringLit(strings.intern(&s[1..s.len() - 1])),
        RawToken::CharLiteral(s) => Token::CharLit(s.as_bytes()[1]),
        RawToken::Attribute(s) => Token::Attribute(strings.intern(s)),
        RawToken::LParen => Token::LParen,
        RawToken::RParen => Token::RParen,
        RawToken::LBracket => Token::LBracket,
        RawToken::RBracket => Token::RBracket,
        RawToken::LBrace => Token::LBrace,
        RawToken::RBrace => Token::RBrace,
        RawToken::Comma => Token::Comma,
        RawToken::Semicolon => Token::Semicolon,
        RawToken::Colon => Token::Colon,
        RawToken::Tilde => Token::Tilde,
        RawToken::Dot => Token::Dot,
        RawToken::DotDotDot => Token::DotDotDot,
        RawToken::Arrow => Token::Arrow,
        RawToken::Minus => Token::Minus,
        RawToken::MinusEq => Token::MinusEq,
        RawToken::Plus => Token::Plus,
        RawToken::PlusEq => Token::PlusEq,
        RawToken::Slash => Token::Slash,
        RawToken::SlashEq => Token::SlashEq,
        RawToken::Star => Token::Star,
        RawToken::StarEq => Token::StarEq,
        RawToken::Bang => Token::Bang,
        RawToken::BangEq => Token::BangEq,
        RawToken::FatArrow => Token::FatArrow,
        RawToken::Eq => Token::Eq,
        RawToken::EqEq => Token::EqEq,
        RawToken::Caret => Token::Caret,
        RawToken::CaretEq => Token::CaretEq,
        RawToken::Pipe => Token::Pipe,
        RawToken::PipeEq => Token::PipeEq,
        RawToken::Amp => Token::Amp,
        RawToken::AmpEq => Token::AmpEq,
        RawToken::Percent => Token::Percent,
        RawToken::PercentEq => Token::PercentEq,
        RawToken::Gt => Token::Gt,
        RawToken::GtEq => Token::GtEq,
        RawToken::GtGt => Token::GtGt,
        RawToken::GtGtEq => Token::GtGtEq,
        RawToken::Lt => Token::Lt,
        RawToken::LtEq => Token::LtEq,
        RawToken::LtLt => Token::LtLt,
        RawToken::LtLtEq => Token::LtLtEq,
    }
}

/// Drives `logos` one file at a time, transparently chaining to the next
/// queued file when the current one is exhausted. `Eof` is only produced
/// once every file has been consumed.
pub struct Lexer<'a> {
    sources: &'a SourceMap,
    pending: VecDeque<FileId>,
    current_file: FileId,
    inner: Option<logos::Lexer<'a, RawToken<'a>>>,
}

impl<'a> Lexer<'a> {
    pub fn new(sources: &'a SourceMap, files: impl IntoIterator<Item = FileId>) -> Self {
        let mut pending: VecDeque<FileId> = files.into_iter().collect();
        let mut lexer = Lexer {
            sources,
            pending: VecDeque::new(),
            current_file: FileId::EMPTY,
            inner: None,
        };
        if let Some(first) = pending.pop_front() {
            log::debug!("lexing file {:?}", first);
            lexer.current_file = first;
            lexer.inner = Some(RawToken::lexer(sources.source(first)));
        }
        lexer.pending = pending;
        lexer
    }

    fn advance_file(&mut self) {
        match self.pending.pop_front() {
            Some(next) => {
                log::debug!("lexing file {:?}", next);
                self.current_file = next;
                self.inner = Some(RawToken::lexer(self.sources.source(next)));
            }
            None => self.inner = None,
        }
    }

    /// Produces the next token. Skips whitespace, line comments and block
    /// comments internally (handled by the raw token alphabet); never
    /// returns more than one token per call.
    pub fn next_token(
        &mut self,
        strings: &mut StringTable,
        diagnostics: &mut DiagnosticEngine,
    ) -> (Token, Location) {
        loop {
            let Some(inner) = &mut self.inner else {
                return (Token::Eof, Location::EMPTY);
            };
            match inner.next() {
                Some(Ok(raw)) => {
                    let span = inner.span();
                    let loc = Location::new(self.current_file, span.start as u32, span.end as u32);
                    return (convert(raw, strings), loc);
                }
                Some(Err(_)) => {
                    let span = inner.span();
                    let loc = Location::new(self.current_file, span.start as u32, span.end as u32);
                    diagnostics.error(loc, "unexpected character");
                    return (Token::Garbage, loc);
                }
                None => self.advance_file(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> (Vec<Token>, StringTable) {
        let mut sources = SourceMap::new();
        let file = sources.add_file("t.ilc", source.to_string());
        let mut strings = StringTable::new();
        let mut diagnostics = DiagnosticEngine::new();
        let mut lexer = Lexer::new(&sources, [file]);
        let mut out = Vec::new();
        loop {
            let (tok, _) = lexer.next_token(&mut strings, &mut diagnostics);
            if tok == Token::Eof {
                break;
            }
            out.push(tok);
        }
        (out, strings)
    }

    #[test]
    fn keywords_and_punctuation() {
        let (tokens, mut strings) = lex_all("fn main() -> i32 { return 1; }");
        let main_name = strings.intern("main");
        assert_eq!(
            tokens,
            vec![
                Token::Fn,
                Token::Ident(main_name),
                Token::LParen,
                Token::RParen,
                Token::Arrow,
                Token::I32,
                Token::LBrace,
                Token::Return,
                Token::Number(1),
                Token::Semicolon,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn longest_match_wins_for_multi_char_operators() {
        let (tokens, _) = lex_all(">> >>= > >= << <<= < <=");
        assert_eq!(
            tokens,
            vec![
                Token::GtGt,
                Token::GtGtEq,
                Token::Gt,
                Token::GtEq,
                Token::LtLt,
                Token::LtLtEq,
                Token::Lt,
                Token::LtEq,
            ]
        );
    }

    #[test]
    fn underscores_are_ignored_in_numbers() {
        let (tokens, _) = lex_all("1_000_000");
        assert_eq!(tokens, vec![Token::Number(1_000_000)]);
    }

    #[test]
    fn line_comments_are_skipped() {
        let (tokens, _) = lex_all("1 // a comment\n2");
        assert_eq!(tokens, vec![Token::Number(1), Token::Number(2)]);
    }

    #[test]
    fn unknown_character_becomes_garbage_with_a_diagnostic() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("t.ilc", "1 @ 2".to_string());
        let mut strings = StringTable::new();
        let mut diagnostics = DiagnosticEngine::new();
        let mut lexer = Lexer::new(&sources, [file]);
        let (t1, _) = lexer.next_token(&mut strings, &mut diagnostics);
        let (t2, _) = lexer.next_token(&mut strings, &mut diagnostics);
        let (t3, _) = lexer.next_token(&mut strings, &mut diagnostics);
        assert_eq!(t1, Token::Number(1));
        assert_eq!(t2, Token::Garbage);
        assert_eq!(t3, Token::Number(2));
        assert!(diagnostics.had_error());
    }

    #[test]
    fn multiple_files_chain_transparently_and_eof_only_comes_last() {
        let mut sources = SourceMap::new();
        let a = sources.add_file("a.ilc", "1".to_string());
        let b = sources.add_file("b.ilc", "2".to_string());
        let mut strings = StringTable::new();
        let mut diagnostics = DiagnosticEngine::new();
        let mut lexer = Lexer::new(&sources, [a, b]);
        let (t1, loc1) = lexer.next_token(&mut strings, &mut diagnostics);
        let (t2, loc2) = lexer.next_token(&mut strings, &mut diagnostics);
        let (t3, _) = lexer.next_token(&mut strings, &mut diagnostics);
        assert_eq!(t1, Token::Number(1));
        assert_eq!(t2, Token::Number(2));
        assert_eq!(t3, Token::Eof);
        assert_eq!(loc1.file, a);
        assert_eq!(loc2.file, b);
    }
}
