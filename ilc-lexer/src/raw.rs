use logos::Logos;

/// The bytes-level token alphabet, produced directly by `logos`. Identifiers
/// and literals keep a borrowed slice into the source; [`crate::Lexer`]
/// resolves these into the public, allocation-free [`crate::Token`] (interning
/// names, parsing numbers) once per call.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r"//[^\n]*")]
pub(crate) enum RawToken<'src> {
    #[token("fn")]
    Fn,
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("module")]
    Module,
    #[token("import")]
    Import,
    #[token("as")]
    As,
    #[token("using")]
    Using,
    #[token("typeof")]
    Typeof,
    #[token("type")]
    Type,
    #[token("null")]
    Null,
    #[token("print")]
    Print,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("extern")]
    Extern,
    #[token("defer")]
    Defer,
    #[token("expect")]
    Expect,

    #[token("void")]
    Void,
    #[token("i32")]
    I32,
    #[token("u32")]
    U32,
    #[token("bool")]
    Bool,
    #[token("str")]
    Str,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident(&'src str),
    #[regex(r"[0-9][0-9_]*")]
    Number(&'src str),
    #[regex(r#""[^"\n]*""#)]
    StringLiteral(&'src str),
    #[regex(r"'[\x20-\x7E]'")]
    CharLiteral(&'src str),

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token("~")]
    Tilde,
    #[token(".")]
    Dot,

    #[token("...")]
    DotDotDot,

    #[token("->")]
    Arrow,
    #[token("-=")]
    MinusEq,
    #[token("-")]
    Minus,
    #[token("+=")]
    PlusEq,
    #[token("+")]
    Plus,
    #[token("/=")]
    SlashEq,
    #[token("/")]
    Slash,
    #[token("*=")]
    StarEq,
    #[token("*")]
    Star,
    #[token("!=")]
    BangEq,
    #[token("!")]
    Bang,
    #[token("=>")]
    FatArrow,
    #[token("==")]
    EqEq,
    #[token("=")]
    Eq,
    #[token("^=")]
    CaretEq,
    #[token("^")]
    Caret,
    #[token("|=")]
    PipeEq,
    #[token("|")]
    Pipe,
    #[token("&=")]
    AmpEq,
    #[token("&")]
    Amp,
    #[token("%=")]
    PercentEq,
    #[token("%")]
    Percent,

    #[token(">>=")]
    GtGtEq,
    #[token(">>")]
    GtGt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("<<=")]
    LtLtEq,
    #[token("<<")]
    LtLt,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,

    #[regex(r"#\[[A-Za-z_][A-Za-z0-9_]*\([^)]*\)\]")]
    Attribute(&'src str),
}
