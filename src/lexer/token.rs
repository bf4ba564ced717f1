use std::fmt;

use phf::phf_map;

pub(super) static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "exit" => TokenKind::Exit,
    "let" => TokenKind::Let,
    "if" => TokenKind::If,
    "elif" => TokenKind::Elif,
    "else" => TokenKind::Else,
};

pub(super) static ONE_SYMBOL_TOKENS: phf::Map<char, TokenKind> = phf_map! {
    '(' => TokenKind::OpenParen,
    ')' => TokenKind::CloseParen,
    ';' => TokenKind::SemiColon,
    '=' => TokenKind::Equal,
    '+' => TokenKind::Plus,
    '*' => TokenKind::Star,
    '-' => TokenKind::Minus,
    '/' => TokenKind::Slash,
    '{' => TokenKind::OpenCurlyBrace,
    '}' => TokenKind::CloseCurlyBrace,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Exit,
    Let,
    If,
    Elif,
    Else,

    IntLit,
    Ident,

    OpenParen,
    CloseParen,
    SemiColon,
    Equal,
    Plus,
    Star,
    Minus,
    Slash,
    OpenCurlyBrace,
    CloseCurlyBrace,
}

impl TokenKind {
    /// Binding power of a binary operator, `None` for anything else.
    pub fn binary_precedence(self) -> Option<u8> {
        match self {
            TokenKind::Plus | TokenKind::Minus => Some(0),
            TokenKind::Star | TokenKind::Slash => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Exit => "`exit`",
            TokenKind::Let => "`let`",
            TokenKind::If => "`if`",
            TokenKind::Elif => "`elif`",
            TokenKind::Else => "`else`",
            TokenKind::IntLit => "integer literal",
            TokenKind::Ident => "identifier",
            TokenKind::OpenParen => "`(`",
            TokenKind::CloseParen => "`)`",
            TokenKind::SemiColon => "`;`",
            TokenKind::Equal => "`=`",
            TokenKind::Plus => "`+`",
            TokenKind::Star => "`*`",
            TokenKind::Minus => "`-`",
            TokenKind::Slash => "`/`",
            TokenKind::OpenCurlyBrace => "`{`",
            TokenKind::CloseCurlyBrace => "`}`",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    /// Source text, kept for identifiers and integer literals.
    pub value: Option<String>,
}

impl Token {
    /// The token's text, or an empty string for tokens that carry none.
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}
