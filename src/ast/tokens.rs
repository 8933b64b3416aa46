use std::fmt;

/// Zero-based source position of a token, counted in characters.
///
/// Displayed one-based, the way error messages report it:
///
/// ```
/// use samql::Pos;
///
/// assert_eq!(Pos::new(0, 7).to_string(), "line 1, char 8");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub line: usize,
    pub char: usize,
}

impl Pos {
    pub fn new(line: usize, char: usize) -> Self {
        Pos { line, char }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, char {}", self.line + 1, self.char + 1)
    }
}

/// Lexical token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Special
    /// A character the lexer does not recognize
    Illegal,
    /// End of input
    Eof,
    /// A run of whitespace, line endings normalized to `\n`
    Ws,
    /// A `/* ... */` block
    Comment,

    // Literals
    /// Bare or double-quoted identifier
    ///
    /// # Examples
    /// ```text
    /// RNAME
    /// NM:i
    /// "my field"
    /// ```
    Ident,
    /// Bound parameter, literal includes the leading `$`
    ///
    /// # Examples
    /// ```text
    /// $host
    /// $"host name"
    /// ```
    BoundParam,
    /// Number with a fractional part
    ///
    /// # Examples
    /// ```text
    /// 100.23
    /// .5
    /// ```
    Number,
    /// Digits without a fractional part
    Integer,
    /// Single-quoted string
    String,
    /// Unterminated string or quoted identifier
    BadString,
    /// Unknown escape sequence inside quotes
    BadEscape,
    True,
    False,
    /// `/pattern/`, only produced where a regex is expected
    Regex,
    /// Unterminated regex
    BadRegex,

    // Operators
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    And,
    Or,
    Eq,
    Neq,
    EqRegex,
    NeqRegex,
    Lt,
    Lte,
    Gt,
    Gte,

    // Structure
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    // Keywords
    As,
    From,
    Select,
    Where,
}

impl TokenKind {
    /// Canonical text of the token kind.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Illegal => "ILLEGAL",
            Eof => "EOF",
            Ws => "WS",
            Comment => "COMMENT",
            Ident => "IDENT",
            BoundParam => "BOUNDPARAM",
            Number => "NUMBER",
            Integer => "INTEGER",
            String => "STRING",
            BadString => "BADSTRING",
            BadEscape => "BADESCAPE",
            True => "TRUE",
            False => "FALSE",
            Regex => "REGEX",
            BadRegex => "BADREGEX",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            BitwiseAnd => "&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            And => "AND",
            Or => "OR",
            Eq => "=",
            Neq => "!=",
            EqRegex => "=~",
            NeqRegex => "!~",
            Lt => "<",
            Lte => "<=",
            Gt => ">",
            Gte => ">=",
            LParen => "(",
            RParen => ")",
            Comma => ",",
            Semicolon => ";",
            Dot => ".",
            As => "AS",
            From => "FROM",
            Select => "SELECT",
            Where => "WHERE",
        }
    }

    /// Binding strength of a binary operator; zero for every other kind.
    pub fn precedence(self) -> u8 {
        use TokenKind::*;
        match self {
            Or => 1,
            And => 2,
            Eq | Neq | EqRegex | NeqRegex | Lt | Lte | Gt | Gte => 3,
            Add | Sub | BitwiseOr | BitwiseXor => 4,
            Mul | Div | Mod | BitwiseAnd => 5,
            _ => 0,
        }
    }

    pub fn is_operator(self) -> bool {
        self.precedence() > 0
    }

    /// Reserved words, including the boolean literals.
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(self, And | Or | As | From | Select | Where | True | False)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a bare word: a reserved word kind, or `Ident`.
///
/// Reserved words match case-insensitively.
///
/// ```
/// use samql::ast::tokens::{lookup, TokenKind};
///
/// assert_eq!(lookup("select"), TokenKind::Select);
/// assert_eq!(lookup("True"), TokenKind::True);
/// assert_eq!(lookup("RNAME"), TokenKind::Ident);
/// ```
pub fn lookup(ident: &str) -> TokenKind {
    match ident.to_ascii_lowercase().as_str() {
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "as" => TokenKind::As,
        "from" => TokenKind::From,
        "select" => TokenKind::Select,
        "where" => TokenKind::Where,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Ident,
    }
}

/// A scanned token.
///
/// Keywords and operators carry an empty literal; their text is the kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
    pub lit: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos, lit: impl Into<String>) -> Self {
        Token {
            kind,
            pos,
            lit: lit.into(),
        }
    }

    /// Text used when reporting this token in an error: the literal when
    /// there is one, otherwise the kind.
    pub fn describe(&self) -> String {
        if self.lit.is_empty() {
            self.kind.to_string()
        } else {
            self.lit.clone()
        }
    }
}
