use thiserror::Error;

use crate::ast::quote::{is_ident_char, is_ident_first_char};
use crate::ast::tokens::{lookup, Pos, Token, TokenKind};

/// Malformed literal found while scanning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("bad string {lit:?} at {pos}")]
    BadString { lit: String, pos: Pos },

    #[error("bad escape {lit} at {pos}")]
    BadEscape { lit: String, pos: Pos },

    #[error("bad regex {lit:?} at {pos}")]
    BadRegex { lit: String, pos: Pos },
}

impl LexError {
    /// The error carried by a `BADSTRING`, `BADESCAPE` or `BADREGEX` token.
    pub fn from_token(token: &Token) -> Option<Self> {
        let lit = token.lit.clone();
        let pos = token.pos;
        match token.kind {
            TokenKind::BadString => Some(LexError::BadString { lit, pos }),
            TokenKind::BadEscape => Some(LexError::BadEscape { lit, pos }),
            TokenKind::BadRegex => Some(LexError::BadRegex { lit, pos }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    offset: usize,
    pos: Pos,
}

/// Converts query text into positioned tokens.
///
/// One token of pushback is available through [`Lexer::unscan`].
pub struct Lexer {
    input: Vec<char>,
    cursor: Cursor,
    last: Option<Cursor>,
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        // Line terminators are normalized once so positions and literals agree.
        let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
        Lexer {
            input: normalized.chars().collect(),
            cursor: Cursor::default(),
            last: None,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.cursor.offset).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.cursor.offset + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current_char()?;
        self.cursor.offset += 1;
        if ch == '\n' {
            self.cursor.pos.line += 1;
            self.cursor.pos.char = 0;
        } else {
            self.cursor.pos.char += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.current_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Position of the next unread character.
    pub fn pos(&self) -> Pos {
        self.cursor.pos
    }

    /// True when the next unread characters open a regex literal rather
    /// than a comment.
    pub fn at_regex(&self) -> bool {
        self.current_char() == Some('/') && self.peek_char(1) != Some('*')
    }

    /// Skip whitespace and comments without producing tokens.
    ///
    /// Clears the pushback slot: there is no token to unscan afterwards.
    pub fn skip_whitespace(&mut self) {
        loop {
            match self.current_char() {
                Some(ch) if is_whitespace(ch) => {
                    self.advance();
                }
                Some('/') if self.peek_char(1) == Some('*') => {
                    self.scan_comment();
                }
                _ => break,
            }
        }
        self.last = None;
    }

    /// Next raw token, whitespace and comments included.
    pub fn scan(&mut self) -> Token {
        self.last = Some(self.cursor);
        let pos = self.cursor.pos;

        let Some(ch) = self.current_char() else {
            return Token::new(TokenKind::Eof, pos, "");
        };

        match ch {
            c if is_whitespace(c) => self.scan_whitespace(),
            c if is_ident_first_char(c) => self.scan_ident(true),
            c if c.is_ascii_digit() => self.scan_number(),
            '.' if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            '.' => {
                self.advance();
                Token::new(TokenKind::Dot, pos, "")
            }
            '"' => self.scan_quoted_ident(),
            '\'' => match self.read_quoted() {
                Ok(s) => Token::new(TokenKind::String, pos, s),
                Err(bad) => bad,
            },
            '$' => self.scan_bound_param(),
            '/' if self.peek_char(1) == Some('*') => self.scan_comment(),
            c => self.scan_operator(c),
        }
    }

    /// Next token that is not whitespace or a comment.
    pub fn next_token(&mut self) -> Token {
        loop {
            let token = self.scan();
            if !matches!(token.kind, TokenKind::Ws | TokenKind::Comment) {
                return token;
            }
        }
    }

    /// Rewind to the start of the last scanned token.
    pub fn unscan(&mut self) {
        if let Some(cursor) = self.last.take() {
            self.cursor = cursor;
        }
    }

    /// Scan a `/.../` regex literal starting at the current character.
    ///
    /// `\/` yields a literal slash; any other backslash sequence is kept
    /// verbatim for the regex engine.
    pub fn scan_regex(&mut self) -> Token {
        self.last = Some(self.cursor);
        let pos = self.cursor.pos;

        if !self.eat('/') {
            return Token::new(TokenKind::BadRegex, pos, "");
        }

        let mut pattern = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => return Token::new(TokenKind::BadRegex, pos, pattern),
                Some('/') => return Token::new(TokenKind::Regex, pos, pattern),
                Some('\\') => {
                    if self.eat('/') {
                        pattern.push('/');
                    } else {
                        pattern.push('\\');
                    }
                }
                Some(ch) => pattern.push(ch),
            }
        }
    }

    fn scan_whitespace(&mut self) -> Token {
        let pos = self.cursor.pos;
        let mut lit = String::new();
        while let Some(ch) = self.current_char() {
            if !is_whitespace(ch) {
                break;
            }
            lit.push(ch);
            self.advance();
        }
        Token::new(TokenKind::Ws, pos, lit)
    }

    fn scan_comment(&mut self) -> Token {
        let pos = self.cursor.pos;
        self.advance();
        self.advance();

        let mut lit = String::new();
        while let Some(ch) = self.advance() {
            if ch == '*' && self.eat('/') {
                break;
            }
            lit.push(ch);
        }
        Token::new(TokenKind::Comment, pos, lit)
    }

    fn read_bare_ident(&mut self) -> String {
        let mut ident = String::new();
        while let Some(ch) = self.current_char() {
            if !is_ident_char(ch) {
                break;
            }
            ident.push(ch);
            self.advance();
        }
        ident
    }

    fn scan_ident(&mut self, lookup_keyword: bool) -> Token {
        let pos = self.cursor.pos;
        let mut ident = self.read_bare_ident();

        // A quote right after a bare word continues the same identifier.
        if self.current_char() == Some('"') {
            return match self.read_quoted() {
                Ok(rest) => {
                    ident.push_str(&rest);
                    Token::new(TokenKind::Ident, pos, ident)
                }
                Err(bad) => bad,
            };
        }

        if lookup_keyword {
            let kind = lookup(&ident);
            if kind != TokenKind::Ident {
                return Token::new(kind, pos, "");
            }
        }
        Token::new(TokenKind::Ident, pos, ident)
    }

    fn scan_quoted_ident(&mut self) -> Token {
        let pos = self.cursor.pos;
        match self.read_quoted() {
            Ok(ident) => Token::new(TokenKind::Ident, pos, ident),
            Err(bad) => bad,
        }
    }

    /// Read a quoted run starting at the opening quote, which also closes it.
    ///
    /// On failure the returned token is `BADSTRING` (at the position where
    /// input ran out) or `BADESCAPE` (at the escaped character).
    fn read_quoted(&mut self) -> Result<String, Token> {
        let Some(quote) = self.advance() else {
            return Err(Token::new(TokenKind::BadString, self.cursor.pos, ""));
        };

        let mut buf = String::new();
        loop {
            let pos = self.cursor.pos;
            match self.advance() {
                None | Some('\n') => return Err(Token::new(TokenKind::BadString, pos, buf)),
                Some(ch) if ch == quote => return Ok(buf),
                Some('\\') => {
                    let escape_pos = self.cursor.pos;
                    match self.advance() {
                        Some('n') => buf.push('\n'),
                        Some('\\') => buf.push('\\'),
                        Some('"') => buf.push('"'),
                        Some('\'') => buf.push('\''),
                        Some(other) => {
                            return Err(Token::new(
                                TokenKind::BadEscape,
                                escape_pos,
                                format!("\\{}", other),
                            ));
                        }
                        None => return Err(Token::new(TokenKind::BadEscape, escape_pos, "\\")),
                    }
                }
                Some(ch) => buf.push(ch),
            }
        }
    }

    fn scan_bound_param(&mut self) -> Token {
        let pos = self.cursor.pos;
        self.advance();

        let name = match self.current_char() {
            Some(ch) if is_ident_first_char(ch) => self.scan_ident(false),
            Some('"') => self.scan_quoted_ident(),
            _ => return Token::new(TokenKind::BoundParam, pos, "$"),
        };
        if name.kind != TokenKind::Ident {
            return name;
        }
        Token::new(TokenKind::BoundParam, pos, format!("${}", name.lit))
    }

    fn read_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.current_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            self.advance();
        }
        digits
    }

    fn scan_number(&mut self) -> Token {
        let pos = self.cursor.pos;
        let mut lit = self.read_digits();

        if self.eat('.') {
            let fraction = self.read_digits();
            if !fraction.is_empty() {
                lit.push('.');
                lit.push_str(&fraction);
            }
            return Token::new(TokenKind::Number, pos, lit);
        }
        Token::new(TokenKind::Integer, pos, lit)
    }

    fn scan_operator(&mut self, ch: char) -> Token {
        use TokenKind::*;

        let pos = self.cursor.pos;
        self.advance();

        let kind = match ch {
            '+' => Add,
            '-' => Sub,
            '*' => Mul,
            '/' => Div,
            '%' => Mod,
            '&' => BitwiseAnd,
            '|' => BitwiseOr,
            '^' => BitwiseXor,
            '=' if self.eat('~') => EqRegex,
            '=' => Eq,
            '!' if self.eat('=') => Neq,
            '!' if self.eat('~') => NeqRegex,
            '<' if self.eat('=') => Lte,
            '<' => Lt,
            '>' if self.eat('=') => Gte,
            '>' => Gt,
            '(' => LParen,
            ')' => RParen,
            ',' => Comma,
            ';' => Semicolon,
            other => return Token::new(Illegal, pos, other.to_string()),
        };
        Token::new(kind, pos, "")
    }
}

#[test]
fn test_keywords_are_case_insensitive() {
    let mut lexer = Lexer::new("select FROM Where and OR true FALSE as");
    let kinds: Vec<TokenKind> = std::iter::from_fn(|| {
        let tok = lexer.next_token();
        (tok.kind != TokenKind::Eof).then_some(tok.kind)
    })
    .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Select,
            TokenKind::From,
            TokenKind::Where,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::True,
            TokenKind::False,
            TokenKind::As,
        ]
    );
}

#[test]
fn test_where_clause() {
    let mut lexer = Lexer::new("RNAME = 'chr1' AND NM:i >= 2");
    assert_eq!(lexer.next_token(), Token::new(TokenKind::Ident, Pos::new(0, 0), "RNAME"));
    assert_eq!(lexer.next_token(), Token::new(TokenKind::Eq, Pos::new(0, 6), ""));
    assert_eq!(lexer.next_token(), Token::new(TokenKind::String, Pos::new(0, 8), "chr1"));
    assert_eq!(lexer.next_token(), Token::new(TokenKind::And, Pos::new(0, 15), ""));
    assert_eq!(lexer.next_token(), Token::new(TokenKind::Ident, Pos::new(0, 19), "NM:i"));
    assert_eq!(lexer.next_token(), Token::new(TokenKind::Gte, Pos::new(0, 24), ""));
    assert_eq!(lexer.next_token(), Token::new(TokenKind::Integer, Pos::new(0, 27), "2"));
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_unscan_rewinds_one_token() {
    let mut lexer = Lexer::new("a  b");
    assert_eq!(lexer.next_token().lit, "a");
    let b = lexer.next_token();
    lexer.unscan();
    assert_eq!(lexer.next_token(), b);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}
