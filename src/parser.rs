use std::collections::HashMap;
use std::ops::ControlFlow;

use thiserror::Error;

use crate::{
    ast::{
        walk, BinOp, Expr, Field, Fields, Node, Pos, RegexLiteral, SelectStatement, Statement,
        Table, Token, TokenKind, Visitor,
    },
    lexer::{LexError, Lexer},
};

/// Values substituted for `$name` bound parameters at parse time.
pub type Params = HashMap<String, serde_json::Value>;

/// Errors raised while parsing a query.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A token other than the ones the grammar allows here
    #[error("found {found}, expected {} at {pos}", .expected.join(", "))]
    Unexpected {
        found: String,
        expected: Vec<&'static str>,
        pos: Pos,
    },

    #[error("{message} at {pos}")]
    Invalid { message: String, pos: Pos },

    #[error(transparent)]
    Lex(#[from] LexError),

    /// Comparison or logical operator inside a field expression
    #[error("invalid operator {op} in SELECT clause at {pos}; operator is intended for WHERE clause")]
    InvalidSelectOperator { op: BinOp, pos: Pos },

    #[error("empty bound parameter at {pos}")]
    EmptyParameter { pos: Pos },

    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("unable to bind parameter {name} with type {kind}")]
    UnsupportedParameter { name: String, kind: &'static str },

    #[error("constant -{0} underflows int64")]
    Underflow(u64),
}

impl ParseError {
    fn unexpected(token: &Token, expected: &[&'static str]) -> Self {
        if let Some(err) = LexError::from_token(token) {
            return ParseError::Lex(err);
        }
        ParseError::Unexpected {
            found: token.describe(),
            expected: expected.to_vec(),
            pos: token.pos,
        }
    }

    fn invalid(message: impl Into<String>, pos: Pos) -> Self {
        ParseError::Invalid {
            message: message.into(),
            pos,
        }
    }
}

/// Parse a standalone expression; the whole input must be consumed.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(input)).parse()
}

/// Parse one statement.
pub fn parse_statement(input: &str) -> Result<Statement, ParseError> {
    Parser::new(Lexer::new(input)).parse_statement()
}

pub struct Parser {
    lexer: Lexer,
    params: Params,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Parser {
            lexer,
            params: Params::new(),
        }
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Parse an expression and require end of input after it.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        let token = self.lexer.next_token();
        if token.kind != TokenKind::Eof {
            return Err(ParseError::unexpected(&token, &["EOF"]));
        }
        Ok(expr)
    }

    /// Parse `SELECT <fields> FROM <ident> [WHERE <expr>] [;]` up to end of input.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.lexer.next_token();
        if token.kind != TokenKind::Select {
            return Err(ParseError::unexpected(&token, &["SELECT"]));
        }
        let select = self.parse_select()?;

        let mut token = self.lexer.next_token();
        if token.kind == TokenKind::Semicolon {
            token = self.lexer.next_token();
            if token.kind != TokenKind::Eof {
                return Err(ParseError::unexpected(&token, &["EOF"]));
            }
        } else if token.kind != TokenKind::Eof {
            return Err(ParseError::unexpected(&token, &[";", "EOF"]));
        }

        Ok(Statement::Select(select))
    }

    fn parse_select(&mut self) -> Result<SelectStatement, ParseError> {
        let fields = self.parse_fields()?;

        let token = self.lexer.next_token();
        if token.kind != TokenKind::From {
            return Err(ParseError::unexpected(&token, &["FROM"]));
        }
        let source = Table {
            name: self.parse_ident()?,
        };

        let token = self.lexer.next_token();
        let condition = if token.kind == TokenKind::Where {
            Some(self.parse_expr()?)
        } else {
            self.lexer.unscan();
            None
        };

        Ok(SelectStatement {
            fields,
            source,
            condition,
        })
    }

    fn parse_fields(&mut self) -> Result<Fields, ParseError> {
        let mut fields = vec![self.parse_field()?];
        loop {
            let token = self.lexer.next_token();
            if token.kind != TokenKind::Comma {
                self.lexer.unscan();
                return Ok(Fields(fields));
            }
            fields.push(self.parse_field()?);
        }
    }

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let expr = match self.parse_regex()? {
            Some(re) => Expr::Regex(re),
            None => {
                let start = self.lexer.next_token().pos;
                self.lexer.unscan();

                let expr = self.parse_expr()?;
                let mut validator = FieldValidator::default();
                walk(&mut validator, Node::Expr(&expr));
                if let Some(op) = validator.invalid {
                    return Err(ParseError::InvalidSelectOperator { op, pos: start });
                }
                expr
            }
        };

        let alias = self.parse_alias()?;
        Ok(Field { expr, alias })
    }

    fn parse_alias(&mut self) -> Result<Option<String>, ParseError> {
        let token = self.lexer.next_token();
        if token.kind != TokenKind::As {
            self.lexer.unscan();
            return Ok(None);
        }
        self.parse_ident().map(Some)
    }

    fn parse_ident(&mut self) -> Result<String, ParseError> {
        let token = self.lexer.next_token();
        if token.kind != TokenKind::Ident {
            return Err(ParseError::unexpected(&token, &["identifier"]));
        }
        Ok(token.lit)
    }

    /// Parse a binary expression by precedence climbing.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut root = self.parse_unary_expr()?;

        loop {
            let token = self.lexer.next_token();
            let Some(op) = BinOp::from_token(token.kind) else {
                self.lexer.unscan();
                return Ok(root);
            };

            let rhs = if op.is_regex() {
                match self.parse_regex()? {
                    Some(re) => Expr::Regex(re),
                    None => {
                        let token = self.lexer.next_token();
                        return Err(ParseError::unexpected(&token, &["regex"]));
                    }
                }
            } else {
                self.parse_unary_expr()?
            };

            root = insert_binary(root, op, rhs);
        }
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, ParseError> {
        let token = self.lexer.next_token();
        match token.kind {
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                let close = self.lexer.next_token();
                if close.kind != TokenKind::RParen {
                    return Err(ParseError::unexpected(&close, &[")"]));
                }
                Ok(Expr::Paren(Box::new(expr)))
            }
            TokenKind::Ident => {
                if self.lexer.scan().kind == TokenKind::LParen {
                    return self.parse_call(&token.lit);
                }
                self.lexer.unscan();
                Ok(Expr::VarRef(token.lit))
            }
            TokenKind::String => Ok(Expr::String(token.lit)),
            TokenKind::Number => token
                .lit
                .parse::<f64>()
                .map(Expr::Number)
                .map_err(|_| ParseError::invalid("unable to parse number", token.pos)),
            TokenKind::Integer => match token.lit.parse::<i64>() {
                Ok(n) => Ok(Expr::Integer(n)),
                Err(_) => token
                    .lit
                    .parse::<u64>()
                    .map(Expr::Unsigned)
                    .map_err(|_| ParseError::invalid("unable to parse integer", token.pos)),
            },
            TokenKind::True => Ok(Expr::Boolean(true)),
            TokenKind::False => Ok(Expr::Boolean(false)),
            TokenKind::Mul => Ok(Expr::Wildcard),
            TokenKind::BoundParam => self.bind_parameter(&token),
            TokenKind::Add | TokenKind::Sub => self.parse_signed(token.kind == TokenKind::Sub),
            _ => Err(ParseError::unexpected(
                &token,
                &["identifier", "string", "number", "bool"],
            )),
        }
    }

    /// Fold a sign into a numeric literal, or multiply anything else by ±1.
    fn parse_signed(&mut self, negate: bool) -> Result<Expr, ParseError> {
        let next = self.lexer.next_token();
        if !matches!(
            next.kind,
            TokenKind::Number | TokenKind::Integer | TokenKind::LParen | TokenKind::Ident
        ) {
            return Err(ParseError::unexpected(&next, &["identifier", "number", "("]));
        }
        self.lexer.unscan();

        match self.parse_unary_expr()? {
            Expr::Number(n) => Ok(Expr::Number(if negate { -n } else { n })),
            Expr::Integer(n) => Ok(Expr::Integer(if negate { -n } else { n })),
            Expr::Unsigned(n) if !negate => Ok(Expr::Unsigned(n)),
            Expr::Unsigned(n) if n == i64::MIN.unsigned_abs() => Ok(Expr::Integer(i64::MIN)),
            Expr::Unsigned(n) => Err(ParseError::Underflow(n)),
            operand @ (Expr::VarRef(_) | Expr::Call { .. } | Expr::Paren(_)) => {
                let sign = if negate { -1 } else { 1 };
                Ok(Expr::binary(BinOp::Mul, Expr::Integer(sign), operand))
            }
            other => Err(ParseError::invalid(
                format!("unexpected operand {} after sign", other),
                next.pos,
            )),
        }
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr, ParseError> {
        let name = name.to_lowercase();
        let mut args = Vec::new();

        let token = self.lexer.next_token();
        if token.kind == TokenKind::RParen {
            return Ok(Expr::Call { name, args });
        }
        self.lexer.unscan();

        loop {
            let arg = match self.parse_regex()? {
                Some(re) => Expr::Regex(re),
                None => self.parse_expr()?,
            };
            args.push(arg);

            let token = self.lexer.next_token();
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RParen => return Ok(Expr::Call { name, args }),
                _ => return Err(ParseError::unexpected(&token, &[",", ")"])),
            }
        }
    }

    /// Parse a regex literal if one starts at the next non-blank character.
    fn parse_regex(&mut self) -> Result<Option<RegexLiteral>, ParseError> {
        self.lexer.skip_whitespace();
        if !self.lexer.at_regex() {
            return Ok(None);
        }

        let token = self.lexer.scan_regex();
        if token.kind != TokenKind::Regex {
            return Err(ParseError::unexpected(&token, &["regex"]));
        }
        RegexLiteral::new(&token.lit)
            .map(Some)
            .map_err(|err| ParseError::invalid(err.to_string(), token.pos))
    }

    fn bind_parameter(&self, token: &Token) -> Result<Expr, ParseError> {
        let name = token.lit.strip_prefix('$').unwrap_or(&token.lit);
        if name.is_empty() {
            return Err(ParseError::EmptyParameter { pos: token.pos });
        }

        let value = self
            .params
            .get(name)
            .ok_or_else(|| ParseError::MissingParameter(name.to_string()))?;

        let unsupported = |kind| ParseError::UnsupportedParameter {
            name: name.to_string(),
            kind,
        };

        match value {
            serde_json::Value::Bool(b) => Ok(Expr::Boolean(*b)),
            serde_json::Value::String(s) => Ok(Expr::String(s.clone())),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Expr::Integer(i))
                } else if n.is_f64() {
                    n.as_f64().map(Expr::Number).ok_or_else(|| unsupported("number"))
                } else {
                    Err(unsupported("unsigned integer"))
                }
            }
            serde_json::Value::Null => Err(unsupported("null")),
            serde_json::Value::Array(_) => Err(unsupported("array")),
            serde_json::Value::Object(_) => Err(unsupported("object")),
        }
    }
}

/// Place `op` so that it binds tighter than every operator above it on the
/// right spine and no tighter than the one it lands under.
fn insert_binary(node: Expr, op: BinOp, rhs: Expr) -> Expr {
    match node {
        Expr::Binary {
            op: current,
            lhs,
            rhs: inner,
        } if current.precedence() < op.precedence() => Expr::Binary {
            op: current,
            lhs,
            rhs: Box::new(insert_binary(*inner, op, rhs)),
        },
        node => Expr::binary(op, node, rhs),
    }
}

/// Finds the first predicate operator in a field expression.
#[derive(Default)]
struct FieldValidator {
    invalid: Option<BinOp>,
}

impl Visitor for FieldValidator {
    fn visit(&mut self, node: Node<'_>) -> ControlFlow<()> {
        if self.invalid.is_some() {
            return ControlFlow::Break(());
        }
        if let Node::Expr(Expr::Binary { op, .. }) = node
            && op.is_predicate()
        {
            self.invalid = Some(*op);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }
}
