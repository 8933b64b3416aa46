use std::fmt;

use crate::ast::tokens::TokenKind;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,

    // Bitwise
    /// Bitwise and (`&`)
    BitwiseAnd,
    /// Bitwise or (`|`)
    BitwiseOr,
    /// Bitwise xor (`^`)
    BitwiseXor,

    // Logical
    /// Logical AND (`AND`)
    And,
    /// Logical OR (`OR`)
    Or,

    // Comparison
    /// Equal (`=`)
    Eq,
    /// Not equal (`!=`)
    Neq,
    /// Regex match (`=~`)
    EqRegex,
    /// Regex not match (`!~`)
    NeqRegex,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Lte,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Gte,
}

impl BinOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Add => BinOp::Add,
            TokenKind::Sub => BinOp::Sub,
            TokenKind::Mul => BinOp::Mul,
            TokenKind::Div => BinOp::Div,
            TokenKind::Mod => BinOp::Mod,
            TokenKind::BitwiseAnd => BinOp::BitwiseAnd,
            TokenKind::BitwiseOr => BinOp::BitwiseOr,
            TokenKind::BitwiseXor => BinOp::BitwiseXor,
            TokenKind::And => BinOp::And,
            TokenKind::Or => BinOp::Or,
            TokenKind::Eq => BinOp::Eq,
            TokenKind::Neq => BinOp::Neq,
            TokenKind::EqRegex => BinOp::EqRegex,
            TokenKind::NeqRegex => BinOp::NeqRegex,
            TokenKind::Lt => BinOp::Lt,
            TokenKind::Lte => BinOp::Lte,
            TokenKind::Gt => BinOp::Gt,
            TokenKind::Gte => BinOp::Gte,
            _ => return None,
        };
        Some(op)
    }

    pub fn token(self) -> TokenKind {
        match self {
            BinOp::Add => TokenKind::Add,
            BinOp::Sub => TokenKind::Sub,
            BinOp::Mul => TokenKind::Mul,
            BinOp::Div => TokenKind::Div,
            BinOp::Mod => TokenKind::Mod,
            BinOp::BitwiseAnd => TokenKind::BitwiseAnd,
            BinOp::BitwiseOr => TokenKind::BitwiseOr,
            BinOp::BitwiseXor => TokenKind::BitwiseXor,
            BinOp::And => TokenKind::And,
            BinOp::Or => TokenKind::Or,
            BinOp::Eq => TokenKind::Eq,
            BinOp::Neq => TokenKind::Neq,
            BinOp::EqRegex => TokenKind::EqRegex,
            BinOp::NeqRegex => TokenKind::NeqRegex,
            BinOp::Lt => TokenKind::Lt,
            BinOp::Lte => TokenKind::Lte,
            BinOp::Gt => TokenKind::Gt,
            BinOp::Gte => TokenKind::Gte,
        }
    }

    pub fn precedence(self) -> u8 {
        self.token().precedence()
    }

    /// `=`, `!=`, `<`, `<=`, `>`, `>=` (regex operators excluded).
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Lte | BinOp::Gt | BinOp::Gte
        )
    }

    pub fn is_regex(self) -> bool {
        matches!(self, BinOp::EqRegex | BinOp::NeqRegex)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }

    /// Operators that turn a projection into a predicate.
    pub fn is_predicate(self) -> bool {
        self.is_ordering() || self.is_regex() || self.is_logical()
    }

    /// The operator that gives the same result with its operands swapped.
    pub fn flip(self) -> Self {
        match self {
            BinOp::Lt => BinOp::Gt,
            BinOp::Lte => BinOp::Gte,
            BinOp::Gt => BinOp::Lt,
            BinOp::Gte => BinOp::Lte,
            op => op,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().as_str())
    }
}
