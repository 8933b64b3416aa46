use std::fmt;

use regex::Regex;

use crate::ast::quote::{quote_ident, quote_regex, quote_string};
use crate::ast::visitor::{walk_fn, Node};
use crate::ast::BinOp;

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Rendering an expression with `Display` produces query text that parses
/// back into the same tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // References
    /// Identifier reference, resolved to a record field during evaluation
    ///
    /// # Examples
    /// ```text
    /// RNAME
    /// NM:i
    /// "odd name"
    /// ```
    VarRef(String),

    /// Function call, kept for rendering only
    ///
    /// # Example
    /// ```text
    /// count(value, /^x/)
    /// ```
    Call { name: String, args: Vec<Expr> },

    // Literals
    /// Floating point literal
    ///
    /// # Example
    /// ```text
    /// 0.0903
    /// ```
    Number(f64),

    /// Signed integer literal
    Integer(i64),

    /// Integer literal too large for `i64`
    ///
    /// # Example
    /// ```text
    /// 9223372036854775808
    /// ```
    Unsigned(u64),

    /// Boolean literal
    Boolean(bool),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// 'chr1'
    /// ```
    String(String),

    /// Compiled regular expression
    ///
    /// # Example
    /// ```text
    /// /^chr[0-9]+/
    /// ```
    Regex(RegexLiteral),

    // Operations
    /// Parenthesized expression
    Paren(Box<Expr>),

    /// Binary operation (arithmetic, bitwise, comparison, logical)
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `*` in a field list
    Wildcard,

    /// Placeholder, never produced by the parser
    Nil,
}

impl Expr {
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::VarRef(name.into())
    }

    /// Derived name of the expression.
    ///
    /// A binary expression joins every identifier and call name found in
    /// it with `_`; call arguments do not contribute.
    ///
    /// ```
    /// use samql::parser::parse_expr;
    ///
    /// let expr = parse_expr("(POS + mean(value)) * MAPQ").unwrap();
    /// assert_eq!(expr.name(), "POS_mean_MAPQ");
    /// ```
    pub fn name(&self) -> String {
        match self {
            Expr::VarRef(name) => name.clone(),
            Expr::Call { name, .. } => name.clone(),
            Expr::Paren(inner) => inner.name(),
            Expr::Binary { .. } => {
                let mut names = Vec::new();
                walk_fn(Node::Expr(self), |node| match node {
                    Node::Expr(Expr::VarRef(name)) => {
                        names.push(name.clone());
                        true
                    }
                    Node::Expr(Expr::Call { name, .. }) => {
                        names.push(name.clone());
                        false
                    }
                    _ => true,
                });
                names.join("_")
            }
            _ => String::new(),
        }
    }

    /// Rendered as unary minus, the form the parser builds it from.
    fn as_negation(&self) -> Option<&Expr> {
        match self {
            Expr::Binary {
                op: BinOp::Mul,
                lhs,
                rhs,
            } if matches!(**lhs, Expr::Integer(-1))
                && matches!(**rhs, Expr::VarRef(_) | Expr::Call { .. } | Expr::Paren(_)) =>
            {
                Some(rhs)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::VarRef(name) => f.write_str(&quote_ident(name)),
            Expr::Call { name, args } => {
                write!(f, "{}(", quote_ident(name))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expr::Number(n) => {
                let text = n.to_string();
                if text.contains(['.', 'e', 'E', 'N', 'i']) {
                    f.write_str(&text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
            Expr::Integer(n) => write!(f, "{}", n),
            Expr::Unsigned(n) => write!(f, "{}", n),
            Expr::Boolean(b) => write!(f, "{}", b),
            Expr::String(s) => f.write_str(&quote_string(s)),
            Expr::Regex(re) => write!(f, "{}", re),
            Expr::Paren(inner) => write!(f, "({})", inner),
            Expr::Binary { op, lhs, rhs } => match self.as_negation() {
                Some(operand) => write!(f, "-{}", operand),
                None => write!(f, "{} {} {}", lhs, op, rhs),
            },
            Expr::Wildcard => f.write_str("*"),
            Expr::Nil => f.write_str("nil"),
        }
    }
}

/// A regex literal, compiled once at parse time.
#[derive(Debug, Clone)]
pub struct RegexLiteral(Regex);

impl RegexLiteral {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(RegexLiteral)
    }

    pub fn pattern(&self) -> &str {
        self.0.as_str()
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern()
    }
}

impl fmt::Display for RegexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_regex(self.pattern()))
    }
}
