use std::cmp::Ordering;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use regex::Regex;
use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{walk, BinOp, Expr, Node, Statement, Visitor},
    record::Record,
    resolver::{resolve, Accessor, BoolAccessor, FloatAccessor, IntAccessor, StrAccessor},
};

/// Errors raised while turning an expression into a predicate.
///
/// Every type error surfaces here, once, before any record is read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Operator with no meaning in a filter (arithmetic, `^`)
    #[error("unsupported operator, {0}")]
    UnsupportedOperator(BinOp),

    /// Operator not defined for the operand kind
    #[error("operator {op} cannot be applied to {kind} operands")]
    InvalidOperator { op: BinOp, kind: &'static str },

    #[error("{lhs} compared to {rhs} with {op}")]
    Mismatch {
        lhs: &'static str,
        op: BinOp,
        rhs: &'static str,
    },

    #[error("unsupported expression {0}")]
    UnsupportedExpression(String),

    #[error("tag {name} has type code {code}, which cannot be queried")]
    UnsupportedTagType { name: String, code: char },

    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("expression produces a {0}, not a boolean")]
    NotBoolean(&'static str),

    #[error("evaluation stack holds {0} values, expected 1")]
    Malformed(usize),
}

/// A compiled filter.
///
/// Cheap to clone; safe to share and call from several threads at once.
#[derive(Clone)]
pub struct Predicate(BoolAccessor);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&dyn Record) -> bool + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }

    pub fn constant(value: bool) -> Self {
        Predicate(constant(value))
    }

    pub fn matches(&self, record: &dyn Record) -> bool {
        (self.0)(record)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate")
    }
}

/// Compile an expression into a predicate.
pub fn compile(expr: &Expr) -> Result<Predicate, EvalError> {
    let mut evaluator = Evaluator::new();
    walk(&mut evaluator, Node::Expr(expr));
    evaluator.finish()
}

/// Compile the condition of a statement; no condition accepts every record.
pub fn compile_statement(statement: &Statement) -> Result<Predicate, EvalError> {
    match &statement.as_select().condition {
        Some(condition) => compile(condition),
        None => Ok(Predicate::constant(true)),
    }
}

// ============================================================================
// Operands
// ============================================================================

/// A partially reduced value on the evaluation stack.
#[derive(Clone)]
enum Operand {
    Predicate(BoolAccessor),
    Field(Accessor),
    Integer(i64),
    Unsigned(u64),
    Number(f64),
    Text(String),
    Boolean(bool),
    Regex(Regex),
}

impl Operand {
    fn kind(&self) -> &'static str {
        match self {
            Operand::Predicate(_) => "predicate",
            Operand::Field(Accessor::Int(_)) => "integer field",
            Operand::Field(Accessor::Float(_)) => "float field",
            Operand::Field(Accessor::Str(_)) => "string field",
            Operand::Field(Accessor::Bool(_)) => "boolean field",
            Operand::Integer(_) => "integer",
            Operand::Unsigned(_) => "unsigned integer",
            Operand::Number(_) => "number",
            Operand::Text(_) => "string",
            Operand::Boolean(_) => "boolean",
            Operand::Regex(_) => "regex",
        }
    }

    /// Boolean-shaped operands as a record test.
    fn bool_fn(&self) -> Option<BoolAccessor> {
        match self {
            Operand::Predicate(f) | Operand::Field(Accessor::Bool(f)) => Some(f.clone()),
            Operand::Boolean(b) => Some(constant(*b)),
            _ => None,
        }
    }
}

fn constant<T>(value: T) -> Arc<dyn Fn(&dyn Record) -> T + Send + Sync>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(move |_: &dyn Record| value.clone())
}

// ============================================================================
// Combination Rules
// ============================================================================

fn combine(lhs: Operand, rhs: Operand, op: BinOp) -> Result<Operand, EvalError> {
    use Accessor::{Float, Int, Str};
    use Operand::{Field, Integer, Number, Text};

    trace!(%op, lhs = lhs.kind(), rhs = rhs.kind(), "combining operands");

    if let (Some(l), Some(r)) = (lhs.bool_fn(), rhs.bool_fn()) {
        return bool_predicate(l, r, op);
    }

    match (lhs, rhs) {
        // Bitwise masks stay integer fields so they can be compared next.
        (Field(Int(a)), Integer(b)) if op == BinOp::BitwiseAnd => {
            Ok(Field(Int(Arc::new(move |r: &dyn Record| a(r) & b))))
        }
        (Field(Int(a)), Integer(b)) if op == BinOp::BitwiseOr => {
            Ok(Field(Int(Arc::new(move |r: &dyn Record| a(r) | b))))
        }
        (Field(Int(a)), Integer(b)) => int_predicate(a, constant(b), op),
        (Field(Int(a)), Field(Int(b))) => int_predicate(a, b, op),
        (Field(Int(a)), Field(Float(b))) => {
            int_predicate(a, Arc::new(move |r: &dyn Record| b(r) as i64), op)
        }
        (Field(Int(a)), Number(b)) => int_predicate(a, constant(b as i64), op),

        (Field(Float(a)), Number(b)) => float_predicate(a, constant(b as f32), op),
        (Field(Float(a)), Integer(b)) => float_predicate(a, constant(b as f32), op),
        (Field(Float(a)), Field(Float(b))) => float_predicate(a, b, op),
        (Field(Float(a)), Field(Int(b))) => {
            float_predicate(a, Arc::new(move |r: &dyn Record| b(r) as f32), op)
        }

        (Field(Str(a)), Operand::Regex(re)) => regex_predicate(a, re, op),
        (Field(Str(a)), Text(pattern)) if op.is_regex() => {
            regex_predicate(a, Regex::new(&pattern)?, op)
        }
        (Field(Str(a)), Text(b)) => str_predicate(a, constant(b), op),
        (Field(Str(a)), Field(Str(b))) => str_predicate(a, b, op),
        (Field(Str(a)), Integer(b)) => str_predicate(a, constant(b.to_string()), op),

        // Two plain words reduce now, and only through equality.
        (Text(a), Text(b)) if op == BinOp::Eq => Ok(Operand::Boolean(a == b)),
        (Text(_), Text(_)) => Err(EvalError::InvalidOperator {
            op,
            kind: "plain word",
        }),

        (lhs @ (Integer(_) | Number(_) | Text(_)), rhs @ Field(_)) => combine(rhs, lhs, op.flip()),

        (lhs, rhs) => Err(EvalError::Mismatch {
            lhs: lhs.kind(),
            op,
            rhs: rhs.kind(),
        }),
    }
}

fn ordering_test(op: BinOp) -> Option<fn(Ordering) -> bool> {
    let test: fn(Ordering) -> bool = match op {
        BinOp::Eq => Ordering::is_eq,
        BinOp::Neq => Ordering::is_ne,
        BinOp::Lt => Ordering::is_lt,
        BinOp::Lte => Ordering::is_le,
        BinOp::Gt => Ordering::is_gt,
        BinOp::Gte => Ordering::is_ge,
        _ => return None,
    };
    Some(test)
}

fn bool_predicate(a: BoolAccessor, b: BoolAccessor, op: BinOp) -> Result<Operand, EvalError> {
    // Both sides are always evaluated.
    let f: BoolAccessor = match op {
        BinOp::Eq => Arc::new(move |r: &dyn Record| a(r) == b(r)),
        BinOp::Neq => Arc::new(move |r: &dyn Record| a(r) != b(r)),
        BinOp::And => Arc::new(move |r: &dyn Record| a(r) & b(r)),
        BinOp::Or => Arc::new(move |r: &dyn Record| a(r) | b(r)),
        _ => return Err(EvalError::InvalidOperator { op, kind: "boolean" }),
    };
    Ok(Operand::Predicate(f))
}

fn int_predicate(a: IntAccessor, b: IntAccessor, op: BinOp) -> Result<Operand, EvalError> {
    let test = ordering_test(op).ok_or(EvalError::InvalidOperator { op, kind: "integer" })?;
    Ok(Operand::Predicate(Arc::new(move |r: &dyn Record| {
        test(a(r).cmp(&b(r)))
    })))
}

fn float_predicate(a: FloatAccessor, b: FloatAccessor, op: BinOp) -> Result<Operand, EvalError> {
    let test = ordering_test(op).ok_or(EvalError::InvalidOperator { op, kind: "float" })?;
    let unordered = op == BinOp::Neq;
    Ok(Operand::Predicate(Arc::new(move |r: &dyn Record| {
        a(r).partial_cmp(&b(r)).map_or(unordered, test)
    })))
}

fn str_predicate(a: StrAccessor, b: StrAccessor, op: BinOp) -> Result<Operand, EvalError> {
    let test = ordering_test(op).ok_or(EvalError::InvalidOperator { op, kind: "string" })?;
    Ok(Operand::Predicate(Arc::new(move |r: &dyn Record| {
        test(a(r).cmp(&b(r)))
    })))
}

fn regex_predicate(a: StrAccessor, re: Regex, op: BinOp) -> Result<Operand, EvalError> {
    let expected = match op {
        BinOp::EqRegex => true,
        BinOp::NeqRegex => false,
        _ => return Err(EvalError::InvalidOperator { op, kind: "regex" }),
    };
    Ok(Operand::Predicate(Arc::new(move |r: &dyn Record| {
        re.is_match(&a(r)) == expected
    })))
}

// ============================================================================
// Evaluator
// ============================================================================

/// Reduces an expression bottom-up on an explicit operand stack.
#[derive(Default)]
pub struct Evaluator {
    stack: Vec<Operand>,
    error: Option<EvalError>,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::default()
    }

    /// Consume the evaluator once the walk is done.
    pub fn finish(mut self) -> Result<Predicate, EvalError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.stack.len() != 1 {
            return Err(EvalError::Malformed(self.stack.len()));
        }
        let operand = self.pop()?;
        match operand.bool_fn() {
            Some(f) => Ok(Predicate(f)),
            None => Err(EvalError::NotBoolean(operand.kind())),
        }
    }

    fn pop(&mut self) -> Result<Operand, EvalError> {
        self.stack.pop().ok_or(EvalError::Malformed(0))
    }

    fn fail(&mut self, err: EvalError) -> ControlFlow<()> {
        if self.error.is_none() {
            self.error = Some(err);
        }
        ControlFlow::Break(())
    }

    fn reduce(&mut self, op: BinOp) -> Result<(), EvalError> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        let result = combine(lhs, rhs, op)?;
        self.stack.push(result);
        Ok(())
    }
}

fn is_reducible(op: BinOp) -> bool {
    op.is_ordering()
        || op.is_regex()
        || op.is_logical()
        || matches!(op, BinOp::BitwiseAnd | BinOp::BitwiseOr)
}

impl Visitor for Evaluator {
    fn visit(&mut self, node: Node<'_>) -> ControlFlow<()> {
        if self.error.is_some() {
            return ControlFlow::Break(());
        }
        let Node::Expr(expr) = node else {
            return ControlFlow::Continue(());
        };

        let operand = match expr {
            Expr::Binary { op, lhs, rhs } => {
                if !is_reducible(*op) {
                    return self.fail(EvalError::UnsupportedOperator(*op));
                }
                walk(self, Node::Expr(lhs));
                walk(self, Node::Expr(rhs));
                if self.error.is_none()
                    && let Err(err) = self.reduce(*op)
                {
                    return self.fail(err);
                }
                return ControlFlow::Break(());
            }
            Expr::Paren(inner) => {
                walk(self, Node::Expr(inner));
                return ControlFlow::Break(());
            }
            Expr::VarRef(name) => match resolve(name) {
                Ok(Some(accessor)) => Operand::Field(accessor),
                Ok(None) => Operand::Text(name.clone()),
                Err(err) => return self.fail(err),
            },
            Expr::String(s) => Operand::Text(s.clone()),
            Expr::Number(n) => Operand::Number(*n),
            Expr::Integer(n) => Operand::Integer(*n),
            Expr::Unsigned(n) => Operand::Unsigned(*n),
            Expr::Boolean(b) => Operand::Boolean(*b),
            Expr::Regex(re) => Operand::Regex(re.regex().clone()),
            Expr::Call { .. } | Expr::Wildcard | Expr::Nil => {
                return self.fail(EvalError::UnsupportedExpression(expr.to_string()));
            }
        };

        self.stack.push(operand);
        ControlFlow::Break(())
    }
}
