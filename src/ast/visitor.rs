//! Depth-first traversal over statements and expressions.

use std::ops::ControlFlow;

use crate::ast::{Expr, Field, Fields, SelectStatement, Statement, Table};

/// A borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Select(&'a SelectStatement),
    Fields(&'a Fields),
    Field(&'a Field),
    Table(&'a Table),
    Expr(&'a Expr),
}

impl<'a> From<&'a Statement> for Node<'a> {
    fn from(statement: &'a Statement) -> Self {
        Node::Select(statement.as_select())
    }
}

impl<'a> From<&'a SelectStatement> for Node<'a> {
    fn from(select: &'a SelectStatement) -> Self {
        Node::Select(select)
    }
}

impl<'a> From<&'a Expr> for Node<'a> {
    fn from(expr: &'a Expr) -> Self {
        Node::Expr(expr)
    }
}

/// Called once per node, parent before children.
///
/// Returning `ControlFlow::Break` skips the node's children; siblings are
/// still visited.
pub trait Visitor {
    fn visit(&mut self, node: Node<'_>) -> ControlFlow<()>;
}

/// Walk `node` and its structural children in pre-order.
pub fn walk<V: Visitor + ?Sized>(visitor: &mut V, node: Node<'_>) {
    if visitor.visit(node).is_break() {
        return;
    }

    match node {
        Node::Select(select) => {
            walk(visitor, Node::Fields(&select.fields));
            walk(visitor, Node::Table(&select.source));
            if let Some(condition) = &select.condition {
                walk(visitor, Node::Expr(condition));
            }
        }
        Node::Fields(fields) => {
            for field in fields.iter() {
                walk(visitor, Node::Field(field));
            }
        }
        Node::Field(field) => walk(visitor, Node::Expr(&field.expr)),
        Node::Table(_) => {}
        Node::Expr(expr) => match expr {
            Expr::Binary { lhs, rhs, .. } => {
                walk(visitor, Node::Expr(lhs));
                walk(visitor, Node::Expr(rhs));
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    walk(visitor, Node::Expr(arg));
                }
            }
            Expr::Paren(inner) => walk(visitor, Node::Expr(inner)),
            _ => {}
        },
    }
}

struct FnVisitor<F>(F);

impl<F> Visitor for FnVisitor<F>
where
    F: FnMut(Node<'_>) -> bool,
{
    fn visit(&mut self, node: Node<'_>) -> ControlFlow<()> {
        if (self.0)(node) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }
}

/// Walk with a closure; returning `false` skips the node's children.
pub fn walk_fn<F>(node: Node<'_>, f: F)
where
    F: FnMut(Node<'_>) -> bool,
{
    walk(&mut FnVisitor(f), node);
}
