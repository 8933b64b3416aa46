//! # samql - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for samql, a small SQL-like
//! language for selecting alignment records with a `WHERE` clause.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Token kinds, positions and the keyword table
//! - **[operators]** - Binary operators and their precedence
//! - **[expressions]** - Expression nodes (references, literals, operations)
//! - **[statements]** - `SELECT` statements, fields and sources
//! - **[visitor]** - Depth-first pre-order traversal
//! - **[quote]** - Quoting rules used when rendering back to text
//!
//! ## Quick Start
//!
//! ```text
//! SELECT * FROM records WHERE RNAME = 'chr1' AND POS > 100
//! ```
//!
//! Only the condition after `WHERE` is evaluated; the field list and source
//! are parsed and rendered but carry no runtime meaning.
//!
//! ## Operator Precedence
//!
//! From loosest to tightest binding; equal precedence associates left:
//!
//! | Level | Operators |
//! |---|---|
//! | 1 | `OR` |
//! | 2 | `AND` |
//! | 3 | `=` `!=` `=~` `!~` `<` `<=` `>` `>=` |
//! | 4 | `+` `-` `\|` `^` |
//! | 5 | `*` `/` `%` `&` |
//!
//! ## Examples
//!
//! ### Flag Bits
//!
//! ```text
//! FLAG & 16 = 16
//! PAIRED AND READ1 AND SECONDARY = FALSE
//! ```
//!
//! ### Optional Tags
//!
//! ```text
//! NM:i >= 3 AND MD:Z =~ /^[0-9]+$/
//! ```
//!
//! ### Round Trip
//!
//! Every expression renders to text that parses back into the same tree:
//!
//! ```
//! use samql::parser::parse_expr;
//!
//! let expr = parse_expr("RNAME = 'chr1' AND (POS>15 OR NM:i = 1)").unwrap();
//! assert_eq!(expr.to_string(), "RNAME = 'chr1' AND (POS > 15 OR NM:i = 1)");
//! assert_eq!(parse_expr(&expr.to_string()).unwrap(), expr);
//! ```
pub mod tokens;
pub mod operators;
pub mod expressions;
pub mod statements;
pub mod visitor;
pub mod quote;

pub use tokens::{Pos, Token, TokenKind};
pub use expressions::{Expr, RegexLiteral};
pub use operators::BinOp;
pub use statements::{Field, Fields, SelectStatement, Statement, Table};
pub use visitor::{walk, walk_fn, Node, Visitor};
