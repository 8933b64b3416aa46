//! samql: filter alignment records with SQL-like `WHERE` clauses.
//!
//! ```
//! use samql::{where_clause, SamRecord};
//!
//! let filter = where_clause("RNAME = 'chr1' AND FLAG & 16 = 16").unwrap();
//! let record: SamRecord = "r1\t16\tchr1\t10\t30\t4M\t*\t0\t0\tACGT\t*".parse().unwrap();
//! assert!(filter.matches(&record));
//! ```
pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod reader;
pub mod record;
pub mod resolver;
pub mod sam;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

use thiserror::Error;
use tracing::debug;

pub use ast::{BinOp, Expr, Pos, SelectStatement, Statement, Token, TokenKind};
pub use evaluator::{compile, compile_statement, EvalError, Evaluator, Predicate};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Params, Parser};
pub use reader::Reader;
pub use record::Record;
pub use sam::{Header, SamReader, SamRecord};
pub use value::Value;

/// Failure to turn a query into a predicate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Compile the condition of a `WHERE` clause into a predicate.
pub fn where_clause(query: &str) -> Result<Predicate, Error> {
    where_clause_with_params(query, Params::new())
}

/// Like [`where_clause`], substituting `$name` bound parameters.
pub fn where_clause_with_params(query: &str, params: Params) -> Result<Predicate, Error> {
    let text = format!("SELECT * FROM records WHERE {}", query);
    let statement = Parser::new(Lexer::new(&text))
        .with_params(params)
        .parse_statement()?;
    debug!(query, statement = %statement, "compiling WHERE clause");
    Ok(compile_statement(&statement)?)
}
