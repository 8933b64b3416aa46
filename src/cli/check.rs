//! Validate a WHERE clause without reading any records

use crate::{compile_statement, Lexer, Params, Parser};
use super::CliError;

/// Parse and compile `query`, returning the normalized statement text.
///
/// Compiling catches type errors too, not just syntax errors.
pub fn execute_check(query: &str, params: &Params) -> Result<String, CliError> {
    let text = format!("SELECT * FROM records WHERE {}", query);
    let statement = Parser::new(Lexer::new(&text))
        .with_params(params.clone())
        .parse_statement()?;
    compile_statement(&statement)?;
    Ok(statement.to_string())
}
