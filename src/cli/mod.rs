//! CLI support for samql
//!
//! Provides programmatic access to the samql commands so they can be
//! embedded in other tools and tested without a process.

mod check;
mod convert;
mod fields;
mod filter;

pub use check::execute_check;
pub use convert::{parse_param, parse_params};
pub use fields::fields_overview;
pub use filter::{compile_filter, execute_filter, filter_sources, FilterOptions};

use std::io;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid SAM input: {0}")]
    Sam(#[from] crate::sam::SamError),

    #[error("cannot open {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid parameter {0:?}: expected name=value")]
    InvalidParam(String),

    #[error("invalid log level filter: {0}")]
    LogLevel(String),

    #[error("No input provided. Pass SAM files, or - to read stdin.")]
    NoInput,
}

impl From<crate::Error> for CliError {
    fn from(e: crate::Error) -> Self {
        match e {
            crate::Error::Parse(e) => CliError::Parse(e),
            crate::Error::Eval(e) => CliError::Eval(e),
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over `log_level`.
pub fn init_tracing(log_level: &str) -> Result<(), CliError> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level).map_err(|_| CliError::LogLevel(log_level.to_string()))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}
