//! Command-line text to bound parameter conversion

use crate::Params;
use super::CliError;

/// Split `name=value` and decode the value as JSON.
///
/// A value that is not valid JSON is taken as a plain string, so
/// `chrom=chr1` and `chrom="chr1"` bind the same thing.
pub fn parse_param(arg: &str) -> Result<(String, serde_json::Value), CliError> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| CliError::InvalidParam(arg.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidParam(arg.to_string()));
    }

    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

pub fn parse_params<S: AsRef<str>>(args: &[S]) -> Result<Params, CliError> {
    args.iter().map(|arg| parse_param(arg.as_ref())).collect()
}
