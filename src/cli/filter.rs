//! Filter SAM input with a WHERE clause

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use tracing::{debug, info};

use crate::{
    output::SamWriter, where_clause_with_params, Header, Params, Predicate, Reader, SamReader,
};
use super::CliError;

/// Options for the filter command
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// WHERE clause; empty or missing keeps every record
    pub query: Option<String>,
    /// Bound parameter values
    pub params: Params,
    /// Print only the number of matching records
    pub count: bool,
    /// SAM files, `-` for stdin
    pub inputs: Vec<String>,
}

/// Compile the options' WHERE clause, if there is one.
pub fn compile_filter(options: &FilterOptions) -> Result<Option<Predicate>, CliError> {
    match options.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => {
            Ok(Some(where_clause_with_params(query, options.params.clone())?))
        }
        _ => Ok(None),
    }
}

fn open_input(path: &str) -> Result<SamReader<Box<dyn BufRead>>, CliError> {
    let input: Box<dyn BufRead> = if path == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(path).map_err(|source| CliError::Open {
            path: path.to_string(),
            source,
        })?;
        Box::new(BufReader::new(file))
    };
    debug!(path, "opened input");
    Ok(SamReader::new(input)?)
}

/// Execute the filter command, writing to `out`. Returns the match count.
pub fn execute_filter<W: Write>(options: &FilterOptions, out: W) -> Result<usize, CliError> {
    if options.inputs.is_empty() {
        return Err(CliError::NoInput);
    }
    // Compile before opening anything so a bad query fails fast.
    let filter = compile_filter(options)?;
    let sources = options
        .inputs
        .iter()
        .map(|path| open_input(path))
        .collect::<Result<Vec<_>, _>>()?;
    filter_sources(filter.as_ref(), sources, options.count, out)
}

/// Write the merged header and every matching record of `sources`, or only
/// their count.
pub fn filter_sources<R: BufRead, W: Write>(
    filter: Option<&Predicate>,
    sources: Vec<SamReader<R>>,
    count: bool,
    out: W,
) -> Result<usize, CliError> {
    let mut writer = SamWriter::new(out);

    if !count {
        let mut header = Header::default();
        for source in &sources {
            header.merge(source.header());
        }
        writer.write_header(&header)?;
    }

    let mut matched = 0;
    for source in sources {
        let mut reader = Reader::new(source);
        if let Some(filter) = filter {
            reader.append_filter(filter.clone());
        }
        for record in reader {
            let record = record?;
            matched += 1;
            if !count {
                writer.write_record(&record)?;
            }
        }
    }

    if count {
        writer.write_count(matched)?;
    }
    writer.flush()?;
    info!(matched, "filtered records");
    Ok(matched)
}
