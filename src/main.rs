use clap::{Parser as ClapParser, Subcommand};
use samql::cli::{self, CliError, FilterOptions};
use std::io::{self, BufWriter, Write};

#[derive(ClapParser)]
#[command(name = "samql")]
#[command(about = "samql - Filter SAM alignment records with SQL-like WHERE clauses")]
#[command(version)]
struct Cli {
    /// Log filter for stderr output (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "SAMQL_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the records matching a WHERE clause
    Filter {
        /// The WHERE clause, e.g. "RNAME = 'chr1' AND MAPQ >= 30"
        #[arg(short, long = "where")]
        query: Option<String>,

        /// Print only the number of matching records
        #[arg(short, long)]
        count: bool,

        /// Bound parameter as name=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,

        /// SAM files to read, - for stdin (reads stdin if none are given)
        inputs: Vec<String>,
    },

    /// Validate a WHERE clause and print its normalized form
    Check {
        /// The WHERE clause to validate
        query: String,

        /// Bound parameter as name=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// List the fields a WHERE clause can reference
    Fields,
}

fn main() {
    let cli = Cli::parse();

    let result = cli::init_tracing(&cli.log_level).and_then(|()| match cli.command {
        Commands::Filter {
            query,
            count,
            params,
            inputs,
        } => run_filter(query, count, &params, inputs),
        Commands::Check { query, params } => run_check(&query, &params),
        Commands::Fields => {
            print!("{}", cli::fields_overview());
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_filter(
    query: Option<String>,
    count: bool,
    params: &[String],
    mut inputs: Vec<String>,
) -> Result<(), CliError> {
    if inputs.is_empty() && !atty::is(atty::Stream::Stdin) {
        inputs.push("-".to_string());
    }

    let options = FilterOptions {
        query,
        params: cli::parse_params(params)?,
        count,
        inputs,
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    cli::execute_filter(&options, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run_check(query: &str, params: &[String]) -> Result<(), CliError> {
    let params = cli::parse_params(params)?;
    println!("{}", cli::execute_check(query, &params)?);
    Ok(())
}
