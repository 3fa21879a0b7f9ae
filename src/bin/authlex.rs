//! `authlex` CLI: BM25 lookup over the auth reference tables.

#[cfg(feature = "cli")]
use authlex::{render, CatalogConfig, Domain, Searcher, Stack};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(author, version, about = "Auth reference lookup", long_about = None)]
struct Args {
    /// Query terms.
    #[arg(required = true)]
    query: Vec<String>,

    /// Domain to search (auto-detected from the query when omitted).
    #[arg(short, long, value_enum)]
    domain: Option<Domain>,

    /// Search a stack's guideline table instead of a domain.
    #[arg(short, long, value_enum)]
    stack: Option<Stack>,

    /// Maximum number of results (defaults to the catalog setting).
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// Print JSON instead of markdown.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Directory holding the CSV tables. The default `data` is resolved against the
    /// current working directory, not the binary's location.
    #[arg(long, env = "AUTHLEX_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// TOML catalog overrides.
    #[arg(long, env = "AUTHLEX_CONFIG")]
    config: Option<PathBuf>,

    /// Debug logging on stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "authlex=debug"
    } else {
        "authlex=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "cli")]
    {
        let args = Args::parse();
        init_logging(args.verbose);

        let config = match &args.config {
            Some(path) => CatalogConfig::load(path)?,
            None => CatalogConfig::default(),
        };
        let searcher = Searcher::new(args.data_dir.clone(), config);
        let query = args.query.join(" ");

        // A stack takes precedence over a domain.
        let resp = match args.stack {
            Some(stack) => searcher.search_stack(&query, stack, args.max_results)?,
            None => searcher.search(&query, args.domain, args.max_results)?,
        };

        if args.json {
            println!("{}", render::json(&resp)?);
        } else {
            println!("{}", render::markdown(&resp));
        }
    }

    #[cfg(not(feature = "cli"))]
    println!("CLI feature is disabled. Build with --features cli to enable.");

    Ok(())
}
