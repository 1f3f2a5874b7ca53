//! Slate CLI - inspect and query the search index of an API docs source tree.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

use commands::search::SearchArgs;

#[derive(Parser)]
#[command(name = "slate")]
#[command(about = "Section search for single-page API documentation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to slate.toml config file
    #[arg(short, long, default_value = "slate.toml")]
    config: PathBuf,

    /// Source directory containing index.yml (overrides config)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sections the search index is built from
    Sections {
        /// Print sections as JSON
        #[arg(long)]
        json: bool,
    },

    /// Type a query into the search box and show the results panel
    Search {
        /// Query text
        #[arg(required = true)]
        query: Vec<String>,

        /// Type the query one character at a time
        #[arg(short, long)]
        incremental: bool,

        /// Press Escape after typing
        #[arg(long)]
        escape: bool,

        /// Print the final panel state as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(&cli.config)?;
    let source = cli.source.unwrap_or(config.source.dir);

    match cli.command {
        Commands::Sections { json } => {
            commands::sections::run(&source, &config.search, json)?;
        }
        Commands::Search {
            query,
            incremental,
            escape,
            json,
        } => {
            let args = SearchArgs {
                query: query.join(" "),
                incremental,
                escape,
                json,
            };
            commands::search::run(&source, &config.search, &args)?;
        }
    }

    Ok(())
}
