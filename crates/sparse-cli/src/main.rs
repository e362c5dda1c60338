#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod config;
mod error;
mod logging;

use clap::Parser;
use config::Config;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sparse")]
#[command(author, version, about = "Parse, check and reprint scripts", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output and JSON log lines
    #[arg(long, global = true)]
    json: bool,

    /// Read settings from a JSON config file; flags override it
    #[arg(long, global = true, value_name = "PATH", env = "SPARSE_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum statement and expression nesting depth
    #[arg(long, global = true, value_name = "N")]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Print the syntax tree of a file as JSON
    Parse {
        /// Source file, or `-` for standard input
        #[arg(default_value = "-")]
        file: PathBuf,

        /// Print the tree on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Print the token stream of a file
    Tokens {
        /// Source file, or `-` for standard input
        #[arg(default_value = "-")]
        file: PathBuf,
    },

    /// Parse files and report the ones that fail
    Check {
        /// Source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Parse a file and print it back as source
    Print {
        /// Source file, or `-` for standard input
        #[arg(default_value = "-")]
        file: PathBuf,

        /// Drop optional whitespace and newlines
        #[arg(long)]
        minify: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build config: file first, then explicit flags
    let mut config = match &cli.config {
        Some(path) => Config::load(path).into_diagnostic()?,
        None => Config::default(),
    };
    if cli.verbose > 0 {
        config = config.with_verbosity(cli.verbose);
    }
    if cli.json {
        config = config.with_json_logs(true);
    }
    if let Some(max_depth) = cli.max_depth {
        config = config.with_max_depth(max_depth);
    }

    logging::init(config.verbosity, config.json_logs);
    tracing::debug!(?config, "configuration resolved");

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Parse { file, compact }) => {
            commands::parse::run(&file, config.parser, compact, cli.json)
        }
        Some(Commands::Tokens { file }) => commands::tokens::run(&file, cli.json),
        Some(Commands::Check { files }) => {
            let span = tracing::info_span!("check", cmd = "check", files = files.len());
            let _guard = span.enter();
            commands::check::run(&files, config.parser, cli.json)
        }
        Some(Commands::Print { file, minify }) => commands::print::run(
            &file,
            config.parser,
            config.codegen_options(minify),
            cli.json,
        ),
    }
}
