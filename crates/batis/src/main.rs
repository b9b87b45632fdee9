//! Batis CLI - package and install Linux desktop applications
//!
//! This is the main entry point for the Batis command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet, cli.is_backend());

    let scheme = cli.scheme_kind();
    match cli.command {
        Commands::Install(args) => commands::install::run(args, scheme).await,
        Commands::Installtar(args) => commands::installtar::run(args, scheme),
        Commands::Uninstall(args) => commands::uninstall::run(args, scheme),
        Commands::List(args) => commands::list::run(args, scheme),
        Commands::Verify(args) => commands::verify::run(args),
        Commands::VerifyIndex(args) => commands::verify_index::run(args).await,
        Commands::Pack(args) => commands::pack::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Initialize tracing with appropriate verbosity
///
/// Logs go to stderr; stdout is reserved for command output and, in backend
/// mode, for progress lines.
fn init_tracing(verbose: u8, quiet: bool, backend: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 if backend => EnvFilter::new("warn"),
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
