//! CLI argument parsing with clap

use std::path::PathBuf;

use batis_core::SchemeKind;
use clap::{Args, Parser, Subcommand};

/// Batis - package and install Linux desktop applications
#[derive(Parser, Debug)]
#[command(name = "batis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Install system-wide, for all users
    #[arg(long, global = true, conflicts_with = "user")]
    pub system: bool,

    /// Install for the current user (default)
    #[arg(long, global = true)]
    pub user: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The scheme chosen on the command line, if any
    pub fn scheme_kind(&self) -> Option<SchemeKind> {
        if self.system {
            Some(SchemeKind::System)
        } else if self.user {
            Some(SchemeKind::User)
        } else {
            None
        }
    }

    /// Whether the command prints machine-readable progress to stdout
    pub fn is_backend(&self) -> bool {
        match &self.command {
            Commands::Install(args) => args.backend,
            Commands::Installtar(args) => args.backend,
            _ => false,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install the latest suitable build from an index URL
    Install(InstallArgs),

    /// Install an application tarball or directory
    Installtar(InstallTarArgs),

    /// Uninstall an application
    Uninstall(UninstallArgs),

    /// List installed applications
    List(ListArgs),

    /// Check an application tarball or directory for problems
    Verify(VerifyArgs),

    /// Check a batis_index.json file for problems
    VerifyIndex(VerifyIndexArgs),

    /// Pack an application directory into a tarball
    Pack(PackArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// URL of the application index (or of the directory containing batis_index.json)
    pub url: String,

    /// Print installation steps to stdout for a graphical frontend
    #[arg(long)]
    pub backend: bool,
}

#[derive(Args, Debug)]
pub struct InstallTarArgs {
    /// Application tarball or directory
    pub path: PathBuf,

    /// Print installation steps to stdout for a graphical frontend
    #[arg(long)]
    pub backend: bool,
}

#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Name of the installed application directory
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as a JSON array
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path of a .app.tar.gz tarball, or of a directory
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct VerifyIndexArgs {
    /// URL or file path of batis_index.json
    pub url: String,
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// The directory to package
    pub directory: PathBuf,

    /// Application name, the directory name by default
    #[arg(short, long)]
    pub name: Option<String>,

    /// Where to write the tarball
    #[arg(short = 'o', long = "output-file")]
    pub output: Option<PathBuf>,

    /// Skip verifying the directory before packing it
    #[arg(long)]
    pub no_verify: bool,

    /// Don't add an install.sh script to the tarball
    #[arg(long)]
    pub no_install_script: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
