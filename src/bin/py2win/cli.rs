//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use py2win::util::shell::ColorChoice;

/// Create a stand-alone Windows distribution of a Python program
#[derive(Parser)]
#[command(name = "py2win")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an embedded distribution of the current project
    Bdist(BdistArgs),

    /// Check that this machine can build distributions
    Doctor(DoctorArgs),

    /// Remove distribution outputs
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BdistArgs {
    /// Directory containing pyproject.toml (searched upward from here)
    #[arg(long, value_name = "PATH")]
    pub project: Option<PathBuf>,

    /// Distribution name (defaults to [project] name)
    #[arg(long)]
    pub name: Option<String>,

    /// Distribution version (defaults to [project] version)
    #[arg(long = "version", id = "dist_version", value_name = "VERSION")]
    pub dist_version: Option<String>,

    /// Wheel to install; skips building the project wheel (repeatable)
    #[arg(long, value_name = "WHEEL")]
    pub wheel: Vec<PathBuf>,

    /// Requirement to install, e.g. `requests>=2.31` (repeatable)
    #[arg(short, long, value_name = "REQ")]
    pub requirement: Vec<String>,

    /// Package to install after the requirements (repeatable)
    #[arg(short, long, value_name = "PKG")]
    pub package: Vec<String>,

    /// Console launcher, `name=module:callable` (repeatable)
    #[arg(long, value_name = "SPEC")]
    pub console_script: Vec<String>,

    /// Windowed launcher, `name=module:callable` (repeatable)
    #[arg(long, value_name = "SPEC")]
    pub gui_script: Vec<String>,

    /// Additional directory of wheels offered to pip
    #[arg(long, value_name = "DIR")]
    pub extra_wheel_dir: Option<PathBuf>,

    /// Output directory [default: dist]
    #[arg(short, long, value_name = "DIR")]
    pub dist_dir: Option<PathBuf>,

    /// Also create {name}-{version}.zip
    #[arg(long)]
    pub zip: bool,

    /// Keep an existing working directory (skips the runtime download)
    #[arg(long)]
    pub no_clean: bool,

    /// Host Python interpreter
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,
}

#[derive(Args)]
pub struct DoctorArgs {
    /// Host Python interpreter to check
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Output directory [default: dist]
    #[arg(short, long, value_name = "DIR")]
    pub dist_dir: Option<PathBuf>,

    /// Remove the whole output directory
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
