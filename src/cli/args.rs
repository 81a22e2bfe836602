//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::asset::EmitMode;
use crate::config::{CONFIG_FILE, Overrides};

/// Multiplex image presets into cached, deterministically named variants
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from cwd
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Transform, name and emit every requested variant
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Print the expanded variant descriptors as JSON without transforming
    #[command(visible_alias = "p")]
    Plan {
        #[command(flatten)]
        args: PlanArgs,
    },
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Source images. If omitted, builds every `[[assets]]` entry.
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Output directory (overrides `build.output`)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Presets to build (comma-separated, overrides `build.outputs`)
    #[arg(long, value_delimiter = ',')]
    pub outputs: Option<Vec<String>>,

    /// Disable the transform cache
    #[arg(long)]
    pub no_cache: bool,

    /// Emit mode: true, false or synthetic
    #[arg(short, long, value_parser = parse_emit_mode)]
    pub emit: Option<EmitMode>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

/// Plan command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct PlanArgs {
    /// Source images. If omitted, plans every `[[assets]]` entry.
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Presets to expand (comma-separated, overrides `build.outputs`)
    #[arg(long, value_delimiter = ',')]
    pub outputs: Option<Vec<String>>,

    /// Pretty-print JSON output
    #[arg(short, long)]
    pub pretty: bool,
}

impl BuildArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            output: self.output.clone(),
            outputs: self.outputs.clone(),
            no_cache: self.no_cache,
            emit: self.emit,
        }
    }
}

impl PlanArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            outputs: self.outputs.clone(),
            ..Default::default()
        }
    }
}

fn parse_emit_mode(s: &str) -> Result<EmitMode, String> {
    EmitMode::parse(s).ok_or_else(|| format!("`{s}` is not one of: true, false, synthetic"))
}
