//! Defines the command-line arguments and subcommands for the astrewrite CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "astrewrite",
    version,
    about = "Source-to-source loop unrolling for Python functions."
)]
pub struct AstrewriteArgs {
    /// Raise log verbosity: -v for debug, -vv for trace. RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pass pipeline and print the rewritten source.
    Rewrite(RewriteArgs),
    /// Show the output of every pass as a diff against the previous step.
    Trace(RewriteArgs),
    /// Print the parsed syntax tree as JSON.
    Ast {
        /// The path to the source file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Only show this top-level function.
        #[arg(short, long)]
        function: Option<String>,
    },
    /// Parse and re-render a source file in canonical form.
    Format {
        /// The path to the source file to format.
        #[arg(required = true)]
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RewriteArgs {
    /// The path to the source file to rewrite.
    #[arg(required = true)]
    pub file: PathBuf,

    /// Rewrite only this top-level function.
    #[arg(short, long)]
    pub function: Option<String>,

    /// A pass to run: `unroll` or `unroll_by_factor=N`. Repeatable; runs in order.
    #[arg(short, long = "pass", value_name = "SPEC")]
    pub passes: Vec<String>,

    /// Bind a compile-time constant, eg `N=4` or `lanes=[0, 1]`.
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE")]
    pub defines: Vec<String>,

    /// YAML or JSON pipeline config; command-line passes and defines are appended.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
