//! The astrewrite Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions: read a file, pick a function, run the
//! configured passes and print the result.

use std::path::Path;
use std::{fs, process};

use clap::Parser;
use miette::{Diagnostic, IntoDiagnostic, Report, WrapErr};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::ast::Module;
use crate::cli::args::{AstrewriteArgs, Command, RewriteArgs};
use crate::config::{PassConfig, PipelineConfig};
use crate::diagnostics::{to_error_source, PipelineError};
use crate::passes::{Metadata, Pipeline};
use crate::runtime::Environment;
use crate::syntax::{extract_function, parse};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = AstrewriteArgs::parse();
    init_tracing(args.verbose);

    // Dispatch to the appropriate subcommand handler.
    let result = match args.command {
        Command::Rewrite(args) => handle_rewrite(&args),
        Command::Trace(args) => handle_trace(&args),
        Command::Ast { file, function } => handle_ast(&file, function.as_deref()),
        Command::Format { file } => handle_format(&file),
    };

    if let Err(report) = result {
        eprintln!("{report:?}");
        process::exit(1);
    }
}

/// Installs a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_rewrite(args: &RewriteArgs) -> miette::Result<()> {
    let job = Job::prepare(args)?;
    let (tree, _, _) = job
        .pipeline
        .run(job.tree.clone(), job.env.clone(), Metadata::new())
        .map_err(|e| job.pass_report(e))?;
    output::print_source(&tree);
    Ok(())
}

fn handle_trace(args: &RewriteArgs) -> miette::Result<()> {
    let job = Job::prepare(args)?;
    let (_, steps) = job
        .pipeline
        .run_traced(job.tree.clone(), job.env.clone(), Metadata::new())
        .map_err(|e| job.pass_report(e))?;
    output::print_trace(&job.tree, &steps);
    Ok(())
}

fn handle_ast(path: &Path, function: Option<&str>) -> miette::Result<()> {
    let (name, source) = read_source(path)?;
    let mut module = parse(&source).map_err(|e| attach_source(e, &name, &source))?;
    if let Some(function) = function {
        module = extract_function(&module, function).map_err(|e| attach_source(e, &name, &source))?;
    }
    output::print_json(&module).into_diagnostic()
}

fn handle_format(path: &Path) -> miette::Result<()> {
    let (name, source) = read_source(path)?;
    let module = parse(&source).map_err(|e| attach_source(e, &name, &source))?;
    output::print_source(&module);
    Ok(())
}

// ============================================================================
// PIPELINE SETUP
// ============================================================================

/// Everything a rewrite needs, resolved from the command line.
struct Job {
    name: String,
    source: String,
    tree: Module,
    env: Environment,
    pipeline: Pipeline,
}

impl Job {
    fn prepare(args: &RewriteArgs) -> miette::Result<Self> {
        let (name, source) = read_source(&args.file)?;

        let mut config = match &args.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };
        for spec in &args.passes {
            config.add_pass(spec)?;
        }
        for spec in &args.defines {
            config.define(spec)?;
        }
        if config.passes.is_empty() {
            config.passes.push(PassConfig::Unroll);
        }

        let module = parse(&source).map_err(|e| attach_source(e, &name, &source))?;

        // Module-level constants play the part of the function's globals;
        // explicit definitions override them.
        let mut env = Environment::with_prelude();
        let collected = env.collect_module_constants(&module);
        config.bind(&mut env);
        debug!(collected, defined = config.env.len(), "environment ready");

        let tree = match &args.function {
            Some(function) => {
                extract_function(&module, function).map_err(|e| attach_source(e, &name, &source))?
            }
            None => module,
        };
        let pipeline = config.pipeline();
        debug!(passes = ?pipeline.pass_names().collect::<Vec<_>>(), "pipeline ready");

        Ok(Self {
            name,
            source,
            tree,
            env,
            pipeline,
        })
    }

    /// Reports the failing pass with the offending span labelled in the source.
    fn pass_report(&self, err: PipelineError) -> Report {
        let pass = err.pass;
        attach_source(err.error, &self.name, &self.source).wrap_err(format!("pass `{pass}` failed"))
    }
}

fn read_source(path: &Path) -> miette::Result<(String, String)> {
    let source = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok((path.display().to_string(), source))
}

fn attach_source<E>(err: E, name: &str, source: &str) -> Report
where
    E: Diagnostic + Send + Sync + 'static,
{
    Report::new(err).with_source_code(to_error_source(name, source))
}
