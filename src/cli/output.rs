//! Handles all user-facing output for the CLI.
//!
//! Rewritten source, JSON trees and coloured pass traces are all printed from
//! here so every command renders the same way.

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::Module;
use crate::passes::TraceStep;

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints the input followed by each pass's output, diffed line by line
/// against the step before it.
pub fn print_trace(initial: &Module, trace: &[TraceStep]) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let mut last_source = initial.pretty();

    print_step_header(&mut stdout, 0, "input");
    print!("{last_source}");
    println!();

    for (i, step) in trace.iter().enumerate() {
        print_step_header(&mut stdout, i + 1, &step.pass);
        let current_source = step.tree.pretty();
        if current_source == last_source {
            println!(" (no changes)");
        } else {
            let changeset = Changeset::new(&last_source, &current_source, "\n");
            print_diff(&mut stdout, &changeset.diffs);
        }
        last_source = current_source;
        println!();
    }
}

/// Prints rewritten source exactly as rendered.
pub fn print_source(module: &Module) {
    print!("{}", module.pretty());
}

pub fn print_json(module: &Module) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(module)?);
    Ok(())
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_step_header(stdout: &mut StandardStream, index: usize, name: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    println!("--- Step {index}: {name} ---");
    let _ = stdout.reset();
}

fn print_diff(stdout: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                let _ = stdout.reset();
                for line in x.lines() {
                    println!(" {line}");
                }
            }
            Difference::Add(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                for line in x.lines() {
                    println!("+{line}");
                }
            }
            Difference::Rem(ref x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                for line in x.lines() {
                    println!("-{line}");
                }
            }
        }
    }
    let _ = stdout.reset();
}
