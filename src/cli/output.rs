//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for printing results and colorizing check
//! diffs, so every command presents output the same way.

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

// ============================================================================
// CORE OUTPUT FUNCTIONS
// ============================================================================

/// Prints command output verbatim.
pub fn print_text(text: &str) {
    println!("{text}");
}

pub fn print_success(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    println!("{message}");
    let _ = stdout.reset();
}

/// Prints a line diff from `expected` to `actual` with a header.
pub fn print_mismatch(name: &str, expected: &str, actual: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
    println!("--- {name}: analysis differs from expectation ---");
    let _ = stdout.reset();

    let changeset = Changeset::new(expected, actual, "\n");
    print_diff(&mut stdout, &changeset.diffs);
    let _ = stdout.reset();
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

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
}
