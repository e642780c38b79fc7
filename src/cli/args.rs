//! Defines the command-line arguments and subcommands for the mdxalchemy CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "mdxalchemy",
    version,
    about = "Analyze MDX cube-select statements and rebuild them as hierarchy-set algebra."
)]
pub struct MdxArgs {
    /// YAML file with analyzer settings (schema level, depth limit).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more detail to stderr (-v debug, -vv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the analyzed statement as JSON.
    Analyze {
        /// The path to the MDX query file.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Write the analyzed statement to a JSON file.
    Export {
        /// The path to the MDX query file.
        #[arg(required = true)]
        file: PathBuf,
        /// Where to write the JSON.
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Rebuild the query through the hierarchy-set algebra and print the MDX.
    Transform {
        /// The path to the MDX query file.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Show the concrete syntax tree.
    Cst {
        /// The path to the MDX query file.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Compare the analysis of a query against a stored JSON expectation.
    Check {
        /// The path to the MDX query file.
        #[arg(required = true)]
        file: PathBuf,
        /// The expected analysis, as written by `export`.
        #[arg(required = true)]
        expected: PathBuf,
    },
}
