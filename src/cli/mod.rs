//! Command-line interface for polypolish.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **pileup**: Build per-position pileups of short-read alignments against an assembly
//!
//! ## Usage
//!
//! ```text
//! # Summarise pileups for an assembly
//! polypolish pileup assembly.fasta alignments.sam
//!
//! # Paired reads aligned separately, with per-base output
//! polypolish pileup assembly.fasta aln_1.sam aln_2.sam --debug pileup.tsv
//!
//! # JSON summary for scripting
//! polypolish --format json pileup assembly.fasta alignments.sam
//! ```

use clap::{Parser, Subcommand};

pub mod pileup;

#[derive(Parser)]
#[command(name = "polypolish")]
#[command(author = "Ryan Wick")]
#[command(version)]
#[command(about = "Short-read pileups for polishing long-read assemblies")]
#[command(
    long_about = "Polypolish builds per-position pileups from short reads aligned to a draft assembly.\n\nUnlike other tools in this category, it uses SAM files where each read has been aligned to all possible locations (not just a single best location), which lets it gather evidence in repeat regions that other alignment-based polishers cannot use."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build per-position pileups from short-read alignments
    Pileup(pileup::PileupArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
