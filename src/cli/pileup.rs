use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::cli::OutputFormat;
use crate::parsing;
use crate::pileup::genome::{build_genome_pileups, ContigPileup, PileupSummary};
use crate::utils::validation::{check_files_exist, validate_threads};

/// Available cores, capped at 16
fn default_thread_count() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get().min(16))
}

#[derive(Args)]
pub struct PileupArgs {
    /// Assembly to polish (FASTA format, optionally gzipped)
    #[arg(required = true)]
    pub assembly: PathBuf,

    /// Short read alignments (SAM format, one or more files, optionally gzipped)
    #[arg(required = true)]
    pub sam: Vec<PathBuf>,

    /// Ignore alignments with more than this many mismatches and indels
    #[arg(short = 'm', long, default_value = "10")]
    pub max_errors: u32,

    /// Number of threads used to build per-contig pileups
    #[arg(short = 't', long, default_value_t = default_thread_count())]
    pub threads: usize,

    /// Optional file to store per-base information for debugging purposes
    #[arg(long)]
    pub debug: Option<PathBuf>,
}

/// Execute pileup subcommand
///
/// # Errors
///
/// Returns an error if the settings are invalid, an input cannot be parsed, an alignment does
/// not fit the assembly, or an output cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PileupArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    validate_threads(args.threads)?;
    check_files_exist(
        std::iter::once(args.assembly.as_path()).chain(args.sam.iter().map(PathBuf::as_path)),
    )?;
    starting_message(&args);

    let references = parsing::fasta::load_fasta(&args.assembly)
        .with_context(|| format!("unable to load {}", args.assembly.display()))?;
    info!(
        sequences = references.len(),
        bases = references.iter().map(|r| r.length()).sum::<usize>(),
        "Loaded assembly"
    );

    let (alignments, stats) =
        parsing::sam::load_alignments(&args.sam, &references, args.max_errors)
            .context("unable to load alignments")?;
    info!(
        records = stats.records,
        unmapped = stats.unmapped,
        too_many_errors = stats.too_many_errors,
        used = stats.used,
        placements = alignments.alignment_count(),
        "Loaded alignments"
    );
    if alignments.is_empty() {
        warn!("No usable alignments, every pileup column will be empty");
    }

    let pileups = build_genome_pileups(&references, &alignments, args.threads)?;

    if let Some(path) = &args.debug {
        write_debug(path, &pileups)
            .with_context(|| format!("unable to write {}", path.display()))?;
        info!(path = %path.display(), "Wrote per-base pileup information");
    }

    let summaries: Vec<PileupSummary> = pileups.iter().map(ContigPileup::summary).collect();

    if verbose {
        for summary in &summaries {
            eprintln!(
                "{}: {} of {} positions covered",
                summary.name, summary.covered_positions, summary.length
            );
        }
    }

    match format {
        OutputFormat::Text => print_text_summary(&summaries),
        OutputFormat::Json => print_json_summary(&summaries, &stats)?,
        OutputFormat::Tsv => print_tsv_summary(&summaries),
    }

    Ok(())
}

fn starting_message(args: &PileupArgs) {
    info!("Starting Polypolish pileup");
    info!(assembly = %args.assembly.display(), "Input assembly");
    for sam in &args.sam {
        info!(sam = %sam.display(), "Input short-read alignments");
    }
    let debug_path = args
        .debug
        .as_ref()
        .map_or_else(|| "none".to_string(), |p| p.display().to_string());
    info!(
        max_errors = args.max_errors,
        threads = args.threads,
        debug = %debug_path,
        "Settings"
    );
}

/// Evidence field for a position with no trusted evidence, distinct from a deletion
const NO_EVIDENCE: &str = ".";

/// One line per reference position: name, 1-based position, reference base, depth, evidence
fn write_debug(path: &Path, pileups: &[ContigPileup<'_>]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "name\tpos\tbase\tdepth\tpileup")?;

    for contig in pileups {
        for (pos, column) in contig.pileup.iter().enumerate() {
            let evidence = if column.is_empty() {
                NO_EVIDENCE.to_string()
            } else {
                column.join(",")
            };
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                contig.reference.name,
                pos + 1,
                contig.reference.base_at(pos).unwrap_or('N'),
                column.len(),
                evidence
            )?;
        }
    }

    writer.flush()
}

fn print_text_summary(summaries: &[PileupSummary]) {
    println!("Pileup Summary");
    println!("{}", "=".repeat(60));

    for summary in summaries {
        println!("\n{}", summary.name);
        println!("  Length: {}", summary.length);
        println!("  Covered positions: {}", summary.covered_positions);
        println!("  Total depth: {}", summary.total_depth);
        println!("  Mean depth: {:.2}", summary.mean_depth);
    }
}

fn print_json_summary(
    summaries: &[PileupSummary],
    stats: &parsing::sam::LoadStats,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "alignments": stats,
        "contigs": summaries,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(summaries: &[PileupSummary]) {
    println!("name\tlength\tcovered_positions\ttotal_depth\tmean_depth");
    for summary in summaries {
        println!(
            "{}\t{}\t{}\t{}\t{:.4}",
            summary.name,
            summary.length,
            summary.covered_positions,
            summary.total_depth,
            summary.mean_depth,
        );
    }
}
