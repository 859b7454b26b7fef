//! End-to-end tests of the `polypolish pileup` command.

use std::fs;
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

const REFERENCE: &str = "ATCGCAATTGTAGAAGGACCTAGGAAGCAAAAGTTTCCTCTATGACGAGACGAACGTCGCTAACGAGCGACCTATAGCGTTTAAAATAGGATTATCGAACACCGGTAG";
const READ: &str = "CTCTATGACGACGAAACGTCGCTCTGTACGAGCGACTATAGCGTTAAAATA";
const CIGAR: &str = "11M1I2M2D10M3I9M1D9M1D6M";

fn write_assembly() -> NamedTempFile {
    let mut temp = NamedTempFile::with_suffix(".fasta").unwrap();
    writeln!(temp, ">contig_1\n{REFERENCE}").unwrap();
    temp.flush().unwrap();
    temp
}

fn write_alignments(edit_distance: u32) -> NamedTempFile {
    let mut temp = NamedTempFile::with_suffix(".sam").unwrap();
    writeln!(temp, "@HD\tVN:1.6").unwrap();
    writeln!(temp, "@SQ\tSN:contig_1\tLN:{}", REFERENCE.len()).unwrap();
    writeln!(
        temp,
        "read_1\t0\tcontig_1\t38\t60\t{CIGAR}\t*\t0\t0\t{READ}\t*\tNM:i:{edit_distance}"
    )
    .unwrap();
    temp.flush().unwrap();
    temp
}

fn polypolish() -> Command {
    Command::cargo_bin("polypolish").unwrap()
}

#[test]
fn test_text_summary() {
    let assembly = write_assembly();
    let alignments = write_alignments(8);

    polypolish()
        .arg("pileup")
        .arg(assembly.path())
        .arg(alignments.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("contig_1"))
        .stdout(predicate::str::contains("Covered positions: 51"));
}

#[test]
fn test_json_summary() {
    let assembly = write_assembly();
    let alignments = write_alignments(8);

    let output = polypolish()
        .args(["--format", "json", "pileup"])
        .arg(assembly.path())
        .arg(alignments.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["alignments"]["used"], 1);
    assert_eq!(json["contigs"][0]["name"], "contig_1");
    assert_eq!(json["contigs"][0]["length"], REFERENCE.len());
    assert_eq!(json["contigs"][0]["covered_positions"], 51);
}

#[test]
fn test_debug_output() {
    let assembly = write_assembly();
    let alignments = write_alignments(8);
    let dir = TempDir::new().unwrap();
    let debug = dir.path().join("pileup.tsv");

    polypolish()
        .arg("pileup")
        .arg(assembly.path())
        .arg(alignments.path())
        .arg("--debug")
        .arg(&debug)
        .assert()
        .success()
        .stderr(predicate::str::contains("Settings"))
        .stderr(predicate::str::contains("pileup.tsv"));

    let contents = fs::read_to_string(&debug).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), REFERENCE.len() + 1);
    assert_eq!(lines[0], "name\tpos\tbase\tdepth\tpileup");
    assert_eq!(lines[1], "contig_1\t1\tA\t0\t.");
    // 0-based column 47 holds the base plus its inserted base
    assert_eq!(lines[48], "contig_1\t48\tA\t1\tAC");
    assert_eq!(lines[51], "contig_1\t51\tC\t1\t-");
    assert_eq!(lines[62], "contig_1\t62\tA\t1\tCTGT");
}

#[test]
fn test_max_errors_filter() {
    let assembly = write_assembly();
    let alignments = write_alignments(12);

    polypolish()
        .args(["--format", "tsv", "pileup"])
        .arg(assembly.path())
        .arg(alignments.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("contig_1\t108\t0\t0\t0.0000"))
        .stderr(predicate::str::contains("No usable alignments"));

    polypolish()
        .args(["--format", "tsv", "pileup", "--max-errors", "12"])
        .arg(assembly.path())
        .arg(alignments.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("contig_1\t108\t51\t51\t"));
}

#[test]
fn test_missing_input() {
    let assembly = write_assembly();

    polypolish()
        .arg("pileup")
        .arg(assembly.path())
        .arg("/nonexistent/alignments.sam")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_zero_threads() {
    let assembly = write_assembly();
    let alignments = write_alignments(8);

    polypolish()
        .args(["pileup", "--threads", "0"])
        .arg(assembly.path())
        .arg(alignments.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Thread count"));
}

#[test]
fn test_alignment_past_contig_end() {
    let assembly = write_assembly();
    let mut alignments = NamedTempFile::with_suffix(".sam").unwrap();
    writeln!(alignments, "@SQ\tSN:contig_1\tLN:{}", REFERENCE.len()).unwrap();
    writeln!(alignments, "read_1\t0\tcontig_1\t100\t60\t10M\t*\t0\t0\tAAAAAAAAAA\t*").unwrap();
    alignments.flush().unwrap();

    polypolish()
        .arg("pileup")
        .arg(assembly.path())
        .arg(alignments.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("beyond reference length"));
}
