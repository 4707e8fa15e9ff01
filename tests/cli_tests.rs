//! End-to-end tests driving the `bin-by-sam` binary over small SAM files.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "@HD\tVN:1.6\tSO:unsorted\n\
@SQ\tSN:chr1\tLN:3000\n\
@SQ\tSN:chr2\tLN:1500\n\
@SQ\tSN:chrC\tLN:200\n";

/// One SAM line with a 50bp read
fn single(name: &str, flag: u16, reference: &str, pos: u32) -> String {
    let seq = "A".repeat(50);
    format!("{name}\t{flag}\t{reference}\t{pos}\t60\t50M\t*\t0\t0\t{seq}\t*\n")
}

/// One SAM line for a mate with a 100bp read
fn mate(name: &str, flag: u16, pos: u32, mate_pos: u32, tlen: i32) -> String {
    let seq = "C".repeat(100);
    format!("{name}\t{flag}\tchr1\t{pos}\t60\t100M\t=\t{mate_pos}\t{tlen}\t{seq}\t*\n")
}

fn write_sam(dir: &Path, file_name: &str, records: &[String]) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(&path, format!("{HEADER}{}", records.concat())).unwrap();
    path
}

/// Two single-end libraries: a (4 reads) and b (2 reads)
fn single_end_libraries(dir: &Path) -> (PathBuf, PathBuf) {
    let a = write_sam(
        dir,
        "a_aln.sam",
        &[
            single("r1", 0, "chr1", 100),
            single("r2", 16, "chr1", 1200),
            single("r3", 0, "chr1", 1300),
            single("r4", 0, "chr2", 100),
            "r5\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*\n".to_string(),
        ],
    );
    let b = write_sam(
        dir,
        "b_aln.sam",
        &[single("s1", 0, "chr1", 150), single("s2", 16, "chr2", 200)],
    );
    (a, b)
}

fn paired_library(dir: &Path) -> PathBuf {
    write_sam(
        dir,
        "pe_aln.sam",
        &[
            mate("p1", 99, 100, 400, 400),
            mate("p1", 147, 400, 100, -400),
            mate("p2", 67, 1100, 1400, 400),
            mate("p2", 131, 1400, 1100, -400),
        ],
    )
}

fn bin_by_sam() -> Command {
    Command::cargo_bin("bin-by-sam").unwrap()
}

#[test]
fn test_single_end_against_control() {
    let dir = TempDir::new().unwrap();
    let (a, b) = single_end_libraries(dir.path());
    let out = dir.path().join("bins.txt");

    bin_by_sam()
        .args(["bin", "-m", "S", "-s", "1000", "-c"])
        .arg(&b)
        .arg("-o")
        .arg(&out)
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 rows"));

    let table = fs::read_to_string(&out).unwrap();
    assert_eq!(
        table,
        "Chrom\tStrt\tEnd\ta\tb\ta/b\tb/b\n\
chr1\t1\t1000\t1\t1\t1.0\t2.0\n\
chr1\t1001\t3000\t2\t0\t.\t.\n\
chr2\t1\t1500\t1\t1\t1.0\t2.0\n"
    );

    let report = fs::read_to_string(dir.path().join("readcounts-bins.txt")).unwrap();
    assert!(report.starts_with("Lib\tReads\tReads/MB\n"));
    assert!(report.contains("a\t4\t851.06\n"));
    assert!(report.contains("b\t2\t425.53\n"));
    assert!(!report.contains("Removed Reference Counts"));
}

#[test]
fn test_mean_normalization_uses_na_label() {
    let dir = TempDir::new().unwrap();
    let (a, b) = single_end_libraries(dir.path());
    let out = dir.path().join("bins.txt");

    bin_by_sam()
        .args(["bin", "-m", "S", "-s", "1000", "-o"])
        .arg(&out)
        .arg(&a)
        .arg(&b)
        .assert()
        .success();

    let table = fs::read_to_string(&out).unwrap();
    let mut lines = table.lines();
    assert_eq!(lines.next(), Some("Chrom\tStrt\tEnd\ta\tb\ta/NA\tb/NA"));
    // a holds 50% of its reads in chr1 bin 1, b none: mean 25%
    assert_eq!(lines.nth(1), Some("chr1\t1001\t3000\t2\t0\t4.0\t0.0"));
}

#[test]
fn test_libraries_found_by_directory_scan() {
    let dir = TempDir::new().unwrap();
    single_end_libraries(dir.path());
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("bins.txt");

    bin_by_sam()
        .args(["bin", "-m", "S", "-s", "1000", "-C", "--input-dir"])
        .arg(dir.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success();

    let table = fs::read_to_string(&out).unwrap();
    assert!(table.starts_with("Chrom\tStrt\tEnd\ta\tb\n"));
}

#[test]
fn test_same_strand_pairs_need_tpm() {
    let dir = TempDir::new().unwrap();
    let input = paired_library(dir.path());
    let out = dir.path().join("bins.txt");

    bin_by_sam()
        .args(["bin", "-m", "TP", "-s", "1000", "-C", "-o"])
        .arg(&out)
        .arg(&input)
        .assert()
        .success();
    let table = fs::read_to_string(&out).unwrap();
    assert_eq!(table, "Chrom\tStrt\tEnd\tpe\nchr1\t1\t3000\t1\n");

    bin_by_sam()
        .args(["bin", "-m", "TPM", "-s", "1000", "-C", "-o"])
        .arg(&out)
        .arg(&input)
        .assert()
        .success();
    let table = fs::read_to_string(&out).unwrap();
    assert_eq!(
        table,
        "Chrom\tStrt\tEnd\tpe\nchr1\t1\t1000\t1\nchr1\t1001\t3000\t1\n"
    );
}

#[test]
fn test_paired_flags_in_single_end_mode_write_nothing() {
    let dir = TempDir::new().unwrap();
    let input = paired_library(dir.path());
    let out = dir.path().join("bins.txt");

    bin_by_sam()
        .args(["bin", "-m", "S", "-o"])
        .arg(&out)
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("p1"));

    assert!(!out.exists());
    assert!(!dir.path().join("readcounts-bins.txt").exists());
}

#[test]
fn test_control_with_coverage_only_rejected() {
    let dir = TempDir::new().unwrap();
    let (a, b) = single_end_libraries(dir.path());
    let out = dir.path().join("bins.txt");

    bin_by_sam()
        .args(["bin", "-m", "S", "-C", "-c"])
        .arg(&a)
        .arg("-o")
        .arg(&out)
        .arg(&a)
        .arg(&b)
        .assert()
        .failure()
        .stderr(predicate::str::contains("control"));

    assert!(!out.exists());
}

#[test]
fn test_breaks_follow_each_reference() {
    let dir = TempDir::new().unwrap();
    let (a, _) = single_end_libraries(dir.path());
    let out = dir.path().join("bins.txt");

    bin_by_sam()
        .args(["bin", "-m", "S", "-s", "100", "-C", "-b", "-o"])
        .arg(&out)
        .arg(&a)
        .assert()
        .success();

    // 3000 / 100 / 10 = 3 blank lines after chr1, chr2 and chrC
    let table = fs::read_to_string(&out).unwrap();
    assert!(table.contains("chr1\t1301\t3000\t1\n\n\n\nchr2\t101\t1500\t1\n\n\n\n"));
    assert!(table.ends_with("\n\n\n\n\n\n\n"));
}

#[test]
fn test_exclusion_list_reported() {
    let dir = TempDir::new().unwrap();
    let input = write_sam(
        dir.path(),
        "c_aln.sam",
        &[single("r1", 0, "chr1", 100), single("r2", 0, "chrC", 10)],
    );
    let exclude = dir.path().join("exclude.sam");
    fs::write(&exclude, "@SQ\tSN:chrC\tLN:200\n").unwrap();
    let out = dir.path().join("bins.txt");

    bin_by_sam()
        .args(["bin", "-m", "S", "-s", "1000", "-r"])
        .arg(&exclude)
        .arg("-o")
        .arg(&out)
        .arg(&input)
        .assert()
        .success();

    let table = fs::read_to_string(&out).unwrap();
    assert!(!table.contains("chrC"));

    let report = fs::read_to_string(dir.path().join("readcounts-bins.txt")).unwrap();
    assert!(report.contains("c\t1\t222.22\n"));
    assert!(report.ends_with("\n\nRemoved Reference Counts:\nReference\tReads\nchrC\t1\n"));
}

#[test]
fn test_json_summary() {
    let dir = TempDir::new().unwrap();
    let (a, b) = single_end_libraries(dir.path());
    let out = dir.path().join("bins.txt");

    let output = bin_by_sam()
        .args(["--format", "json", "bin", "-m", "S", "-s", "1000", "-o"])
        .arg(&out)
        .arg(&a)
        .arg(&b)
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["mode"], "S");
    assert_eq!(summary["rows"], 3);
    assert_eq!(summary["libraries"][0]["library"], "a");
    assert_eq!(summary["libraries"][0]["reads"], 4);
    assert_eq!(summary["libraries"][1]["reads"], 2);
}

#[test]
fn test_refs_lists_catalog() {
    let dir = TempDir::new().unwrap();
    let (a, _) = single_end_libraries(dir.path());
    let exclude = dir.path().join("exclude.sam");
    fs::write(&exclude, "@SQ\tSN:chrC\tLN:200\n").unwrap();

    bin_by_sam()
        .args(["--format", "tsv", "refs"])
        .arg(&a)
        .arg("-r")
        .arg(&exclude)
        .assert()
        .success()
        .stdout(predicate::eq(
            "name\tlength\tstatus\n\
chr1\t3000\tincluded\n\
chr2\t1500\tincluded\n\
chrC\t200\texcluded\n",
        ));
}

#[test]
fn test_missing_mode_is_usage_error() {
    let dir = TempDir::new().unwrap();
    bin_by_sam()
        .args(["bin", "-o"])
        .arg(dir.path().join("bins.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--mode"));
}

#[test]
fn test_zero_length_reference_is_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("z_aln.sam");
    let header = HEADER.replace("@SQ\tSN:chr2", "@SQ\tSN:empty\tLN:0\n@SQ\tSN:chr2");
    fs::write(&path, format!("{header}{}", single("r1", 0, "chr1", 100))).unwrap();

    bin_by_sam()
        .args(["--format", "tsv", "refs"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("empty\t0\tempty\n"));

    let out = dir.path().join("bins.txt");
    bin_by_sam()
        .args(["bin", "-m", "S", "-s", "1000", "-C", "-o"])
        .arg(&out)
        .arg(&path)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "Chrom\tStrt\tEnd\tz\nchr1\t1\t3000\t1\n"
    );
}

#[test]
fn test_refs_without_sequence_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bare.sam");
    fs::write(&path, "@HD\tVN:1.6\n").unwrap();

    bin_by_sam()
        .arg("refs")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("no @SQ header lines"));
}
