use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::binning::normalize::{normalize, table_header};
use crate::binning::pipeline::{self, BinningRun};
use crate::cli::OutputFormat;
use crate::core::config::{BinningConfig, DEFAULT_BIN_SIZE, DEFAULT_PLOIDY};
use crate::core::types::{LibraryName, Mode};
use crate::output::stats::{
    excluded_stats, library_stats, render_stats_report, stats_report_path, ExcludedStats,
    LibraryStats,
};
use crate::output::table::{break_length, describe_references, render_bin_table, row_count};
use crate::output::write_atomically;
use crate::parsing::inputs::{read_list_file, scan_directory};
use crate::parsing::sam::parse_exclusion_file;

#[derive(Args)]
pub struct BinArgs {
    /// Alignment files to bin (one library each). When omitted, --list or
    /// --input-dir is used.
    pub inputs: Vec<PathBuf>,

    /// Output table path; the stats report is written beside it as readcounts-<name>
    #[arg(short, long, required = true)]
    pub out: PathBuf,

    /// Bin width in bp
    #[arg(short = 's', long, default_value_t = DEFAULT_BIN_SIZE)]
    pub bin_size: u64,

    /// Which reads or pairs are countable
    #[arg(short, long, required = true, value_enum)]
    pub mode: Mode,

    /// Minimum mapping quality
    #[arg(short = 'q', long, default_value = "0")]
    pub min_mapq: u8,

    /// Ploidy multiplier for the relative columns
    #[arg(short, long, default_value_t = DEFAULT_PLOIDY)]
    pub ploidy: u32,

    /// Alignment file of the control library (relative columns use the
    /// mean of all libraries when omitted)
    #[arg(short, long)]
    pub control: Option<PathBuf>,

    /// Only report raw counts
    #[arg(short = 'C', long)]
    pub coverage_only: bool,

    /// Insert blank lines after each reference
    #[arg(short, long)]
    pub breaks: bool,

    /// SAM header file whose @SQ lines name references to exclude
    #[arg(short = 'r', long)]
    pub exclude: Option<PathBuf>,

    /// File listing alignment paths, one per line
    #[arg(short, long, conflicts_with = "inputs")]
    pub list: Option<PathBuf>,

    /// Directory scanned for alignment files when no inputs or list are given
    #[arg(long, default_value = ".")]
    pub input_dir: PathBuf,

    /// Scan for BAM files instead of SAM files
    #[arg(short = 'B', long)]
    pub bam: bool,

    /// Delete bins whose percentage lies beyond this many standard deviations
    /// of any library's mean
    #[arg(long, value_name = "SD")]
    pub drop_outliers: Option<f64>,

    /// Fail when a later input's header names a reference the first input lacks
    #[arg(long)]
    pub strict_references: bool,
}

/// What a finished run reports on stdout
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub bin_size: u64,
    pub output: PathBuf,
    pub stats_report: PathBuf,
    pub rows: usize,
    pub libraries: Vec<LibraryStats>,
    pub excluded: Vec<ExcludedStats>,
    pub removed_bins: usize,
    pub accepted_pairs: Vec<String>,
}

impl BinArgs {
    fn config(&self) -> BinningConfig {
        let mut config = BinningConfig::new(self.mode);
        config.bin_size = self.bin_size;
        config.min_mapq = self.min_mapq;
        config.ploidy = self.ploidy;
        config.control = self.control.as_deref().map(LibraryName::from_path);
        config.coverage_only = self.coverage_only;
        config.insert_breaks = self.breaks;
        config.outlier_sd = self.drop_outliers;
        config.strict_references = self.strict_references;
        config
    }

    fn resolve_inputs(&self) -> anyhow::Result<Vec<PathBuf>> {
        if !self.inputs.is_empty() {
            let mut inputs = self.inputs.clone();
            inputs.sort();
            return Ok(inputs);
        }
        let inputs = match &self.list {
            Some(list) => read_list_file(list)
                .with_context(|| format!("Failed to read list file {}", list.display()))?,
            None => scan_directory(&self.input_dir, self.bam)?,
        };
        Ok(inputs)
    }
}

/// Execute bin subcommand
///
/// # Errors
///
/// Returns an error if the configuration is invalid, an input cannot be
/// read, classification fails, or the outputs cannot be written. Nothing is
/// written unless the whole run succeeds.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: BinArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config();
    config.validate()?;

    let paths = args.resolve_inputs()?;
    let inputs = pipeline::plan_libraries(&paths)?;
    if verbose {
        eprintln!("Binning {} libraries in mode {}", inputs.len(), config.mode);
    }

    let exclusions = match &args.exclude {
        Some(path) => Some(
            parse_exclusion_file(path)
                .with_context(|| format!("Failed to read exclusion list {}", path.display()))?,
        ),
        None => None,
    };

    let result = pipeline::run(&config, &inputs, exclusions)?;
    let summary = write_outputs(&config, &args.out, &result, verbose)?;

    match format {
        OutputFormat::Text => print_text_summary(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Tsv => print_tsv_summary(&summary),
    }

    Ok(())
}

/// Render both outputs, then write them
fn write_outputs(
    config: &BinningConfig,
    out: &Path,
    result: &BinningRun,
    verbose: bool,
) -> anyhow::Result<RunSummary> {
    let BinningRun {
        catalog,
        accumulator,
        removed_bins,
        accepted_pairs,
    } = result;

    let references = normalize(config, catalog, accumulator)?;
    let header = table_header(
        accumulator.libraries(),
        config.control.as_ref(),
        config.coverage_only,
    );
    let breaks = if config.insert_breaks {
        break_length(catalog, config.bin_size)
    } else {
        0
    };
    let table = render_bin_table(&header, &references, breaks);

    let libraries = library_stats(catalog, accumulator);
    let report = render_stats_report(&libraries, catalog, accumulator);
    let report_path = stats_report_path(out);

    write_atomically(out, &table)
        .with_context(|| format!("Failed to write bin table {}", out.display()))?;
    write_atomically(&report_path, &report)
        .with_context(|| format!("Failed to write stats report {}", report_path.display()))?;

    if verbose {
        eprint!("{}", describe_references(&references));
    }

    Ok(RunSummary {
        mode: config.mode,
        bin_size: config.bin_size,
        output: out.to_path_buf(),
        stats_report: report_path,
        rows: row_count(&references),
        libraries,
        excluded: excluded_stats(catalog, accumulator),
        removed_bins: removed_bins.len(),
        accepted_pairs: accepted_pairs.iter().map(ToString::to_string).collect(),
    })
}

fn print_text_summary(summary: &RunSummary) {
    println!(
        "Wrote {} rows ({} bp bins, mode {}) to {}",
        summary.rows,
        summary.bin_size,
        summary.mode,
        summary.output.display()
    );
    println!("Stats report: {}", summary.stats_report.display());
    println!();

    for library in &summary.libraries {
        println!(
            "  {:<20} {:>12} reads  {:>10.2} reads/Mb",
            library.library, library.reads, library.reads_per_mb
        );
    }

    if !summary.excluded.is_empty() {
        println!();
        println!("Excluded references:");
        for excluded in &summary.excluded {
            println!("  {:<20} {:>12} reads", excluded.reference, excluded.reads);
        }
    }

    if summary.removed_bins > 0 {
        println!();
        println!("Removed {} outlier bins", summary.removed_bins);
    }

    if !summary.accepted_pairs.is_empty() {
        println!();
        println!("Accepted flag pairs: {}", summary.accepted_pairs.join(" "));
    }
}

fn print_tsv_summary(summary: &RunSummary) {
    println!("library\treads\treads_per_mb");
    for library in &summary.libraries {
        println!(
            "{}\t{}\t{}",
            library.library,
            library.reads,
            crate::utils::format::format_decimal(library.reads_per_mb)
        );
    }
}
