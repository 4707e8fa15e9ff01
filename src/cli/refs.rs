use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::core::reference::{ReferenceCatalog, ReferenceStatus};
use crate::parsing::sam::{parse_exclusion_file, read_dictionary};

#[derive(Args)]
pub struct RefsArgs {
    /// Alignment file whose header defines the catalog (SAM, SAM.gz or BAM)
    #[arg(required = true)]
    pub input: PathBuf,

    /// SAM header file whose @SQ lines name references to exclude
    #[arg(short = 'r', long)]
    pub exclude: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ReferenceEntry {
    name: String,
    length: u64,
    status: &'static str,
}

fn status_label(status: ReferenceStatus) -> &'static str {
    match status {
        ReferenceStatus::Included => "included",
        ReferenceStatus::Excluded => "excluded",
        ReferenceStatus::Unknown => "unknown",
    }
}

/// Execute refs subcommand
///
/// # Errors
///
/// Returns an error if the alignment header or exclusion list cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RefsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let dictionary = read_dictionary(&args.input)
        .with_context(|| format!("Failed to read header of {}", args.input.display()))?;
    let exclusions = match &args.exclude {
        Some(path) => Some(
            parse_exclusion_file(path)
                .with_context(|| format!("Failed to read exclusion list {}", path.display()))?,
        ),
        None => None,
    };
    if dictionary.is_empty() {
        eprintln!("Warning: {} has no @SQ header lines.", args.input.display());
        return Ok(());
    }
    let catalog = ReferenceCatalog::from_header(&dictionary, exclusions);

    // Header order, binned or not; zero-length entries are never binned.
    let entries: Vec<ReferenceEntry> = dictionary
        .references
        .iter()
        .map(|reference| {
            let status = if reference.length == 0 {
                "empty"
            } else {
                status_label(catalog.status(&reference.name))
            };
            ReferenceEntry {
                name: reference.name.clone(),
                length: reference.length,
                status,
            }
        })
        .collect();

    match format {
        OutputFormat::Text => {
            println!(
                "{}: {} references, {} binned ({} bp)",
                args.input.display(),
                entries.len(),
                catalog.len(),
                catalog.total_length()
            );
            if verbose {
                if let Some(source) = &dictionary.source {
                    println!("Source: {source}");
                }
            }
            println!();
            for entry in &entries {
                println!("  {:<24} {:>12}  {}", entry.name, entry.length, entry.status);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Tsv => {
            println!("name\tlength\tstatus");
            for entry in &entries {
                println!("{}\t{}\t{}", entry.name, entry.length, entry.status);
            }
        }
    }

    Ok(())
}
