//! Command-line interface for bin-by-sam.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **bin**: Count reads per fixed-width bin for one or more libraries
//! - **refs**: Show the reference catalog a file would be binned against
//!
//! ## Usage
//!
//! ```text
//! # Single-end libraries in the current directory, 100kb bins
//! bin-by-sam bin -o bins.txt -m S -s 100000
//!
//! # Proper pairs with MAPQ >= 30, normalized against a control library
//! bin-by-sam bin -o bins.txt -m TP -q 30 -c input_aln.sam tumor_aln.sam input_aln.sam
//!
//! # BAM files listed in a file, chloroplast removed
//! bin-by-sam bin -o bins.txt -m TPA -B -l libs.txt -r chloroplast.sam
//!
//! # Inspect the catalog
//! bin-by-sam refs sample_aln.sam -r chloroplast.sam --format tsv
//! ```

use clap::{Parser, Subcommand};

pub mod bin;
pub mod refs;

#[derive(Parser)]
#[command(name = "bin-by-sam")]
#[command(version)]
#[command(about = "Bin aligned reads into fixed-width genomic windows")]
#[command(
    long_about = "bin-by-sam counts aligned reads per fixed-width bin along every reference sequence, for several libraries at once.\n\nFor each bin it reports:\n- The raw read count of every library\n- Each library's share of the bin relative to a control library, or to the mean of all libraries, scaled by ploidy"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format of the run summary
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bin reads from alignment files into a coverage table
    Bin(bin::BinArgs),

    /// Show the reference catalog built from an alignment file
    Refs(refs::RefsArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
