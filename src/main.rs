//! bom-optimize - normalize, merge and batch BOM spreadsheets.
//!
//! Reads a delimited BOM table, canonicalizes resistor and capacitor values,
//! merges duplicate lines at the cheapest observed unit price and writes the
//! result ordered by line total, optionally split into price-bounded batches.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod bom;
mod commands;

use bom::{ColumnBindings, SortOrder};
use commands::optimize::OptimizeOptions;
use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "bom-optimize")]
#[command(author, version, about = "Normalize, merge and batch BOM spreadsheets")]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge duplicate BOM lines and order them by total price
    Optimize {
        /// Path to the BOM table (.csv, .tsv, ...; delimiter is auto-detected)
        input: PathBuf,

        /// Output CSV path (default: <input>_optimized.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column holding the component value/name
        #[arg(long, default_value = "Name")]
        name_col: String,

        /// Column holding the footprint
        #[arg(long, default_value = "Footprint")]
        footprint_col: String,

        /// Column holding the quantity
        #[arg(long, default_value = "Quantity")]
        qty_col: String,

        /// Column holding the unit price (optional in the input)
        #[arg(long, default_value = "Price")]
        price_col: String,

        /// Name of the computed line-total column
        #[arg(long, default_value = "FinalPrice")]
        total_col: String,

        /// Sort by total price ascending instead of descending
        #[arg(long)]
        ascending: bool,

        /// Split the result into batches of roughly this total price
        #[arg(short, long)]
        split: Option<f64>,

        /// Output format (human, json)
        #[arg(short, long, default_value = "human")]
        format: String,
    },

    /// Show how values are classified and normalized
    Classify {
        /// Component values (e.g., "4k7", "100nF", "USB-C Connector")
        #[arg(required = true)]
        values: Vec<String>,

        /// Footprint used for the grouping key
        #[arg(long, default_value = "")]
        footprint: String,

        /// Output format (human, json)
        #[arg(short, long, default_value = "human")]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Optimize {
            input,
            output,
            name_col,
            footprint_col,
            qty_col,
            price_col,
            total_col,
            ascending,
            split,
            format,
        } => {
            let options = OptimizeOptions {
                input,
                output,
                columns: ColumnBindings {
                    designator: name_col,
                    footprint: footprint_col,
                    quantity: qty_col,
                    price: price_col,
                    total: total_col,
                },
                sort: if ascending {
                    SortOrder::Ascending
                } else {
                    SortOrder::Descending
                },
                split_threshold: split,
            };

            commands::optimize::execute(&options, OutputFormat::from_arg(&format))
        }

        Commands::Classify {
            values,
            footprint,
            format,
        } => commands::classify::execute(&values, &footprint, OutputFormat::from_arg(&format)),
    }
}
