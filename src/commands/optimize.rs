//! Optimize command - merge duplicate BOM lines and split into batches.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;
use serde::Serialize;
use tabled::{
    settings::{style::Style, Alignment, Modify},
    Table, Tabled,
};

use super::classify::kind_label;
use super::{truncate, OutputFormat};
use crate::bom::batch::label_width;
use crate::bom::number::{format_decimal, format_general};
use crate::bom::{self, BomTable, ColumnBindings, MergedRow, SortOrder};

/// Lines shown in the human summary table.
const PREVIEW_LINES: usize = 10;

/// Everything the optimize pipeline needs, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub input: PathBuf,
    /// Defaults to `<input stem>_optimized.csv` next to the input
    pub output: Option<PathBuf>,
    pub columns: ColumnBindings,
    pub sort: SortOrder,
    /// Batch threshold in price units; `None` or <= 0 disables splitting
    pub split_threshold: Option<f64>,
}

/// Outcome of an optimize run.
#[derive(Debug, Serialize)]
pub struct OptimizeReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_rows: usize,
    pub skipped_rows: usize,
    pub merged_rows: usize,
    pub total_cost: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub batches: Vec<BatchReport>,
}

/// One written batch file.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub path: PathBuf,
    pub lines: usize,
    pub total: f64,
}

/// Table row for the merged-line preview.
#[derive(Tabled)]
struct MergedLineRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Footprint")]
    footprint: String,
    #[tabled(rename = "Rows")]
    merged_from: usize,
    #[tabled(rename = "Qty")]
    quantity: i64,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Total")]
    total: String,
}

/// Execute the optimize command.
pub fn execute(options: &OptimizeOptions, format: OutputFormat) -> Result<()> {
    let (report, merged) = run(options)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Human => print_human(&report, &merged),
    }

    Ok(())
}

/// Run the pipeline and write all outputs.
pub fn run(options: &OptimizeOptions) -> Result<(OptimizeReport, Vec<MergedRow>)> {
    let table = BomTable::load(&options.input)
        .with_context(|| format!("Failed to load BOM {}", options.input.display()))?;
    let rows = bom::read_rows(&table, &options.columns)?;
    let input_rows = rows.len();

    let merged = bom::optimize(rows, options.sort);
    info!("Merged {} rows into {} lines", input_rows, merged.len());

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&options.input));
    bom::to_table(&table.headers, &merged, &options.columns)
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let batches = match options.split_threshold.filter(|t| *t > 0.0) {
        Some(threshold) => write_batches(
            &merged,
            threshold,
            &output,
            &table.headers,
            &options.columns,
        )?,
        None => Vec::new(),
    };

    let report = OptimizeReport {
        input: options.input.clone(),
        output,
        input_rows,
        skipped_rows: table.skipped,
        merged_rows: merged.len(),
        total_cost: merged.iter().map(|r| r.total_price).sum(),
        batches,
    };

    Ok((report, merged))
}

fn write_batches(
    merged: &[MergedRow],
    threshold: f64,
    output: &Path,
    headers: &[String],
    columns: &ColumnBindings,
) -> Result<Vec<BatchReport>> {
    let dir = batch_dir(output, threshold);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create batch directory {}", dir.display()))?;

    let stem = file_stem(output);
    let batches = bom::split(merged.to_vec(), Some(threshold));
    let width = label_width(batches.len());

    let mut reports = Vec::with_capacity(batches.len());
    for batch in &batches {
        let path = dir.join(format!("{}_chunk_{}.csv", stem, batch.label(width)));
        bom::to_table(headers, &batch.rows, columns)
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        reports.push(BatchReport {
            path,
            lines: batch.rows.len(),
            total: batch.total,
        });
    }

    info!("Wrote {} batches to {}", reports.len(), dir.display());
    Ok(reports)
}

/// `<dir>/<stem>_optimized.csv` for an input `<dir>/<stem>.<ext>`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_file_name(format!("{}_optimized.csv", file_stem(input)))
}

/// `<dir>/<output stem>_chunks_<threshold>` next to the output file.
pub fn batch_dir(output: &Path, threshold: f64) -> PathBuf {
    output.with_file_name(format!(
        "{}_chunks_{}",
        file_stem(output),
        format_general(threshold)
    ))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_human(report: &OptimizeReport, merged: &[MergedRow]) {
    if merged.is_empty() {
        println!("{} No BOM lines found in {}", "✗".red(), report.input.display());
        return;
    }

    let rows: Vec<MergedLineRow> = merged
        .iter()
        .take(PREVIEW_LINES)
        .map(|line| MergedLineRow {
            kind: kind_label(line.kind),
            value: truncate(&line.key.value, 24),
            footprint: truncate(&line.key.footprint, 24),
            merged_from: line.merged_from,
            quantity: line.quantity,
            unit: format!("${:.4}", line.unit_price),
            total: format!("${:.2}", line.total_price),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(tabled::settings::object::Columns::new(3..=6)).with(Alignment::right()))
        .to_string();

    println!("\n{}", table);
    if merged.len() > PREVIEW_LINES {
        println!("… {} more lines", merged.len() - PREVIEW_LINES);
    }

    println!();
    println!(
        "{} {} rows merged into {} lines, total {}",
        "Summary:".bold(),
        report.input_rows,
        report.merged_rows.to_string().green(),
        format!("${}", format_decimal(report.total_cost)).cyan()
    );
    println!(
        "{} Wrote {}",
        "✓".green().bold(),
        report.output.display().to_string().cyan()
    );

    for batch in &report.batches {
        println!(
            "  {} {} lines, ${:.2}",
            batch.path.display(),
            batch.lines,
            batch.total
        );
    }

    if report.skipped_rows > 0 {
        println!(
            "{} {} malformed input lines skipped",
            "!".yellow().bold(),
            report.skipped_rows
        );
    }
}
