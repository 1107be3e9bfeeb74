//! Classify command - show how free-text values are normalized and keyed.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::style::Style, Table, Tabled};

use super::{truncate, OutputFormat};
use crate::bom::{classify, ComponentKind, GroupingKey};

/// Table row for classification results.
#[derive(Tabled)]
struct ClassifyRow {
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Footprint")]
    footprint: String,
}

/// JSON output for a classification.
#[derive(Serialize)]
struct ClassifyJson<'a> {
    input: &'a str,
    kind: ComponentKind,
    value: String,
    key: GroupingKey,
}

/// Execute the classify command.
pub fn execute(values: &[String], footprint: &str, format: OutputFormat) -> Result<()> {
    let results: Vec<ClassifyJson> = values
        .iter()
        .map(|input| {
            let c = classify(input, footprint);
            ClassifyJson {
                input,
                kind: c.kind,
                value: c.value,
                key: c.key,
            }
        })
        .collect();

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let rows: Vec<ClassifyRow> = results
        .into_iter()
        .map(|r| ClassifyRow {
            input: truncate(r.input, 32),
            kind: kind_label(r.kind),
            value: r.value,
            footprint: r.key.footprint,
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    Ok(())
}

pub(crate) fn kind_label(kind: ComponentKind) -> String {
    match kind {
        ComponentKind::Resistor => kind.to_string().green().to_string(),
        ComponentKind::Capacitor => kind.to_string().blue().to_string(),
        ComponentKind::Other => kind.to_string().dimmed().to_string(),
    }
}
