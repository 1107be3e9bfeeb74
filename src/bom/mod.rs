//! BOM normalization pipeline.
//!
//! Rows flow leaf-first through [`classify`], [`merge`], [`merge::order`] and
//! optionally [`batch::split`]. Every stage takes a collection and returns a
//! new one; nothing is mutated in place.

pub mod batch;
pub mod classify;
mod error;
pub mod merge;
pub mod number;
pub mod table;
pub mod value;

use std::fmt;

use log::debug;
use serde::Serialize;

pub use batch::{split, Batch};
pub use classify::{classify, Classification, GroupingKey};
pub use error::BomError;
pub use merge::{merge, order, MergedRow, SortOrder};
pub use table::BomTable;

use number::{format_decimal, parse_money, parse_quantity};

/// Component kind, decided from the designator text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Resistor,
    Capacitor,
    Other,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComponentKind::Resistor => "Resistor",
            ComponentKind::Capacitor => "Capacitor",
            ComponentKind::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Column names bound to each role in the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBindings {
    /// Component value/name (e.g. "10k", "100nF", "USB-C Connector")
    pub designator: String,
    pub footprint: String,
    pub quantity: String,
    /// Unit price; optional in the input
    pub price: String,
    /// Computed line total, appended on output
    pub total: String,
}

impl Default for ColumnBindings {
    fn default() -> Self {
        Self {
            designator: "Name".to_string(),
            footprint: "Footprint".to_string(),
            quantity: "Quantity".to_string(),
            price: "Price".to_string(),
            total: "FinalPrice".to_string(),
        }
    }
}

/// Column positions after validating [`ColumnBindings`] against a header.
#[derive(Debug, Clone, Copy)]
struct ColumnIndices {
    designator: usize,
    footprint: usize,
    quantity: usize,
    price: Option<usize>,
}

impl ColumnBindings {
    fn resolve(&self, table: &BomTable) -> Result<ColumnIndices, BomError> {
        Ok(ColumnIndices {
            designator: table.require_column(&self.designator)?,
            footprint: table.require_column(&self.footprint)?,
            quantity: table.require_column(&self.quantity)?,
            price: table.column(&self.price),
        })
    }
}

/// One input line with its parsed quantity and price.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRow {
    pub designator: String,
    pub footprint: String,
    pub quantity: i64,
    pub unit_price: f64,
    /// Every input cell in header order, copied to the output verbatim
    pub fields: Vec<String>,
}

impl ComponentRow {
    #[cfg(test)]
    pub fn new(designator: &str, footprint: &str, quantity: i64, unit_price: f64) -> Self {
        Self {
            designator: designator.to_string(),
            footprint: footprint.to_string(),
            quantity,
            unit_price,
            fields: Vec::new(),
        }
    }
}

/// A row paired with its classification.
#[derive(Debug, Clone)]
pub struct KeyedRow {
    pub row: ComponentRow,
    pub classification: Classification,
}

/// Read component rows out of a table.
///
/// Missing required columns fail before any row is touched. Unparseable
/// quantities and prices fall back to 0.
pub fn read_rows(
    table: &BomTable,
    columns: &ColumnBindings,
) -> Result<Vec<ComponentRow>, BomError> {
    let idx = columns.resolve(table)?;

    Ok(table
        .rows
        .iter()
        .map(|fields| {
            let cell = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");

            let unit_price = match idx.price {
                Some(i) => parse_money(cell(i)).unwrap_or_else(|| {
                    debug!("Unparseable price {:?}, using 0", cell(i));
                    0.0
                }),
                None => 0.0,
            };

            ComponentRow {
                designator: cell(idx.designator).to_string(),
                footprint: cell(idx.footprint).to_string(),
                quantity: parse_quantity(cell(idx.quantity)),
                unit_price,
                fields: fields.clone(),
            }
        })
        .collect())
}

/// Classify every row.
pub fn key_rows(rows: Vec<ComponentRow>) -> Vec<KeyedRow> {
    rows.into_iter()
        .map(|row| {
            let classification = classify(&row.designator, &row.footprint);
            debug!(
                "{:?} -> {} {:?}",
                row.designator, classification.kind, classification.value
            );
            KeyedRow { row, classification }
        })
        .collect()
}

/// Classify, merge and order rows in one go.
pub fn optimize(rows: Vec<ComponentRow>, sort: SortOrder) -> Vec<MergedRow> {
    order(merge(key_rows(rows)), sort)
}

/// Render merged rows back into a table shaped like the input.
///
/// Input columns keep their order; the price column is appended when the
/// input lacked it, followed by the total column. Existing price/total
/// columns are overwritten in place.
pub fn to_table(headers: &[String], rows: &[MergedRow], columns: &ColumnBindings) -> BomTable {
    let mut headers = headers.to_vec();
    let mut position = |name: &str| match headers.iter().position(|h| h == name) {
        Some(i) => i,
        None => {
            headers.push(name.to_string());
            headers.len() - 1
        }
    };

    let quantity = position(&columns.quantity);
    let price = position(&columns.price);
    let total = position(&columns.total);
    let width = headers.len();

    let rows = rows
        .iter()
        .map(|merged| {
            let mut fields = merged.source.fields.clone();
            fields.resize(width, String::new());
            fields[quantity] = merged.quantity.to_string();
            fields[price] = format_decimal(merged.unit_price);
            fields[total] = format_decimal(merged.total_price);
            fields
        })
        .collect();

    BomTable::new(headers, rows)
}
