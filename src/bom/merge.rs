//! Duplicate merging and ordering.

use std::collections::HashMap;

use serde::Serialize;

use super::number::round_to;
use super::{ComponentKind, ComponentRow, GroupingKey, KeyedRow};

/// Decimal places kept on line totals.
const TOTAL_DIGITS: usize = 6;

/// One line per distinct [`GroupingKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub kind: ComponentKind,
    pub key: GroupingKey,
    /// Cheapest contributing row; its display fields are kept
    pub source: ComponentRow,
    /// Sum over all contributing rows
    pub quantity: i64,
    /// Minimum over all contributing rows
    pub unit_price: f64,
    /// `unit_price * quantity`, rounded to 6 decimals
    pub total_price: f64,
    /// Number of input rows folded into this line
    pub merged_from: usize,
}

/// Sort direction for [`order`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Merge rows sharing a grouping key.
///
/// Groups come out in first-appearance order of their key. Within a group the
/// first row (in input order) holding the minimum unit price provides the
/// display fields.
pub fn merge(rows: Vec<KeyedRow>) -> Vec<MergedRow> {
    let mut groups: HashMap<GroupingKey, Vec<KeyedRow>> = HashMap::new();
    // Preserve insertion order
    let mut key_order: Vec<GroupingKey> = Vec::new();

    for row in rows {
        let key = row.classification.key.clone();
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                key_order.push(key);
                Vec::new()
            })
            .push(row);
    }

    key_order
        .into_iter()
        .filter_map(|key| merge_group(groups.remove(&key)?))
        .collect()
}

fn merge_group(group: Vec<KeyedRow>) -> Option<MergedRow> {
    let quantity = group
        .iter()
        .fold(0i64, |acc, r| acc.saturating_add(r.row.quantity));
    let merged_from = group.len();

    // Strict comparison keeps the earliest row on ties.
    let cheapest = group.into_iter().reduce(|best, candidate| {
        if candidate.row.unit_price < best.row.unit_price {
            candidate
        } else {
            best
        }
    })?;

    let unit_price = cheapest.row.unit_price;

    Some(MergedRow {
        kind: cheapest.classification.kind,
        key: cheapest.classification.key,
        source: cheapest.row,
        quantity,
        unit_price,
        total_price: round_to(unit_price * quantity as f64, TOTAL_DIGITS),
        merged_from,
    })
}

/// Stable sort by line total.
pub fn order(mut rows: Vec<MergedRow>, sort: SortOrder) -> Vec<MergedRow> {
    match sort {
        SortOrder::Ascending => rows.sort_by(|a, b| a.total_price.total_cmp(&b.total_price)),
        SortOrder::Descending => rows.sort_by(|a, b| b.total_price.total_cmp(&a.total_price)),
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::key_rows;

    fn row(designator: &str, footprint: &str, quantity: i64, unit_price: f64) -> ComponentRow {
        ComponentRow::new(designator, footprint, quantity, unit_price)
    }

    fn merged(total_price: f64, label: &str) -> MergedRow {
        MergedRow {
            kind: ComponentKind::Other,
            key: GroupingKey {
                value: label.to_string(),
                footprint: String::new(),
            },
            source: row(label, "", 1, total_price),
            quantity: 1,
            unit_price: total_price,
            total_price,
            merged_from: 1,
        }
    }

    fn labels(rows: &[MergedRow]) -> Vec<&str> {
        rows.iter().map(|r| r.key.value.as_str()).collect()
    }

    #[test]
    fn test_merge_sums_quantity_and_takes_min_price() {
        let rows = key_rows(vec![row("10k", "0603", 3, 0.05), row("10k", "0603", 5, 0.02)]);
        let out = merge(rows);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].quantity, 8);
        assert_eq!(out[0].unit_price, 0.02);
        assert_eq!(out[0].total_price, 0.16);
        assert_eq!(out[0].merged_from, 2);
    }

    #[test]
    fn test_merge_tie_keeps_first_row() {
        let rows = key_rows(vec![
            row("10k", "0603", 1, 0.03),
            row("10000", "0603", 1, 0.01),
            row("10 kOhm", "0603", 1, 0.01),
        ]);
        let out = merge(rows);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source.designator, "10000");
        assert_eq!(out[0].quantity, 3);
    }

    #[test]
    fn test_merge_keeps_first_appearance_order() {
        let rows = key_rows(vec![
            row("100nF", "0402", 1, 0.01),
            row("10k", "0603", 1, 0.01),
            row("0.1uF", "0402", 2, 0.02),
            row("10k", "0402", 1, 0.01),
        ]);
        let out = merge(rows);

        assert_eq!(labels(&out), vec!["100n", "10k", "10k"]);
        assert_eq!(out[0].quantity, 3);
        assert_eq!(out[1].key.footprint, "0603");
        assert_eq!(out[2].key.footprint, "0402");
    }

    #[test]
    fn test_merge_other_requires_exact_text() {
        let rows = key_rows(vec![
            row("USB-C Connector", "USB_C", 1, 0.5),
            row("USB-C  Connector", "USB_C", 1, 0.4),
            row("USB C Connector", "USB_C", 1, 0.3),
        ]);
        let out = merge(rows);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind, ComponentKind::Other);
        assert_eq!(out[0].quantity, 2);
        assert_eq!(out[0].source.designator, "USB-C  Connector");
    }

    #[test]
    fn test_merge_saturates_huge_quantities() {
        let huge = crate::bom::number::parse_quantity("1e30");
        let out = merge(key_rows(vec![
            row("LED", "0603", huge, 0.1),
            row("LED", "0603", huge, 0.2),
        ]));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].quantity, i64::MAX);
        assert!(out[0].total_price.is_finite());
    }

    #[test]
    fn test_total_is_rounded() {
        let out = merge(key_rows(vec![row("10k", "0603", 3, 0.1)]));
        assert_eq!(out[0].total_price, 0.3);
    }

    #[test]
    fn test_order_descending_and_ascending() {
        let rows = vec![merged(1.0, "a"), merged(3.0, "b"), merged(2.0, "c")];

        assert_eq!(labels(&order(rows.clone(), SortOrder::Descending)), vec!["b", "c", "a"]);
        assert_eq!(labels(&order(rows, SortOrder::Ascending)), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_order_is_stable() {
        let rows = vec![
            merged(2.0, "first"),
            merged(5.0, "big"),
            merged(2.0, "second"),
            merged(2.0, "third"),
        ];

        assert_eq!(
            labels(&order(rows.clone(), SortOrder::Descending)),
            vec!["big", "first", "second", "third"]
        );
        assert_eq!(
            labels(&order(rows, SortOrder::Ascending)),
            vec!["first", "second", "third", "big"]
        );
    }
}
