//! Price-bounded batches for staged purchasing.

use super::MergedRow;

/// A contiguous run of merged rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// 1-based position
    pub index: usize,
    pub rows: Vec<MergedRow>,
    /// Sum of `total_price` over `rows`
    pub total: f64,
}

impl Batch {
    /// Zero-padded index, e.g. "007" for width 3.
    pub fn label(&self, width: usize) -> String {
        format!("{:0width$}", self.index, width = width)
    }
}

/// Split ordered rows into batches.
///
/// Rows accumulate into the current batch until its running total reaches
/// `threshold`, which seals it. A trailing partial batch is kept. A missing or
/// non-positive threshold yields one batch holding every row.
pub fn split(rows: Vec<MergedRow>, threshold: Option<f64>) -> Vec<Batch> {
    let Some(threshold) = threshold.filter(|t| *t > 0.0) else {
        let total = rows.iter().map(|r| r.total_price).sum();
        return vec![Batch {
            index: 1,
            rows,
            total,
        }];
    };

    let mut batches = Vec::new();
    let mut current = Vec::new();
    let mut running = 0.0;

    for row in rows {
        running += row.total_price;
        current.push(row);

        if running >= threshold {
            batches.push(Batch {
                index: batches.len() + 1,
                rows: std::mem::take(&mut current),
                total: running,
            });
            running = 0.0;
        }
    }

    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len() + 1,
            rows: current,
            total: running,
        });
    }

    batches
}

/// Width of batch labels: digits of the batch count, at least 3.
pub fn label_width(count: usize) -> usize {
    count.to_string().len().max(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::{ComponentKind, ComponentRow, GroupingKey};

    fn rows(totals: &[f64]) -> Vec<MergedRow> {
        totals
            .iter()
            .enumerate()
            .map(|(i, total)| MergedRow {
                kind: ComponentKind::Other,
                key: GroupingKey {
                    value: format!("part{}", i),
                    footprint: String::new(),
                },
                source: ComponentRow::new(&format!("part{}", i), "", 1, *total),
                quantity: 1,
                unit_price: *total,
                total_price: *total,
                merged_from: 1,
            })
            .collect()
    }

    fn totals(batches: &[Batch]) -> Vec<Vec<f64>> {
        batches
            .iter()
            .map(|b| b.rows.iter().map(|r| r.total_price).collect())
            .collect()
    }

    #[test]
    fn test_split_seals_at_threshold() {
        let batches = split(rows(&[10.0, 10.0, 10.0, 10.0]), Some(25.0));
        assert_eq!(totals(&batches), vec![vec![10.0, 10.0, 10.0], vec![10.0]]);
        assert_eq!(batches[0].total, 30.0);
        assert_eq!(batches[1].index, 2);
    }

    #[test]
    fn test_split_exact_threshold_closes_batch() {
        let batches = split(rows(&[5.0, 5.0, 5.0]), Some(10.0));
        assert_eq!(totals(&batches), vec![vec![5.0, 5.0], vec![5.0]]);
    }

    #[test]
    fn test_split_no_trailing_empty_batch() {
        let batches = split(rows(&[30.0, 30.0]), Some(25.0));
        assert_eq!(batches.len(), 2);
        assert_eq!(totals(&batches), vec![vec![30.0], vec![30.0]]);
    }

    #[test]
    fn test_split_disabled() {
        for threshold in [None, Some(0.0), Some(-5.0)] {
            let batches = split(rows(&[1.0, 2.0, 3.0]), threshold);
            assert_eq!(batches.len(), 1);
            assert_eq!(batches[0].rows.len(), 3);
            assert_eq!(batches[0].total, 6.0);
        }
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split(Vec::new(), Some(10.0)).is_empty());
    }

    #[test]
    fn test_label_width() {
        assert_eq!(label_width(1), 3);
        assert_eq!(label_width(999), 3);
        assert_eq!(label_width(1000), 4);

        let batch = Batch {
            index: 7,
            rows: Vec::new(),
            total: 0.0,
        };
        assert_eq!(batch.label(3), "007");
    }
}
