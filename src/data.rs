use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One evaluated event from an inference CSV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InferenceRow {
    pub truth: f64,
    pub score: f64,
    pub weight: f64,
    pub disco_target: f64,
}

impl InferenceRow {
    pub fn is_signal(&self) -> bool {
        self.truth == 1.0
    }

    pub fn is_background(&self) -> bool {
        self.truth == 0.0
    }
}

/// Per-event model outputs for one split (train or test).
#[derive(Debug, Clone, Default)]
pub struct InferenceTable {
    rows: Vec<InferenceRow>,
}

impl InferenceTable {
    pub fn new(rows: Vec<InferenceRow>) -> Self {
        Self { rows }
    }

    /// Read a CSV with at least `truth`, `score`, `weight` and `disco_target`
    /// columns. Other columns are ignored.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Failed to open inferences {}", path.display()))?;

        let mut rows = Vec::new();
        for (idx, record) in reader.deserialize().enumerate() {
            let row: InferenceRow = record.with_context(|| {
                format!("Malformed row {} in {}", idx + 1, path.display())
            })?;
            rows.push(row);
        }

        Ok(Self { rows })
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Rows of both tables, `self` first.
    pub fn concat(&self, other: &InferenceTable) -> InferenceTable {
        let mut rows = Vec::with_capacity(self.rows.len() + other.rows.len());
        rows.extend_from_slice(&self.rows);
        rows.extend_from_slice(&other.rows);
        InferenceTable { rows }
    }

    pub fn rows(&self) -> &[InferenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn signal(&self) -> impl Iterator<Item = &InferenceRow> + '_ {
        self.rows.iter().filter(|row| row.is_signal())
    }

    pub fn background(&self) -> impl Iterator<Item = &InferenceRow> + '_ {
        self.rows.iter().filter(|row| row.is_background())
    }

    /// Expected number of signal events (sum of signal weights).
    pub fn signal_yield(&self) -> f64 {
        self.signal().map(|row| row.weight).sum()
    }

    /// Expected number of background events (sum of background weights).
    pub fn background_yield(&self) -> f64 {
        self.background().map(|row| row.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(truth: f64, score: f64, weight: f64) -> InferenceRow {
        InferenceRow {
            truth,
            score,
            weight,
            disco_target: 1.0,
        }
    }

    #[test]
    fn load_csv_reads_required_columns_in_any_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_inferences.csv");
        std::fs::write(
            &path,
            "idx,score,truth,disco_target,weight\n\
             0,0.9,1.0,2.5,0.5\n\
             1,0.1,0,3.5,2\n",
        )
        .unwrap();

        let table = InferenceTable::load_csv(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], InferenceRow {
            truth: 1.0,
            score: 0.9,
            weight: 0.5,
            disco_target: 2.5,
        });
        assert!(table.rows()[1].is_background());
    }

    #[test]
    fn load_csv_reports_missing_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.csv");
        std::fs::write(&path, "truth,score\n1,0.5\n").unwrap();

        assert!(InferenceTable::load_csv(&path).is_err());
        assert!(InferenceTable::load_csv(temp_dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn yields_split_by_class_and_concat() {
        let test = InferenceTable::new(vec![row(1.0, 0.8, 0.25), row(0.0, 0.2, 4.0)]);
        let train = InferenceTable::new(vec![row(1.0, 0.7, 0.75), row(0.0, 0.3, 6.0)]);

        let total = test.concat(&train);
        assert_eq!(total.len(), 4);
        assert_eq!(total.signal_yield(), 1.0);
        assert_eq!(total.background_yield(), 10.0);
    }

    #[test]
    fn non_binary_truth_belongs_to_neither_class() {
        let table = InferenceTable::new(vec![row(0.5, 0.5, 1.0)]);
        assert_eq!(table.signal().count(), 0);
        assert_eq!(table.background().count(), 0);
    }

    #[test]
    fn write_then_load_preserves_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rows.csv");
        let table = InferenceTable::new(vec![row(1.0, 0.75, 0.5), row(0.0, 0.25, 1.5)]);

        table.write_csv(&path).unwrap();
        let loaded = InferenceTable::load_csv(&path).unwrap();
        assert_eq!(loaded.rows(), table.rows());
    }
}
