use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Every Nth epoch is shown on the loss curve.
pub const LOSS_CURVE_STRIDE: usize = 10;

/// Per-epoch averages of the total loss and its two components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub train_loss: Vec<f64>,
    pub test_loss: Vec<f64>,
    pub train_bce: Vec<f64>,
    pub test_bce: Vec<f64>,
    pub train_disco: Vec<f64>,
    pub test_disco: Vec<f64>,
}

impl TrainingHistory {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read history {}", path.display()))?;
        let history: TrainingHistory = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse history {}", path.display()))?;
        history
            .validate()
            .with_context(|| format!("Invalid history {}", path.display()))?;
        Ok(history)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write history {}", path.display()))?;
        Ok(())
    }

    pub fn series(&self) -> [(&'static str, &[f64]); 6] {
        [
            ("train_loss", self.train_loss.as_slice()),
            ("test_loss", self.test_loss.as_slice()),
            ("train_bce", self.train_bce.as_slice()),
            ("test_bce", self.test_bce.as_slice()),
            ("train_disco", self.train_disco.as_slice()),
            ("test_disco", self.test_disco.as_slice()),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        let num_epochs = self.train_loss.len();
        if num_epochs == 0 {
            bail!("history has no epochs");
        }
        for (name, values) in self.series() {
            if values.len() != num_epochs {
                bail!(
                    "history series '{}' has {} epochs, expected {}",
                    name,
                    values.len(),
                    num_epochs
                );
            }
        }
        Ok(())
    }

    pub fn num_epochs(&self) -> usize {
        self.train_loss.len()
    }
}

/// Pair each value with its 1-based epoch and keep every `stride`-th one,
/// starting from epoch 1.
pub fn subsample(values: &[f64], stride: usize) -> Vec<(usize, f64)> {
    values
        .iter()
        .enumerate()
        .step_by(stride.max(1))
        .map(|(idx, value)| (idx + 1, *value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn ramp_history(num_epochs: usize) -> TrainingHistory {
        let ramp: Vec<f64> = (1..=num_epochs).map(|e| e as f64).collect();
        TrainingHistory {
            train_loss: ramp.clone(),
            test_loss: ramp.clone(),
            train_bce: ramp.clone(),
            test_bce: ramp.clone(),
            train_disco: ramp.clone(),
            test_disco: ramp,
        }
    }

    #[test]
    fn subsample_length_is_ceiling_of_stride() {
        for len in [1, 9, 10, 11, 100, 101] {
            let values: Vec<f64> = (0..len).map(|v| v as f64).collect();
            let points = subsample(&values, LOSS_CURVE_STRIDE);
            assert_eq!(points.len(), (len + LOSS_CURVE_STRIDE - 1) / LOSS_CURVE_STRIDE);
            assert_eq!(points[0], (1, 0.0));
        }
    }

    #[test]
    fn subsample_keeps_every_tenth_epoch() {
        let history = ramp_history(35);
        let points = subsample(&history.train_loss, LOSS_CURVE_STRIDE);
        assert_eq!(points, vec![(1, 1.0), (11, 11.0), (21, 21.0), (31, 31.0)]);
    }

    #[test]
    fn save_and_load_history() {
        let history = ramp_history(12);
        let temp_file = NamedTempFile::new().unwrap();

        history.save(temp_file.path()).unwrap();
        let loaded = TrainingHistory::load(temp_file.path()).unwrap();

        assert_eq!(loaded.num_epochs(), 12);
        assert_eq!(loaded.test_disco[11], 12.0);
    }

    #[test]
    fn load_ignores_extra_metrics() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"{"train_loss": [1.0], "test_loss": [1.0], "train_bce": [0.5],
                "test_bce": [0.5], "train_disco": [0.5], "test_disco": [0.5],
                "lr": [0.001]}"#,
        )
        .unwrap();

        let loaded = TrainingHistory::load(temp_file.path()).unwrap();
        assert_eq!(loaded.num_epochs(), 1);
    }

    #[test]
    fn validate_rejects_empty_and_ragged_histories() {
        assert!(ramp_history(0).validate().is_err());

        let mut ragged = ramp_history(5);
        ragged.test_bce.pop();
        let err = ragged.validate().unwrap_err();
        assert!(err.to_string().contains("test_bce"));
    }
}
