use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::histogram::uniform_edges;

/// The subset of a training run's configuration needed to locate its outputs.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub basedir: PathBuf,
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: RunConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn run_dir(&self) -> PathBuf {
        self.basedir.join(&self.name)
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.run_dir().join("plots")
    }

    /// `{basedir}/{name}[/{subdir}]/{name}_{tag}[_epoch{epoch}].{ext}`
    pub fn outfile(
        &self,
        tag: &str,
        ext: &str,
        epoch: Option<usize>,
        subdir: Option<&str>,
    ) -> PathBuf {
        let mut dir = self.run_dir();
        if let Some(subdir) = subdir {
            dir = dir.join(subdir);
        }

        let mut filename = format!("{}_{}", self.name, tag);
        if let Some(epoch) = epoch {
            filename.push_str(&format!("_epoch{}", epoch));
        }
        filename.push('.');
        filename.push_str(ext);

        dir.join(filename)
    }

    pub fn history_path(&self) -> PathBuf {
        self.outfile("history", "json", None, None)
    }

    pub fn inferences_path(&self, split: &str, epoch: usize) -> PathBuf {
        self.outfile(
            &format!("{}_inferences", split),
            "csv",
            Some(epoch),
            Some("inferences"),
        )
    }
}

/// Formatting knobs shared by the renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub epoch: usize,
    pub corr2d_rebin: usize,
    pub corr2d_ymin: f64,
    pub corr2d_ymax: f64,
    pub corr2d_ybins: usize,
    pub loss_logy: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            epoch: 50,
            corr2d_rebin: 0,
            corr2d_ymin: 0.0,
            corr2d_ymax: 8.0,
            corr2d_ybins: 20,
            loss_logy: false,
        }
    }
}

impl PlotOptions {
    pub fn validate(&self) -> Result<()> {
        if self.corr2d_ybins == 0 {
            bail!("--corr2D_ybins must be at least 1");
        }
        if !(self.corr2d_ymax > self.corr2d_ymin) {
            bail!(
                "--corr2D_ymax ({}) must be greater than --corr2D_ymin ({})",
                self.corr2d_ymax,
                self.corr2d_ymin
            );
        }
        Ok(())
    }

    /// Uniform DisCo-target bin edges for the 2D correlation histogram.
    pub fn target_edges(&self) -> Vec<f64> {
        uniform_edges(self.corr2d_ymin, self.corr2d_ymax, self.corr2d_ybins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> RunConfig {
        RunConfig {
            name: "ABCDNet_v1".to_string(),
            basedir: PathBuf::from("/data/runs"),
        }
    }

    #[test]
    fn test_plot_options_defaults_match_cli() {
        let options = PlotOptions::default();

        assert_eq!(options.epoch, 50);
        assert_eq!(options.corr2d_rebin, 0);
        assert_eq!(options.corr2d_ymin, 0.0);
        assert_eq!(options.corr2d_ymax, 8.0);
        assert_eq!(options.corr2d_ybins, 20);
        assert!(!options.loss_logy);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_outfile_follows_naming_convention() {
        let config = sample_config();

        assert_eq!(
            config.history_path(),
            PathBuf::from("/data/runs/ABCDNet_v1/ABCDNet_v1_history.json")
        );
        assert_eq!(
            config.inferences_path("test", 5),
            PathBuf::from("/data/runs/ABCDNet_v1/inferences/ABCDNet_v1_test_inferences_epoch5.csv")
        );
        assert_eq!(config.plots_dir(), PathBuf::from("/data/runs/ABCDNet_v1/plots"));
    }

    #[test]
    fn test_target_edges_are_uniform_and_closed() {
        let options = PlotOptions {
            corr2d_ymin: 1.0,
            corr2d_ymax: 3.0,
            corr2d_ybins: 4,
            ..PlotOptions::default()
        };

        assert_eq!(options.target_edges(), vec![1.0, 1.5, 2.0, 2.5, 3.0]);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let options = PlotOptions {
            corr2d_ymin: 5.0,
            corr2d_ymax: 5.0,
            ..PlotOptions::default()
        };
        assert!(options.validate().is_err());

        let options = PlotOptions {
            corr2d_ybins: 0,
            ..PlotOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_load_ignores_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"name": "run", "basedir": "/tmp/out", "train": {"n_epochs": 200}}"#,
        )
        .unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.name, "run");
        assert_eq!(config.basedir, PathBuf::from("/tmp/out"));
    }
}
