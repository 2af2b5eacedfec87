use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::analysis::RocSummary;
use crate::config::{PlotOptions, RunConfig};
use crate::data::InferenceTable;
use crate::history::TrainingHistory;
use crate::plotting::{
    correlation_histogram, plot_correlation_histogram, plot_loss_curve, plot_roc_curve,
    plot_score_histogram, SCORE_VS_TARGET, TARGET_VS_SCORE,
};

/// Everything the plots are made from, loaded once up front.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub history: TrainingHistory,
    pub train: InferenceTable,
    pub test: InferenceTable,
}

impl Inputs {
    pub fn load(config: &RunConfig, epoch: usize) -> Result<Self> {
        let history_path = config.history_path();
        let history = TrainingHistory::load(&history_path)?;
        info!(
            "Loaded {} epochs of history from {}",
            history.num_epochs(),
            history_path.display()
        );

        let test_path = config.inferences_path("test", epoch);
        let test = InferenceTable::load_csv(&test_path)?;
        info!("Loaded {} test inferences from {}", test.len(), test_path.display());

        let train_path = config.inferences_path("train", epoch);
        let train = InferenceTable::load_csv(&train_path)?;
        info!("Loaded {} train inferences from {}", train.len(), train_path.display());

        Ok(Self {
            history,
            train,
            test,
        })
    }
}

/// Render the five diagnostic plots into `plots_dir`. Returns the PNG paths
/// in the order they were written.
pub fn render_all(inputs: &Inputs, options: &PlotOptions, plots_dir: &Path) -> Result<Vec<PathBuf>> {
    let epoch = options.epoch;
    let mut written = Vec::with_capacity(5);

    let path = plot_loss_curve(&inputs.history, options, plots_dir)?;
    println!("Wrote loss curve to {}", path.display());
    written.push(path);

    let roc = RocSummary::compute(&inputs.train, &inputs.test)?;
    let path = plot_roc_curve(&roc, epoch, plots_dir)?;
    println!("Wrote ROC curve to {}", path.display());
    written.push(path);

    let path = plot_score_histogram(&inputs.test, epoch, plots_dir)?;
    println!("Wrote scores histogram to {}", path.display());
    written.push(path);

    let hist = correlation_histogram(&inputs.test, options)?;
    let path = plot_correlation_histogram(
        &hist,
        SCORE_VS_TARGET,
        &format!("correlation2D_epoch{}", epoch),
        plots_dir,
    )?;
    println!("Wrote correlation histogram to {}", path.display());
    written.push(path);

    let path = plot_correlation_histogram(
        &hist.transpose(),
        TARGET_VS_SCORE,
        &format!("correlation2D_flipped_epoch{}", epoch),
        plots_dir,
    )?;
    println!("Wrote other correlation histogram to {}", path.display());
    written.push(path);

    Ok(written)
}

/// Validate options, resolve inputs from the run configuration and render
/// every plot.
pub fn run(config_path: &Path, options: &PlotOptions) -> Result<Vec<PathBuf>> {
    options.validate()?;

    let config = RunConfig::load(config_path)?;
    let plots_dir = config.plots_dir();
    let inputs = Inputs::load(&config, options.epoch)
        .with_context(|| format!("Failed to load inputs for run '{}'", config.name))?;

    let written = render_all(&inputs, options, &plots_dir)?;
    println!("Done. All plots can be found here: {}", plots_dir.display());
    Ok(written)
}
