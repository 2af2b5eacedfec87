use clap::Parser;
use std::path::PathBuf;

use crate::config::PlotOptions;

/// Diagnostic plots for a DisCo-regularized classifier.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, allow_negative_numbers = true)]
pub struct Args {
    /// Run configuration JSON
    #[arg(value_name = "CONFIG_JSON")]
    pub config_json: PathBuf,

    /// Training epoch of the model whose inferences are plotted
    #[arg(long, default_value_t = 50, value_name = "N")]
    pub epoch: usize,

    /// Rebin 2D correlation plots by this factor (0 = no rebinning)
    #[arg(long = "corr2D_rebin", default_value_t = 0)]
    pub corr2d_rebin: usize,

    /// Max value for y-axis of nominal 2D correlation plot
    #[arg(long = "corr2D_ymax", default_value_t = 8.0)]
    pub corr2d_ymax: f64,

    /// Min value for y-axis of nominal 2D correlation plot
    #[arg(long = "corr2D_ymin", default_value_t = 0.0)]
    pub corr2d_ymin: f64,

    /// Number of bins for the y-axis of the nominal 2D correlation plot
    #[arg(long = "corr2D_ybins", default_value_t = 20)]
    pub corr2d_ybins: usize,

    /// Make y-axis of loss curve log-scale
    #[arg(long = "loss_logy")]
    pub loss_logy: bool,
}

impl Args {
    pub fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            epoch: self.epoch,
            corr2d_rebin: self.corr2d_rebin,
            corr2d_ymin: self.corr2d_ymin,
            corr2d_ymax: self.corr2d_ymax,
            corr2d_ybins: self.corr2d_ybins,
            loss_logy: self.loss_logy,
        }
    }
}
