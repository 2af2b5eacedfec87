use anyhow::Result;
use clap::Parser;
use disco_plots::{cli::Args, pipeline};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = args.plot_options();
    pipeline::run(&args.config_json, &options)?;

    Ok(())
}
