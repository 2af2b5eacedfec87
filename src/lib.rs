pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod figure;
pub mod histogram;
pub mod history;
pub mod pipeline;
pub mod plotting;
