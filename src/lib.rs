pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::pipelines::{BbDataset, BbPipeline, BridelyDataset, BridelyPipeline, TwnPipeline};
pub use crate::core::etl::EtlEngine;
pub use crate::utils::error::{Result, ScrapeError};
