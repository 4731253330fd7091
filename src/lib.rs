pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ReportConfig;

pub use adapters::storage::LocalStorage;
pub use core::engine::FormatEngine;
pub use core::markup_pipeline::MarkupPipeline;
pub use core::report_pipeline::ReportPipeline;
pub use utils::error::{CifraError, Result};
