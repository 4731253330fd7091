pub mod engine;
pub mod format;
pub mod markup;
pub mod markup_pipeline;
pub mod report_pipeline;

pub use crate::domain::model::{
    FormatMode, FormatSpec, Marker, MarkupResult, ReportEntry, ReportResult, StatRecord,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
