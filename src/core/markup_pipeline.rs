use crate::core::{format, markup};
use crate::domain::model::{Marker, MarkupResult};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use std::path::Path;

/// Formats a markup document in place: scan its markers, format each one,
/// rewrite the document into the output directory under the same file name.
pub struct MarkupPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> MarkupPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MarkupPipeline<S, C> {
    type Item = Marker;
    type Output = MarkupResult;

    async fn extract(&self) -> Result<Vec<Marker>> {
        tracing::debug!("Scanning document: {}", self.config.source());
        let bytes = self.storage.read_file(self.config.source()).await?;
        let source = String::from_utf8_lossy(&bytes);
        let markers = markup::scan_markers(&source)?;
        tracing::debug!("Found {} markers", markers.len());
        Ok(markers)
    }

    async fn transform(&self, markers: Vec<Marker>) -> Result<MarkupResult> {
        let replacements = markers
            .iter()
            .map(|marker| {
                let formatted = format::apply_to_input(&marker.spec, &marker.raw_text);
                tracing::debug!(
                    "Marker {} ({}): '{}' -> '{}'",
                    marker.ordinal,
                    marker.spec.mode.as_marker(),
                    marker.raw_text.trim(),
                    formatted
                );
                formatted
            })
            .collect();

        Ok(MarkupResult { replacements })
    }

    async fn load(&self, result: MarkupResult) -> Result<String> {
        let bytes = self.storage.read_file(self.config.source()).await?;
        let source = String::from_utf8_lossy(&bytes);
        let rewritten = markup::rewrite(&source, &result.replacements)?;

        let file_name = Path::new(self.config.source())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("formatted.html");
        let output_file = format!("{}/{}", self.config.output_path(), file_name);

        self.storage
            .write_file(&output_file, rewritten.as_bytes())
            .await?;
        Ok(output_file)
    }
}
