use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

/// Drives a pipeline through its three stages. Stages run to completion
/// sequentially; there is no overlap between passes.
pub struct FormatEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> FormatEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting formatting pass");

        let items = self.pipeline.extract().await?;
        tracing::info!("Extracted {} items", items.len());

        let output = self.pipeline.transform(items).await?;
        tracing::debug!("Transform stage complete");

        let output_path = self.pipeline.load(output).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
