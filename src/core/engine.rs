use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct ConnectorEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ConnectorEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Fetching document...");
        let document = self.pipeline.extract().await?;

        tracing::info!("Building schema and rows...");
        let result = self.pipeline.transform(document).await?;
        tracing::info!(
            "Projected {} records onto {} of {} fields",
            result.projection.rows.len(),
            result.projection.fields.len(),
            result.schema.len()
        );

        tracing::info!("Writing output...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
