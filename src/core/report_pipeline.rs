use crate::config::toml_config::ReportConfig;
use crate::core::format;
use crate::domain::model::{ReportEntry, ReportResult, StatRecord};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::{CifraError, Result};
use reqwest::Client;
use std::io::Write;
use std::time::Duration;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const JSON_FILENAME: &str = "informe.json";
pub const CSV_FILENAME: &str = "informe.csv";
pub const TEXT_FILENAME: &str = "informe.txt";

/// Renders a statistics payload into formatted report files.
///
/// The payload is a flat JSON object of numeric fields, fetched from an HTTP
/// endpoint or read from a file; each configured field is located by name,
/// coerced, formatted, and emitted in the selected output formats. A payload
/// that cannot be interpreted degrades to an all-zeros report rather than
/// failing the run, matching the fail-soft display policy of the formatters.
pub struct ReportPipeline<S: Storage> {
    storage: S,
    config: ReportConfig,
    client: Client,
}

impl<S: Storage> ReportPipeline<S> {
    pub fn new(storage: S, config: ReportConfig) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    async fn fetch_payload(&self) -> Result<serde_json::Value> {
        match self.config.source.r#type.as_str() {
            "api" => {
                let endpoint = self.config.endpoint()?;
                tracing::debug!("Requesting statistics from: {}", endpoint);

                let mut request = self.client.get(endpoint);
                if let Some(seconds) = self.config.source.timeout_seconds {
                    request = request.timeout(Duration::from_secs(seconds));
                }
                if let Some(headers) = &self.config.source.headers {
                    for (name, value) in headers {
                        request = request.header(name.as_str(), value.as_str());
                    }
                }

                let response = request.send().await?;
                tracing::debug!("Statistics response status: {}", response.status());

                if !response.status().is_success() {
                    tracing::warn!(
                        "Statistics endpoint returned {}, rendering zeros",
                        response.status()
                    );
                    return Ok(serde_json::Value::Null);
                }

                match response.json().await {
                    Ok(payload) => Ok(payload),
                    Err(e) => {
                        tracing::warn!("Statistics payload is not valid JSON ({}), rendering zeros", e);
                        Ok(serde_json::Value::Null)
                    }
                }
            }
            "file" => {
                let path = self.config.source_path()?;
                tracing::debug!("Reading statistics from: {}", path);
                let bytes = self.storage.read_file(path).await?;
                match serde_json::from_slice(&bytes) {
                    Ok(payload) => Ok(payload),
                    Err(e) => {
                        tracing::warn!("Statistics payload is not valid JSON ({}), rendering zeros", e);
                        Ok(serde_json::Value::Null)
                    }
                }
            }
            other => Err(CifraError::InvalidConfigValueError {
                field: "source.type".to_string(),
                value: other.to_string(),
                reason: "Supported source types: api, file".to_string(),
            }),
        }
    }

    fn render_text(&self, entries: &[ReportEntry]) -> String {
        let mut lines = vec![
            format!("Informe: {}", self.config.report.name),
            format!(
                "Generado: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ),
            String::new(),
        ];
        for entry in entries {
            lines.push(format!("{}: {}", entry.label, entry.formatted));
        }
        lines.join("\n")
    }
}

fn coerce_value(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(number) => {
            let value = number.as_f64().unwrap_or(0.0);
            if value.is_finite() {
                value
            } else {
                0.0
            }
        }
        serde_json::Value::String(text) => format::parse_numeric_input(text),
        _ => 0.0,
    }
}

fn render_csv(entries: &[ReportEntry]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["campo", "etiqueta", "valor_formateado"])?;
    for entry in entries {
        writer.write_record([
            entry.name.as_str(),
            entry.label.as_str(),
            entry.formatted.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CifraError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for ReportPipeline<S> {
    type Item = StatRecord;
    type Output = ReportResult;

    async fn extract(&self) -> Result<Vec<StatRecord>> {
        let payload = self.fetch_payload().await?;

        let records = match payload {
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(name, value)| StatRecord { name, value })
                .collect(),
            serde_json::Value::Null => Vec::new(),
            _ => {
                tracing::warn!("Statistics payload is not an object, rendering zeros");
                Vec::new()
            }
        };

        Ok(records)
    }

    async fn transform(&self, records: Vec<StatRecord>) -> Result<ReportResult> {
        let mut entries = Vec::with_capacity(self.config.fields.len());

        for field in &self.config.fields {
            // A field missing from the payload is absent input: it renders
            // as zero, the same as a non-numeric value.
            let value = records
                .iter()
                .find(|record| record.name == field.name)
                .map(|record| coerce_value(&record.value))
                .unwrap_or(0.0);

            let formatted = format::apply(&field.spec(), value);
            tracing::debug!("Field '{}': {} -> '{}'", field.name, value, formatted);

            entries.push(ReportEntry {
                name: field.name.clone(),
                label: field.display_label().to_string(),
                raw: value,
                formatted,
            });
        }

        let json_output = serde_json::to_string_pretty(&entries)?;
        let csv_output = render_csv(&entries)?;
        let text_output = self.render_text(&entries);

        Ok(ReportResult {
            entries,
            json_output,
            csv_output,
            text_output,
        })
    }

    async fn load(&self, result: ReportResult) -> Result<String> {
        let mut files: Vec<(&str, &[u8])> = Vec::new();
        for format in &self.config.load.output_formats {
            match format.as_str() {
                "json" => files.push((JSON_FILENAME, result.json_output.as_bytes())),
                "csv" => files.push((CSV_FILENAME, result.csv_output.as_bytes())),
                "text" => files.push((TEXT_FILENAME, result.text_output.as_bytes())),
                other => {
                    tracing::warn!("Skipping unsupported output format: {}", other);
                }
            }
        }

        if self.config.compression_enabled() {
            let zip_name = self.config.compression_filename();
            tracing::debug!("Bundling {} report files into {}", files.len(), zip_name);

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, bytes) in &files {
                    zip.start_file(*name, SimpleFileOptions::default())?;
                    zip.write_all(bytes)?;
                }
                zip.finish()?.into_inner()
            };

            let output_file = format!("{}/{}", self.config.load.output_path, zip_name);
            self.storage.write_file(&output_file, &zip_data).await?;
            return Ok(output_file);
        }

        for (name, bytes) in &files {
            let output_file = format!("{}/{}", self.config.load.output_path, name);
            self.storage.write_file(&output_file, bytes).await?;
        }
        Ok(self.config.load.output_path.clone())
    }
}
