use crate::domain::model::{FormatMode, FormatSpec};
use crate::utils::error::{CifraError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// TOML configuration for a statistics report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub report: ReportMeta,
    pub source: SourceConfig,
    pub fields: Vec<FieldConfig>,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: String,
    pub endpoint: Option<String>,
    pub path: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

/// One report line: which payload field to read and how to format it.
/// `format` takes the marker tokens (numero, moneda, porcentaje, compacto);
/// anything else is a deserialization error. Configuration is strict; only
/// data values are fail-soft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub label: Option<String>,
    pub format: FormatMode,
    pub decimales: Option<u32>,
    pub simbolo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

impl FieldConfig {
    pub fn spec(&self) -> FormatSpec {
        FormatSpec {
            mode: self.format,
            decimals: self.decimales,
            symbol: self.simbolo.clone(),
        }
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

impl ReportConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CifraError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CifraError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` references with environment values. Unset
    /// variables are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type.as_str() {
            "api" => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
            "file" => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                validation::validate_path("source.path", path)?;
            }
            other => {
                return Err(CifraError::InvalidConfigValueError {
                    field: "source.type".to_string(),
                    value: other.to_string(),
                    reason: "Supported source types: api, file".to_string(),
                })
            }
        }

        if let Some(seconds) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", seconds, 1, 300)?;
        }

        if self.fields.is_empty() {
            return Err(CifraError::MissingConfigError {
                field: "fields".to_string(),
            });
        }
        for field in &self.fields {
            validation::validate_non_empty_string("fields.name", &field.name)?;
            if let Some(decimals) = field.decimales {
                validation::validate_range("fields.decimales", decimals, 0, 10)?;
            }
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;

        if self.load.output_formats.is_empty() {
            return Err(CifraError::MissingConfigError {
                field: "load.output_formats".to_string(),
            });
        }
        let valid_formats = ["json", "csv", "text"];
        for format in &self.load.output_formats {
            if !valid_formats.contains(&format.as_str()) {
                return Err(CifraError::InvalidConfigValueError {
                    field: "load.output_formats".to_string(),
                    value: format.clone(),
                    reason: format!(
                        "Unsupported format. Valid formats: {}",
                        valid_formats.join(", ")
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn endpoint(&self) -> Result<&str> {
        let endpoint =
            validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
        Ok(endpoint.as_str())
    }

    pub fn source_path(&self) -> Result<&str> {
        let path = validation::validate_required_field("source.path", &self.source.path)?;
        Ok(path.as_str())
    }

    pub fn compression_enabled(&self) -> bool {
        self.load
            .compression
            .as_ref()
            .map(|c| c.enabled)
            .unwrap_or(false)
    }

    pub fn compression_filename(&self) -> &str {
        self.load
            .compression
            .as_ref()
            .map(|c| c.filename.as_str())
            .unwrap_or("informe.zip")
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
