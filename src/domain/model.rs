use serde::{Deserialize, Serialize};

/// Presentation mode selected by a markup marker or a report field.
///
/// The serialized tokens are the Spanish marker values consumed from host
/// markup and report configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatMode {
    #[serde(rename = "numero")]
    Plain,
    #[serde(rename = "moneda")]
    Currency,
    #[serde(rename = "porcentaje")]
    Percentage,
    #[serde(rename = "compacto")]
    Compact,
}

impl FormatMode {
    /// Resolves a `data-format` marker value. Unrecognized values yield
    /// `None` and the element is left untouched.
    pub fn from_marker(value: &str) -> Option<Self> {
        match value {
            "numero" => Some(Self::Plain),
            "moneda" => Some(Self::Currency),
            "porcentaje" => Some(Self::Percentage),
            "compacto" => Some(Self::Compact),
            _ => None,
        }
    }

    pub fn as_marker(&self) -> &'static str {
        match self {
            Self::Plain => "numero",
            Self::Currency => "moneda",
            Self::Percentage => "porcentaje",
            Self::Compact => "compacto",
        }
    }
}

/// Formatting options attached to a mode. `None` means "use the mode's
/// default": 0 decimals for plain and currency, 1 for percentage, `$` for
/// the currency symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpec {
    pub mode: FormatMode,
    pub decimals: Option<u32>,
    pub symbol: Option<String>,
}

impl FormatSpec {
    pub fn new(mode: FormatMode) -> Self {
        Self {
            mode,
            decimals: None,
            symbol: None,
        }
    }
}

/// One marked element discovered while scanning a document, in document
/// order. `raw_text` is the accumulated descendant text, still unparsed.
#[derive(Debug, Clone)]
pub struct Marker {
    pub ordinal: usize,
    pub raw_text: String,
    pub spec: FormatSpec,
}

/// One field of the statistics payload, as extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatRecord {
    pub name: String,
    pub value: serde_json::Value,
}

/// Output of the markup transform stage: formatted strings aligned with the
/// marker ordinals from the scan.
#[derive(Debug, Clone)]
pub struct MarkupResult {
    pub replacements: Vec<String>,
}

/// One formatted report line.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub label: String,
    pub raw: f64,
    pub formatted: String,
}

/// Output of the report transform stage.
#[derive(Debug, Clone)]
pub struct ReportResult {
    pub entries: Vec<ReportEntry>,
    pub json_output: String,
    pub csv_output: String,
    pub text_output: String,
}
