// ============================================================
// METADATA TOOL
// ============================================================
// Request/response envelope for the invoking tool layer

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::application::MetadataAssembler;
use crate::domain::error::{MetadataError, Result};
use crate::domain::metadata::{Metadata, MetadataConfig, MetadataOptions};
use crate::shared::log_buffer::{add_log, LogBuffer};

const LOG_SOURCE: &str = "Tool";

/// Arguments of a metadata tool call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MetadataRequest {
    pub file_path: String,
    #[serde(default)]
    pub sample_cap: Option<usize>,
    #[serde(default)]
    pub fallback_encoding: Option<String>,
    #[serde(default)]
    pub sheet_name: Option<String>,
    /// One character, or "tab" / "\t"
    #[serde(default)]
    pub delimiter: Option<String>,
}

impl MetadataRequest {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            sample_cap: None,
            fallback_encoding: None,
            sheet_name: None,
            delimiter: None,
        }
    }

    /// Merge request arguments over configured defaults
    pub fn options(&self, config: &MetadataConfig) -> Result<MetadataOptions> {
        let mut options = config.options();
        if let Some(cap) = self.sample_cap {
            options.sample_cap = cap;
        }
        if let Some(label) = &self.fallback_encoding {
            options.fallback_encoding = label.clone();
        }
        options.sheet = self.sheet_name.clone();
        options.delimiter = self
            .delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()?;
        Ok(options)
    }
}

/// Outcome of a metadata tool call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum ToolResponse {
    Success { metadata: Box<Metadata> },
    Error { error: String, message: String },
}

impl ToolResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResponse::Success { .. })
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({
                "status": "ERROR",
                "error": "IO_ERROR",
                "message": format!("failed to serialize response: {}", e),
            })
        })
    }
}

impl From<Result<Metadata>> for ToolResponse {
    fn from(result: Result<Metadata>) -> Self {
        match result {
            Ok(metadata) => ToolResponse::Success {
                metadata: Box::new(metadata),
            },
            Err(err) => ToolResponse::Error {
                error: err.code().to_string(),
                message: err.message().to_string(),
            },
        }
    }
}

/// Run one metadata request; failures become an `ERROR` response
pub fn run_metadata_tool(request: &MetadataRequest, config: &MetadataConfig, logs: &LogBuffer) -> ToolResponse {
    let assembler = MetadataAssembler::new(config.clone());
    let result = request
        .options(config)
        .and_then(|options| assembler.assemble(Path::new(&request.file_path), &options, logs));
    ToolResponse::from(result)
}

/// Run a tool call from raw JSON arguments
pub fn handle_tool_call(arguments: JsonValue, config: &MetadataConfig, logs: &LogBuffer) -> JsonValue {
    match serde_json::from_value::<MetadataRequest>(arguments) {
        Ok(request) => run_metadata_tool(&request, config, logs).to_json(),
        Err(e) => {
            add_log(logs, "WARN", LOG_SOURCE, &format!("Rejected tool arguments: {}", e));
            ToolResponse::from(Err(MetadataError::InvalidConfig(format!(
                "invalid tool arguments: {}",
                e
            ))))
            .to_json()
        }
    }
}

fn parse_delimiter(raw: &str) -> Result<u8> {
    match raw {
        "\t" | "\\t" | "tab" => Ok(b'\t'),
        other if other.len() == 1 && other.is_ascii() => Ok(other.as_bytes()[0]),
        other => Err(MetadataError::InvalidConfig(format!(
            "delimiter must be a single ASCII character, got '{}'",
            other
        ))),
    }
}
