//! Client configuration passed in from JS

use report_core::ocr::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS};
use report_core::OcrPoll;
use serde::{Deserialize, Serialize};

/// Endpoints and limits the browser client works with
///
/// Built by the page from its environment and handed to
/// `WasmReportSession::new` as JSON. Only `backendUrl` is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL of the formatting / replace-text backend
    pub backend_url: String,
    #[serde(default)]
    pub presigned_url_endpoint: Option<String>,
    #[serde(default)]
    pub ocr_start_endpoint: Option<String>,
    #[serde(default)]
    pub ocr_results_endpoint: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub ocr_poll_interval_ms: u32,
    #[serde(default = "default_max_attempts")]
    pub ocr_max_attempts: u32,
}

fn default_poll_interval() -> u32 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: ClientConfig =
            serde_json::from_str(json).map_err(|e| format!("Invalid client config: {}", e))?;
        if config.backend_url.trim().is_empty() {
            return Err("Invalid client config: backendUrl is empty".into());
        }
        Ok(config)
    }

    /// Join a backend path onto the base URL
    pub fn backend(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn presigned_url_endpoint(&self) -> Result<&str, String> {
        required(&self.presigned_url_endpoint, "Pre-signed URL endpoint")
    }

    pub fn ocr_endpoints(&self) -> Result<(&str, &str), String> {
        Ok((
            required(&self.ocr_start_endpoint, "OCR start endpoint")?,
            required(&self.ocr_results_endpoint, "OCR results endpoint")?,
        ))
    }

    pub fn ocr_poll(&self) -> OcrPoll {
        OcrPoll::new(self.ocr_poll_interval_ms, self.ocr_max_attempts)
    }
}

fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str, String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("{} is not configured", what))
}
