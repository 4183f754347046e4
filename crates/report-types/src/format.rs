//! Wire types for the number-formatting service

use serde::{Deserialize, Serialize};

/// A number as sent by a client: either a JSON number or its string form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(serde_json::Number),
    Text(String),
}

impl NumberInput {
    /// Textual form used as formatter input
    ///
    /// JSON numbers keep their shortest round-trip representation, so
    /// `12345` stays `"12345"` and `3.14159` stays `"3.14159"`.
    pub fn as_text(&self) -> String {
        match self {
            NumberInput::Number(n) => n.to_string(),
            NumberInput::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for NumberInput {
    fn from(s: &str) -> Self {
        NumberInput::Text(s.to_string())
    }
}

/// `POST /api/format/sig-figs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SigFigsRequest {
    #[serde(default)]
    pub value: Option<NumberInput>,
    #[serde(rename = "sigFigs", default)]
    pub sig_figs: Option<i64>,
}

/// `POST /api/format/rounding`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingRequest {
    #[serde(default)]
    pub value: Option<NumberInput>,
    #[serde(rename = "decimalPlaces", default)]
    pub decimal_places: Option<i64>,
}

/// Response of both formatting endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatResponse {
    pub original: NumberInput,
    pub formatted: String,
    #[serde(rename = "sigFigs", default, skip_serializing_if = "Option::is_none")]
    pub sig_figs: Option<i64>,
    #[serde(
        rename = "decimalPlaces",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub decimal_places: Option<i64>,
}
