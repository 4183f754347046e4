//! API handlers for the report server
//!
//! Provides REST endpoints for:
//! - Significant-figure and decimal-place formatting
//! - PDF text replacement through object storage

use axum::{extract::State, http::HeaderMap, Json};
use report_core::format::{
    format_with_rounding, format_with_sig_figs, is_numeric, MAX_PRECISION,
};
use report_types::{
    FormatResponse, NumberInput, ReplaceTextRequest, ReplaceTextResponse, RoundingRequest,
    SigFigsRequest,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::storage::{location, PDF_CONTENT_TYPE};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "report-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn numeric_text(value: &NumberInput) -> Result<String, ApiError> {
    let text = value.as_text();
    if is_numeric(&text) {
        Ok(text)
    } else {
        Err(ApiError::InvalidRequest(format!(
            "Value '{}' is not a number",
            text
        )))
    }
}

/// Handler: POST /api/format/sig-figs
pub async fn handle_sig_figs(
    Json(req): Json<SigFigsRequest>,
) -> Result<Json<FormatResponse>, ApiError> {
    let (Some(value), Some(sig_figs)) = (req.value, req.sig_figs) else {
        return Err(ApiError::MissingFields("value, sigFigs"));
    };
    if !(1..=MAX_PRECISION).contains(&sig_figs) {
        return Err(ApiError::InvalidRequest(format!(
            "sigFigs must be between 1 and {}",
            MAX_PRECISION
        )));
    }
    let text = numeric_text(&value)?;
    let formatted = format_with_sig_figs(&text, sig_figs);
    debug!(value = %text, sig_figs, formatted = %formatted, "formatted sig figs");

    Ok(Json(FormatResponse {
        original: value,
        formatted,
        sig_figs: Some(sig_figs),
        decimal_places: None,
    }))
}

/// Handler: POST /api/format/rounding
pub async fn handle_rounding(
    Json(req): Json<RoundingRequest>,
) -> Result<Json<FormatResponse>, ApiError> {
    let (Some(value), Some(decimal_places)) = (req.value, req.decimal_places) else {
        return Err(ApiError::MissingFields("value, decimalPlaces"));
    };
    if !(0..=MAX_PRECISION).contains(&decimal_places) {
        return Err(ApiError::InvalidRequest(format!(
            "decimalPlaces must be between 0 and {}",
            MAX_PRECISION
        )));
    }
    let text = numeric_text(&value)?;
    let formatted = format_with_rounding(&text, decimal_places);
    debug!(value = %text, decimal_places, formatted = %formatted, "formatted rounding");

    Ok(Json(FormatResponse {
        original: value,
        formatted,
        sig_figs: None,
        decimal_places: Some(decimal_places),
    }))
}

/// Bearer token from the `Authorization` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Handler: POST /api/pdf/replace-text
pub async fn handle_replace_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ReplaceTextRequest>,
) -> Result<Json<ReplaceTextResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    if req.replacements.is_empty() {
        return Err(ApiError::InvalidRequest("No replacements provided".into()));
    }

    info!(
        template = %req.template_id,
        page = req.page_number,
        count = req.replacements.len(),
        "replace-text request"
    );

    let template = state
        .store
        .get(&req.source_bucket, &req.template_id, &token)
        .await?;

    let replacements = req.replacements.clone();
    let page_number = req.page_number;
    let output = tokio::task::spawn_blocking(move || {
        report_pdf::replace_text(&template, &replacements, page_number)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    state
        .store
        .put(
            &req.destination_bucket,
            &req.output_key,
            output,
            PDF_CONTENT_TYPE,
            &token,
        )
        .await?;

    let destination = location(&req.destination_bucket, &req.output_key);
    info!(destination = %destination, "report written");

    Ok(Json(ReplaceTextResponse {
        success: true,
        message: "Text replaced successfully".into(),
        source: Some(location(&req.source_bucket, &req.template_id)),
        destination: Some(destination),
        replacements_count: Some(req.replacements.len()),
        error: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(auth: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static(auth),
        );
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(
            bearer_token(&headers_with("Bearer abc.def")).as_deref(),
            Some("abc.def")
        );
        assert_eq!(bearer_token(&headers_with("raw-token")).as_deref(), Some("raw-token"));
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_numeric_text_rejects_words() {
        assert!(numeric_text(&NumberInput::from("abc")).is_err());
        assert_eq!(numeric_text(&NumberInput::from(" 1.50 ")).unwrap(), " 1.50 ");
    }
}
