//! Report editing session exposed to JS
//!
//! The page keeps one [`WasmReportSession`] per template. All state changes
//! go through `dispatch` with a JSON action; reads return JSON strings.
//! Async methods borrow the session only between awaits, so the page may
//! keep dispatching while a formatting call or OCR job is in flight.

use std::cell::RefCell;

use chrono::Utc;
use report_core::geometry::pixel_to_normalized;
use report_core::{Completion, PollStep, ReportContext, ReportSession, Section, SessionAction};
use report_types::{BlockType, GetResultsRequest, StartAnalysisRequest};
use wasm_bindgen::prelude::*;

use crate::client::{
    error_message, js_error_text, ocr_output_prefix, parse_format_reply, parse_presigned_reply,
    parse_replace_reply, parse_results_reply, parse_start_reply, post_json, send, sleep, to_js,
    validate_upload,
};
use crate::config::ClientConfig;

/// Block-type filter from JS: absent, empty or `"ALL"` means every type
pub fn parse_filter(filter: Option<&str>) -> Result<Option<BlockType>, String> {
    let Some(name) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
        return Ok(None);
    };
    let name = name.to_ascii_uppercase();
    if name == "ALL" {
        return Ok(None);
    }
    match serde_json::from_value::<BlockType>(serde_json::Value::String(name.clone())) {
        Ok(BlockType::Other) if name != "OTHER" => Err(format!("Unknown block type: {}", name)),
        Ok(block_type) => Ok(Some(block_type)),
        Err(e) => Err(e.to_string()),
    }
}

/// Apply a JSON-encoded action and return the JSON-encoded event
pub fn dispatch_json(session: &mut ReportSession, action_json: &str) -> Result<String, String> {
    let action: SessionAction =
        serde_json::from_str(action_json).map_err(|e| format!("Invalid action: {}", e))?;
    let event = session.dispatch(action).map_err(|e| e.to_string())?;
    serde_json::to_string(&event).map_err(|e| e.to_string())
}

pub fn overlay_json(
    session: &ReportSession,
    page: u32,
    width_px: f64,
    height_px: f64,
    filter: Option<&str>,
) -> Result<String, String> {
    let filter = parse_filter(filter)?;
    let boxes = session.overlay(page, width_px, height_px, filter);
    serde_json::to_string(&boxes).map_err(|e| e.to_string())
}

/// Id of the smallest block under a click, in rendered-page pixels
pub fn block_at(
    session: &ReportSession,
    page: u32,
    x_px: f64,
    y_px: f64,
    width_px: f64,
    height_px: f64,
    filter: Option<&str>,
) -> Result<Option<String>, String> {
    let filter = parse_filter(filter)?;
    let (x, y) = pixel_to_normalized(x_px, y_px, width_px, height_px);
    Ok(session
        .blocks()
        .block_at(page, x, y, filter)
        .map(|b| b.id.clone()))
}

pub fn variables_json(session: &ReportSession, section: &str) -> Result<String, String> {
    let section =
        Section::parse(section).ok_or_else(|| format!("Unknown section: {}", section))?;
    serde_json::to_string(&session.registry().variables_in(section)).map_err(|e| e.to_string())
}

/// Context for generating page 1 of a template
pub fn report_context(
    config: &ClientConfig,
    template: String,
    user_sub: String,
    auth_token: String,
) -> ReportContext {
    ReportContext {
        template: Some(template),
        user_sub,
        auth_token: Some(auth_token),
        bucket: config.bucket.clone(),
        page_number: 0,
    }
}

#[wasm_bindgen]
pub struct WasmReportSession {
    inner: RefCell<ReportSession>,
    config: ClientConfig,
}

#[wasm_bindgen]
impl WasmReportSession {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmReportSession, JsValue> {
        let config = ClientConfig::from_json(config_json).map_err(to_js)?;
        Ok(Self {
            inner: RefCell::new(ReportSession::new()),
            config,
        })
    }

    /// Apply a session action, e.g. `{"type":"bind","variable":"…","block":"…"}`
    #[wasm_bindgen]
    pub fn dispatch(&self, action_json: &str) -> Result<String, JsValue> {
        dispatch_json(&mut self.inner.borrow_mut(), action_json).map_err(to_js)
    }

    #[wasm_bindgen(js_name = overlayBoxes)]
    pub fn overlay_boxes(
        &self,
        page: u32,
        width_px: f64,
        height_px: f64,
        filter: Option<String>,
    ) -> Result<String, JsValue> {
        overlay_json(&self.inner.borrow(), page, width_px, height_px, filter.as_deref())
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = blockAt)]
    pub fn block_at(
        &self,
        page: u32,
        x_px: f64,
        y_px: f64,
        width_px: f64,
        height_px: f64,
        filter: Option<String>,
    ) -> Result<Option<String>, JsValue> {
        block_at(
            &self.inner.borrow(),
            page,
            x_px,
            y_px,
            width_px,
            height_px,
            filter.as_deref(),
        )
        .map_err(to_js)
    }

    #[wasm_bindgen(js_name = variablesJson)]
    pub fn variables_json(&self, section: &str) -> Result<String, JsValue> {
        variables_json(&self.inner.borrow(), section).map_err(to_js)
    }

    #[wasm_bindgen(js_name = replacementsJson)]
    pub fn replacements_json(&self) -> Result<String, JsValue> {
        let replacements = self.inner.borrow().build_replacements().map_err(to_js)?;
        serde_json::to_string(&replacements).map_err(to_js)
    }

    #[wasm_bindgen(js_name = displayValue)]
    pub fn display_value(&self, variable_id: &str) -> Option<String> {
        self.inner
            .borrow()
            .engine()
            .display_value(variable_id)
            .map(String::from)
    }

    #[wasm_bindgen(js_name = blockValue)]
    pub fn block_value(&self, block_id: &str) -> Option<String> {
        self.inner
            .borrow()
            .engine()
            .block_value(block_id)
            .map(String::from)
    }

    /// Format a variable through the backend and project the result
    ///
    /// Resolves to the new display string, or `undefined` when a newer
    /// edit superseded this request. Service failures fall back to the raw
    /// value rather than rejecting.
    #[wasm_bindgen(js_name = formatVariableRemote)]
    pub async fn format_variable_remote(
        &self,
        variable_id: String,
    ) -> Result<Option<String>, JsValue> {
        let ticket = self
            .inner
            .borrow_mut()
            .begin_remote_format(&variable_id)
            .map_err(to_js)?;

        let Some(request) = ticket.request.clone() else {
            return Ok(self.display_value(&variable_id));
        };

        let url = self.config.backend(request.path());
        let body = request.body().map_err(to_js)?;
        let outcome = match post_json(&url, &body, None).await {
            Ok(reply) => parse_format_reply(&reply),
            Err(err) => Err(js_error_text(&err)),
        };

        match self
            .inner
            .borrow_mut()
            .complete_remote_format(&ticket, outcome)
        {
            Completion::Applied(display) => Ok(Some(display)),
            Completion::Stale => {
                web_sys::console::log_1(
                    &format!("Dropped stale formatting result for {}", variable_id).into(),
                );
                Ok(None)
            }
        }
    }

    /// Build the replace-text request and send it; resolves to the report location
    #[wasm_bindgen(js_name = generateReport)]
    pub async fn generate_report(
        &self,
        template_name: String,
        user_sub: String,
        auth_token: String,
    ) -> Result<String, JsValue> {
        let context = report_context(&self.config, template_name, user_sub, auth_token);
        let request = self
            .inner
            .borrow()
            .build_request(&context, Utc::now())
            .map_err(to_js)?;
        let token = context.auth_token.unwrap_or_default();

        web_sys::console::log_1(
            &format!(
                "Generating report with {} replacements",
                request.replacements.len()
            )
            .into(),
        );

        let reply = post_json(
            &self.config.backend("/api/pdf/replace-text"),
            &request,
            Some(&token),
        )
        .await?;
        let response = parse_replace_reply(&reply).map_err(to_js)?;

        Ok(response.destination.unwrap_or_else(|| {
            format!("s3://{}/{}", request.destination_bucket, request.output_key)
        }))
    }

    /// Upload a template PDF through a pre-signed URL; resolves to its key
    #[wasm_bindgen(js_name = uploadTemplate)]
    pub async fn upload_template(
        &self,
        bytes: Vec<u8>,
        content_type: String,
        key: String,
        auth_token: String,
    ) -> Result<String, JsValue> {
        validate_upload(&content_type, &key).map_err(to_js)?;
        let bucket = self
            .config
            .bucket
            .as_deref()
            .ok_or_else(|| to_js(report_core::ReportError::MissingBucket))?;
        let endpoint = self.config.presigned_url_endpoint().map_err(to_js)?;

        let presign = serde_json::json!({
            "bucket": bucket,
            "key": key,
            "method": "PUT",
            "contentType": content_type,
        });
        let reply = post_json(endpoint, &presign, Some(&auth_token)).await?;
        let url = parse_presigned_reply(&reply)
            .map_err(|e| to_js(format!("Failed to get pre-signed URL: {}", e)))?;

        let body: JsValue = js_sys::Uint8Array::from(bytes.as_slice()).into();
        let reply = send("PUT", &url, Some(&body), Some(&content_type), None).await?;
        if !reply.is_success() {
            return Err(to_js(format!("Upload failed: {}", error_message(&reply))));
        }

        web_sys::console::log_1(&format!("Uploaded template to {}", key).into());
        Ok(key)
    }

    /// Run document analysis on an uploaded template and load its blocks
    ///
    /// Resolves to the number of blocks loaded.
    #[wasm_bindgen(js_name = runOcr)]
    pub async fn run_ocr(
        &self,
        bucket: String,
        key: String,
        output_bucket: String,
        auth_token: String,
    ) -> Result<u32, JsValue> {
        let (start_url, results_url) = self.config.ocr_endpoints().map_err(to_js)?;

        let start = StartAnalysisRequest {
            bucket,
            output_key_prefix: ocr_output_prefix(&key),
            key,
            output_bucket,
        };
        let reply = post_json(start_url, &start, Some(&auth_token)).await?;
        let job_id = parse_start_reply(&reply).map_err(to_js)?;
        web_sys::console::log_1(&format!("OCR job started: {}", job_id).into());

        let mut poll = self.config.ocr_poll();
        let mut next_token = None;
        loop {
            let request = GetResultsRequest {
                job_id: job_id.clone(),
                next_token: next_token.take(),
            };
            let reply = post_json(results_url, &request, Some(&auth_token)).await?;
            let response = parse_results_reply(&reply).map_err(to_js)?;

            match poll.observe(response).map_err(to_js)? {
                PollStep::Pending => sleep(poll.interval_ms).await?,
                PollStep::FetchMore(token) => next_token = Some(token),
                PollStep::Complete(index) => {
                    let blocks = index.blocks().to_vec();
                    let count = blocks.len() as u32;
                    self.inner
                        .borrow_mut()
                        .dispatch(SessionAction::LoadBlocks { blocks })
                        .map_err(to_js)?;
                    return Ok(count);
                }
            }
        }
    }
}
