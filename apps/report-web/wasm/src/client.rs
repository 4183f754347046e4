//! Fetch-based service clients
//!
//! Network calls go through `window.fetch`; everything that interprets a
//! reply is a plain function over status and body so it can be tested
//! without a browser.

use report_types::{FormatResponse, GetResultsResponse, ReplaceTextResponse, StartAnalysisResponse};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Status and body text of a finished request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub(crate) fn to_js(err: impl ToString) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub(crate) fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

pub(crate) async fn send(
    method: &str,
    url: &str,
    body: Option<&JsValue>,
    content_type: Option<&str>,
    token: Option<&str>,
) -> Result<HttpReply, JsValue> {
    let window = web_sys::window().ok_or("No window")?;

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = body {
        opts.set_body(body);
    }

    let request = Request::new_with_str_and_init(url, &opts)?;
    if let Some(content_type) = content_type {
        request.headers().set("Content-Type", content_type)?;
    }
    if let Some(token) = token {
        request
            .headers()
            .set("Authorization", &format!("Bearer {}", token))?;
    }

    let response = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response: Response = response.dyn_into()?;
    let text = JsFuture::from(response.text()?).await?;

    Ok(HttpReply {
        status: response.status(),
        body: text.as_string().unwrap_or_default(),
    })
}

pub(crate) async fn post_json<T: Serialize>(
    url: &str,
    body: &T,
    token: Option<&str>,
) -> Result<HttpReply, JsValue> {
    let json = serde_json::to_string(body).map_err(to_js)?;
    send(
        "POST",
        url,
        Some(&JsValue::from_str(&json)),
        Some("application/json"),
        token,
    )
    .await
}

/// Resolve after `ms` milliseconds
pub(crate) async fn sleep(ms: u32) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let delay = i32::try_from(ms).unwrap_or(i32::MAX);
    let mut schedule = |resolve: js_sys::Function, _reject: js_sys::Function| {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, delay);
    };
    JsFuture::from(js_sys::Promise::new(&mut schedule)).await?;
    Ok(())
}

/// User-facing message for a failed reply
///
/// Prefers the `error` field of a JSON body, then `message`, then the raw
/// body text.
pub fn error_message(reply: &HttpReply) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&reply.body) {
        for field in ["error", "message"] {
            if let Some(text) = json.get(field).and_then(|v| v.as_str()) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    let body = reply.body.trim();
    if body.is_empty() {
        format!("HTTP {}", reply.status)
    } else {
        format!("HTTP {}: {}", reply.status, body)
    }
}

fn parse_success<T: serde::de::DeserializeOwned>(reply: &HttpReply, what: &str) -> Result<T, String> {
    if !reply.is_success() {
        return Err(error_message(reply));
    }
    serde_json::from_str(&reply.body).map_err(|e| format!("Malformed {} response: {}", what, e))
}

/// Formatted string from a formatting-service reply
pub fn parse_format_reply(reply: &HttpReply) -> Result<String, String> {
    parse_success::<FormatResponse>(reply, "formatting").map(|r| r.formatted)
}

pub fn parse_replace_reply(reply: &HttpReply) -> Result<ReplaceTextResponse, String> {
    let response: ReplaceTextResponse = parse_success(reply, "replace-text")?;
    if response.success {
        Ok(response)
    } else {
        Err(response.error.unwrap_or(response.message))
    }
}

pub fn parse_presigned_reply(reply: &HttpReply) -> Result<String, String> {
    let json: serde_json::Value = parse_success(reply, "pre-signed URL")?;
    json.get("presignedUrl")
        .and_then(|v| v.as_str())
        .filter(|url| !url.is_empty())
        .map(String::from)
        .ok_or_else(|| "No pre-signed URL returned from server".to_string())
}

pub fn parse_start_reply(reply: &HttpReply) -> Result<String, String> {
    let response: StartAnalysisResponse = parse_success(reply, "OCR start")?;
    if response.job_id.is_empty() {
        return Err("No job ID returned from OCR service".into());
    }
    Ok(response.job_id)
}

pub fn parse_results_reply(reply: &HttpReply) -> Result<GetResultsResponse, String> {
    parse_success(reply, "OCR results")
}

/// Where the OCR job writes its raw output for a template key
///
/// `users/u/templates/invoice/invoice.pdf` becomes
/// `users/u/templates/invoice/textract-output`.
pub fn ocr_output_prefix(template_key: &str) -> String {
    match template_key.rsplit_once('/') {
        Some((folder, _)) => format!("{}/textract-output", folder),
        None => "textract-output".to_string(),
    }
}

pub fn validate_upload(content_type: &str, key: &str) -> Result<(), String> {
    if key.trim().is_empty() {
        return Err("Key is required".into());
    }
    if content_type != "application/pdf" {
        return Err(format!(
            "Invalid file type: {}. Only PDF files (application/pdf) are allowed",
            content_type
        ));
    }
    Ok(())
}
