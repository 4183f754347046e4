//! Replacement instructions and the text-replacement request

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use report_types::{PageSize, ReplaceTextRequest, ReplacementInstruction};
use tracing::{debug, warn};

use crate::error::{ReportError, Result};
use crate::geometry::to_document_rect_on;
use crate::ocr::BlockIndex;

/// One instruction per block with a non-empty display string
///
/// Blocks missing from `index`, or without geometry, are skipped. Output is
/// ordered by block id.
pub fn build_replacements(
    index: &BlockIndex,
    block_values: &BTreeMap<String, String>,
    page_size: PageSize,
) -> Result<Vec<ReplacementInstruction>> {
    collect(index, block_values, page_size, None)
}

/// [`build_replacements`] restricted to blocks on one 1-based page
pub fn build_page_replacements(
    index: &BlockIndex,
    block_values: &BTreeMap<String, String>,
    page_size: PageSize,
    page: u32,
) -> Result<Vec<ReplacementInstruction>> {
    collect(index, block_values, page_size, Some(page))
}

fn collect(
    index: &BlockIndex,
    block_values: &BTreeMap<String, String>,
    page_size: PageSize,
    page: Option<u32>,
) -> Result<Vec<ReplacementInstruction>> {
    let mut replacements = Vec::new();
    for (block_id, text) in block_values {
        if text.is_empty() {
            continue;
        }
        let Some(block) = index.get(block_id) else {
            warn!(block = %block_id, "bound block not found in OCR results, skipping");
            continue;
        };
        if page.is_some_and(|p| block.page != p) {
            continue;
        }
        let Some(bbox) = block.bounding_box() else {
            warn!(block = %block_id, "bound block has no geometry, skipping");
            continue;
        };
        replacements.push(ReplacementInstruction::new(
            to_document_rect_on(bbox, page_size),
            text.clone(),
        ));
    }

    if replacements.is_empty() {
        return Err(ReportError::NothingToReplace);
    }
    debug!(count = replacements.len(), "replacements assembled");
    Ok(replacements)
}

/// Object keys for a template and the report generated from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTarget {
    /// Template name without the `.pdf` suffix
    pub name: String,
    pub template_key: String,
    pub output_key: String,
}

impl ReportTarget {
    pub fn new(user_sub: &str, template: &str, at: DateTime<Utc>) -> Result<Self> {
        let template = template.trim();
        if template.is_empty() {
            return Err(ReportError::MissingTemplate);
        }
        let name = template.strip_suffix(".pdf").unwrap_or(template).to_string();
        let timestamp = at
            .to_rfc3339_opts(SecondsFormat::Millis, true)
            .replace([':', '.'], "-");

        Ok(Self {
            template_key: format!("users/{}/templates/{}/{}.pdf", user_sub, name, name),
            output_key: format!("users/{}/reports/{}_{}.pdf", user_sub, name, timestamp),
            name,
        })
    }

    pub fn now(user_sub: &str, template: &str) -> Result<Self> {
        Self::new(user_sub, template, Utc::now())
    }
}

/// Everything outside the session that a replace-text request needs
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    pub template: Option<String>,
    pub user_sub: String,
    pub auth_token: Option<String>,
    pub bucket: Option<String>,
    /// 0-based page the service edits
    pub page_number: u32,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Validate the context and assemble the request body
///
/// Only blocks on the requested page are included. Checks run in the order
/// the user would fix them: template, sign-in, bindings, storage.
pub fn build_request(
    index: &BlockIndex,
    block_values: &BTreeMap<String, String>,
    page_size: PageSize,
    context: &ReportContext,
    at: DateTime<Utc>,
) -> Result<ReplaceTextRequest> {
    let template = present(&context.template).ok_or(ReportError::MissingTemplate)?;
    present(&context.auth_token).ok_or(ReportError::MissingAuthToken)?;
    let page = context
        .page_number
        .checked_add(1)
        .ok_or(ReportError::NothingToReplace)?;
    let replacements = build_page_replacements(index, block_values, page_size, page)?;
    let bucket = present(&context.bucket).ok_or(ReportError::MissingBucket)?;

    let target = ReportTarget::new(&context.user_sub, template, at)?;
    Ok(ReplaceTextRequest {
        template_id: target.template_key,
        replacements,
        page_number: context.page_number,
        source_bucket: bucket.to_string(),
        destination_bucket: bucket.to_string(),
        output_key: target.output_key,
    })
}
