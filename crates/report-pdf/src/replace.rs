//! Text replacement by content-stream overlay
//!
//! Each instruction paints a white rectangle over its box and draws the new
//! text in Helvetica on top. The page's original content is wrapped in
//! `q`/`Q` so any graphics state it leaves behind does not leak into the
//! overlay.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use report_core::geometry::to_pdf_user_space;
use report_types::{PageSize, ReplacementInstruction};
use tracing::{debug, info};

use crate::error::PdfReplaceError;

/// Largest font size used for replacement text
pub const MAX_FONT_SIZE: f64 = 12.0;

/// Gap between the left edge of the box and the text
pub const TEXT_INSET: f64 = 2.0;

/// Font size for a box of the given height in points
pub fn font_size_for(height: f64) -> f64 {
    (height * 0.7).min(MAX_FONT_SIZE)
}

/// Number of pages in a PDF
pub fn page_count(pdf_bytes: &[u8]) -> Result<u32, PdfReplaceError> {
    let doc = load(pdf_bytes)?;
    Ok(doc.get_pages().len() as u32)
}

/// MediaBox size of a 0-based page, following inheritance from the page tree
pub fn page_size(pdf_bytes: &[u8], page_number: u32) -> Result<PageSize, PdfReplaceError> {
    let doc = load(pdf_bytes)?;
    let page_id = page_id(&doc, page_number)?;
    media_box_size(&doc, page_id)
}

/// Apply replacement instructions to one 0-based page
///
/// Instruction coordinates are document points with a top-left origin.
/// Other pages are left untouched.
pub fn replace_text(
    pdf_bytes: &[u8],
    instructions: &[ReplacementInstruction],
    page_number: u32,
) -> Result<Vec<u8>, PdfReplaceError> {
    let mut doc = load(pdf_bytes)?;
    let page_id = page_id(&doc, page_number)?;

    if instructions.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let size = media_box_size(&doc, page_id)?;
    let font_name = add_font_resource(&mut doc, page_id)?;
    let overlay = overlay_content(instructions, size.height, &font_name);
    let encoded = overlay
        .encode()
        .map_err(|e| PdfReplaceError::OperationError(e.to_string()))?;
    append_content(&mut doc, page_id, encoded)?;

    info!(
        page = page_number,
        count = instructions.len(),
        "applied text replacements"
    );

    let mut output = Vec::new();
    doc.save_to(&mut output)
        .map_err(|e| PdfReplaceError::OperationError(e.to_string()))?;
    Ok(output)
}

fn load(pdf_bytes: &[u8]) -> Result<Document, PdfReplaceError> {
    Document::load_mem(pdf_bytes).map_err(|e| PdfReplaceError::ParseError(e.to_string()))
}

fn page_id(doc: &Document, page_number: u32) -> Result<ObjectId, PdfReplaceError> {
    let pages = doc.get_pages();
    page_number
        .checked_add(1)
        .and_then(|key| pages.get(&key))
        .copied()
        .ok_or(PdfReplaceError::PageOutOfRange {
            page: page_number,
            count: pages.len() as u32,
        })
}

/// Look up a page attribute, walking up `Parent` links for inherited values
fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    // Page trees are shallow; the bound guards against Parent cycles
    for _ in 0..64 {
        let dict = doc.get_object(current).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

fn resolve(doc: &Document, object: Object) -> Object {
    match object {
        Object::Reference(id) => doc.get_object(id).cloned().unwrap_or(Object::Null),
        other => other,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn media_box_size(doc: &Document, page_id: ObjectId) -> Result<PageSize, PdfReplaceError> {
    let media_box = inherited(doc, page_id, b"MediaBox")
        .map(|obj| resolve(doc, obj))
        .ok_or(PdfReplaceError::MissingMediaBox)?;
    let Object::Array(items) = media_box else {
        return Err(PdfReplaceError::MissingMediaBox);
    };
    let values: Vec<f64> = items
        .iter()
        .map(|item| number(&resolve(doc, item.clone())))
        .collect::<Option<_>>()
        .ok_or(PdfReplaceError::MissingMediaBox)?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Ok(PageSize::new((x1 - x0).abs(), (y1 - y0).abs())),
        _ => Err(PdfReplaceError::MissingMediaBox),
    }
}

enum ResourcesHome {
    Page,
    Object(ObjectId),
}

/// Register Helvetica in the page's font resources, returning its resource name
fn add_font_resource(doc: &mut Document, page_id: ObjectId) -> Result<String, PdfReplaceError> {
    let (mut resources, home) = match inherited(doc, page_id, b"Resources") {
        Some(Object::Reference(id)) => (doc.get_object(id)?.as_dict()?.clone(), ResourcesHome::Object(id)),
        Some(Object::Dictionary(dict)) => (dict, ResourcesHome::Page),
        _ => (Dictionary::new(), ResourcesHome::Page),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Reference(id)) => doc.get_object(*id)?.as_dict()?.clone(),
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let name = (1..)
        .map(|n| format!("FRpt{}", n))
        .find(|candidate| !fonts.has(candidate.as_bytes()))
        .unwrap_or_else(|| "FRpt".to_string());

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    fonts.set(name.as_bytes().to_vec(), Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    match home {
        ResourcesHome::Object(id) => {
            *doc.get_object_mut(id)? = Object::Dictionary(resources);
        }
        ResourcesHome::Page => {
            doc.get_object_mut(page_id)?
                .as_dict_mut()?
                .set("Resources", Object::Dictionary(resources));
        }
    }
    debug!(font = %name, "added font resource");
    Ok(name)
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn overlay_content(
    instructions: &[ReplacementInstruction],
    page_height: f64,
    font_name: &str,
) -> Content {
    let mut operations = vec![Operation::new("Q", vec![])];

    for instruction in instructions {
        let rect = to_pdf_user_space(&instruction.rect(), page_height);
        let font_size = font_size_for(rect.height);
        let text_y = rect.y + (rect.height - font_size) / 2.0;

        operations.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![real(1.0), real(1.0), real(1.0)]),
            Operation::new(
                "re",
                vec![
                    real(rect.x),
                    real(rect.y),
                    real(rect.width),
                    real(rect.height),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("rg", vec![real(0.0), real(0.0), real(0.0)]),
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font_name.as_bytes().to_vec()), real(font_size)],
            ),
            Operation::new("Td", vec![real(rect.x + TEXT_INSET), real(text_y)]),
            Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(&instruction.text),
                    StringFormat::Literal,
                )],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    Content { operations }
}

/// Wrap existing content in `q`/`Q` and append the overlay stream
fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    overlay: Vec<u8>,
) -> Result<(), PdfReplaceError> {
    let existing = match doc.get_object(page_id)?.as_dict()?.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(items) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    };

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let mut body = b"\n".to_vec();
    body.extend(overlay);
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), body));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Encode text for a WinAnsiEncoding simple font
///
/// Superscript digits and signs become plain ASCII, including the `¹²³` the
/// encoding does carry, so an exponent never mixes glyph sizes. Other
/// unsupported characters become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '¹' => b'1',
            '²' => b'2',
            '³' => b'3',
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '⁰' => b'0',
            '⁴' => b'4',
            '⁵' => b'5',
            '⁶' => b'6',
            '⁷' => b'7',
            '⁸' => b'8',
            '⁹' => b'9',
            '⁺' => b'+',
            '⁻' => b'-',
            _ => b'?',
        })
        .collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// One output byte per input character
        #[test]
        fn win_ansi_is_one_byte_per_char(text in "\\PC{0,40}") {
            prop_assert_eq!(encode_win_ansi(&text).len(), text.chars().count());
        }

        /// Text always fits inside its box vertically
        #[test]
        fn font_fits_box(height in 0.1f64..500.0) {
            let size = font_size_for(height);
            prop_assert!(size <= height);
            prop_assert!(size <= MAX_FONT_SIZE);
        }
    }
}
