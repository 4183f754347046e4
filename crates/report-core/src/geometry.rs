//! Coordinate conversion between normalized OCR geometry, screen pixels and
//! document points

use report_types::{DocumentRect, NormalizedBox, PageSize, PixelRect};

/// Scale a normalized box to a rendered page of `page_width_px` x `page_height_px`
pub fn to_pixel_rect(bbox: &NormalizedBox, page_width_px: f64, page_height_px: f64) -> PixelRect {
    PixelRect {
        x: bbox.left * page_width_px,
        y: bbox.top * page_height_px,
        width: bbox.width * page_width_px,
        height: bbox.height * page_height_px,
    }
}

/// Scale a normalized box to document points (top-left origin)
pub fn to_document_rect(
    bbox: &NormalizedBox,
    page_width_pt: f64,
    page_height_pt: f64,
) -> DocumentRect {
    DocumentRect {
        x: bbox.left * page_width_pt,
        y: bbox.top * page_height_pt,
        width: bbox.width * page_width_pt,
        height: bbox.height * page_height_pt,
    }
}

/// [`to_document_rect`] against a known page size
pub fn to_document_rect_on(bbox: &NormalizedBox, page: PageSize) -> DocumentRect {
    to_document_rect(bbox, page.width, page.height)
}

/// Flip a top-left-origin rect into PDF user space (bottom-left origin)
///
/// The returned rect's `y` is the lower edge of the box.
pub fn to_pdf_user_space(rect: &DocumentRect, page_height: f64) -> DocumentRect {
    DocumentRect {
        x: rect.x,
        y: page_height - rect.y - rect.height,
        width: rect.width,
        height: rect.height,
    }
}

/// Map a pixel position on the rendered page back to normalized coordinates
pub fn pixel_to_normalized(x: f64, y: f64, page_width_px: f64, page_height_px: f64) -> (f64, f64) {
    (x / page_width_px, y / page_height_px)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimension() -> impl Strategy<Value = f64> {
        1.0f64..2000.0
    }

    fn fraction() -> impl Strategy<Value = f64> {
        0.0f64..=1.0
    }

    fn normalized_box() -> impl Strategy<Value = NormalizedBox> {
        (fraction(), fraction(), fraction(), fraction())
            .prop_map(|(l, t, w, h)| NormalizedBox::new(l, t, w, h))
    }

    proptest! {
        /// Pixel and document conversions are the same scaling on different units
        #[test]
        fn pixel_and_document_rects_agree(
            bbox in normalized_box(),
            w in dimension(),
            h in dimension(),
        ) {
            let px = to_pixel_rect(&bbox, w, h);
            let pt = to_document_rect(&bbox, w, h);
            prop_assert_eq!(px.x, pt.x);
            prop_assert_eq!(px.y, pt.y);
            prop_assert_eq!(px.width, pt.width);
            prop_assert_eq!(px.height, pt.height);
        }

        /// Rendering at twice the size doubles every component
        #[test]
        fn linear_scaling(bbox in normalized_box(), w in dimension(), h in dimension()) {
            let one = to_pixel_rect(&bbox, w, h);
            let two = to_pixel_rect(&bbox, w * 2.0, h * 2.0);
            let tolerance = 1e-9;
            prop_assert!((two.x - one.x * 2.0).abs() < tolerance);
            prop_assert!((two.y - one.y * 2.0).abs() < tolerance);
            prop_assert!((two.width - one.width * 2.0).abs() < tolerance);
            prop_assert!((two.height - one.height * 2.0).abs() < tolerance);
        }

        /// Flipping into PDF space twice returns the original rect
        #[test]
        fn y_flip_is_an_involution(bbox in normalized_box(), h in dimension()) {
            let rect = to_document_rect(&bbox, 612.0, h);
            let back = to_pdf_user_space(&to_pdf_user_space(&rect, h), h);
            prop_assert!((back.y - rect.y).abs() < 1e-9);
            prop_assert_eq!(back.height, rect.height);
        }

        /// A click at a box's pixel centre maps back inside the box
        #[test]
        fn pixel_centre_hits_box(bbox in normalized_box(), w in dimension(), h in dimension()) {
            let px = to_pixel_rect(&bbox, w, h);
            let (nx, ny) = pixel_to_normalized(px.x + px.width / 2.0, px.y + px.height / 2.0, w, h);
            let tolerance = 1e-9;
            prop_assert!(nx >= bbox.left - tolerance && nx <= bbox.left + bbox.width + tolerance);
            prop_assert!(ny >= bbox.top - tolerance && ny <= bbox.top + bbox.height + tolerance);
        }
    }
}
