use serde::{Deserialize, Serialize};

/// Bounding box relative to the page, each component nominally in `[0, 1]`
///
/// Deserializes from the document-analysis service's `BoundingBox` shape
/// (`Left`, `Top`, `Width`, `Height`) as well as lowercase keys.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NormalizedBox {
    #[serde(alias = "left")]
    pub left: f64,
    #[serde(alias = "top")]
    pub top: f64,
    #[serde(alias = "width")]
    pub width: f64,
    #[serde(alias = "height")]
    pub height: f64,
}

impl NormalizedBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Whether a normalized point lies inside the box (edges inclusive)
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Rectangle in screen pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Rectangle in document points, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// 8.5" x 11" at 72 DPI
    pub const US_LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    pub const A4: PageSize = PageSize {
        width: 595.0,
        height: 842.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::US_LETTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_box_accepts_service_casing() {
        let json = r#"{"Left":0.1,"Top":0.2,"Width":0.3,"Height":0.4}"#;
        let bbox: NormalizedBox = serde_json::from_str(json).unwrap();
        assert_eq!(bbox, NormalizedBox::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn test_normalized_box_accepts_lowercase() {
        let json = r#"{"left":0.5,"top":0.5,"width":0.1,"height":0.1}"#;
        let bbox: NormalizedBox = serde_json::from_str(json).unwrap();
        assert_eq!(bbox.left, 0.5);
        assert_eq!(bbox.height, 0.1);
    }

    #[test]
    fn test_contains_includes_edges() {
        let bbox = NormalizedBox::new(0.1, 0.2, 0.3, 0.4);
        assert!(bbox.contains(0.1, 0.2));
        assert!(bbox.contains(0.4, 0.6));
        assert!(bbox.contains(0.25, 0.3));
        assert!(!bbox.contains(0.05, 0.3));
        assert!(!bbox.contains(0.25, 0.61));
    }

    #[test]
    fn test_default_page_size_is_letter() {
        assert_eq!(PageSize::default(), PageSize::new(612.0, 792.0));
    }
}
