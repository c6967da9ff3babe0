//! Image category detection for complaint reports.
//!
//! Given the bytes of an uploaded photo, suggest a Swachhata complaint
//! category. The shipped [`HeuristicDetector`] is deterministic: it sniffs the
//! image container from magic bytes, applies filename keyword hints, and falls
//! back to byte statistics over the payload. It exists behind the
//! [`CategoryDetector`] trait so a real vision model can replace it without
//! touching the HTTP layer.

use thiserror::Error;

/// A complaint category from the Swachhata taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: &'static str,
}

/// Swachhata complaint taxonomy (category ids are fixed by the upstream API).
pub const CATEGORIES: &[Category] = &[
    Category { id: 1, name: "Dead Animal" },
    Category { id: 2, name: "Overflowing Dustbin" },
    Category { id: 3, name: "Garbage Dump" },
    Category { id: 4, name: "Open Drain" },
    Category { id: 5, name: "Public Toilet Issue" },
    Category { id: 6, name: "Street Sweeping Not Done" },
    Category { id: 7, name: "Stagnant Water" },
    Category { id: 8, name: "Debris Removal" },
];

/// Filename keywords that strongly indicate a category.
const KEYWORD_HINTS: &[(&str, i64)] = &[
    ("animal", 1),
    ("carcass", 1),
    ("dustbin", 2),
    ("bin", 2),
    ("garbage", 3),
    ("dump", 3),
    ("trash", 3),
    ("drain", 4),
    ("sewer", 4),
    ("toilet", 5),
    ("sweep", 6),
    ("water", 7),
    ("puddle", 7),
    ("debris", 8),
    ("rubble", 8),
];

/// Look up a category name by id. Unknown ids map to "Uncategorized".
pub fn category_name(id: i64) -> &'static str {
    CATEGORIES.iter().find(|c| c.id == id).map(|c| c.name).unwrap_or("Uncategorized")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageKind {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
}

impl ImageKind {
    /// Sniff the container format from magic bytes.
    fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageKind::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageKind::Png),
            [b'G', b'I', b'F', b'8', ..] => Some(ImageKind::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(ImageKind::WebP),
            [b'B', b'M', ..] => Some(ImageKind::Bmp),
            _ => None,
        }
    }
}

/// A category suggestion with a rough confidence score in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct Suggestion {
    pub category: Category,
    pub confidence: f32,
}

#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("empty image payload")]
    EmptyImage,

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

/// Suggests a complaint category for an uploaded image.
pub trait CategoryDetector: Send + Sync {
    fn detect(
        &self,
        filename: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Suggestion, DetectionError>;
}

/// Deterministic detector based on filename hints and byte statistics.
#[derive(Debug, Default)]
pub struct HeuristicDetector;

impl HeuristicDetector {
    /// Mean byte value and a coarse spread measure over the payload, skipping
    /// the container header so the choice of format matters less.
    fn byte_features(bytes: &[u8]) -> (f64, f64) {
        let body = if bytes.len() > 64 { &bytes[64..] } else { bytes };

        let mut histogram = [0u64; 16];
        let mut sum = 0u64;
        for &b in body {
            histogram[(b >> 4) as usize] += 1;
            sum += b as u64;
        }

        let mean = sum as f64 / body.len() as f64;
        let occupied = histogram.iter().filter(|&&n| n > 0).count();
        let spread = occupied as f64 / histogram.len() as f64;
        (mean, spread)
    }
}

impl CategoryDetector for HeuristicDetector {
    fn detect(
        &self,
        filename: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Suggestion, DetectionError> {
        if bytes.is_empty() {
            return Err(DetectionError::EmptyImage);
        }

        let is_image_type = content_type.map(|ct| ct.starts_with("image/")).unwrap_or(false);
        if ImageKind::sniff(bytes).is_none() && !is_image_type {
            return Err(DetectionError::UnsupportedMediaType(
                content_type.unwrap_or("unknown").to_string(),
            ));
        }

        // Filename hints beat byte statistics; a field worker's photo app
        // often embeds a label in the name.
        if let Some(name) = filename {
            let lowered = name.to_lowercase();
            for (keyword, category_id) in KEYWORD_HINTS {
                if lowered.contains(keyword) {
                    let category = CATEGORIES
                        .iter()
                        .copied()
                        .find(|c| c.id == *category_id)
                        .unwrap_or(CATEGORIES[0]);
                    return Ok(Suggestion { category, confidence: 0.9 });
                }
            }
        }

        let (mean, spread) = Self::byte_features(bytes);
        let index = (mean as usize) % CATEGORIES.len();
        // Flat payloads (low spread) give the model little to go on
        let confidence = (0.5 + 0.4 * spread).min(0.9) as f32;

        Ok(Suggestion {
            category: CATEGORIES[index],
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_payload(fill: u8, len: usize) -> Vec<u8> {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.extend(std::iter::repeat(fill).take(len));
        bytes
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = HeuristicDetector.detect(None, Some("image/png"), &[]).unwrap_err();
        assert!(matches!(err, DetectionError::EmptyImage));
    }

    #[test]
    fn non_image_without_media_type_is_rejected() {
        let err = HeuristicDetector
            .detect(Some("notes.txt"), Some("text/plain"), b"hello world")
            .unwrap_err();
        assert!(matches!(err, DetectionError::UnsupportedMediaType(_)));
    }

    #[test]
    fn declared_image_type_without_known_magic_is_accepted() {
        let suggestion = HeuristicDetector
            .detect(None, Some("image/x-unknown"), &[1, 2, 3, 4])
            .unwrap();
        assert!(CATEGORIES.contains(&suggestion.category));
    }

    #[test]
    fn filename_keyword_wins() {
        let bytes = png_payload(0, 256);
        let suggestion = HeuristicDetector
            .detect(Some("overflowing-dustbin.png"), Some("image/png"), &bytes)
            .unwrap();
        assert_eq!(suggestion.category.id, 2);
        assert_eq!(suggestion.category.name, "Overflowing Dustbin");
        assert!(suggestion.confidence >= 0.9);
    }

    #[test]
    fn detection_is_deterministic() {
        let bytes = png_payload(137, 1024);
        let a = HeuristicDetector.detect(Some("photo.png"), Some("image/png"), &bytes).unwrap();
        let b = HeuristicDetector.detect(Some("photo.png"), Some("image/png"), &bytes).unwrap();
        assert_eq!(a.category, b.category);
        assert_eq!(a.confidence, b.confidence);
    }

    #[test]
    fn category_name_falls_back_for_unknown_ids() {
        assert_eq!(category_name(1), "Dead Animal");
        assert_eq!(category_name(42), "Uncategorized");
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(ImageKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(PNG_HEADER), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(b"GIF89a"), Some(ImageKind::Gif));
        assert_eq!(ImageKind::sniff(b"RIFF\x00\x00\x00\x00WEBP"), Some(ImageKind::WebP));
        assert_eq!(ImageKind::sniff(b"plain text"), None);
    }
}
