//! Prescription upload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A prescription attached to a product.
///
/// Stored in the `prescriptions` map keyed by product ID; a later upload for
/// the same product replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub file_name: String,
    /// `data:` URL of an image upload, `None` for other file types.
    #[serde(rename = "dataURL", default)]
    pub data_url: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// A file read from disk and waiting to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescriptionFile {
    pub file_name: String,
    /// Media type guessed from the file extension.
    pub media_type: Option<&'static str>,
    /// Preview for image files.
    pub data_url: Option<String>,
}

impl PrescriptionFile {
    /// Whether the file was recognised as an image.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.media_type.is_some_and(|m| m.starts_with("image/"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stored_shape() {
        let prescription: Prescription = serde_json::from_value(json!({
            "fileName": "rx.pdf",
            "dataURL": null,
            "uploadedAt": "2026-03-01T10:15:00.000Z"
        }))
        .unwrap();
        assert_eq!(prescription.file_name, "rx.pdf");
        assert!(prescription.data_url.is_none());

        let value = serde_json::to_value(&prescription).unwrap();
        assert!(value.get("dataURL").is_some());
        assert!(value.get("fileName").is_some());
    }
}
