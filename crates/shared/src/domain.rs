use std::fmt;

use serde::{Deserialize, Serialize};

/// Contrast phase forwarded to the remote processor. Opaque to the client
/// beyond being one of two fixed selector strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Arterial,
    Venous,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Arterial, Phase::Venous];

    /// Wire selector string.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Arterial => "arterial",
            Phase::Venous => "venous",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Arterial => "Arterial",
            Phase::Venous => "Venous",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image picked for submission: opaque bytes plus the name and MIME type
/// the picker reported. Never mutated after selection.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A displayable identification of image bytes: either a raw URL or a
/// self-describing data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Normalizes a processor payload into a displayable reference: a string
    /// already carrying the data-URI scheme is kept verbatim, anything else
    /// is wrapped as base64-encoded PNG data. Idempotent.
    pub fn from_payload(payload: String) -> Self {
        if payload.starts_with("data:") {
            Self(payload)
        } else {
            Self(format!("data:image/png;base64,{payload}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_uri(&self) -> bool {
        self.0.starts_with("data:")
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
