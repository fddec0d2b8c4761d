//! Wire contract with the remote processing service.

use serde::{Deserialize, Serialize};

/// Success payload of `POST /process`: both images as base64 strings,
/// optionally already prefixed as data URIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub original_b64: String,
    pub processed_b64: String,
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_response_uses_wire_field_names() {
        let payload: ProcessResponse =
            serde_json::from_str(r#"{"original_b64":"Zm9v","processed_b64":"YmFy"}"#)
                .expect("decode");
        assert_eq!(payload.original_b64, "Zm9v");
        assert_eq!(payload.processed_b64, "YmFy");
    }

    #[test]
    fn process_response_requires_both_fields() {
        let missing = serde_json::from_str::<ProcessResponse>(r#"{"original_b64":"Zm9v"}"#);
        assert!(missing.is_err());
    }
}
