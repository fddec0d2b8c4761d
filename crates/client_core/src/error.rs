//! Error taxonomy for the submission core.

use thiserror::Error;

/// Fallback shown when a failure carries no usable text.
pub const GENERIC_FAILURE_MESSAGE: &str = "Processing failed";

/// Fixed validation message for a submit attempt with no image selected.
pub const MISSING_IMAGE_MESSAGE: &str = "Please choose an image";

#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Submit was triggered with no image selected; no I/O was attempted.
    #[error("Please choose an image")]
    MissingImage,

    /// A second submit arrived while one was already in flight. The trigger
    /// is inert; callers log it and move on.
    #[error("a submission is already in flight")]
    AlreadyInFlight,

    /// The processor answered with a non-success status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request never completed at the transport level.
    #[error("failed to reach the processing service: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// A success response whose body did not decode as the expected JSON.
    #[error("malformed processing response: {source}")]
    MalformedResponse {
        #[source]
        source: serde_json::Error,
    },
}

impl ProcessingError {
    /// Non-2xx response. A blank body collapses to the generic message here,
    /// so `Server` always carries displayable text.
    pub fn server(status: u16, body: String) -> Self {
        let message = if body.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            body
        };
        Self::Server { status, message }
    }

    /// Coarse classification used for status-line labels.
    pub fn kind(&self) -> ProcessingErrorKind {
        match self {
            Self::MissingImage | Self::AlreadyInFlight => ProcessingErrorKind::Validation,
            Self::Server { .. } => ProcessingErrorKind::Server,
            Self::Transport { .. } | Self::MalformedResponse { .. } => {
                ProcessingErrorKind::Transport
            }
        }
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            text
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingErrorKind {
    Validation,
    Transport,
    Server,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_server_body_falls_back_to_generic_message() {
        let err = ProcessingError::server(503, "   ".to_string());
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn server_body_text_is_surfaced_verbatim() {
        let err = ProcessingError::server(500, "model unavailable".to_string());
        assert_eq!(err.user_message(), "model unavailable");
        assert_eq!(err.kind(), ProcessingErrorKind::Server);
    }

    #[test]
    fn validation_errors_classify_as_validation() {
        assert_eq!(
            ProcessingError::MissingImage.kind(),
            ProcessingErrorKind::Validation
        );
        assert_eq!(
            ProcessingError::AlreadyInFlight.kind(),
            ProcessingErrorKind::Validation
        );
        assert_eq!(
            ProcessingError::MissingImage.user_message(),
            MISSING_IMAGE_MESSAGE
        );
    }
}
