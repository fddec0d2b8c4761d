//! Events flowing from the backend worker to the UI thread.

use client_core::ProcessingErrorKind;
use shared::domain::ImageReference;

pub enum UiEvent {
    Info(String),
    ImageSelected {
        filename: String,
        size_bytes: u64,
    },
    ImageSelectionFailed {
        reason: String,
    },
    /// A submission entered flight; shown as the busy indicator.
    SubmissionStarted,
    /// The in-flight submission completed, successfully or not.
    SubmissionFinished,
    /// Both references arrive together; the panes never update one without
    /// the other.
    ImagesReady {
        original: ImageReference,
        processed: ImageReference,
    },
    SubmissionFailed {
        kind: ProcessingErrorKind,
        message: String,
    },
}

pub fn failure_label(kind: ProcessingErrorKind) -> &'static str {
    match kind {
        ProcessingErrorKind::Validation => "Validation",
        ProcessingErrorKind::Transport => "Transport",
        ProcessingErrorKind::Server => "Processing service",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_labels_match_taxonomy() {
        assert_eq!(failure_label(ProcessingErrorKind::Validation), "Validation");
        assert_eq!(failure_label(ProcessingErrorKind::Transport), "Transport");
        assert_eq!(
            failure_label(ProcessingErrorKind::Server),
            "Processing service"
        );
    }
}
