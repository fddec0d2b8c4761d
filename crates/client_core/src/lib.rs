//! Headless submission core for the phase simulator desktop client.
//!
//! [`ProcessorClient`] speaks the remote processor's HTTP contract;
//! [`SubmissionController`] owns the selection state and the submission
//! state machine and is the only place that mutates it. The two are joined
//! by the [`ImageProcessor`] seam so tests can substitute the network.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{ImageReference, Phase, SelectedImage},
    protocol::{HealthResponse, ProcessResponse},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub mod error;

pub use error::{
    ProcessingError, ProcessingErrorKind, GENERIC_FAILURE_MESSAGE, MISSING_IMAGE_MESSAGE,
};

/// Seam between the controller and the wire.
#[async_trait]
pub trait ImageProcessor: Send + Sync {
    async fn process_image(
        &self,
        image: &SelectedImage,
        phase: Phase,
    ) -> Result<ProcessResponse, ProcessingError>;
}

/// HTTP client for the remote processing service.
///
/// No retries and no explicit timeout: a submission rides on the
/// transport's defaults, matching the service's demo-scoped contract.
pub struct ProcessorClient {
    http: Client,
    base_url: String,
}

impl ProcessorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Reachability probe against the service's health endpoint.
    pub async fn health(&self) -> Result<bool, ProcessingError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        let health: HealthResponse = serde_json::from_str(&body)
            .map_err(|source| ProcessingError::MalformedResponse { source })?;
        Ok(health.ok)
    }
}

#[async_trait]
impl ImageProcessor for ProcessorClient {
    async fn process_image(
        &self,
        image: &SelectedImage,
        phase: Phase,
    ) -> Result<ProcessResponse, ProcessingError> {
        let mut part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.filename.clone());
        if let Some(mime) = &image.mime_type {
            part = part.mime_str(mime)?;
        }
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("phase", phase.as_str());

        debug!(
            filename = %image.filename,
            phase = phase.as_str(),
            size_bytes = image.bytes.len(),
            "posting image to processor"
        );
        let response = self
            .http
            .post(format!("{}/process", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "processor rejected submission");
            return Err(ProcessingError::server(status.as_u16(), body));
        }

        let body = response.text().await?;
        let payload: ProcessResponse = serde_json::from_str(&body)
            .map_err(|source| ProcessingError::MalformedResponse { source })?;
        Ok(payload)
    }
}

/// Submission lifecycle. One value at a time; success carries both
/// references so the pair can never be half-set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Validating,
    InFlight,
    Succeeded {
        original: ImageReference,
        processed: ImageReference,
    },
    Failed {
        message: String,
    },
}

impl SubmissionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}

/// Original and processed display references, set together on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImages {
    pub original: ImageReference,
    pub processed: ImageReference,
}

/// Observer invoked with `true` when a submission enters flight and `false`
/// when it leaves, exactly once each. Presentation uses it to drive the
/// busy indicator instead of polling the state.
pub type BusyObserver = Arc<dyn Fn(bool) + Send + Sync>;

struct ControllerState {
    selected: Option<SelectedImage>,
    phase: Phase,
    state: SubmissionState,
}

/// Owns the selected file, the selected phase, and the submission state;
/// orchestrates calls into the processor.
pub struct SubmissionController {
    processor: Arc<dyn ImageProcessor>,
    busy_observer: Option<BusyObserver>,
    inner: Mutex<ControllerState>,
}

impl SubmissionController {
    pub fn new(processor: Arc<dyn ImageProcessor>) -> Self {
        Self {
            processor,
            busy_observer: None,
            inner: Mutex::new(ControllerState {
                selected: None,
                phase: Phase::default(),
                state: SubmissionState::Idle,
            }),
        }
    }

    pub fn with_busy_observer(mut self, observer: BusyObserver) -> Self {
        self.busy_observer = Some(observer);
        self
    }

    /// Replaces the selected image. The submission state is left untouched:
    /// picking a new file neither clears an error nor aborts anything.
    pub async fn select_image(&self, image: SelectedImage) {
        let mut inner = self.inner.lock().await;
        info!(
            filename = %image.filename,
            size_bytes = image.bytes.len(),
            "image selected"
        );
        inner.selected = Some(image);
    }

    pub async fn selected_filename(&self) -> Option<String> {
        self.inner
            .lock()
            .await
            .selected
            .as_ref()
            .map(|image| image.filename.clone())
    }

    /// Allowed in any state; affects only the next submit.
    pub async fn set_phase(&self, phase: Phase) {
        let mut inner = self.inner.lock().await;
        if inner.phase != phase {
            debug!(phase = phase.as_str(), "phase changed");
            inner.phase = phase;
        }
    }

    pub async fn phase(&self) -> Phase {
        self.inner.lock().await.phase
    }

    pub async fn state(&self) -> SubmissionState {
        self.inner.lock().await.state.clone()
    }

    /// Runs one submission to completion.
    ///
    /// The lock is not held across the network await, so selection and phase
    /// edits stay possible mid-flight; they affect only future submissions.
    /// A submit that arrives while one is in flight returns
    /// [`ProcessingError::AlreadyInFlight`] without touching state or wire.
    pub async fn submit(&self) -> Result<ProcessedImages, ProcessingError> {
        let (image, phase) = {
            let mut inner = self.inner.lock().await;
            if inner.state.is_in_flight() {
                warn!("submit ignored: a submission is already in flight");
                return Err(ProcessingError::AlreadyInFlight);
            }
            inner.state = SubmissionState::Validating;
            let Some(image) = inner.selected.clone() else {
                inner.state = SubmissionState::Failed {
                    message: MISSING_IMAGE_MESSAGE.to_string(),
                };
                return Err(ProcessingError::MissingImage);
            };
            inner.state = SubmissionState::InFlight;
            (image, inner.phase)
        };

        self.notify_busy(true);
        let result = self.processor.process_image(&image, phase).await;
        let outcome = {
            let mut inner = self.inner.lock().await;
            match result {
                Ok(response) => {
                    let images = ProcessedImages {
                        original: ImageReference::from_payload(response.original_b64),
                        processed: ImageReference::from_payload(response.processed_b64),
                    };
                    inner.state = SubmissionState::Succeeded {
                        original: images.original.clone(),
                        processed: images.processed.clone(),
                    };
                    info!(phase = phase.as_str(), "submission succeeded");
                    Ok(images)
                }
                Err(err) => {
                    warn!(error = %err, "submission failed");
                    inner.state = SubmissionState::Failed {
                        message: err.user_message(),
                    };
                    Err(err)
                }
            }
        };
        self.notify_busy(false);
        outcome
    }

    fn notify_busy(&self, busy: bool) {
        if let Some(observer) = &self.busy_observer {
            observer(busy);
        }
    }
}

#[cfg(test)]
mod tests;
