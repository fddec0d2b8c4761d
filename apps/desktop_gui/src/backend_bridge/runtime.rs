//! Backend worker: a dedicated thread owning the tokio runtime, the HTTP
//! client, and the submission controller. Commands are served serially, so
//! a submission runs to completion before the next command is picked up;
//! the UI thread stays responsive throughout.

use std::{sync::Arc, thread};

use client_core::{ProcessingError, ProcessorClient, SubmissionController};
use crossbeam_channel::{Receiver, Sender};
use shared::domain::SelectedImage;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, server_url: String) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Info(format!(
                    "Backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let client = ProcessorClient::new(server_url);
            probe_health(&client, &ui_tx).await;

            let busy_tx = ui_tx.clone();
            let controller = SubmissionController::new(Arc::new(client)).with_busy_observer(
                Arc::new(move |busy| {
                    let event = if busy {
                        UiEvent::SubmissionStarted
                    } else {
                        UiEvent::SubmissionFinished
                    };
                    let _ = busy_tx.try_send(event);
                }),
            );

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::SelectImage { path } => match tokio::fs::read(&path).await {
                        Ok(bytes) => {
                            let filename = path
                                .file_name()
                                .map(|name| name.to_string_lossy().into_owned())
                                .unwrap_or_else(|| "image".to_string());
                            let mime_type =
                                mime_guess::from_path(&path).first_raw().map(str::to_string);
                            let size_bytes = bytes.len() as u64;
                            controller
                                .select_image(SelectedImage {
                                    filename: filename.clone(),
                                    mime_type,
                                    bytes,
                                })
                                .await;
                            let _ = ui_tx.try_send(UiEvent::ImageSelected {
                                filename,
                                size_bytes,
                            });
                        }
                        Err(err) => {
                            let _ = ui_tx.try_send(UiEvent::ImageSelectionFailed {
                                reason: format!("Failed to read {}: {err}", path.display()),
                            });
                        }
                    },
                    BackendCommand::SetPhase { phase } => controller.set_phase(phase).await,
                    BackendCommand::Submit => match controller.submit().await {
                        Ok(images) => {
                            let _ = ui_tx.try_send(UiEvent::ImagesReady {
                                original: images.original,
                                processed: images.processed,
                            });
                        }
                        Err(ProcessingError::AlreadyInFlight) => {
                            tracing::warn!("submit ignored while a submission is in flight");
                        }
                        Err(err) => {
                            let _ = ui_tx.try_send(UiEvent::SubmissionFailed {
                                kind: err.kind(),
                                message: err.user_message(),
                            });
                        }
                    },
                }
            }
        });
    });
}

async fn probe_health(client: &ProcessorClient, ui_tx: &Sender<UiEvent>) {
    match client.health().await {
        Ok(true) => {
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Processing service reachable at {}",
                client.base_url()
            )));
        }
        Ok(false) => {
            let _ = ui_tx.try_send(UiEvent::Info(
                "Processing service reports unhealthy".to_string(),
            ));
        }
        Err(err) => {
            tracing::warn!(error = %err, "health probe failed");
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Processing service not reachable yet at {}",
                client.base_url()
            )));
        }
    }
}
