//! Application shell: selection controls, submission trigger, display panes,
//! and the status bar.

use chrono::Local;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::domain::Phase;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{failure_label, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::panes::DisplayPane;

pub const SETTINGS_STORAGE_KEY: &str = "phase_simulator.settings";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub phase: Phase,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            phase: Phase::Arterial,
        }
    }
}

#[derive(Debug, Clone)]
struct SelectedSummary {
    filename: String,
    size_bytes: u64,
}

pub struct PhaseSimulatorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    server_url: String,
    selected: Option<SelectedSummary>,
    phase: Phase,
    in_flight: bool,
    error: Option<String>,
    status: String,
    completed_at: Option<String>,

    original_pane: DisplayPane,
    processed_pane: DisplayPane,
}

impl PhaseSimulatorApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        server_url: String,
        persisted: Option<PersistedSettings>,
    ) -> Self {
        let settings = persisted.unwrap_or_default();
        let mut startup_status = String::new();
        if settings.phase != Phase::default() {
            dispatch_backend_command(
                &cmd_tx,
                BackendCommand::SetPhase {
                    phase: settings.phase,
                },
                &mut startup_status,
            );
        }
        Self {
            cmd_tx,
            ui_rx,
            server_url,
            selected: None,
            phase: settings.phase,
            in_flight: false,
            error: None,
            status: "Awaiting input".to_string(),
            completed_at: None,
            original_pane: DisplayPane::new("Original"),
            processed_pane: DisplayPane::new("Processed"),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_ui_event(event);
        }
    }

    fn apply_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::ImageSelected {
                filename,
                size_bytes,
            } => {
                self.status = format!("Selected {filename}");
                self.selected = Some(SelectedSummary {
                    filename,
                    size_bytes,
                });
            }
            UiEvent::ImageSelectionFailed { reason } => {
                self.status = reason;
            }
            UiEvent::SubmissionStarted => {
                self.in_flight = true;
                self.error = None;
                self.status = "Processing the image…".to_string();
            }
            UiEvent::SubmissionFinished => {
                self.in_flight = false;
            }
            UiEvent::ImagesReady {
                original,
                processed,
            } => {
                self.original_pane.set_reference(original);
                self.processed_pane.set_reference(processed);
                self.completed_at = Some(Local::now().format("%H:%M:%S").to_string());
                self.status = "Processing completed".to_string();
            }
            UiEvent::SubmissionFailed { kind, message } => {
                self.status = format!("{} error: {message}", failure_label(kind));
                self.error = Some(message);
            }
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                "Upload a PNG/JPG, choose a phase, and process on the remote service. \
                 Pixels are never manipulated locally.",
            );
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Browse…").clicked() {
                    self.open_picker();
                }
                match &self.selected {
                    Some(selected) => {
                        ui.label(&selected.filename);
                        ui.weak(human_readable_bytes(selected.size_bytes));
                    }
                    None => {
                        ui.weak("Click to choose an image (PNG/JPG)");
                    }
                }
            });
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.label("Phase:");
                for phase in Phase::ALL {
                    let clicked = ui
                        .selectable_label(self.phase == phase, phase.label())
                        .clicked();
                    if clicked && self.phase != phase {
                        self.phase = phase;
                        dispatch_backend_command(
                            &self.cmd_tx,
                            BackendCommand::SetPhase { phase },
                            &mut self.status,
                        );
                    }
                }
                ui.separator();
                let can_submit = !self.in_flight && self.selected.is_some();
                if ui
                    .add_enabled(can_submit, egui::Button::new("Process"))
                    .clicked()
                {
                    dispatch_backend_command(
                        &self.cmd_tx,
                        BackendCommand::Submit,
                        &mut self.status,
                    );
                }
            });
            if let Some(error) = &self.error {
                ui.add_space(4.0);
                ui.colored_label(ui.visuals().error_fg_color, error);
            }
        });
    }

    fn open_picker(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("PNG or JPEG image", &["png", "jpg", "jpeg"])
            .pick_file();
        if let Some(path) = picked {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::SelectImage { path },
                &mut self.status,
            );
        }
    }

    fn show_panes(&mut self, ui: &mut egui::Ui) {
        ui.columns(2, |columns| {
            self.original_pane.show(&mut columns[0]);
            self.processed_pane.show(&mut columns[1]);
        });
        if self.processed_pane.reference().is_some() {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.button("Save processed image…").clicked() {
                    self.save_processed_image();
                }
                if ui.button("Copy processed image").clicked() {
                    self.copy_processed_image();
                }
            });
        }
    }

    fn save_processed_image(&mut self) {
        let Some(bytes) = self.processed_pane.image_bytes() else {
            self.status = "No processed image to save".to_string();
            return;
        };
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name("processed.png")
            .save_file()
        {
            match std::fs::write(&path, &bytes) {
                Ok(()) => {
                    self.status = format!("Saved processed image to {}", path.display());
                }
                Err(err) => {
                    self.status = format!("Failed to save processed image: {err}");
                }
            }
        }
    }

    fn copy_processed_image(&mut self) {
        let Some(bytes) = self.processed_pane.image_bytes() else {
            self.status = "No processed image to copy".to_string();
            return;
        };
        match copy_image_to_clipboard(&bytes) {
            Ok(()) => self.status = "Copied processed image to clipboard".to_string(),
            Err(err) => self.status = format!("Failed to copy processed image: {err}"),
        }
    }
}

impl eframe::App for PhaseSimulatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Surgical Planning — Phase Simulator");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(format!(
                        "{} · server-side processing",
                        server_environment_label(&self.server_url)
                    ));
                });
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.in_flight {
                    ui.add(egui::Spinner::new());
                    ui.label("Processing the image…");
                } else if let Some(completed_at) = &self.completed_at {
                    ui.label(format!("✓ Processing completed at {completed_at}"));
                } else {
                    ui.weak("Awaiting input");
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.status);
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_controls(ui);
            ui.add_space(12.0);
            self.show_panes(ui);
        });

        let repaint_after = if self.in_flight { 100 } else { 250 };
        ctx.request_repaint_after(std::time::Duration::from_millis(repaint_after));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings { phase: self.phase };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

fn copy_image_to_clipboard(bytes: &[u8]) -> Result<(), String> {
    let decoded = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let rgba = decoded.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    let mut clipboard = arboard::Clipboard::new().map_err(|err| err.to_string())?;
    clipboard
        .set_image(arboard::ImageData {
            width,
            height,
            bytes: std::borrow::Cow::Owned(rgba.into_raw()),
        })
        .map_err(|err| err.to_string())
}

fn server_environment_label(server_url: &str) -> &'static str {
    let server = server_url.to_ascii_lowercase();
    if server.contains("127.0.0.1") || server.contains("localhost") {
        "Local"
    } else if server.contains("staging") {
        "Staging"
    } else if server.contains("dev") {
        "Development"
    } else {
        "Production"
    }
}

fn human_readable_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else if value.fract().abs() < 1e-9 {
        format!("{value:.0} {}", UNITS[unit])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::ProcessingErrorKind;
    use crossbeam_channel::bounded;
    use shared::domain::ImageReference;

    fn test_app() -> PhaseSimulatorApp {
        let (cmd_tx, _cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        PhaseSimulatorApp::new(cmd_tx, ui_rx, "http://127.0.0.1:8080".to_string(), None)
    }

    #[test]
    fn formats_image_sizes_readably() {
        assert_eq!(human_readable_bytes(0), "0 B");
        assert_eq!(human_readable_bytes(1023), "1023 B");
        assert_eq!(human_readable_bytes(1024), "1 KB");
        assert_eq!(human_readable_bytes(1536), "1.5 KB");
        assert_eq!(human_readable_bytes(2 * 1024 * 1024), "2 MB");
        assert_eq!(human_readable_bytes(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn labels_server_environment_from_url() {
        assert_eq!(server_environment_label("http://127.0.0.1:8080"), "Local");
        assert_eq!(
            server_environment_label("https://staging.imaging.example"),
            "Staging"
        );
        assert_eq!(
            server_environment_label("https://imaging.example"),
            "Production"
        );
    }

    #[test]
    fn busy_events_toggle_the_flight_flag_and_clear_errors() {
        let mut app = test_app();
        app.error = Some("old error".to_string());

        app.apply_ui_event(UiEvent::SubmissionStarted);
        assert!(app.in_flight);
        assert!(app.error.is_none());

        app.apply_ui_event(UiEvent::SubmissionFinished);
        assert!(!app.in_flight);
    }

    #[test]
    fn images_ready_updates_both_panes_together() {
        let mut app = test_app();
        app.apply_ui_event(UiEvent::ImagesReady {
            original: ImageReference::from_payload("Zm9v".to_string()),
            processed: ImageReference::from_payload("YmFy".to_string()),
        });

        assert_eq!(
            app.original_pane.reference().map(|r| r.as_str()),
            Some("data:image/png;base64,Zm9v")
        );
        assert_eq!(
            app.processed_pane.reference().map(|r| r.as_str()),
            Some("data:image/png;base64,YmFy")
        );
        assert_eq!(app.status, "Processing completed");
    }

    #[test]
    fn failed_submission_keeps_previous_pane_references() {
        let mut app = test_app();
        app.apply_ui_event(UiEvent::ImagesReady {
            original: ImageReference::from_payload("Zm9v".to_string()),
            processed: ImageReference::from_payload("YmFy".to_string()),
        });
        let before_original = app.original_pane.reference().cloned();
        let before_processed = app.processed_pane.reference().cloned();

        app.apply_ui_event(UiEvent::SubmissionFailed {
            kind: ProcessingErrorKind::Server,
            message: "model unavailable".to_string(),
        });

        assert_eq!(app.original_pane.reference().cloned(), before_original);
        assert_eq!(app.processed_pane.reference().cloned(), before_processed);
        assert_eq!(app.error.as_deref(), Some("model unavailable"));
        assert_eq!(app.status, "Processing service error: model unavailable");
    }

    #[test]
    fn selecting_a_file_does_not_clear_a_pending_error() {
        let mut app = test_app();
        app.apply_ui_event(UiEvent::SubmissionFailed {
            kind: ProcessingErrorKind::Validation,
            message: "Please choose an image".to_string(),
        });

        app.apply_ui_event(UiEvent::ImageSelected {
            filename: "scan.jpg".to_string(),
            size_bytes: 10 * 1024,
        });

        assert_eq!(app.error.as_deref(), Some("Please choose an image"));
        assert_eq!(app.selected.as_ref().map(|s| s.filename.as_str()), Some("scan.jpg"));
    }
}
