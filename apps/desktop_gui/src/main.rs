use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::commands::BackendCommand;
use config::Cli;
use controller::events::UiEvent;
use ui::app::{PersistedSettings, PhaseSimulatorApp, SETTINGS_STORAGE_KEY};

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let server_url = match cli.resolve_server_url() {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!(error = %err, "invalid server URL; falling back to the local default");
            config::DEFAULT_SERVER_URL.to_string()
        }
    };
    tracing::info!(server_url = %server_url, "starting phase simulator client");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, server_url.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Surgical Planning — Phase Simulator")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([820.0, 560.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Phase Simulator",
        options,
        Box::new(move |cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedSettings>(&text).ok())
            });
            Ok(Box::new(PhaseSimulatorApp::new(
                cmd_tx, ui_rx, server_url, persisted,
            )))
        }),
    )
}
