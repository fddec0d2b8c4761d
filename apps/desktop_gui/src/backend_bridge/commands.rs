//! Commands queued from the UI thread to the backend worker.

use std::path::PathBuf;

use shared::domain::Phase;

pub enum BackendCommand {
    SelectImage { path: PathBuf },
    SetPhase { phase: Phase },
    Submit,
}
