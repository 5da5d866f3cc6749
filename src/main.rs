mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::GvcDashboardApp;
use eframe::egui;
use gvc_emissions::config::PresentationConfig;
use state::AppState;

/// Build the initial state from `GVC_PRESENTATION`, the panel given as the
/// first argument (or `GVC_PANEL`), and `GVC_BOUNDARIES`.
fn initial_state() -> AppState {
    let presentation = match std::env::var_os("GVC_PRESENTATION") {
        Some(path) => PresentationConfig::from_file(&PathBuf::from(path)).unwrap_or_else(|e| {
            log::error!("Ignoring presentation config: {e:#}");
            PresentationConfig::default()
        }),
        None => PresentationConfig::default(),
    };
    let mut state = AppState::new(presentation);

    let panel = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("GVC_PANEL"))
        .map(PathBuf::from);
    if let Some(path) = panel {
        if let Err(e) = state.load_table(&path) {
            state.report("Failed to preload table", e);
        }
    }
    if let Some(path) = std::env::var_os("GVC_BOUNDARIES").map(PathBuf::from) {
        if let Err(e) = state.load_boundaries(&path) {
            state.report("Failed to preload boundaries", e);
        }
    }
    state
}

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    let state = initial_state();
    eframe::run_native(
        "GVC Emissions Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(GvcDashboardApp::new(state)))),
    )
}
