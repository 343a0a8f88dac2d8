mod app;
mod canvas;
mod document;
mod error;
mod geometry;
mod model;
mod surface;

use std::str::FromStr;

use eframe::egui;
use log::{LevelFilter, debug, info};

use app::settings;

fn main() -> eframe::Result<()> {
    let settings_path = settings::config_path().unwrap_or_else(|| "settings.toml".to_string());
    let settings = settings::load_settings(&settings_path)
        .or_else(|| settings::load_settings("settings.json"))
        .unwrap_or_default();

    let log_level = LevelFilter::from_str(&settings.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'info' instead.",
            settings.log_level
        );
        LevelFilter::Info
    });

    // RUST_LOG, when set, takes precedence over the settings file.
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_env(env_logger::Env::default())
        .init();

    info!(log_level:?; "Starting flowdraft");
    debug!(settings_path:%, settings:?; "Loaded settings");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Flowchart Editor")
            .with_inner_size([settings.window_width, settings.window_height]),
        ..Default::default()
    };
    eframe::run_native(
        "Flowchart Editor",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::FlowchartApp::new(cc, settings, settings_path)))),
    )
}
