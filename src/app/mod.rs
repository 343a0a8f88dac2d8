use eframe::egui;

use crate::canvas::{Canvas, TextPrompt};
use crate::geometry::Size;
use crate::model::ShapeId;

mod actions;
mod help;
mod render;
pub(crate) mod settings;
mod update;

/// Label editor window state, open while the user types a new label.
struct LabelDialog {
    shape: ShapeId,
    buffer: String,
    focus_requested: bool,
}

/// The user's answer from a closed [`LabelDialog`].
struct DialogAnswer(Option<String>);

impl TextPrompt for DialogAnswer {
    fn prompt_for_text(&mut self, _initial: &str) -> Option<String> {
        self.0.take()
    }
}

pub struct FlowchartApp {
    canvas: Canvas,
    file_path: String,
    settings_path: String,
    log_level: String,
    window_size: egui::Vec2,
    status: Option<String>,
    label_dialog: Option<LabelDialog>,
    show_help: bool,
}

impl FlowchartApp {
    pub(crate) fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: settings::AppSettings,
        settings_path: String,
    ) -> Self {
        let window_size = egui::vec2(settings.window_width, settings.window_height);
        Self {
            canvas: Canvas::new(Size::new(window_size.x, window_size.y)),
            file_path: settings.file_path,
            settings_path,
            log_level: settings.log_level,
            window_size,
            status: None,
            label_dialog: None,
            show_help: false,
        }
    }
}
