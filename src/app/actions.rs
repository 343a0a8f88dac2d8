use std::path::Path;

use log::{error, info, warn};

use crate::error::{DiagramError, Error};
use crate::model::ShapeKind;

use super::{FlowchartApp, settings};

impl FlowchartApp {
    pub(super) fn add_shape(&mut self, kind: ShapeKind) {
        let id = self.canvas.add_shape(kind);
        self.status = Some(format!("Added {kind} {id}"));
    }

    pub(super) fn clear_all(&mut self) {
        self.canvas.clear();
        self.label_dialog = None;
        self.status = Some("Cleared diagram".to_string());
    }

    fn write_diagram(&self, path: &Path) -> Result<(), Error> {
        let json = self.canvas.save_json()?;
        std::fs::write(path, json).map_err(|e| Error::io(path, e))
    }

    fn read_diagram(&mut self, path: &Path) -> Result<(), Error> {
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.canvas.load_json(&json)?;
        Ok(())
    }

    fn report_failure(&mut self, what: &str, err: &Error) {
        match err {
            Error::Diagram(DiagramError::DanglingReference { .. }) => {
                error!(err:%; "Diagram bookkeeping is inconsistent");
            }
            _ => warn!(err:%; "{what} failed"),
        }
        self.status = Some(format!("{what} failed: {err}"));
    }

    pub(super) fn save_to_path(&mut self) {
        let path = self.file_path.clone();
        self.save_to(Path::new(&path));
    }

    pub(super) fn save_json_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(&self.file_path)
            .add_filter("JSON", &["json"])
            .save_file()
        {
            self.save_to(&path);
        }
    }

    fn save_to(&mut self, path: &Path) {
        match self.write_diagram(path) {
            Ok(()) => {
                let path_str = path.display().to_string();
                info!(path:% = path_str; "Saved diagram");
                self.status = Some(format!("Saved {path_str}"));
                self.remember_path(path_str);
            }
            Err(err) => self.report_failure("Save", &err),
        }
    }

    pub(super) fn open_json_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            match self.read_diagram(&path) {
                Ok(()) => {
                    let path_str = path.display().to_string();
                    info!(path:% = path_str; "Opened diagram");
                    self.label_dialog = None;
                    self.status = Some(format!("Loaded {path_str}"));
                    self.remember_path(path_str);
                }
                Err(err) => self.report_failure("Load", &err),
            }
        }
    }

    fn remember_path(&mut self, path: String) {
        self.file_path = path;
        if let Err(err) = settings::save_settings(&self.settings_path, &self.settings_snapshot()) {
            warn!(err:%; "Could not store settings");
        }
    }

    pub(super) fn settings_snapshot(&self) -> settings::AppSettings {
        settings::AppSettings {
            file_path: self.file_path.clone(),
            log_level: self.log_level.clone(),
            window_width: self.window_size.x,
            window_height: self.window_size.y,
        }
    }
}
