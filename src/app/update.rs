use eframe::egui;
use log::debug;

use crate::canvas::{Gesture, Outcome, PointerButton, PointerEvent};
use crate::geometry::Size;
use crate::model::ShapeKind;

use super::help::draw_help_window;
use super::render::{PainterSurface, draw_background, to_canvas};
use super::{DialogAnswer, FlowchartApp, LabelDialog};

#[derive(Default)]
struct Shortcuts {
    save: bool,
    open: bool,
    help: bool,
}

fn pointer_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl eframe::App for FlowchartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(inner) = ctx.input(|i| i.viewport().inner_rect) {
            self.window_size = inner.size();
        }

        let dialog_open = self.label_dialog.is_some();
        let shortcuts = ctx.input_mut(|i| {
            let mut keys = Shortcuts::default();
            if i.consume_key(egui::Modifiers::NONE, egui::Key::F1) {
                keys.help = true;
            }
            if !dialog_open {
                keys.save = i.consume_key(egui::Modifiers::COMMAND, egui::Key::S);
                keys.open = i.consume_key(egui::Modifiers::COMMAND, egui::Key::O);
            }
            keys
        });
        if shortcuts.help {
            self.show_help = true;
        }
        if shortcuts.save {
            self.save_to_path();
        }
        if shortcuts.open {
            self.open_json_dialog();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                for kind in ShapeKind::ALL {
                    if ui.button(format!("Add {kind}")).clicked() {
                        self.add_shape(kind);
                    }
                }
                ui.separator();
                if ui.button("Clear").clicked() {
                    self.clear_all();
                }
                ui.separator();
                if ui.button("Open…").clicked() {
                    self.open_json_dialog();
                }
                if ui.button("Save").clicked() {
                    self.save_to_path();
                }
                if ui.button("Save As…").clicked() {
                    self.save_json_dialog();
                }
                ui.separator();
                if ui.button("Help").clicked() {
                    self.show_help = true;
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!(
                    "{} shapes, {} arrows",
                    self.canvas.shapes().len(),
                    self.canvas.arrows().len()
                ));
                ui.separator();
                ui.label(match self.canvas.gesture() {
                    Gesture::Idle if self.canvas.is_empty() => "Add a shape to start".to_string(),
                    Gesture::Idle => match self.canvas.hovered() {
                        Some(id) => format!("Over {id}"),
                        None => "Ready".to_string(),
                    },
                    Gesture::DraggingShape { shape, .. } => format!("Moving {shape}"),
                    Gesture::DrawingArrow { from, .. } => format!("Connecting from {from}"),
                });
                if let Some(status) = &self.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                let size = Size::new(rect.width(), rect.height());
                if self.canvas.size() != size {
                    self.canvas.set_size(size);
                }

                if self.label_dialog.is_none() {
                    self.dispatch_pointer(ctx, rect, &response);
                }

                let painter = ui.painter_at(rect);
                draw_background(&painter, rect);
                let mut surface = PainterSurface::new(&painter, rect.min);
                self.canvas.render(&mut surface);
            });

        self.show_label_dialog(ctx);
        draw_help_window(ctx, &mut self.show_help);
    }
}

impl FlowchartApp {
    fn dispatch_pointer(&mut self, ctx: &egui::Context, rect: egui::Rect, response: &egui::Response) {
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            let pointer_event = match event {
                egui::Event::PointerMoved(pos) => PointerEvent::Move {
                    pos: to_canvas(rect.min, pos),
                },
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    let Some(button) = pointer_button(button) else {
                        continue;
                    };
                    let pos_in_canvas = to_canvas(rect.min, pos);
                    if pressed {
                        // Presses over the toolbar or status bar belong to those panels.
                        if !(response.contains_pointer() && rect.contains(pos)) {
                            continue;
                        }
                        PointerEvent::Press {
                            button,
                            pos: pos_in_canvas,
                        }
                    } else {
                        PointerEvent::Release {
                            button,
                            pos: pos_in_canvas,
                        }
                    }
                }
                _ => continue,
            };
            let outcome = self.canvas.handle(pointer_event);
            self.apply_outcome(outcome);
        }

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let outcome = self.canvas.handle(PointerEvent::DoubleClick {
                    button: PointerButton::Primary,
                    pos: to_canvas(rect.min, pos),
                });
                self.apply_outcome(outcome);
            }
        }
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::ShapeDeleted {
                shape,
                arrows_removed,
            } => {
                self.status = Some(format!(
                    "Deleted {shape} and {arrows_removed} connected arrows"
                ));
            }
            Outcome::ArrowCreated { start, end } => {
                self.status = Some(format!("Connected {start} to {end}"));
            }
            Outcome::ArrowsRemoved(n) if n > 0 => {
                self.status = Some(format!("Removed {n} arrows"));
            }
            Outcome::EditLabel(id) => {
                if let Some(shape) = self.canvas.shape(id) {
                    debug!(shape:% = id; "Opening label editor");
                    self.label_dialog = Some(LabelDialog {
                        shape: id,
                        buffer: shape.text().to_string(),
                        focus_requested: false,
                    });
                }
            }
            _ => {}
        }
    }

    fn show_label_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = self.label_dialog.as_mut() else {
            return;
        };

        // Some(None) is a cancel, Some(Some(text)) an accepted answer.
        let mut answer: Option<Option<String>> = None;
        egui::Window::new("Edit label")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                let edit = ui.text_edit_singleline(&mut dialog.buffer);
                if !dialog.focus_requested {
                    edit.request_focus();
                    dialog.focus_requested = true;
                }
                let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || submitted {
                        answer = Some(Some(dialog.buffer.clone()));
                    }
                    if ui.button("Cancel").clicked() {
                        answer = Some(None);
                    }
                });
            });
        if answer.is_none() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            answer = Some(None);
        }

        let Some(answer) = answer else {
            return;
        };
        let id = dialog.shape;
        self.label_dialog = None;
        if self.canvas.edit_label(id, &mut DialogAnswer(answer)) {
            self.status = Some(format!("Renamed {id}"));
        }
    }
}
