use eframe::egui;

pub(super) fn draw_help_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Help")
        .open(open)
        .resizable(true)
        .default_width(460.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Mouse");
                ui.separator();
                help_row(ui, "Drag body", "Move a shape (brings it to the front)");
                help_row(ui, "Drag node", "Draw an arrow to another shape's node");
                help_row(ui, "Click ✕", "Delete a shape and its arrows");
                help_row(ui, "Double-click shape", "Edit the shape's label");
                help_row(ui, "Double-click arrow", "Remove arrows under the pointer");

                ui.add_space(10.0);
                ui.heading("Keyboard Shortcuts");
                ui.separator();
                help_row(ui, "⌘S", "Save diagram to the current file");
                help_row(ui, "⌘O", "Open a diagram");
                help_row(ui, "F1", "Show this help");
                help_row(ui, "Enter / Escape", "Accept / cancel the label editor");

                ui.add_space(10.0);
                ui.heading("Files");
                ui.separator();
                ui.label("• Diagrams are saved as JSON files (.json)");
                ui.label("• Arrows are stored by shape and node index");
                ui.label("• Settings are stored in settings.toml or ~/.config/flowdraft.toml");
            });
        });
}

fn help_row(ui: &mut egui::Ui, shortcut: &str, description: &str) {
    ui.horizontal(|ui| {
        ui.add_sized([140.0, 16.0], egui::Label::new(
            egui::RichText::new(shortcut).monospace().strong()
        ));
        ui.label(description);
    });
}
