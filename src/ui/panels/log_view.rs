// CrashMinder - ui/panels/log_view.rs
//
// Crash log content viewer: a floating window showing the raw report text.

use crate::app::state::AppState;
use crate::ui::theme;

/// Render the viewer window (if a log is open).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    let Some(ref viewer) = state.viewer else {
        return;
    };

    let mut open = true;
    egui::Window::new(&viewer.title)
        .id(egui::Id::new("log_viewer"))
        .collapsible(false)
        .resizable(true)
        .default_width(theme::VIEWER_DEFAULT_WIDTH)
        .default_height(theme::VIEWER_DEFAULT_HEIGHT)
        .open(&mut open)
        .show(ctx, |ui| {
            egui::ScrollArea::both()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(&viewer.content).monospace());
                });
        });

    if !open {
        state.viewer = None;
    }
}
