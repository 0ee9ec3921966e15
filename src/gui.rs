// CrashMinder - gui.rs
//
// Top-level eframe::App implementation.
// Wires together the panels and handles the pending actions panels record.

use crate::app::safe_mode;
use crate::app::state::{AppState, View};
use crate::ui;

/// The CrashMinder application.
pub struct CrashMinderApp {
    pub state: AppState,
    /// Focus state from the previous frame, for foreground detection.
    focused: bool,
}

impl CrashMinderApp {
    /// Create a new application instance with the given state.
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            focused: true,
        }
    }
}

impl eframe::App for CrashMinderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Crash logs arrive while the window is in the background; rescan
        // whenever the app returns to the foreground.
        let focused = ctx.input(|i| i.viewport().focused.unwrap_or(true));
        if focused && !self.focused {
            self.state.cache.forget();
        }
        self.focused = focused;

        // ---- Handle flags set by panels last frame ----
        if self.state.pending_refresh {
            self.state.pending_refresh = false;
            self.state.refresh();
        }
        if let Some((domain, name)) = self.state.pending_open_group.take() {
            self.state.open_group(domain, &name);
        }
        if let Some((domain, name)) = self.state.pending_delete_group.take() {
            self.state.delete_group(domain, &name);
        }
        if self.state.pending_delete_all {
            self.state.pending_delete_all = false;
            self.state.delete_all();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Refresh").clicked() {
                        self.state.pending_refresh = true;
                        ui.close_menu();
                    }
                    if ui.button("Open Mobile Directory\u{2026}").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.state.cache.set_mobile_dir(path);
                            self.state.view = View::GroupList;
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Options").clicked() {
                        self.state.show_options = true;
                        ui.close_menu();
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.state.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let total = self.state.cache.total_groups();
                    if total > 0 {
                        ui.label(format!("{total} group(s)"));
                    }
                    if let Some(warning) = self.state.cache.warnings.first() {
                        ui.label(egui::RichText::new(warning.as_str()).weak().small());
                    }
                });
            });
        });

        // Central panel: group list or per-group detail
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::GroupList => ui::panels::group_list::render(ui, &mut self.state),
            View::Detail(_) => ui::panels::log_list::render(ui, &mut self.state),
        });

        // Floating windows
        ui::panels::log_view::render(ctx, &mut self.state);
        ui::panels::options::render(ctx, &mut self.state);
        ui::panels::alerts::render_confirm_delete_all(ctx, &mut self.state);
        ui::panels::alerts::render_alert(ctx, &mut self.state);
        ui::panels::alerts::render_safe_mode_notice(ctx, &mut self.state);
    }

    /// Called by eframe when the application window is about to close.
    ///
    /// Persists the session and clears the running marker so the next launch
    /// does not report an unclean shutdown.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.save_session();
        safe_mode::clear_marker(&self.state.marker_path);
    }
}
