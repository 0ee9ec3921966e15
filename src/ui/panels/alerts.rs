// CrashMinder - ui/panels/alerts.rs
//
// Modal-ish dialogs: the single error alert and the delete-all confirmation.
// One alert at a time; later failures within an operation are aggregated by
// the app layer before they get here.

use crate::app::state::AppState;

/// Render the error alert window (if an alert is pending).
pub fn render_alert(ctx: &egui::Context, state: &mut AppState) {
    let Some(ref message) = state.alert else {
        return;
    };
    let message = message.clone();

    let mut dismissed = false;
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(6.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        state.alert = None;
    }
}

/// Render the delete-all confirmation dialog.
pub fn render_confirm_delete_all(ctx: &egui::Context, state: &mut AppState) {
    if !state.confirm_delete_all {
        return;
    }

    egui::Window::new("Delete All Crash Logs")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Delete every crash log in both the Mobile and Root domains?");
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                if ui.button("Delete All").clicked() {
                    state.confirm_delete_all = false;
                    state.pending_delete_all = true;
                }
                if ui.button("Cancel").clicked() {
                    state.confirm_delete_all = false;
                }
            });
        });
}

/// Render the one-time safe-mode notice after an unclean shutdown.
pub fn render_safe_mode_notice(ctx: &egui::Context, state: &mut AppState) {
    if !state.safe_mode_notice {
        return;
    }

    let mut dismissed = false;
    egui::Window::new("Previous Session Ended Unexpectedly")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(
                "CrashMinder did not shut down cleanly last time. \
                 Its own crash log, if one was written, appears in the list below.",
            );
            ui.add_space(6.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        state.safe_mode_notice = false;
    }
}
