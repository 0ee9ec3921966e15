// CrashMinder - ui/panels/options.rs
//
// Options window: the two notifier preference toggles.
//
// Changes are persisted immediately on toggle so the crash-notifier CLI
// (a separate process) always reads the current values.

use crate::app::state::AppState;

/// Render the Options window (if `state.show_options` is true).
pub fn render(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_options {
        return;
    }

    let mut open = true;
    let mut changed = false;
    egui::Window::new("Options")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Notifications").strong());
            changed |= ui
                .checkbox(
                    &mut state.prefs.notify_sandbox_violations,
                    "Notify on sandbox violations",
                )
                .changed();
            changed |= ui
                .checkbox(
                    &mut state.prefs.notify_execution_timeouts,
                    "Notify on execution timeouts",
                )
                .changed();

            ui.add_space(6.0);
            ui.label(
                egui::RichText::new(
                    "Ordinary crashes always notify; these toggles only gate \
                     the two noisy classes.",
                )
                .weak()
                .small(),
            );
        });

    if changed {
        state.save_prefs();
    }
    if !open {
        state.show_options = false;
    }
}
