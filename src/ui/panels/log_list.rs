// CrashMinder - ui/panels/log_list.rs
//
// Per-group crash log list: a Latest section with the most recent log and
// an Earlier section with the remainder. Row text is the formatted crash
// timestamp, coloured by symbolication state.
//
// Deletion here goes straight through the DetailState so its index-shift
// semantics apply; the cache is forgotten so the group list rescans.

use crate::app::state::{AppState, DetailSection, View};
use crate::core::model::CrashLog;
use crate::ui::theme;

/// Row action chosen by the user this frame.
enum RowAction {
    Open(DetailSection, usize),
    Delete(DetailSection, usize),
}

/// Render the detail view into the central panel.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let View::Detail(ref detail) = state.view else {
        return;
    };

    let title = format!("{} — {}", detail.group_name, detail.domain.label());
    let mut back = false;
    ui.horizontal(|ui| {
        if ui.button("\u{2190} Groups").clicked() {
            back = true;
        }
        ui.heading(title);
    });
    ui.separator();

    let mut action: Option<RowAction> = None;

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            ui.label(egui::RichText::new("Latest").strong());
            if detail.latest_rows() == 0 {
                ui.label(egui::RichText::new("No crash logs remain.").weak().italics());
            } else if let Some(log) = detail.log_at(DetailSection::Latest, 0) {
                render_row(ui, log, DetailSection::Latest, 0, &mut action);
            }

            ui.add_space(8.0);
            ui.label(egui::RichText::new("Earlier").strong());
            if detail.earlier_rows() == 0 {
                ui.label(egui::RichText::new("No earlier crash logs.").weak().italics());
            } else {
                for row in 0..detail.earlier_rows() {
                    if let Some(log) = detail.log_at(DetailSection::Earlier, row) {
                        render_row(ui, log, DetailSection::Earlier, row, &mut action);
                    }
                }
            }
        });

    if back {
        state.close_detail();
        return;
    }

    match action {
        Some(RowAction::Open(section, row)) => {
            let log = {
                let View::Detail(ref detail) = state.view else {
                    return;
                };
                detail.log_at(section, row).cloned()
            };
            if let Some(log) = log {
                if state.open_log(&log) {
                    if let View::Detail(ref mut detail) = state.view {
                        detail.mark_viewed(section, row);
                    }
                }
            }
        }
        Some(RowAction::Delete(section, row)) => {
            let result = match state.view {
                View::Detail(ref mut detail) => detail.delete(section, row),
                _ => return,
            };
            match result {
                Ok(()) => {
                    // The list view must rescan on return.
                    state.cache.forget();
                    state.session.prune_missing();
                    state.save_session();
                    state.status_message = "Crash log deleted.".to_string();
                }
                Err(e) => {
                    state.alert = Some(format!("Could not delete crash log: {e}"));
                }
            }
        }
        None => {}
    }
}

fn render_row(
    ui: &mut egui::Ui,
    log: &CrashLog,
    section: DetailSection,
    row: usize,
    action: &mut Option<RowAction>,
) {
    let label = log.date.format("%b %e, %Y %H:%M:%S").to_string();
    let colour = theme::log_colour(log.symbolicated);

    ui.horizontal(|ui| {
        let text = if log.viewed {
            egui::RichText::new(label).color(colour)
        } else {
            egui::RichText::new(label).color(colour).strong()
        };
        if ui.link(text).clicked() {
            *action = Some(RowAction::Open(section, row));
        }
        if ui.small_button("Delete").clicked() {
            *action = Some(RowAction::Delete(section, row));
        }
    });
}
