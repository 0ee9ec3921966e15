// CrashMinder - ui/panels/group_list.rs
//
// The group list: two sections (Mobile, Root), each row showing a group's
// name and its unviewed/total count, with per-row Open and Delete actions.
//
// Panels never mutate the cache directly; they set pending_* flags on the
// state which the top-level update loop handles before the next render.

use crate::app::state::AppState;
use crate::core::model::OwnerDomain;
use crate::ui::theme;

/// Render the group list into the central panel.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    ui.horizontal(|ui| {
        ui.heading("Crash Log Groups");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Delete All").clicked() {
                state.confirm_delete_all = true;
            }
            if ui.button("Refresh").clicked() {
                state.pending_refresh = true;
            }
        });
    });
    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            for &domain in OwnerDomain::all() {
                render_domain(ui, state, domain);
            }
        });
}

fn render_domain(ui: &mut egui::Ui, state: &mut AppState, domain: OwnerDomain) {
    // Clone the row data up front: the closures below borrow state mutably
    // to record pending actions.
    let rows: Vec<(String, usize, usize, String)> = match state.cache.groups(domain, &state.session)
    {
        Ok(groups) => groups
            .iter()
            .map(|g| {
                let latest = g
                    .latest_date()
                    .map(|d| d.format("%b %e, %Y %H:%M:%S").to_string())
                    .unwrap_or_default();
                (g.name.clone(), g.unviewed(), g.total(), latest)
            })
            .collect(),
        Err(e) => {
            ui.colored_label(
                theme::log_colour(false),
                format!("{}: {e}", domain.label()),
            );
            return;
        }
    };

    egui::CollapsingHeader::new(
        egui::RichText::new(format!("{} ({})", domain.label(), rows.len())).strong(),
    )
    .id_salt(format!("domain_{}", domain.label()))
    .default_open(true)
    .show(ui, |ui| {
        if rows.is_empty() {
            ui.label(egui::RichText::new("No crash logs.").weak().italics());
            return;
        }

        egui::Grid::new(format!("group_grid_{}", domain.label()))
            .num_columns(4)
            .spacing([16.0, 4.0])
            .striped(true)
            .show(ui, |ui| {
                for (name, unviewed, total, latest) in &rows {
                    let badge_colour = if *unviewed > 0 {
                        theme::UNVIEWED_BADGE
                    } else {
                        theme::VIEWED_BADGE
                    };

                    if ui.link(name).clicked() {
                        state.pending_open_group = Some((domain, name.clone()));
                    }
                    ui.colored_label(badge_colour, format!("{unviewed}/{total}"));
                    ui.label(egui::RichText::new(latest.as_str()).weak().small());
                    if ui.small_button("Delete").clicked() {
                        state.pending_delete_group = Some((domain, name.clone()));
                    }
                    ui.end_row();
                }
            });
    });
}
