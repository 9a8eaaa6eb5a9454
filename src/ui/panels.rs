use eframe::egui::{self, Color32, RichText, Slider, Ui};

use crate::data::model::SiteFilter;
use crate::state::{DashboardState, SelectionEvent};

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the site dropdown and payload range controls.
pub fn side_panel(ui: &mut Ui, state: &mut DashboardState) {
    ui.heading("Selection");
    ui.separator();

    // ---- Site dropdown ----
    ui.strong("Launch site");
    let options = state.site_options();
    let current = state.selection.site.clone();
    let current_label = options
        .iter()
        .find(|(site, _)| *site == current)
        .map(|(_, label)| label.clone())
        .unwrap_or_else(|| current.to_string());

    let mut picked: Option<SiteFilter> = None;
    egui::ComboBox::from_id_salt("site_dropdown")
        .selected_text(current_label)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for (site, label) in &options {
                if ui.selectable_label(*site == current, label.as_str()).clicked() {
                    picked = Some(site.clone());
                }
            }
        });
    if let Some(site) = picked {
        state.apply(SelectionEvent::SiteChanged(site));
    }

    ui.add_space(8.0);

    // ---- Payload range ----
    ui.strong("Payload range (Kg):");
    let bounds = &state.config.payload_slider;
    let (min, max, step) = (bounds.min, bounds.max, bounds.step);
    let [mut low, mut high] = state.slider;

    let low_changed = ui
        .add(Slider::new(&mut low, min..=max).step_by(step).text("from"))
        .changed();
    let high_changed = ui
        .add(Slider::new(&mut high, min..=max).step_by(step).text("to"))
        .changed();
    if low_changed || high_changed {
        state.apply(SelectionEvent::PayloadChanged { low, high });
    }

    ui.separator();

    // ---- Summary ----
    if state.dataset.is_some() {
        let range = state.selection.payload;
        ui.label(format!(
            "{:.0} – {:.0} kg: {} launches",
            range.low(),
            range.high(),
            state.scatter_indices.len()
        ));
        match state.success_rate {
            Some(rate) => ui.label(format!("Success rate: {:.1}%", rate * 100.0)),
            None => ui.label("Success rate: n/a"),
        };
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut DashboardState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} launches loaded from {} sites",
                ds.len(),
                ds.sites.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut DashboardState) {
    let file = rfd::FileDialog::new()
        .set_title("Open launch records")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_path(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
