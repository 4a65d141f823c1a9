use eframe::egui::{self, Color32, RichText, Ui};

use crate::interp::InterpolationKind;
use crate::params::{KDE_BW_RANGE, SCATTER_ALPHA_RANGE, ViewMode};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – visualization options
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Visualization Options");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        if ui.button("Open heart.csv…").clicked() {
            open_file_dialog(state);
        }
        return;
    }

    let params = &mut state.params;

    ui.strong("Choose Visualization");
    egui::ComboBox::from_id_salt("view_mode")
        .selected_text(params.view.title())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for view in ViewMode::ALL {
                ui.selectable_value(&mut params.view, view, view.title());
            }
        });

    ui.separator();
    ui.heading("Plot Parameters");

    ui.checkbox(&mut params.kde_fill, "Shade KDE Plots");

    ui.label("Scatter Point Alpha");
    ui.add(egui::Slider::new(&mut params.scatter_alpha, SCATTER_ALPHA_RANGE).step_by(0.05));

    ui.label("KDE Bandwidth Adjustment");
    ui.add(egui::Slider::new(&mut params.kde_bw_adjust, KDE_BW_RANGE).step_by(0.1));

    if params.view == ViewMode::Angina {
        ui.label("Interpolation Method (Angina Plot)");
        egui::ComboBox::from_id_salt("interpolation")
            .selected_text(params.interpolation.label())
            .show_ui(ui, |ui: &mut Ui| {
                for kind in InterpolationKind::ALL {
                    ui.selectable_value(&mut params.interpolation, kind, kind.label());
                }
            });
    }

    ui.separator();
    ui.checkbox(&mut params.show_raw, "Show Raw Data Sample");
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload default").clicked() {
                state.load_default();
                ui.close_menu();
            }
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Close dataset"))
                .clicked()
            {
                state.unload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(seg)) = (&state.dataset, &state.segmentation) {
            ui.label(format!(
                "{}: {} patients, {} healthy, {} diseased",
                ds.source,
                ds.len(),
                seg.outcome.healthy.len(),
                seg.outcome.diseased.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if state.awaiting_upload {
                Color32::from_rgb(0xC0, 0x80, 0x00)
            } else {
                Color32::RED
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open patient data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_picked(&path);
    }
}
