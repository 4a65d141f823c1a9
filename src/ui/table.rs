use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Dataset, columns};

/// Rows shown by the raw data preview.
const SAMPLE_ROWS: usize = 5;

/// First rows of the dataset as a striped table.
pub fn raw_sample(ui: &mut Ui, dataset: &Dataset) {
    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .columns(Column::auto().at_least(48.0), columns::ALL.len())
        .header(20.0, |mut header| {
            for name in columns::ALL {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|mut body| {
            for record in dataset.head(SAMPLE_ROWS) {
                body.row(18.0, |mut row| {
                    for cell in record.to_row() {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            }
        });
}
