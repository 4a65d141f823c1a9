use eframe::egui::{Align2, Color32, Ui};

use crate::color::{self, Ramp, with_alpha};
use crate::data::model::NumericAttr::{Age, RestingBp};
use crate::data::model::RestingEcg;
use crate::data::segment::Segmentation;
use crate::kde::GridCache;
use crate::params::PlotParams;
use crate::ui::plot::{
    Bounds, MAIN_HEIGHT, TOP_HEIGHT, chart, draw_bp_band, draw_density_2d, draw_density_by_sex,
    draw_note, draw_scatter, empty_note,
};

/// Diseased patients' resting BP vs age, one column per resting ECG result.
pub fn show(ui: &mut Ui, seg: &Segmentation, params: &PlotParams, grids: &mut GridCache) {
    if seg.outcome.diseased.is_empty() {
        empty_note(ui, "No diseased data available for ECG visualization.");
        return;
    }

    ui.columns(seg.ecg.len(), |cols: &mut [Ui]| {
        for (ui, ecg) in cols.iter_mut().zip(&seg.ecg) {
            let code = ecg.ecg.to_string();
            let segment = &ecg.segment;

            chart(
                ui,
                ("ecg_age", &code),
                &format!("Age Dist by Sex (ECG {code})"),
                TOP_HEIGHT,
                Bounds::AGE_DENSITY,
                |plot_ui| draw_density_by_sex(plot_ui, segment, color::DISEASED_SEX, params),
            );
            if segment.is_empty() {
                ui.weak("No patients in this category.");
            } else {
                ui.label(format!(
                    "Male-{:.1}%  Female-{:.1}%  (n = {})",
                    ecg.sex.male,
                    ecg.sex.female,
                    segment.len()
                ));
            }

            chart(
                ui,
                ("ecg_scatter", &code),
                &format!("ECG {code}: Age vs Resting BP"),
                MAIN_HEIGHT,
                Bounds::AGE_BP,
                |plot_ui| {
                    draw_density_2d(
                        plot_ui,
                        grids,
                        &format!("ecg/{code}"),
                        || segment.points(Age, RestingBp),
                        Ramp::REDS,
                        params.kde_fill,
                        Bounds::AGE_BP,
                    );
                    draw_scatter(
                        plot_ui,
                        &code,
                        segment.points(Age, RestingBp),
                        with_alpha(color::DISEASED, params.scatter_alpha),
                        Bounds::AGE_BP,
                    );
                    draw_bp_band(plot_ui);
                    if let Some(caption) = caption(ecg.ecg) {
                        draw_note(plot_ui, 27.0, 188.0, caption, Align2::LEFT_BOTTOM, Color32::GRAY);
                    }
                },
            );
        }
    });
}

fn caption(ecg: RestingEcg) -> Option<&'static str> {
    match ecg {
        RestingEcg::St => Some("ST-T wave abnormality"),
        RestingEcg::Lvh => Some("Left ventricular hypertrophy"),
        _ => None,
    }
}
