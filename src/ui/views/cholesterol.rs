use eframe::egui::{Align2, Color32, Ui};

use crate::color::{self, with_alpha};
use crate::data::model::NumericAttr::{Age, Cholesterol};
use crate::data::segment::{CHOLESTEROL_THRESHOLD, Segmentation};
use crate::kde::GridCache;
use crate::params::PlotParams;
use crate::ui::plot::{
    Bounds, DISEASED_STYLE, HEALTHY_STYLE, MAIN_HEIGHT, TOP_HEIGHT, chart, draw_density_2d,
    draw_density_by_sex, draw_guide, draw_note, draw_scatter,
};

/// Cholesterol vs age by outcome, with the sex split of high readings.
pub fn show(ui: &mut Ui, seg: &Segmentation, params: &PlotParams, grids: &mut GridCache) {
    let groups = [
        (HEALTHY_STYLE, &seg.outcome.healthy, &seg.cholesterol.healthy),
        (DISEASED_STYLE, &seg.outcome.diseased, &seg.cholesterol.diseased),
    ];

    ui.columns(2, |cols: &mut [Ui]| {
        for (ui, (style, group, split)) in cols.iter_mut().zip(groups) {
            chart(
                ui,
                ("chol_age", style.label),
                &format!("Age Distribution by Sex ({})", style.label),
                TOP_HEIGHT,
                Bounds::AGE_DENSITY,
                |plot_ui| draw_density_by_sex(plot_ui, group, style.sex, params),
            );
            ui.label(format!(
                "High cholesterol: Male-{:.1}%  Female-{:.1}%",
                split.abnormal_sex.male, split.abnormal_sex.female
            ));

            let bounds = Bounds::AGE_CHOLESTEROL;
            chart(
                ui,
                ("chol_scatter", style.label),
                &format!("{}: Age vs Cholesterol", style.label),
                MAIN_HEIGHT,
                bounds,
                |plot_ui| {
                    draw_density_2d(
                        plot_ui,
                        grids,
                        &format!("chol/{}", style.label),
                        || split.density_points(),
                        style.ramp,
                        params.kde_fill,
                        bounds,
                    );
                    draw_scatter(
                        plot_ui,
                        "High cholesterol",
                        split.abnormal.points(Age, Cholesterol),
                        style.solid,
                        bounds,
                    );
                    draw_scatter(
                        plot_ui,
                        "Normal cholesterol",
                        split.normal.points(Age, Cholesterol),
                        with_alpha(style.light, params.scatter_alpha),
                        bounds,
                    );
                    draw_guide(plot_ui, CHOLESTEROL_THRESHOLD, color::GUIDE);
                    draw_note(
                        plot_ui,
                        84.0,
                        CHOLESTEROL_THRESHOLD,
                        &threshold_label(),
                        Align2::RIGHT_BOTTOM,
                        color::GUIDE,
                    );
                    draw_note(
                        plot_ui,
                        26.0,
                        350.0,
                        &format!("High cholesterol\n> {CHOLESTEROL_THRESHOLD} mg/dL"),
                        Align2::LEFT_CENTER,
                        Color32::GRAY,
                    );
                },
            );
        }
    });
}

/// Value printed on the threshold line.
fn threshold_label() -> String {
    format!("{CHOLESTEROL_THRESHOLD:.0}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_line_is_labelled_with_its_value() {
        assert_eq!(threshold_label(), "200");
    }
}
