use eframe::egui::Ui;

use crate::color::with_alpha;
use crate::data::model::NumericAttr::{Age, RestingBp};
use crate::data::segment::Segmentation;
use crate::kde::GridCache;
use crate::params::PlotParams;
use crate::ui::plot::{
    Bounds, DISEASED_STYLE, HEALTHY_STYLE, MAIN_HEIGHT, TOP_HEIGHT, chart, draw_bp_band, draw_density,
    draw_density_2d, draw_scatter,
};

/// Blood pressure vs age, healthy on the left and diseased on the right.
pub fn show(ui: &mut Ui, seg: &Segmentation, params: &PlotParams, grids: &mut GridCache) {
    let groups = [
        (HEALTHY_STYLE, &seg.outcome.healthy, &seg.bp.healthy),
        (DISEASED_STYLE, &seg.outcome.diseased, &seg.bp.diseased),
    ];

    ui.columns(2, |cols: &mut [Ui]| {
        for (ui, (style, group, split)) in cols.iter_mut().zip(groups) {
            chart(
                ui,
                ("bp_age", style.label),
                &format!("Age Distribution ({})", style.label),
                TOP_HEIGHT,
                Bounds::AGE_DENSITY,
                |plot_ui| {
                    draw_density(plot_ui, "Age", group.values(Age), 1.0, style.solid, params);
                },
            );

            chart(
                ui,
                ("bp_scatter", style.label),
                &format!("{}: Age vs Resting BP", style.label),
                MAIN_HEIGHT,
                Bounds::AGE_BP,
                |plot_ui| {
                    draw_density_2d(
                        plot_ui,
                        grids,
                        &format!("bp/{}", style.label),
                        || split.normal.points(Age, RestingBp),
                        style.ramp,
                        params.kde_fill,
                        Bounds::AGE_BP,
                    );
                    draw_scatter(
                        plot_ui,
                        "Abnormal BP",
                        split.abnormal.points(Age, RestingBp),
                        with_alpha(style.light, params.scatter_alpha),
                        Bounds::AGE_BP,
                    );
                    draw_scatter(
                        plot_ui,
                        "Normal BP",
                        split.normal.points(Age, RestingBp),
                        style.solid,
                        Bounds::AGE_BP,
                    );
                    draw_bp_band(plot_ui);
                },
            );
            ui.weak(format!(
                "{} normal, {} outside 115-155 mmHg",
                split.normal.len(),
                split.abnormal.len()
            ));
        }
    });
}
