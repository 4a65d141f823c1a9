use eframe::egui::{Align2, Ui};
use egui_plot::{Line, LineStyle, MarkerShape, PlotPoints, PlotUi, Points};

use crate::color::{self, with_alpha};
use crate::data::model::NumericAttr::{Age, MaxHr};
use crate::data::segment::{Segment, Segmentation};
use crate::data::stats::{GroupedMean, mean};
use crate::interp::smooth;
use crate::params::PlotParams;
use crate::ui::plot::{Bounds, MAIN_HEIGHT, chart, draw_guide, draw_note, draw_scatter, empty_note};

const SMALL_HEIGHT: f32 = 200.0;

/// Max heart rate vs age for diseased patients, split by exercise-induced
/// angina, with small multiples per chest pain type.
pub fn show(ui: &mut Ui, seg: &Segmentation, params: &PlotParams) {
    if seg.outcome.diseased.is_empty() {
        empty_note(ui, "No diseased data available for Angina visualization.");
        return;
    }
    let angina = &seg.angina;
    let bounds = Bounds::AGE_MAX_HR;

    chart(
        ui,
        "angina_main",
        "Diseased Patients: Max HR vs Age by Exercise Angina",
        MAIN_HEIGHT,
        bounds,
        |plot_ui| {
            let induced = smooth(&angina.induced.grouped_mean(Age, MaxHr), params.interpolation);
            let not_induced = smooth(&angina.not_induced.grouped_mean(Age, MaxHr), params.interpolation);

            if !induced.is_empty() {
                let values: Vec<f64> = induced.iter().map(|p| p[1]).collect();
                plot_ui.line(
                    Line::new(PlotPoints::new(induced))
                        .name("Induced Angina (Y)")
                        .color(color::DISEASED)
                        .width(1.5),
                );
                if let Some(avg) = mean(&values) {
                    draw_guide(plot_ui, avg, with_alpha(color::DISEASED, 0.7));
                    draw_note(
                        plot_ui,
                        85.0,
                        avg,
                        &format!("Avg\n{avg:.1}"),
                        Align2::RIGHT_BOTTOM,
                        with_alpha(color::DISEASED, 0.7),
                    );
                }
            }
            if !not_induced.is_empty() {
                plot_ui.line(
                    Line::new(PlotPoints::new(not_induced))
                        .name("Not Induced Angina (N)")
                        .color(with_alpha(color::NOT_INDUCED, 0.7))
                        .width(1.5),
                );
            }

            draw_scatter(
                plot_ui,
                "Induced (raw)",
                angina.induced.points(Age, MaxHr),
                with_alpha(color::DISEASED_LIGHT, 0.1),
                bounds,
            );
            draw_scatter(
                plot_ui,
                "Not induced (raw)",
                angina.not_induced.points(Age, MaxHr),
                with_alpha(color::NOT_INDUCED_LIGHT, 0.1),
                bounds,
            );
        },
    );
    ui.weak("Comparing mean Max HR trend for patients with and without exercise-induced angina.");
    ui.add_space(8.0);

    ui.columns(angina.by_pain.len(), |cols: &mut [Ui]| {
        for (ui, (pain, induced, not_induced)) in cols.iter_mut().zip(&angina.by_pain) {
            chart(
                ui,
                ("angina_pain", pain.to_string()),
                &format!("Pain Type: {pain} ({})", pain.description()),
                SMALL_HEIGHT,
                bounds,
                |plot_ui| {
                    draw_raw_means(plot_ui, induced, true);
                    draw_raw_means(plot_ui, not_induced, false);
                },
            );
        }
    });
}

/// Unsmoothed grouped means with markers; the induced series also gets
/// its average line.
fn draw_raw_means(plot_ui: &mut PlotUi, segment: &Segment, induced: bool) {
    if segment.is_empty() {
        return;
    }
    let series: GroupedMean = segment.grouped_mean(Age, MaxHr);
    let (name, line_color, style, marker) = if induced {
        ("Y", color::DISEASED, LineStyle::Solid, MarkerShape::Circle)
    } else {
        (
            "N",
            with_alpha(color::NOT_INDUCED, 0.7),
            LineStyle::dotted_dense(),
            MarkerShape::Cross,
        )
    };

    plot_ui.line(
        Line::new(PlotPoints::new(series.points.clone()))
            .name(name)
            .color(line_color)
            .style(style)
            .width(1.0),
    );
    plot_ui.points(
        Points::new(series.points.clone())
            .shape(marker)
            .color(line_color)
            .radius(2.0),
    );

    if induced {
        if let Some(avg) = series.mean_value() {
            draw_guide(plot_ui, avg, with_alpha(color::DISEASED, 0.7));
            draw_note(
                plot_ui,
                85.0,
                avg,
                &format!("Avg\n{avg:.1}"),
                Align2::RIGHT_BOTTOM,
                with_alpha(color::DISEASED, 0.7),
            );
        }
    }
}
