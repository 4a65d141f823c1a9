use eframe::egui::{self, Align2, Color32, RichText, ScrollArea, Stroke, Ui};
use egui_plot::{HLine, Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, PlotUi, Points, Polygon, Text};

use crate::color::{self, Ramp, SexPalette};
use crate::data::model::{NumericAttr, Sex};
use crate::data::segment::{BP_NORMAL_MAX, BP_NORMAL_MIN, Segment};
use crate::kde::{GridCache, Kde1d, Kde2d};
use crate::params::{PlotParams, ViewMode};
use crate::state::AppState;
use crate::ui::{table, views};

pub const TOP_HEIGHT: f32 = 110.0;
pub const MAIN_HEIGHT: f32 = 380.0;

/// Points along a 1-D density curve.
const KDE_GRID: usize = 200;
/// Cells per axis of a 2-D density grid, and its band count.
const KDE2_GRID: usize = 36;
const KDE2_LEVELS: usize = 10;
const KDE2_THRESH: f64 = 0.05;
/// 2-D densities always use half the automatic bandwidth.
const KDE2_ADJUST: f64 = 0.5;

// ---------------------------------------------------------------------------
// Chart frames
// ---------------------------------------------------------------------------

/// Visible data window of a chart.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl Bounds {
    pub const AGE_DENSITY: Bounds = Bounds {
        x: (25.0, 85.0),
        y: (0.0, 0.0),
    };
    pub const AGE_BP: Bounds = Bounds {
        x: (25.0, 85.0),
        y: (80.0, 210.0),
    };
    pub const AGE_CHOLESTEROL: Bounds = Bounds {
        x: (25.0, 85.0),
        y: (-5.0, 650.0),
    };
    pub const AGE_MAX_HR: Bounds = Bounds {
        x: (25.0, 85.0),
        y: (80.0, 210.0),
    };

    fn contains_x(&self, x: f64) -> bool {
        (self.x.0..=self.x.1).contains(&x)
    }

    fn contains(&self, p: [f64; 2]) -> bool {
        self.contains_x(p[0]) && (self.y.0..=self.y.1).contains(&p[1])
    }
}

/// Colours for one outcome group.
#[derive(Debug, Clone, Copy)]
pub struct GroupStyle {
    pub label: &'static str,
    pub solid: Color32,
    pub light: Color32,
    pub ramp: Ramp,
    pub sex: SexPalette,
}

pub const HEALTHY_STYLE: GroupStyle = GroupStyle {
    label: "Healthy",
    solid: color::HEALTHY,
    light: color::HEALTHY_LIGHT,
    ramp: Ramp::BLUES,
    sex: color::HEALTHY_SEX,
};

pub const DISEASED_STYLE: GroupStyle = GroupStyle {
    label: "Diseased",
    solid: color::DISEASED,
    light: color::DISEASED_LIGHT,
    ramp: Ramp::REDS,
    sex: color::DISEASED_SEX,
};

/// A static (non-interactive) chart with a bold title above it.
pub fn chart(ui: &mut Ui, id: impl std::hash::Hash, title: &str, height: f32, bounds: Bounds, add: impl FnOnce(&mut PlotUi)) {
    ui.label(RichText::new(title).strong());
    Plot::new(id)
        .height(height)
        .include_x(bounds.x.0)
        .include_x(bounds.x.1)
        .include_y(bounds.y.0)
        .include_y(bounds.y.1)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_grid(false)
        .legend(Legend::default())
        .show(ui, add);
}

// ---------------------------------------------------------------------------
// Chart elements
// ---------------------------------------------------------------------------

/// 1-D density of `samples`, scaled by `weight`. Returns `false` when the
/// samples cannot support a density and nothing was drawn.
pub fn draw_density(
    plot_ui: &mut PlotUi,
    name: &str,
    samples: Vec<f64>,
    weight: f64,
    color: Color32,
    params: &PlotParams,
) -> bool {
    let Some(kde) = Kde1d::fit(samples, params.kde_bw_adjust) else {
        return false;
    };
    let bounds = Bounds::AGE_DENSITY;
    let points: PlotPoints = kde
        .curve(KDE_GRID, weight)
        .into_iter()
        .filter(|p| bounds.contains_x(p[0]))
        .collect();
    let mut line = Line::new(points).name(name).color(color).width(1.0);
    if params.kde_fill {
        line = line.fill(0.0);
    }
    plot_ui.line(line);
    true
}

/// Age densities of male and female records, each weighted by its share of
/// the segment so the two areas sum to one.
pub fn draw_density_by_sex(plot_ui: &mut PlotUi, segment: &Segment, palette: SexPalette, params: &PlotParams) {
    for (sex, label, color) in [
        (Sex::Male, "M", palette.male),
        (Sex::Female, "F", palette.female),
    ] {
        let subset = Segment::select(label, &segment.records, |r| r.sex == sex);
        if subset.is_empty() {
            continue;
        }
        let weight = subset.len() as f64 / segment.len() as f64;
        draw_density(plot_ui, label, subset.values(NumericAttr::Age), weight, color, params);
    }
}

/// Banded 2-D density over `bounds`: filled cells, or the band outlines
/// when fill is off. The grid is fitted once per `key` and reused from
/// `grids` on later frames.
pub fn draw_density_2d(
    plot_ui: &mut PlotUi,
    grids: &mut GridCache,
    key: &str,
    points: impl FnOnce() -> Vec<[f64; 2]>,
    ramp: Ramp,
    fill: bool,
    bounds: Bounds,
) {
    let Some(grid) = grids.get_or_fit(key, || {
        Kde2d::fit(points(), KDE2_ADJUST).map(|kde| kde.grid(bounds.x, bounds.y, KDE2_GRID + 1, KDE2_GRID + 1))
    }) else {
        return;
    };

    if fill {
        for cell in grid.banded_cells(KDE2_LEVELS, KDE2_THRESH) {
            let square = vec![
                [cell.x0, cell.y0],
                [cell.x1, cell.y0],
                [cell.x1, cell.y1],
                [cell.x0, cell.y1],
            ];
            plot_ui.polygon(
                Polygon::new(PlotPoints::new(square))
                    .fill_color(ramp.band(cell.level, KDE2_LEVELS))
                    .stroke(Stroke::NONE),
            );
        }
    } else {
        for cell in grid.contour_cells(KDE2_LEVELS, KDE2_THRESH) {
            let centre = [(cell.x0 + cell.x1) / 2.0, (cell.y0 + cell.y1) / 2.0];
            plot_ui.points(
                Points::new(vec![centre])
                    .color(ramp.band(cell.level, KDE2_LEVELS))
                    .radius(1.0),
            );
        }
    }
}

pub fn draw_scatter(plot_ui: &mut PlotUi, name: &str, points: Vec<[f64; 2]>, color: Color32, bounds: Bounds) {
    let visible: Vec<[f64; 2]> = points.into_iter().filter(|p| bounds.contains(*p)).collect();
    if visible.is_empty() {
        return;
    }
    plot_ui.points(Points::new(visible).name(name).color(color).radius(2.0));
}

/// Dashed horizontal reference line.
pub fn draw_guide(plot_ui: &mut PlotUi, y: f64, color: Color32) {
    plot_ui.hline(HLine::new(y).color(color).style(LineStyle::dashed_loose()).width(1.0));
}

pub fn draw_note(plot_ui: &mut PlotUi, x: f64, y: f64, text: &str, anchor: Align2, color: Color32) {
    plot_ui.text(
        Text::new(PlotPoint::new(x, y), RichText::new(text).size(11.0).color(color)).anchor(anchor),
    );
}

/// The normal blood pressure band drawn on every Age-vs-BP chart.
pub fn draw_bp_band(plot_ui: &mut PlotUi) {
    draw_guide(plot_ui, BP_NORMAL_MAX + 0.5, color::GUIDE);
    draw_guide(plot_ui, BP_NORMAL_MIN - 0.5, color::GUIDE);
    draw_note(
        plot_ui,
        26.0,
        (BP_NORMAL_MIN + BP_NORMAL_MAX) / 2.0,
        &format!("Normal BP\n({BP_NORMAL_MIN}-{BP_NORMAL_MAX} mmHg)"),
        Align2::LEFT_CENTER,
        Color32::GRAY,
    );
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected visualization in the central panel.
pub fn central_view(ui: &mut Ui, state: &mut AppState) {
    let AppState {
        dataset,
        segmentation,
        params,
        density_grids: grids,
        awaiting_upload,
        ..
    } = state;
    let (Some(dataset), Some(segmentation)) = (dataset.as_ref(), segmentation.as_ref()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if *awaiting_upload {
                ui.heading("Please open the 'heart.csv' dataset (File → Open…, or drop it here) to view the visualizations.");
            } else {
                ui.heading("No dataset loaded.");
            }
        });
        return;
    };

    let params = &*params;
    ui.heading(params.view.title());
    ui.label(params.view.description());
    ui.add_space(6.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            match params.view {
                ViewMode::BloodPressure => views::bp::show(ui, segmentation, params, grids),
                ViewMode::Cholesterol => views::cholesterol::show(ui, segmentation, params, grids),
                ViewMode::Angina => views::angina::show(ui, segmentation, params),
                ViewMode::RestingEcg => views::ecg::show(ui, segmentation, params, grids),
            }

            if params.show_raw {
                ui.separator();
                ui.strong("Raw Data Sample");
                table::raw_sample(ui, dataset);
            }
        });
}

/// Frame a "nothing to show" message where a chart would be.
pub fn empty_note(ui: &mut Ui, text: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.weak(text);
    });
}
