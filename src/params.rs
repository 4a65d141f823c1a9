use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::interp::InterpolationKind;

pub const KDE_BW_RANGE: RangeInclusive<f64> = 0.1..=5.0;
pub const SCATTER_ALPHA_RANGE: RangeInclusive<f32> = 0.1..=1.0;

// ---------------------------------------------------------------------------
// Visualization modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ViewMode {
    #[default]
    BloodPressure,
    Cholesterol,
    Angina,
    RestingEcg,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [
        ViewMode::BloodPressure,
        ViewMode::Cholesterol,
        ViewMode::Angina,
        ViewMode::RestingEcg,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::BloodPressure => "Blood Pressure vs Age",
            ViewMode::Cholesterol => "Cholesterol vs Age",
            ViewMode::Angina => "Angina vs Max HR",
            ViewMode::RestingEcg => "Resting ECG vs BP",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ViewMode::BloodPressure => {
                "Comparing Resting Blood Pressure against Age for Healthy and Diseased individuals. \
                 The dashed lines indicate a 'normal' BP range (115-155 mmHg)."
            }
            ViewMode::Cholesterol => {
                "Comparing Cholesterol levels against Age for Healthy and Diseased individuals, \
                 broken down by sex in the top plots. The dashed line indicates the threshold for \
                 'high' cholesterol (> 200 mg/dL). Cholesterol values of 0 are plotted but excluded \
                 from the density estimate."
            }
            ViewMode::Angina => {
                "Maximum Heart Rate against Age for Diseased patients, with and without \
                 Exercise-Induced Angina. Smaller plots break the trend down by Chest Pain Type."
            }
            ViewMode::RestingEcg => {
                "Resting Blood Pressure against Age for Diseased individuals by Resting ECG result \
                 (Normal, ST, LVH). Top plots show the age distribution by sex for each category."
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Plot parameters
// ---------------------------------------------------------------------------

/// User-adjustable rendering parameters, persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotParams {
    pub view: ViewMode,
    /// Multiplier on the automatic KDE bandwidth.
    pub kde_bw_adjust: f64,
    pub scatter_alpha: f32,
    /// Draw densities filled rather than as outlines.
    pub kde_fill: bool,
    /// Curve smoothing for the angina view.
    pub interpolation: InterpolationKind,
    pub show_raw: bool,
}

impl Default for PlotParams {
    fn default() -> Self {
        Self {
            view: ViewMode::default(),
            kde_bw_adjust: 1.0,
            scatter_alpha: 0.4,
            kde_fill: true,
            interpolation: InterpolationKind::default(),
            show_raw: false,
        }
    }
}

impl PlotParams {
    /// Force continuous parameters into their documented ranges.
    pub fn clamped(mut self) -> Self {
        let bw = self.kde_bw_adjust;
        self.kde_bw_adjust = if bw.is_finite() {
            bw.clamp(*KDE_BW_RANGE.start(), *KDE_BW_RANGE.end())
        } else {
            Self::default().kde_bw_adjust
        };
        let alpha = self.scatter_alpha;
        self.scatter_alpha = if alpha.is_finite() {
            alpha.clamp(*SCATTER_ALPHA_RANGE.start(), *SCATTER_ALPHA_RANGE.end())
        } else {
            Self::default().scatter_alpha
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_controls() {
        let p = PlotParams::default();
        assert_eq!(p.view, ViewMode::BloodPressure);
        assert_eq!(p.kde_bw_adjust, 1.0);
        assert_eq!(p.scatter_alpha, 0.4);
        assert!(p.kde_fill);
        assert_eq!(p.interpolation, InterpolationKind::Cubic);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let p = PlotParams {
            kde_bw_adjust: 12.0,
            scatter_alpha: 0.0,
            ..PlotParams::default()
        }
        .clamped();
        assert_eq!(p.kde_bw_adjust, 5.0);
        assert_eq!(p.scatter_alpha, 0.1);

        let p = PlotParams {
            kde_bw_adjust: f64::NAN,
            ..PlotParams::default()
        }
        .clamped();
        assert_eq!(p.kde_bw_adjust, 1.0);
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let p: PlotParams = serde_json::from_str(r#"{"view":"Angina","interpolation":"Nearest"}"#).unwrap();
        assert_eq!(p.view, ViewMode::Angina);
        assert_eq!(p.interpolation, InterpolationKind::Nearest);
        assert_eq!(p.scatter_alpha, 0.4);
    }
}
