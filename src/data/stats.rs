use super::model::{NumericAttr, PatientRecord};

/// Share of `part` in `whole` as a percentage (0–100).
/// An empty `whole` yields `0.0` rather than NaN.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// ---------------------------------------------------------------------------
// GroupedMean
// ---------------------------------------------------------------------------

/// Mean of a dependent attribute per distinct value of a key attribute,
/// ordered by key. Keys are strictly increasing and unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedMean {
    /// `[key, mean]` pairs.
    pub points: Vec<[f64; 2]>,
}

impl GroupedMean {
    pub fn compute<'a, I>(records: I, key: NumericAttr, value: NumericAttr) -> Self
    where
        I: IntoIterator<Item = &'a PatientRecord>,
    {
        let mut pairs: Vec<(f64, f64)> = records
            .into_iter()
            .map(|r| (r.numeric(key), r.numeric(value)))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut points: Vec<[f64; 2]> = Vec::new();
        let mut group_start = 0;
        for i in 1..=pairs.len() {
            if i == pairs.len() || pairs[i].0 != pairs[group_start].0 {
                let group = &pairs[group_start..i];
                let sum: f64 = group.iter().map(|p| p.1).sum();
                points.push([group[0].0, sum / group.len() as f64]);
                group_start = i;
            }
        }
        GroupedMean { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn keys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[0]).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[1]).collect()
    }

    /// Mean of the per-key means (the "Avg" reference line).
    pub fn mean_value(&self) -> Option<f64> {
        mean(&self.values())
    }
}
