use super::model::{
    Categorical, ChestPainType, Dataset, ExerciseAngina, NumericAttr, PatientRecord, RestingEcg, Sex,
};
use super::stats::{GroupedMean, percentage};

/// Resting blood pressure range (mmHg, inclusive) considered normal.
pub const BP_NORMAL_MIN: f64 = 115.0;
pub const BP_NORMAL_MAX: f64 = 155.0;

/// Cholesterol (mg/dL) above which a reading is high.
pub const CHOLESTEROL_THRESHOLD: f64 = 200.0;

/// Both boundaries belong to the normal range.
pub fn is_normal_bp(bp: f64) -> bool {
    (BP_NORMAL_MIN..=BP_NORMAL_MAX).contains(&bp)
}

/// Zero-coded (missing) readings are *not* high.
pub fn is_high_cholesterol(cholesterol: f64) -> bool {
    cholesterol > CHOLESTEROL_THRESHOLD
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// A named, read-only subset of the dataset, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub name: String,
    pub records: Vec<PatientRecord>,
}

impl Segment {
    pub fn new(name: impl Into<String>, records: Vec<PatientRecord>) -> Self {
        Segment {
            name: name.into(),
            records,
        }
    }

    /// Records of `parent` matching `pred`.
    pub fn select<P>(name: impl Into<String>, parent: &[PatientRecord], pred: P) -> Self
    where
        P: Fn(&PatientRecord) -> bool,
    {
        Segment::new(name, parent.iter().filter(|r| pred(r)).copied().collect())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count<P: Fn(&PatientRecord) -> bool>(&self, pred: P) -> usize {
        self.records.iter().filter(|r| pred(r)).count()
    }

    /// Percentage of records matching `pred`; 0 for an empty segment.
    pub fn share<P: Fn(&PatientRecord) -> bool>(&self, pred: P) -> f64 {
        percentage(self.count(pred), self.len())
    }

    pub fn sex_share(&self) -> SexShare {
        SexShare {
            male: self.share(|r| r.sex == Sex::Male),
            female: self.share(|r| r.sex == Sex::Female),
        }
    }

    pub fn values(&self, attr: NumericAttr) -> Vec<f64> {
        self.records.iter().map(|r| r.numeric(attr)).collect()
    }

    /// `[x, y]` pairs for scatter plots and 2-D densities.
    pub fn points(&self, x: NumericAttr, y: NumericAttr) -> Vec<[f64; 2]> {
        self.records
            .iter()
            .map(|r| [r.numeric(x), r.numeric(y)])
            .collect()
    }

    pub fn grouped_mean(&self, key: NumericAttr, value: NumericAttr) -> GroupedMean {
        GroupedMean::compute(&self.records, key, value)
    }
}

/// Percentages of male and female records within a segment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SexShare {
    pub male: f64,
    pub female: f64,
}

/// A value computed once for each outcome group.
#[derive(Debug, Clone, PartialEq)]
pub struct ByOutcome<T> {
    pub healthy: T,
    pub diseased: T,
}

impl<T> ByOutcome<T> {
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> ByOutcome<U> {
        ByOutcome {
            healthy: f(&self.healthy),
            diseased: f(&self.diseased),
        }
    }
}

// ---------------------------------------------------------------------------
// Splits
// ---------------------------------------------------------------------------

/// Partition by outcome label.
pub fn split_outcome(records: &[PatientRecord]) -> ByOutcome<Segment> {
    ByOutcome {
        healthy: Segment::select("healthy", records, |r| !r.heart_disease),
        diseased: Segment::select("diseased", records, |r| r.heart_disease),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BpSplit {
    pub abnormal: Segment,
    pub normal: Segment,
}

pub fn split_bp(group: &Segment) -> BpSplit {
    BpSplit {
        abnormal: Segment::select(format!("abnormal_bp_{}", group.name), &group.records, |r| {
            !is_normal_bp(r.resting_bp)
        }),
        normal: Segment::select(format!("normal_bp_{}", group.name), &group.records, |r| {
            is_normal_bp(r.resting_bp)
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CholesterolSplit {
    pub abnormal: Segment,
    /// Includes zero (missing-coded) readings.
    pub normal: Segment,
    /// Sex percentages within `abnormal`.
    pub abnormal_sex: SexShare,
}

impl CholesterolSplit {
    /// Abnormal records usable for density estimation (non-zero readings).
    pub fn density_points(&self) -> Vec<[f64; 2]> {
        self.abnormal
            .records
            .iter()
            .filter(|r| r.cholesterol > 0.0)
            .map(|r| [r.age, r.cholesterol])
            .collect()
    }
}

pub fn split_cholesterol(group: &Segment) -> CholesterolSplit {
    let abnormal = Segment::select(format!("abnormal_chol_{}", group.name), &group.records, |r| {
        is_high_cholesterol(r.cholesterol)
    });
    let normal = Segment::select(format!("normal_chol_{}", group.name), &group.records, |r| {
        !is_high_cholesterol(r.cholesterol)
    });
    let abnormal_sex = abnormal.sex_share();
    CholesterolSplit {
        abnormal,
        normal,
        abnormal_sex,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EcgSegment {
    pub ecg: RestingEcg,
    pub segment: Segment,
    pub sex: SexShare,
}

/// One segment per recognised resting-ECG category, in
/// Normal / ST / LVH order. Records with a missing ECG fall in none.
pub fn split_ecg(group: &Segment) -> Vec<EcgSegment> {
    RestingEcg::VARIANTS
        .iter()
        .map(|&ecg| {
            let segment = Segment::select(
                format!("ecg_{}_{}", ecg.code().to_ascii_lowercase(), group.name),
                &group.records,
                |r| r.resting_ecg == ecg,
            );
            let sex = segment.sex_share();
            EcgSegment { ecg, segment, sex }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnginaSplit {
    pub induced: Segment,
    pub not_induced: Segment,
    /// `(pain type, induced, not induced)` for each recognised pain type.
    pub by_pain: Vec<(ChestPainType, Segment, Segment)>,
}

pub fn split_angina(group: &Segment) -> AnginaSplit {
    let induced = Segment::select("angina_induced", &group.records, |r| {
        r.exercise_angina == ExerciseAngina::Yes
    });
    let not_induced = Segment::select("angina_not_induced", &group.records, |r| {
        r.exercise_angina == ExerciseAngina::No
    });
    let by_pain = ChestPainType::VARIANTS
        .iter()
        .map(|&pain| {
            let code = pain.code().to_ascii_lowercase();
            (
                pain,
                Segment::select(format!("angina_induced_{code}"), &induced.records, |r| {
                    r.chest_pain == pain
                }),
                Segment::select(format!("angina_not_induced_{code}"), &not_induced.records, |r| {
                    r.chest_pain == pain
                }),
            )
        })
        .collect();
    AnginaSplit {
        induced,
        not_induced,
        by_pain,
    }
}

// ---------------------------------------------------------------------------
// Segmentation – everything the views consume
// ---------------------------------------------------------------------------

/// All segments and percentages derived from one dataset.
/// A pure function of the dataset: recomputing yields identical results.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub outcome: ByOutcome<Segment>,
    pub bp: ByOutcome<BpSplit>,
    pub cholesterol: ByOutcome<CholesterolSplit>,
    /// Diseased records by resting ECG.
    pub ecg: Vec<EcgSegment>,
    /// Diseased records by exercise angina.
    pub angina: AnginaSplit,
}

impl Segmentation {
    pub fn compute(dataset: &Dataset) -> Self {
        let outcome = split_outcome(&dataset.records);
        let bp = outcome.map(split_bp);
        let cholesterol = outcome.map(split_cholesterol);
        let ecg = split_ecg(&outcome.diseased);
        let angina = split_angina(&outcome.diseased);

        log::debug!(
            "segmented {} records: {} healthy, {} diseased",
            dataset.len(),
            outcome.healthy.len(),
            outcome.diseased.len()
        );

        Segmentation {
            outcome,
            bp,
            cholesterol,
            ecg,
            angina,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::StSlope;

    fn rec(age: f64, bp: f64, chol: f64, sex: Sex, diseased: bool) -> PatientRecord {
        PatientRecord {
            age,
            sex,
            chest_pain: ChestPainType::Asymptomatic,
            resting_bp: bp,
            cholesterol: chol,
            fasting_bs: false,
            resting_ecg: RestingEcg::Normal,
            max_hr: 150.0,
            exercise_angina: ExerciseAngina::No,
            oldpeak: 0.0,
            st_slope: StSlope::Flat,
            heart_disease: diseased,
        }
    }

    fn mixed_dataset() -> Dataset {
        let mut records = Vec::new();
        for (i, bp) in [100.0, 114.0, 115.0, 130.0, 155.0, 156.0, 190.0].iter().enumerate() {
            for (j, chol) in [0.0, 150.0, 200.0, 201.0, 300.0].iter().enumerate() {
                let sex = if (i + j) % 3 == 0 { Sex::Female } else { Sex::Male };
                records.push(rec(40.0 + i as f64, *bp, *chol, sex, (i * 5 + j) % 2 == 0));
            }
        }
        Dataset::new(records, "test")
    }

    #[test]
    fn outcome_split_partitions() {
        let ds = mixed_dataset();
        let seg = Segmentation::compute(&ds);
        assert_eq!(seg.outcome.healthy.len() + seg.outcome.diseased.len(), ds.len());
        assert!(seg.outcome.healthy.records.iter().all(|r| !r.heart_disease));
        assert!(seg.outcome.diseased.records.iter().all(|r| r.heart_disease));
    }

    #[test]
    fn bp_split_partitions_with_inclusive_boundaries() {
        let seg = Segmentation::compute(&mixed_dataset());
        for (group, split) in [
            (&seg.outcome.healthy, &seg.bp.healthy),
            (&seg.outcome.diseased, &seg.bp.diseased),
        ] {
            assert_eq!(split.abnormal.len() + split.normal.len(), group.len());
            assert!(split.normal.records.iter().all(|r| (115.0..=155.0).contains(&r.resting_bp)));
            assert!(split.abnormal.records.iter().all(|r| r.resting_bp < 115.0 || r.resting_bp > 155.0));
        }
        assert!(is_normal_bp(115.0));
        assert!(is_normal_bp(155.0));
        assert!(!is_normal_bp(114.9));
        assert!(!is_normal_bp(155.1));
    }

    #[test]
    fn cholesterol_zero_and_threshold_are_normal() {
        assert!(!is_high_cholesterol(0.0));
        assert!(!is_high_cholesterol(200.0));
        assert!(is_high_cholesterol(201.0));

        let seg = Segmentation::compute(&mixed_dataset());
        let split = &seg.cholesterol.diseased;
        assert_eq!(split.abnormal.len() + split.normal.len(), seg.outcome.diseased.len());
        assert!(split.normal.records.iter().any(|r| r.cholesterol == 0.0));
    }

    #[test]
    fn cholesterol_density_input_excludes_zero() {
        let records = vec![
            rec(50.0, 120.0, 0.0, Sex::Male, true),
            rec(51.0, 120.0, 250.0, Sex::Male, true),
        ];
        let group = Segment::new("diseased", records);
        let split = split_cholesterol(&group);
        assert_eq!(split.normal.len(), 1);
        assert_eq!(split.density_points(), vec![[51.0, 250.0]]);
    }

    #[test]
    fn sex_shares_sum_to_hundred() {
        let seg = Segmentation::compute(&mixed_dataset());
        for split in [&seg.cholesterol.healthy, &seg.cholesterol.diseased] {
            assert!(!split.abnormal.is_empty());
            let share = split.abnormal_sex;
            assert!((share.male + share.female - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_segment_shares_are_zero() {
        let empty = Segment::new("empty", Vec::new());
        assert_eq!(empty.sex_share(), SexShare { male: 0.0, female: 0.0 });
    }

    #[test]
    fn two_record_scenario() {
        let ds = Dataset::new(
            vec![
                rec(50.0, 120.0, 180.0, Sex::Male, true),
                rec(50.0, 200.0, 180.0, Sex::Female, true),
            ],
            "scenario",
        );
        let seg = Segmentation::compute(&ds);
        assert_eq!(seg.outcome.diseased.len(), 2);
        assert!(seg.outcome.healthy.is_empty());
        assert_eq!(seg.bp.diseased.normal.len(), 1);
        assert_eq!(seg.bp.diseased.normal.records[0].resting_bp, 120.0);
        assert_eq!(seg.bp.diseased.abnormal.len(), 1);
        assert_eq!(seg.bp.diseased.abnormal.records[0].resting_bp, 200.0);
        assert_eq!(seg.bp.diseased.normal.sex_share().male, 100.0);
        assert_eq!(seg.bp.diseased.abnormal.sex_share().female, 100.0);
        assert!(seg.bp.healthy.normal.is_empty());
    }

    #[test]
    fn missing_ecg_category_yields_empty_segment() {
        let seg = Segmentation::compute(&mixed_dataset());
        let by_ecg = |ecg: RestingEcg| seg.ecg.iter().find(|e| e.ecg == ecg).cloned().unwrap();
        let st = by_ecg(RestingEcg::St);
        assert!(st.segment.is_empty());
        assert_eq!(st.sex, SexShare::default());

        let normal = by_ecg(RestingEcg::Normal);
        assert_eq!(normal.segment.len(), seg.outcome.diseased.len());
        assert_eq!(seg.ecg.len(), 3);
    }

    #[test]
    fn angina_groups_cover_pain_types() {
        let mut records = mixed_dataset().records;
        records[0].exercise_angina = ExerciseAngina::Yes;
        records[0].chest_pain = ChestPainType::TypicalAngina;
        let seg = Segmentation::compute(&Dataset::new(records, "angina"));
        let angina = &seg.angina;
        assert_eq!(angina.induced.len() + angina.not_induced.len(), seg.outcome.diseased.len());
        assert_eq!(angina.by_pain.len(), 4);
        let (pain, induced, _) = &angina.by_pain[0];
        assert_eq!(*pain, ChestPainType::TypicalAngina);
        assert_eq!(induced.len(), 1);
    }

    #[test]
    fn recomputation_is_identical() {
        let ds = mixed_dataset();
        assert_eq!(Segmentation::compute(&ds), Segmentation::compute(&ds));
    }
}
