use std::fmt;

use super::error::LoadError;

// ---------------------------------------------------------------------------
// Column names of the source table
// ---------------------------------------------------------------------------

pub mod columns {
    pub const AGE: &str = "Age";
    pub const SEX: &str = "Sex";
    pub const CHEST_PAIN_TYPE: &str = "ChestPainType";
    pub const RESTING_BP: &str = "RestingBP";
    pub const CHOLESTEROL: &str = "Cholesterol";
    pub const FASTING_BS: &str = "FastingBS";
    pub const RESTING_ECG: &str = "RestingECG";
    pub const MAX_HR: &str = "MaxHR";
    pub const EXERCISE_ANGINA: &str = "ExerciseAngina";
    pub const OLDPEAK: &str = "Oldpeak";
    pub const ST_SLOPE: &str = "ST_Slope";
    pub const HEART_DISEASE: &str = "HeartDisease";

    /// Columns every source must carry in its header.
    pub const REQUIRED: [&str; 9] = [
        AGE,
        SEX,
        CHEST_PAIN_TYPE,
        RESTING_BP,
        CHOLESTEROL,
        RESTING_ECG,
        MAX_HR,
        EXERCISE_ANGINA,
        HEART_DISEASE,
    ];

    /// Header order used when writing tables (sample generator, raw view).
    pub const ALL: [&str; 12] = [
        AGE,
        SEX,
        CHEST_PAIN_TYPE,
        RESTING_BP,
        CHOLESTEROL,
        FASTING_BS,
        RESTING_ECG,
        MAX_HR,
        EXERCISE_ANGINA,
        OLDPEAK,
        ST_SLOPE,
        HEART_DISEASE,
    ];
}

// ---------------------------------------------------------------------------
// Cell – one raw value before typing
// ---------------------------------------------------------------------------

/// A raw table cell as produced by any of the loaders.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
}

/// Text values read as missing, matching the pandas default NA set.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A",
    "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

impl Cell {
    /// Interpret the cell as a number. Missing values become `0.0`.
    fn to_number(&self, row: usize, column: &'static str) -> Result<f64, LoadError> {
        match self {
            Cell::Missing => Ok(0.0),
            Cell::Number(v) if v.is_nan() => Ok(0.0),
            Cell::Number(v) => Ok(*v),
            Cell::Text(s) => {
                let s = s.trim();
                if is_na_token(s) {
                    return Ok(0.0);
                }
                s.parse::<f64>().map_err(|_| LoadError::InvalidValue {
                    row,
                    column,
                    value: s.to_string(),
                })
            }
        }
    }

    /// Interpret the cell as a 0/1 flag. Missing values become `false`.
    fn to_flag(&self, row: usize, column: &'static str) -> Result<bool, LoadError> {
        let v = self.to_number(row, column)?;
        if v == 0.0 {
            Ok(false)
        } else if v == 1.0 {
            Ok(true)
        } else {
            Err(LoadError::InvalidValue {
                row,
                column,
                value: v.to_string(),
            })
        }
    }

    fn to_category<C: Categorical>(&self, row: usize, column: &'static str) -> Result<C, LoadError> {
        let invalid = |value: String| LoadError::InvalidValue { row, column, value };
        match self {
            Cell::Missing => Ok(C::MISSING),
            // The scalar-0 fill applies to categorical columns too.
            Cell::Number(v) if *v == 0.0 || v.is_nan() => Ok(C::MISSING),
            Cell::Number(v) => Err(invalid(v.to_string())),
            Cell::Text(s) => {
                let s = s.trim();
                if is_na_token(s) || s == "0" {
                    return Ok(C::MISSING);
                }
                C::from_code(s).ok_or_else(|| invalid(s.to_string()))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Categorical attributes
// ---------------------------------------------------------------------------

/// An enumerated column with a fixed set of codes plus an explicit
/// `Missing` variant for empty cells.
pub trait Categorical: Copy + Sized + 'static {
    const MISSING: Self;
    /// All recognised (non-missing) variants, in display order.
    const VARIANTS: &'static [Self];

    fn from_code(code: &str) -> Option<Self>;
    fn code(self) -> &'static str;
}

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $code:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)+
            Missing,
        }

        impl Categorical for $name {
            const MISSING: Self = $name::Missing;
            const VARIANTS: &'static [Self] = &[$($name::$variant),+];

            fn from_code(code: &str) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code,)+
                    $name::Missing => "0",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }
    };
}

categorical! {
    pub enum Sex {
        Male => "M",
        Female => "F",
    }
}

categorical! {
    pub enum ChestPainType {
        TypicalAngina => "TA",
        AtypicalAngina => "ATA",
        NonAnginalPain => "NAP",
        Asymptomatic => "ASY",
    }
}

categorical! {
    pub enum RestingEcg {
        Normal => "Normal",
        St => "ST",
        Lvh => "LVH",
    }
}

categorical! {
    pub enum ExerciseAngina {
        Yes => "Y",
        No => "N",
    }
}

categorical! {
    pub enum StSlope {
        Up => "Up",
        Flat => "Flat",
        Down => "Down",
    }
}

impl ChestPainType {
    pub fn description(self) -> &'static str {
        match self {
            ChestPainType::TypicalAngina => "Typical Angina",
            ChestPainType::AtypicalAngina => "Atypical Angina",
            ChestPainType::NonAnginalPain => "Non-Anginal Pain",
            ChestPainType::Asymptomatic => "Asymptomatic",
            ChestPainType::Missing => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// PatientRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single patient (one row of the source table). Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatientRecord {
    pub age: f64,
    pub sex: Sex,
    pub chest_pain: ChestPainType,
    pub resting_bp: f64,
    pub cholesterol: f64,
    pub fasting_bs: bool,
    pub resting_ecg: RestingEcg,
    pub max_hr: f64,
    pub exercise_angina: ExerciseAngina,
    pub oldpeak: f64,
    pub st_slope: StSlope,
    pub heart_disease: bool,
}

impl PatientRecord {
    /// Build a record from raw cells. `cell` is asked for each column by
    /// name and returns [`Cell::Missing`] for absent columns.
    pub fn from_cells<F>(row: usize, mut cell: F) -> Result<Self, LoadError>
    where
        F: FnMut(&'static str) -> Cell,
    {
        use columns::*;
        Ok(PatientRecord {
            age: cell(AGE).to_number(row, AGE)?,
            sex: cell(SEX).to_category(row, SEX)?,
            chest_pain: cell(CHEST_PAIN_TYPE).to_category(row, CHEST_PAIN_TYPE)?,
            resting_bp: cell(RESTING_BP).to_number(row, RESTING_BP)?,
            cholesterol: cell(CHOLESTEROL).to_number(row, CHOLESTEROL)?,
            fasting_bs: cell(FASTING_BS).to_flag(row, FASTING_BS)?,
            resting_ecg: cell(RESTING_ECG).to_category(row, RESTING_ECG)?,
            max_hr: cell(MAX_HR).to_number(row, MAX_HR)?,
            exercise_angina: cell(EXERCISE_ANGINA).to_category(row, EXERCISE_ANGINA)?,
            oldpeak: cell(OLDPEAK).to_number(row, OLDPEAK)?,
            st_slope: cell(ST_SLOPE).to_category(row, ST_SLOPE)?,
            heart_disease: cell(HEART_DISEASE).to_flag(row, HEART_DISEASE)?,
        })
    }

    /// Value of a numeric attribute.
    pub fn numeric(&self, attr: NumericAttr) -> f64 {
        match attr {
            NumericAttr::Age => self.age,
            NumericAttr::RestingBp => self.resting_bp,
            NumericAttr::Cholesterol => self.cholesterol,
            NumericAttr::MaxHr => self.max_hr,
        }
    }

    /// Cells in [`columns::ALL`] order, formatted for display or CSV output.
    pub fn to_row(&self) -> [String; 12] {
        [
            fmt_number(self.age),
            self.sex.to_string(),
            self.chest_pain.to_string(),
            fmt_number(self.resting_bp),
            fmt_number(self.cholesterol),
            u8::from(self.fasting_bs).to_string(),
            self.resting_ecg.to_string(),
            fmt_number(self.max_hr),
            self.exercise_angina.to_string(),
            fmt_number(self.oldpeak),
            self.st_slope.to_string(),
            u8::from(self.heart_disease).to_string(),
        ]
    }
}

fn fmt_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// Numeric columns usable as grouping keys or dependent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericAttr {
    Age,
    RestingBp,
    Cholesterol,
    MaxHr,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table, in source row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub records: Vec<PatientRecord>,
    /// Human-readable origin (path or uploaded file name).
    pub source: String,
}

impl Dataset {
    pub fn new(records: Vec<PatientRecord>, source: impl Into<String>) -> Self {
        Dataset {
            records,
            source: source.into(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// First `n` records, for the raw data preview.
    pub fn head(&self, n: usize) -> &[PatientRecord] {
        &self.records[..n.min(self.records.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn full_row(column: &str) -> Cell {
        match column {
            "Age" => text("54"),
            "Sex" => text("M"),
            "ChestPainType" => text("ASY"),
            "RestingBP" => text("140"),
            "Cholesterol" => text("239"),
            "FastingBS" => text("0"),
            "RestingECG" => text("Normal"),
            "MaxHR" => text("160"),
            "ExerciseAngina" => text("N"),
            "Oldpeak" => text("1.2"),
            "ST_Slope" => text("Up"),
            "HeartDisease" => text("1"),
            _ => Cell::Missing,
        }
    }

    #[test]
    fn parses_complete_row() {
        let rec = PatientRecord::from_cells(0, full_row).unwrap();
        assert_eq!(rec.age, 54.0);
        assert_eq!(rec.sex, Sex::Male);
        assert_eq!(rec.chest_pain, ChestPainType::Asymptomatic);
        assert_eq!(rec.resting_ecg, RestingEcg::Normal);
        assert_eq!(rec.exercise_angina, ExerciseAngina::No);
        assert_eq!(rec.st_slope, StSlope::Up);
        assert!((rec.oldpeak - 1.2).abs() < 1e-12);
        assert!(rec.heart_disease);
        assert!(!rec.fasting_bs);
    }

    #[test]
    fn missing_cells_coerce_to_zero() {
        let rec = PatientRecord::from_cells(3, |col| match col {
            "Cholesterol" | "Sex" | "ST_Slope" => Cell::Missing,
            "RestingBP" => text(""),
            other => full_row(other),
        })
        .unwrap();
        assert_eq!(rec.cholesterol, 0.0);
        assert_eq!(rec.resting_bp, 0.0);
        assert_eq!(rec.sex, Sex::Missing);
        assert_eq!(rec.st_slope, StSlope::Missing);
    }

    #[test]
    fn zero_filled_category_is_missing() {
        let rec = PatientRecord::from_cells(0, |col| match col {
            "RestingECG" => Cell::Number(0.0),
            "Sex" => text("0"),
            other => full_row(other),
        })
        .unwrap();
        assert_eq!(rec.resting_ecg, RestingEcg::Missing);
        assert_eq!(rec.sex, Sex::Missing);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = PatientRecord::from_cells(7, |col| match col {
            "ChestPainType" => text("XYZ"),
            other => full_row(other),
        })
        .unwrap_err();
        match err {
            LoadError::InvalidValue { row, column, value } => {
                assert_eq!(row, 7);
                assert_eq!(column, "ChestPainType");
                assert_eq!(value, "XYZ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn outcome_must_be_binary() {
        let err = PatientRecord::from_cells(0, |col| match col {
            "HeartDisease" => text("2"),
            other => full_row(other),
        });
        assert!(matches!(err, Err(LoadError::InvalidValue { column: "HeartDisease", .. })));

        let ok = PatientRecord::from_cells(0, |col| match col {
            "HeartDisease" => Cell::Number(1.0),
            other => full_row(other),
        })
        .unwrap();
        assert!(ok.heart_disease);
    }

    #[test]
    fn row_formatting_round_trips_codes() {
        let rec = PatientRecord::from_cells(0, full_row).unwrap();
        let row = rec.to_row();
        assert_eq!(row[0], "54");
        assert_eq!(row[1], "M");
        assert_eq!(row[9], "1.2");
        assert_eq!(row[11], "1");
    }

    #[test]
    fn head_is_bounded() {
        let rec = PatientRecord::from_cells(0, full_row).unwrap();
        let ds = Dataset::new(vec![rec; 3], "mem");
        assert_eq!(ds.head(5).len(), 3);
        assert_eq!(ds.head(2).len(), 2);
    }
}
