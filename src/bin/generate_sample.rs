//! Writes a synthetic `heart.csv` with the same columns and roughly the same
//! marginal distributions as the public heart-failure prediction table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const HEADER: [&str; 12] = [
    "Age",
    "Sex",
    "ChestPainType",
    "RestingBP",
    "Cholesterol",
    "FastingBS",
    "RestingECG",
    "MaxHR",
    "ExerciseAngina",
    "Oldpeak",
    "ST_Slope",
    "HeartDisease",
];

#[derive(Debug, Parser)]
#[command(about = "Generate a synthetic heart.csv")]
struct Args {
    /// Destination file.
    #[arg(long, default_value = "input/heart.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 918)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Pick one of `choices` with the given relative weights.
fn weighted<'a>(rng: &mut StdRng, choices: &[(&'a str, f64)]) -> &'a str {
    let total: f64 = choices.iter().map(|c| c.1).sum();
    let mut roll = rng.random_range(0.0..total);
    for &(label, weight) in choices {
        if roll < weight {
            return label;
        }
        roll -= weight;
    }
    choices[choices.len() - 1].0
}

fn sample(rng: &mut StdRng, dist: &Normal<f64>, lo: f64, hi: f64) -> f64 {
    dist.sample(rng).clamp(lo, hi).round()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let age_healthy = Normal::new(50.5, 9.4)?;
    let age_diseased = Normal::new(55.9, 8.7)?;
    let bp = Normal::new(132.0, 18.0)?;
    let chol = Normal::new(240.0, 55.0)?;
    let hr_healthy = Normal::new(148.0, 23.0)?;
    let hr_diseased = Normal::new(127.0, 23.0)?;
    let oldpeak = Normal::<f64>::new(0.9, 1.0)?;

    let mut rng = StdRng::seed_from_u64(args.seed);

    if let Some(dir) = args.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("opening {}", args.output.display()))?;
    writer.write_record(HEADER)?;

    for _ in 0..args.rows {
        let diseased = rng.random_bool(0.553);
        let age = if diseased {
            sample(&mut rng, &age_diseased, 28.0, 77.0)
        } else {
            sample(&mut rng, &age_healthy, 28.0, 77.0)
        };
        let sex = if rng.random_bool(if diseased { 0.9 } else { 0.65 }) { "M" } else { "F" };
        let chest_pain = if diseased {
            weighted(&mut rng, &[("ASY", 0.77), ("NAP", 0.14), ("ATA", 0.05), ("TA", 0.04)])
        } else {
            weighted(&mut rng, &[("ASY", 0.26), ("NAP", 0.32), ("ATA", 0.37), ("TA", 0.05)])
        };
        let resting_bp = sample(&mut rng, &bp, 80.0, 200.0);
        // zero is how the source table codes a missing reading
        let cholesterol = if rng.random_bool(if diseased { 0.3 } else { 0.05 }) {
            0.0
        } else {
            sample(&mut rng, &chol, 85.0, 603.0)
        };
        let fasting_bs = rng.random_bool(if diseased { 0.33 } else { 0.1 });
        let ecg = weighted(&mut rng, &[("Normal", 0.6), ("ST", 0.2), ("LVH", 0.2)]);
        let max_hr = if diseased {
            sample(&mut rng, &hr_diseased, 60.0, 202.0)
        } else {
            sample(&mut rng, &hr_healthy, 60.0, 202.0)
        };
        let angina = rng.random_bool(if diseased { 0.62 } else { 0.13 });
        let peak = (oldpeak.sample(&mut rng) + if diseased { 0.6 } else { -0.2 }).clamp(0.0, 6.2);
        let slope = if diseased {
            weighted(&mut rng, &[("Flat", 0.75), ("Up", 0.17), ("Down", 0.08)])
        } else {
            weighted(&mut rng, &[("Up", 0.79), ("Flat", 0.19), ("Down", 0.02)])
        };

        writer.write_record([
            age.to_string(),
            sex.to_string(),
            chest_pain.to_string(),
            resting_bp.to_string(),
            cholesterol.to_string(),
            u8::from(fasting_bs).to_string(),
            ecg.to_string(),
            max_hr.to_string(),
            if angina { "Y" } else { "N" }.to_string(),
            format!("{peak:.1}"),
            slope.to_string(),
            u8::from(diseased).to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {} rows to {}", args.rows, args.output.display());
    Ok(())
}
