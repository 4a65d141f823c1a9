mod app;
mod color;
mod data;
mod interp;
mod kde;
mod params;
mod state;
mod ui;

use std::path::PathBuf;

use app::CardioDashApp;
use clap::Parser;
use eframe::egui;
use params::ViewMode;

/// Heart-failure risk factor dashboard.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Patient table loaded on start-up (.csv, .json or .parquet).
    #[arg(long, default_value = "input/heart.csv")]
    pub data: PathBuf,

    /// Visualization shown first (overrides the saved choice).
    #[arg(long, value_enum)]
    pub view: Option<ViewMode>,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Cli::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Heart Failure Analysis Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(CardioDashApp::new(cc, &args)))),
    )
}
