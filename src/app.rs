use eframe::egui;

use crate::params::PlotParams;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CardioDashApp {
    pub state: AppState,
}

impl CardioDashApp {
    /// Restore persisted plot parameters, then try the default data file.
    pub fn new(cc: &eframe::CreationContext<'_>, args: &crate::Cli) -> Self {
        let mut params: PlotParams = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        if let Some(view) = args.view {
            params.view = view;
        }

        let mut state = AppState::new(args.data.clone(), params.clamped());
        state.load_default();
        Self { state }
    }

    /// Files dropped onto the window go through the upload path.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(bytes) = &file.bytes {
                self.state.load_upload(&file.name, bytes);
            } else if let Some(path) = &file.path {
                self.state.load_picked(path);
            }
        }
    }
}

impl eframe::App for CardioDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: visualization options ----
        egui::SidePanel::left("options_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: selected visualization ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_view(ui, &mut self.state);
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state.params);
    }
}
