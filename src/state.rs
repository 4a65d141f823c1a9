use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::data::model::Dataset;
use crate::data::repository::DatasetRepository;
use crate::data::segment::Segmentation;
use crate::kde::GridCache;
use crate::params::PlotParams;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Load-once dataset cache.
    pub repository: DatasetRepository,

    /// Path tried on start-up and by "Reload default".
    pub default_path: PathBuf,

    /// Active dataset (None until something loads).
    pub dataset: Option<Arc<Dataset>>,

    /// Segments of the active dataset.
    pub segmentation: Option<Segmentation>,

    pub params: PlotParams,

    /// 2-D density grids fitted for the active dataset.
    pub density_grids: GridCache,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// No default file was found; the user must pick one.
    pub awaiting_upload: bool,
}

impl AppState {
    pub fn new(default_path: PathBuf, params: PlotParams) -> Self {
        Self {
            repository: DatasetRepository::new(),
            default_path,
            dataset: None,
            segmentation: None,
            params,
            density_grids: GridCache::default(),
            status_message: None,
            awaiting_upload: false,
        }
    }

    /// Try the default path. A missing file asks for an upload instead.
    pub fn load_default(&mut self) {
        let path = self.default_path.clone();
        match self.repository.load_path(&path) {
            Ok(Some(dataset)) => self.set_dataset(dataset),
            Ok(None) => {
                self.awaiting_upload = true;
                self.status_message = Some(format!(
                    "Default data file not found at {}. Please open a heart.csv file.",
                    path.display()
                ));
            }
            Err(e) => self.report_error(&path.display().to_string(), &e),
        }
    }

    /// Load a user-selected file through the upload path.
    pub fn load_picked(&mut self, path: &Path) {
        let name = path.display().to_string();
        match std::fs::read(path) {
            Ok(bytes) => self.load_upload(&name, &bytes),
            Err(e) => self.report_error(&name, &e),
        }
    }

    /// Load uploaded bytes. On failure the current dataset is kept.
    pub fn load_upload(&mut self, name: &str, bytes: &[u8]) {
        match self.repository.load_upload(name, bytes) {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => self.report_error(name, &e),
        }
    }

    /// Make `dataset` active and derive its segments.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.segmentation = Some(Segmentation::compute(&dataset));
        self.density_grids.clear();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.awaiting_upload = false;
    }

    /// Forget the active dataset and everything cached.
    pub fn unload(&mut self) {
        self.repository.clear();
        self.dataset = None;
        self.segmentation = None;
        self.density_grids.clear();
        self.awaiting_upload = true;
    }

    fn report_error(&mut self, source: &str, err: &dyn std::error::Error) {
        log::error!("Failed to load {source}: {err}");
        self.status_message = Some(format!("Error loading {source}: {err}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Age,Sex,ChestPainType,RestingBP,Cholesterol,RestingECG,MaxHR,ExerciseAngina,HeartDisease
50,M,ASY,120,0,Normal,140,Y,1
50,F,ASY,200,240,LVH,130,N,1
44,F,NAP,130,210,Normal,170,N,0
";

    fn state() -> AppState {
        AppState::new(PathBuf::from("no/such/dir/heart.csv"), PlotParams::default())
    }

    #[test]
    fn missing_default_waits_for_upload() {
        let mut st = state();
        st.load_default();
        assert!(st.awaiting_upload);
        assert!(st.dataset.is_none());
        assert!(st.status_message.is_some());
    }

    #[test]
    fn upload_activates_dataset() {
        let mut st = state();
        st.load_default();
        st.load_upload("heart.csv", CSV.as_bytes());
        assert!(!st.awaiting_upload);
        assert!(st.status_message.is_none());
        let seg = st.segmentation.as_ref().unwrap();
        assert_eq!(seg.outcome.diseased.len(), 2);
        assert_eq!(seg.outcome.healthy.len(), 1);
    }

    #[test]
    fn failed_upload_keeps_current_dataset() {
        let mut st = state();
        st.load_upload("heart.csv", CSV.as_bytes());
        let before = st.dataset.clone().unwrap();

        st.load_upload("broken.csv", b"Age,Sex\n1,M\n");
        assert!(st.status_message.as_deref().unwrap().contains("broken.csv"));
        assert!(Arc::ptr_eq(&before, st.dataset.as_ref().unwrap()));
        assert_eq!(st.repository.len(), 1);
    }

    #[test]
    fn new_dataset_refits_density_grids() {
        let mut st = state();
        st.load_upload("heart.csv", CSV.as_bytes());
        let mut fits = 0;
        let mut fit = |grids: &mut GridCache| {
            grids.get_or_fit("bp/Diseased", || {
                fits += 1;
                None
            });
        };
        fit(&mut st.density_grids);
        fit(&mut st.density_grids);

        st.load_upload("other.csv", CSV.replace("240", "250").as_bytes());
        fit(&mut st.density_grids);
        assert_eq!(fits, 2);
    }

    #[test]
    fn unload_clears_cache() {
        let mut st = state();
        st.load_upload("heart.csv", CSV.as_bytes());
        st.unload();
        assert!(st.dataset.is_none());
        assert!(st.segmentation.is_none());
        assert!(st.repository.is_empty());
    }
}
