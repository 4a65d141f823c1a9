use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::LoadError;
use super::loader;
use super::model::Dataset;

/// Identity of a load source. Two loads with equal keys share one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKey {
    Path(PathBuf),
    /// An uploaded file, identified by name and content digest so that
    /// re-uploading a different file under the same name reloads it.
    Upload { name: String, digest: u64 },
}

impl SourceKey {
    pub fn upload(name: &str, bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        SourceKey::Upload {
            name: name.to_string(),
            digest: hasher.finish(),
        }
    }
}

/// Load-once store of parsed datasets, keyed by source.
///
/// Owned by the application state and passed explicitly to whoever loads
/// data. Entries live until [`DatasetRepository::clear`] or drop; failed
/// loads are never cached.
#[derive(Debug, Default)]
pub struct DatasetRepository {
    cache: BTreeMap<SourceKey, Arc<Dataset>>,
}

impl DatasetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the dataset at `path`, parsing it only on first use.
    ///
    /// Returns `Ok(None)` when nothing exists at `path`: the caller is
    /// expected to fall back to an upload.
    pub fn load_path(&mut self, path: &Path) -> Result<Option<Arc<Dataset>>, LoadError> {
        let key = SourceKey::Path(path.to_path_buf());
        if let Some(ds) = self.cache.get(&key) {
            log::debug!("dataset cache hit for {}", path.display());
            return Ok(Some(Arc::clone(ds)));
        }
        if !path.exists() {
            log::warn!("default data file not found at {}", path.display());
            return Ok(None);
        }

        let dataset = Arc::new(loader::load_file(path)?);
        log::info!("loaded {} records from {}", dataset.len(), path.display());
        self.cache.insert(key, Arc::clone(&dataset));
        Ok(Some(dataset))
    }

    /// Load an uploaded file held in memory.
    pub fn load_upload(&mut self, name: &str, bytes: &[u8]) -> Result<Arc<Dataset>, LoadError> {
        let key = SourceKey::upload(name, bytes);
        if let Some(ds) = self.cache.get(&key) {
            log::debug!("dataset cache hit for upload {name}");
            return Ok(Arc::clone(ds));
        }

        let dataset = Arc::new(loader::load_bytes(name, bytes)?);
        log::info!("loaded {} records from upload {name}", dataset.len());
        self.cache.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every cached dataset.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        log::info!("dropping {} cached datasets", self.len());
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::segment::Segmentation;

    const CSV: &str = "\
Age,Sex,ChestPainType,RestingBP,Cholesterol,RestingECG,MaxHR,ExerciseAngina,HeartDisease
50,M,ASY,120,0,Normal,140,Y,1
50,F,ASY,200,240,ST,130,N,1
";

    fn temp_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_path_is_no_data() {
        let mut repo = DatasetRepository::new();
        let result = repo.load_path(Path::new("definitely/not/here/heart.csv")).unwrap();
        assert!(result.is_none());
        assert!(repo.is_empty());
    }

    #[test]
    fn same_path_is_parsed_once() {
        let file = temp_csv(CSV);
        let mut repo = DatasetRepository::new();
        let first = repo.load_path(file.path()).unwrap().unwrap();
        let second = repo.load_path(file.path()).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn separate_repositories_load_equal_datasets() {
        let file = temp_csv(CSV);
        let a = DatasetRepository::new().load_path(file.path()).unwrap().unwrap();
        let b = DatasetRepository::new().load_path(file.path()).unwrap().unwrap();
        assert_eq!(a.records, b.records);
        assert_eq!(Segmentation::compute(&a), Segmentation::compute(&b));
    }

    #[test]
    fn malformed_file_is_not_cached() {
        let file = temp_csv("Age,Sex\n1,M\n");
        let mut repo = DatasetRepository::new();
        assert!(repo.load_path(file.path()).is_err());
        assert!(repo.is_empty());
    }

    #[test]
    fn uploads_keyed_by_content() {
        let mut repo = DatasetRepository::new();
        let a = repo.load_upload("heart.csv", CSV.as_bytes()).unwrap();
        let b = repo.load_upload("heart.csv", CSV.as_bytes()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = CSV.replace("240", "250");
        let c = repo.load_upload("heart.csv", other.as_bytes()).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(repo.len(), 2);
        assert_eq!(c.records[1].cholesterol, 250.0);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut repo = DatasetRepository::new();
        repo.load_upload("heart.csv", CSV.as_bytes()).unwrap();
        repo.clear();
        assert!(repo.is_empty());
    }
}
