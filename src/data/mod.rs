/// Data layer: core types, loading, caching, and segmentation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / upload
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (typed PatientRecords)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  repository   │  load-once cache keyed by source
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  segment  │  outcome / BP / cholesterol / ECG / angina splits
///   └──────────┘         + sex percentages, grouped means (stats)
/// ```

pub mod error;
pub mod loader;
pub mod model;
pub mod repository;
pub mod segment;
pub mod stats;
