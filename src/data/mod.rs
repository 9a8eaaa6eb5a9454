/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate rows → LaunchDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ LaunchDataset │  Vec<LaunchRecord>, site / booster index
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Selection → pie slices / scatter rows
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
