/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌──────────┐          ┌──────────┐
///   │ catalog  │          │  filter   │  FilterSelection → FilteredView
///   └──────────┘          └──────────┘
///   options per dimension       │
///                               ▼
///                         ┌───────────┐
///                         │ aggregate │  counts, frequency tables, geo points
///                         └───────────┘
/// ```

pub mod aggregate;
pub mod catalog;
pub mod filter;
pub mod loader;
pub mod model;
