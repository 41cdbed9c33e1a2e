/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ResponseTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ ResponseTable │  Vec<Respondent>, column index
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply filter chain → visible row indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  TableView → Distribution / CrossTab
///   └───────────┘
/// ```

pub mod aggregate;
pub mod loader;
pub mod model;
pub mod filter;
