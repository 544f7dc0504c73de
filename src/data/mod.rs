/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  Claims.csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, coerce date columns → ClaimsDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ ClaimsDataset │  Vec<ClaimRecord>, option universe, date bounds
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply FilterCriteria → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐     ┌──────────┐
///   │ aggregate  │     │  export   │
///   └───────────┘     └──────────┘
///    count tables       filtered CSV
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
