/// Data layer: core types, loading, schema contracts and statistics.
///
/// Architecture:
/// ```text
///  meteor_data.csv / artifacts/*.parquet
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  presence check + mtime → reload
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ schema / stats    │  required columns, typed rows, describe()
///   └──────────────────┘
/// ```

pub mod cache;
pub mod loader;
pub mod model;
pub mod schema;
pub mod stats;
