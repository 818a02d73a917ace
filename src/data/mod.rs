//! Data layer: catalog parsing and the typed galaxy table.
//!
//! Architecture:
//! ```text
//!  allCf4.xml / .vot / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Vec<RawRow>   (votable: TR/TD cells)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Catalog   │  31 named columns, 8 coerced to Option<f64>
//!   └──────────┘
//! ```

pub mod error;
pub mod loader;
pub mod model;
pub mod votable;
