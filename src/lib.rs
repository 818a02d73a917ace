//! Interactive explorer for the Cosmicflows-4 (CF4) galaxy distance catalog.
//!
//! ```text
//!  allCf4.xml ──▶ data::loader ──▶ Catalog ──▶ menu ──▶ charts ──▶ ui (window)
//! ```

pub mod charts;
pub mod color;
pub mod config;
pub mod data;
pub mod menu;
pub mod ui;
