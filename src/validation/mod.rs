//! Schema and value validation used by [`crate::reader::ChunkedReader`].
//!
//! - [`classify`]: per-cell type predicates and the warning-producing [`check_cell`]
//! - [`reconcile`]: one-time matching of declared columns against the header row
//! - [`window`]: half-open row windows handed to sources

pub mod classify;
pub mod reconcile;
pub mod window;

pub use classify::{check_cell, is_date, is_float, is_int, is_null, is_string, is_time, matches_type};
pub use reconcile::{Reconciliation, ResolvedColumn};
pub use window::RowWindow;
