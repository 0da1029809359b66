//! Engine tuning knobs.

use serde::{Deserialize, Serialize};

/// Options supplied when constructing an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Tables with more rows than this are truncated by `display`.
    pub preview_threshold: usize,
    /// Rows shown when a table is truncated.
    pub preview_rows: usize,
    /// Relative tolerance for float equality in `filter`.
    pub float_tolerance: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            preview_threshold: 10,
            preview_rows: 5,
            float_tolerance: 1e-9,
        }
    }
}
