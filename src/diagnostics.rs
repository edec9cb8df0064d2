// SPDX-License-Identifier: AGPL-3.0-only

//! Field summaries, slices, and JSON result export.
//!
//! The core solver performs no I/O; these helpers are what the scenario
//! and benchmark binaries use to report results and to hand 2D slices to
//! external plotting tools.

use std::path::Path;

use serde::Serialize;

use crate::field::{MetricField, ScalarField};

/// Summary statistics of a scalar field.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSummary {
    /// Arithmetic mean over all cells.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl FieldSummary {
    /// Summarize a scalar field.
    #[must_use]
    pub fn of(field: &ScalarField) -> Self {
        Self {
            mean: field.mean(),
            std: field.std_dev(),
            min: field.min(),
            max: field.max(),
        }
    }

    /// Summarize the g₀₀ component of a metric field.
    #[must_use]
    pub fn of_g00(metric: &MetricField) -> Self {
        Self::of(&metric.g00_field())
    }
}

impl std::fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "mean {:.6e}  std {:.6e}  min {:.6e}  max {:.6e}",
            self.mean, self.std, self.min, self.max
        )
    }
}

/// Extract the 2D slice at `z = k` as an n×n row-major buffer, for
/// external plotting.
///
/// # Panics
///
/// Panics if `k >= field.n()` (caller indexing error, not input data).
#[must_use]
pub fn slice_z(field: &ScalarField, k: usize) -> Vec<f64> {
    let n = field.n();
    assert!(k < n, "slice index {k} out of range for grid size {n}");
    let mut out = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            out.push(field.at(i, j, k));
        }
    }
    out
}

/// Save a serializable record as pretty JSON under `{base}/results/`.
///
/// Creates the results directory if needed; I/O failures are reported to
/// stdout rather than propagated, since result export is best-effort
/// reporting around a completed computation.
pub fn save_json_to_results<T: Serialize>(base: &Path, filename: &str, record: &T) {
    let results_dir = base.join("results");
    let _ = std::fs::create_dir_all(&results_dir);
    let path = results_dir.join(filename);
    match serde_json::to_string_pretty(record) {
        Ok(s) => {
            if std::fs::write(&path, s).is_ok() {
                println!("  Results saved to: {}", path.display());
            } else {
                println!("  Could not write results to: {}", path.display());
            }
        }
        Err(e) => println!("  Could not serialize results: {e}"),
    }
}
