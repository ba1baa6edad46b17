//! Navigable-water classification.

use serde::{Deserialize, Serialize};

use crate::grid::{Field2D, Grid};

/// Configuration for land/void detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Reference-field values below this are land or fill values
    /// (degrees C when the reference is sea-surface temperature).
    pub min_valid_value: f64,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            min_valid_value: -50.0,
        }
    }
}

/// Boolean grid where `true` marks a non-navigable cell.
#[derive(Debug, Clone, PartialEq)]
pub struct NavMask {
    num_lat: usize,
    num_lon: usize,
    blocked: Vec<bool>,
}

impl NavMask {
    /// Classify every cell of a reference field: missing (`NaN`) or
    /// implausibly low values are blocked.
    pub fn from_reference(field: &Field2D, config: &MaskConfig) -> Self {
        let (num_lat, num_lon) = field.shape();
        let blocked = field
            .values()
            .iter()
            .map(|&value| value.is_nan() || value < config.min_valid_value)
            .collect();
        Self {
            num_lat,
            num_lon,
            blocked,
        }
    }

    /// Mask with every cell navigable.
    pub fn open(grid: &Grid) -> Self {
        Self {
            num_lat: grid.num_lat(),
            num_lon: grid.num_lon(),
            blocked: vec![false; grid.num_nodes()],
        }
    }

    /// Whether lon index `i`, lat index `j` is non-navigable.
    pub fn is_blocked(&self, i: usize, j: usize) -> bool {
        self.blocked[j * self.num_lon + i]
    }

    pub fn set_blocked(&mut self, i: usize, j: usize, blocked: bool) {
        self.blocked[j * self.num_lon + i] = blocked;
    }

    /// `(num_lat, num_lon)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_lat, self.num_lon)
    }

    pub fn matches(&self, grid: &Grid) -> bool {
        self.num_lat == grid.num_lat() && self.num_lon == grid.num_lon()
    }

    pub fn navigable_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| !**blocked).count()
    }
}
