//! Request and result models for route optimization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RouteError;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Ship class. Each class has a nominal speed and rough-water sensitivity
/// in [`crate::cost::VesselTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VesselClass {
    Passenger,
    Cargo,
    Tanker,
}

impl VesselClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passenger => "passenger",
            Self::Cargo => "cargo",
            Self::Tanker => "tanker",
        }
    }
}

impl fmt::Display for VesselClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VesselClass {
    type Err = RouteError;

    /// Accepts `passenger`, `cargo`, `tanker`, optionally followed by `ship`,
    /// in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let base = normalized
            .strip_suffix("ship")
            .map(str::trim_end)
            .unwrap_or(&normalized);
        match base {
            "passenger" => Ok(Self::Passenger),
            "cargo" => Ok(Self::Cargo),
            "tanker" => Ok(Self::Tanker),
            _ => Err(RouteError::invalid_request(format!(
                "unknown vessel class: {s:?}"
            ))),
        }
    }
}

/// Vessel taking the route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselProfile {
    pub class: VesselClass,
    /// Draft in meters, if known.
    #[serde(default)]
    pub draft_m: Option<f64>,
}

impl VesselProfile {
    pub fn new(class: VesselClass) -> Self {
        Self {
            class,
            draft_m: None,
        }
    }

    pub fn with_draft(mut self, draft_m: f64) -> Self {
        self.draft_m = Some(draft_m);
        self
    }
}

/// One route optimization request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: Position,
    pub end: Position,
    pub vessel: VesselProfile,
    /// Selects the time slice of time-varying fields.
    pub departure: DateTime<Utc>,
}

/// Optimized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Accumulated effective cost (kilometers per knot, weighted by conditions).
    pub total_cost: f64,
    /// Route from start to end as `[lon, lat]` pairs.
    pub route: Vec<[f64; 2]>,
    /// Number of legs, one less than the number of route points.
    pub num_steps: usize,
    /// `total_cost / num_steps`, zero for a single-point route.
    pub avg_step_cost: f64,
    /// Nodes settled by the search.
    pub nodes_visited: usize,
}
