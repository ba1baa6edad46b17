//! Weather-aware vessel route optimization over gridded ocean data.
//!
//! Source fields are resampled onto a routing grid, land is masked out, and a
//! Dijkstra search over the 4-connected water cells finds the cheapest route
//! for a vessel under the prevailing waves, wind, currents and salinity.

pub mod cost;
pub mod engine;
pub mod error;
pub mod fields;
pub mod graph;
pub mod grid;
pub mod mask;
pub mod models;
pub mod resample;
pub mod search;
pub mod spatial;

pub use cost::{CostModel, CostModelConfig, VesselClassConfig, VesselTable};
pub use engine::{EngineConfig, RouteEngine};
pub use error::{Result, RouteError};
pub use fields::{DatasetBundle, EnvSample, EnvironmentalFields, SourceDataset, TimeSlice};
pub use graph::{Edge, GridGraph};
pub use grid::{Field2D, Grid};
pub use mask::{MaskConfig, NavMask};
pub use models::{Position, RouteRequest, RouteResult, VesselClass, VesselProfile};
pub use resample::{resample_nearest, SourceGrid};
pub use search::{shortest_path, SearchOutcome};
pub use spatial::haversine_km;
