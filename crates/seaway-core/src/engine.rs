//! Route engine: resampling, masking, graph construction and search for one request.

use serde::{Deserialize, Serialize};

use crate::cost::{CostModel, CostModelConfig, VesselTable};
use crate::error::{Result, RouteError};
use crate::fields::{DatasetBundle, EnvironmentalFields};
use crate::graph::GridGraph;
use crate::grid::Grid;
use crate::mask::{MaskConfig, NavMask};
use crate::models::{RouteRequest, RouteResult};
use crate::search::shortest_path;
use crate::spatial::initial_bearing;

/// Engine configuration. Every section falls back to its defaults when
/// omitted from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mask: MaskConfig,
    pub cost: CostModelConfig,
    pub vessels: VesselTable,
}

/// Stateless route optimizer. Each call builds its own mask and graph.
#[derive(Debug, Clone, Default)]
pub struct RouteEngine {
    config: EngineConfig,
}

impl RouteEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resample `bundle` at the request's departure time and find the cheapest route.
    pub fn optimize_route(
        &self,
        bundle: &DatasetBundle,
        request: &RouteRequest,
    ) -> Result<RouteResult> {
        // Reject bad vessel parameters before doing any resampling work.
        CostModel::new(&self.config.cost, &self.config.vessels, &request.vessel)?;
        let fields = EnvironmentalFields::resample(bundle, request.departure)?;
        self.route_on_fields(&bundle.grid, &fields, request)
    }

    /// Find the cheapest route over fields that are already on `grid`.
    pub fn route_on_fields(
        &self,
        grid: &Grid,
        fields: &EnvironmentalFields,
        request: &RouteRequest,
    ) -> Result<RouteResult> {
        fields.validate(grid)?;
        let model = CostModel::new(&self.config.cost, &self.config.vessels, &request.vessel)?;

        let mask = NavMask::from_reference(&fields.sea_surface_temperature, &self.config.mask);
        let graph = GridGraph::build(grid, &mask)?;
        tracing::debug!(
            nodes = grid.num_nodes(),
            navigable = mask.navigable_count(),
            edges = graph.edge_count(),
            "built routing graph"
        );

        let start = self.snap(grid, &mask, request.start.lon, request.start.lat, "start")?;
        let end = self.snap(grid, &mask, request.end.lon, request.end.lat, "end")?;

        let outcome = shortest_path(&graph, start, end, |from, edge| {
            let (from_lon, from_lat) = grid.coord(from);
            let (to_lon, to_lat) = grid.coord(edge.to);
            let (i, j) = grid.node_index(edge.to);
            let sample = fields.sample(i, j);
            let bearing = initial_bearing(from_lon, from_lat, to_lon, to_lat);
            model.edge_cost(edge.base_km, bearing, &sample)
        })?;

        let route: Vec<[f64; 2]> = outcome
            .path
            .iter()
            .map(|&node| {
                let (lon, lat) = grid.coord(node);
                [lon, lat]
            })
            .collect();
        let num_steps = route.len().saturating_sub(1);
        let avg_step_cost = if num_steps == 0 {
            0.0
        } else {
            outcome.total_cost / num_steps as f64
        };

        tracing::info!(
            vessel = %request.vessel.class,
            total_cost = outcome.total_cost,
            steps = num_steps,
            nodes_visited = outcome.nodes_visited,
            "route optimized"
        );

        Ok(RouteResult {
            total_cost: outcome.total_cost,
            route,
            num_steps,
            avg_step_cost,
            nodes_visited: outcome.nodes_visited,
        })
    }

    fn snap(&self, grid: &Grid, mask: &NavMask, lon: f64, lat: f64, label: &str) -> Result<usize> {
        let node = grid.nearest_node(lon, lat)?;
        let (i, j) = grid.node_index(node);
        if mask.is_blocked(i, j) {
            return Err(RouteError::invalid_request(format!(
                "{label} point ({lon}, {lat}) snaps to non-navigable cell ({}, {})",
                grid.lons()[i],
                grid.lats()[j]
            )));
        }
        Ok(node)
    }
}
