//! 4-connected graph over navigable grid cells.

use crate::error::{Result, RouteError};
use crate::grid::Grid;
use crate::mask::NavMask;
use crate::spatial::haversine_km;

/// Directed edge to a neighboring navigable node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    /// Great-circle distance between the two node centers in kilometers.
    pub base_km: f64,
}

/// Adjacency-list graph indexed by node id.
///
/// Blocked cells keep an empty neighbor list and are never referenced as a
/// neighbor, so they take no part in a search.
#[derive(Debug, Clone)]
pub struct GridGraph {
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
}

impl GridGraph {
    /// Build edges between every pair of axis-aligned navigable neighbors.
    ///
    /// Neighbors are found by index arithmetic in the order left, right, down,
    /// up (`i-1`, `i+1`, `j-1`, `j+1`).
    pub fn build(grid: &Grid, mask: &NavMask) -> Result<Self> {
        if !mask.matches(grid) {
            return Err(RouteError::data(format!(
                "mask shaped {:?} does not match grid {}x{}",
                mask.shape(),
                grid.num_lat(),
                grid.num_lon()
            )));
        }

        let (num_lon, num_lat) = (grid.num_lon(), grid.num_lat());
        let lons = grid.lons();
        let lats = grid.lats();
        let mut adjacency = vec![Vec::new(); grid.num_nodes()];
        let mut edge_count = 0usize;

        for i in 0..num_lon {
            for j in 0..num_lat {
                if mask.is_blocked(i, j) {
                    continue;
                }
                let candidates = [
                    (i > 0).then(|| (i - 1, j)),
                    (i + 1 < num_lon).then(|| (i + 1, j)),
                    (j > 0).then(|| (i, j - 1)),
                    (j + 1 < num_lat).then(|| (i, j + 1)),
                ];
                let from = grid.node_id(i, j);
                for (ni, nj) in candidates.into_iter().flatten() {
                    if mask.is_blocked(ni, nj) {
                        continue;
                    }
                    adjacency[from].push(Edge {
                        to: grid.node_id(ni, nj),
                        base_km: haversine_km(lons[i], lats[j], lons[ni], lats[nj]),
                    });
                    edge_count += 1;
                }
            }
        }

        Ok(Self {
            adjacency,
            edge_count,
        })
    }

    pub fn neighbors(&self, node: usize) -> &[Edge] {
        &self.adjacency[node]
    }

    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
