//! Routing grid, node identifiers and grid-aligned fields.

use crate::error::{Result, RouteError};

/// Rectangular lon/lat lattice that the route is searched over.
///
/// Node `(i, j)` sits at `(lons[i], lats[j])`. Node ids use
/// `id = i * lats.len() + j`; [`Grid::node_id`] and [`Grid::node_index`] are
/// the only places that encoding is spelled out.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    lons: Vec<f64>,
    lats: Vec<f64>,
}

impl Grid {
    pub fn new(lons: Vec<f64>, lats: Vec<f64>) -> Result<Self> {
        if lons.is_empty() || lats.is_empty() {
            return Err(RouteError::data(format!(
                "grid axes must be non-empty (lon={}, lat={})",
                lons.len(),
                lats.len()
            )));
        }
        if let Some(bad) = lons.iter().chain(lats.iter()).find(|v| !v.is_finite()) {
            return Err(RouteError::data(format!("grid coordinate is not finite: {bad}")));
        }
        Ok(Self { lons, lats })
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn num_lon(&self) -> usize {
        self.lons.len()
    }

    pub fn num_lat(&self) -> usize {
        self.lats.len()
    }

    pub fn num_nodes(&self) -> usize {
        self.lons.len() * self.lats.len()
    }

    pub fn node_id(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.num_lon() && j < self.num_lat());
        i * self.num_lat() + j
    }

    pub fn node_index(&self, id: usize) -> (usize, usize) {
        debug_assert!(id < self.num_nodes());
        (id / self.num_lat(), id % self.num_lat())
    }

    /// Coordinates of a node as `(lon, lat)`.
    pub fn coord(&self, id: usize) -> (f64, f64) {
        let (i, j) = self.node_index(id);
        (self.lons[i], self.lats[j])
    }

    /// Snap an arbitrary coordinate to a grid node.
    ///
    /// Longitude and latitude are matched independently (`argmin |lon - x|`,
    /// `argmin |lat - y|`), first index wins on ties. This is not a true 2-D
    /// nearest search, which only matters for non-monotonic axes.
    pub fn nearest_node(&self, lon: f64, lat: f64) -> Result<usize> {
        if !lon.is_finite() || !lat.is_finite() {
            return Err(RouteError::invalid_request(format!(
                "coordinate ({lon}, {lat}) is not finite"
            )));
        }
        let i = argmin_abs(&self.lons, lon);
        let j = argmin_abs(&self.lats, lat);
        Ok(self.node_id(i, j))
    }
}

fn argmin_abs(values: &[f64], target: f64) -> usize {
    let mut best = 0usize;
    let mut best_delta = f64::INFINITY;
    for (idx, value) in values.iter().enumerate() {
        let delta = (value - target).abs();
        if delta < best_delta {
            best = idx;
            best_delta = delta;
        }
    }
    best
}

/// Row-major `(num_lat, num_lon)` array of samples. Missing samples are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    num_lat: usize,
    num_lon: usize,
    values: Vec<f64>,
}

impl Field2D {
    pub fn new(num_lat: usize, num_lon: usize, values: Vec<f64>) -> Result<Self> {
        if num_lat == 0 || num_lon == 0 {
            return Err(RouteError::data("field must have at least one row and column"));
        }
        if values.len() != num_lat * num_lon {
            return Err(RouteError::data(format!(
                "field has {} values, expected {}x{}",
                values.len(),
                num_lat,
                num_lon
            )));
        }
        Ok(Self {
            num_lat,
            num_lon,
            values,
        })
    }

    /// Build from nested rows, one row per latitude.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let num_lat = rows.len();
        let num_lon = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != num_lon) {
            return Err(RouteError::data(format!(
                "ragged field: row {idx} has {} values, expected {num_lon}",
                row.len()
            )));
        }
        Self::new(num_lat, num_lon, rows.concat())
    }

    pub fn filled(num_lat: usize, num_lon: usize, value: f64) -> Result<Self> {
        Self::new(num_lat, num_lon, vec![value; num_lat * num_lon])
    }

    /// `(num_lat, num_lon)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_lat, self.num_lon)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sample at longitude index `i`, latitude index `j`.
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.num_lon + i]
    }

    pub fn matches(&self, grid: &Grid) -> bool {
        self.num_lat == grid.num_lat() && self.num_lon == grid.num_lon()
    }

    pub(crate) fn ensure_matches(&self, grid: &Grid, name: &str) -> Result<()> {
        if self.matches(grid) {
            Ok(())
        } else {
            Err(RouteError::data(format!(
                "{name} field is {}x{}, routing grid is {}x{}",
                self.num_lat,
                self.num_lon,
                grid.num_lat(),
                grid.num_lon()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_3x2() -> Grid {
        Grid::new(vec![10.0, 11.0, 12.0], vec![-1.0, 1.0]).unwrap()
    }

    #[test]
    fn node_id_round_trips_every_cell() {
        let grid = grid_3x2();
        for i in 0..3 {
            for j in 0..2 {
                let id = grid.node_id(i, j);
                assert_eq!(grid.node_index(id), (i, j));
            }
        }
        assert_eq!(grid.node_id(2, 1), 5);
        assert_eq!(grid.coord(3), (11.0, 1.0));
    }

    #[test]
    fn empty_axes_are_rejected() {
        assert!(matches!(Grid::new(vec![], vec![0.0]), Err(RouteError::Data(_))));
        assert!(matches!(Grid::new(vec![0.0], vec![]), Err(RouteError::Data(_))));
        assert!(matches!(
            Grid::new(vec![0.0, f64::NAN], vec![0.0]),
            Err(RouteError::Data(_))
        ));
    }

    #[test]
    fn nearest_node_snaps_each_axis_independently() {
        let grid = grid_3x2();
        let id = grid.nearest_node(11.4, 0.7).unwrap();
        assert_eq!(grid.node_index(id), (1, 1));

        // Outside the grid snaps to the edge.
        let id = grid.nearest_node(50.0, -40.0).unwrap();
        assert_eq!(grid.node_index(id), (2, 0));
    }

    #[test]
    fn nearest_node_prefers_first_index_on_tie() {
        let grid = grid_3x2();
        let id = grid.nearest_node(10.5, 0.0).unwrap();
        assert_eq!(grid.node_index(id), (0, 0));
    }

    #[test]
    fn field_indexing_is_lat_major() {
        let field = Field2D::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(field.shape(), (2, 3));
        assert_eq!(field.value(2, 0), 3.0);
        assert_eq!(field.value(0, 1), 4.0);
        assert!(field.matches(&grid_3x2()));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Field2D::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, RouteError::Data(_)));
    }
}
