//! Nearest-neighbor resampling of source grids onto the routing grid.
//!
//! Longitude and latitude are treated as planar coordinates. Routing regions
//! are small enough that the distortion does not change which sample is closest
//! in any way that matters for routing.

use crate::error::{Result, RouteError};
use crate::grid::{Field2D, Grid};
use crate::spatial::planar_distance_sq;

/// Coordinates of a source dataset's samples.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceGrid {
    /// 1-D axes; values are shaped `(lats.len(), lons.len())`.
    Rectilinear { lons: Vec<f64>, lats: Vec<f64> },
    /// Per-sample 2-D coordinates with the same shape as the values
    /// (ROMS-style `LON_RHO` / `LAT_RHO`).
    Curvilinear { lons: Field2D, lats: Field2D },
}

impl SourceGrid {
    /// `(num_lat, num_lon)` shape expected of the value array.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Rectilinear { lons, lats } => (lats.len(), lons.len()),
            Self::Curvilinear { lons, .. } => lons.shape(),
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Rectilinear { lons, lats } => {
                if lons.is_empty() || lats.is_empty() {
                    return Err(RouteError::data("source grid axes must be non-empty"));
                }
            }
            Self::Curvilinear { lons, lats } => {
                if lons.shape() != lats.shape() {
                    return Err(RouteError::data(format!(
                        "curvilinear source grid lon shape {:?} differs from lat shape {:?}",
                        lons.shape(),
                        lats.shape()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Resample `values` (defined on `source`) onto `dst` by nearest neighbor.
///
/// The output is shaped `(dst.num_lat(), dst.num_lon())`. `NaN` samples are
/// ordinary samples here: a destination cell whose closest source sample is
/// missing stays missing. Ties go to the lowest row-major source index.
pub fn resample_nearest(source: &SourceGrid, values: &Field2D, dst: &Grid) -> Result<Field2D> {
    source.validate()?;
    if values.shape() != source.shape() {
        return Err(RouteError::data(format!(
            "source values shaped {:?} do not match source grid {:?}",
            values.shape(),
            source.shape()
        )));
    }

    let out = match source {
        SourceGrid::Rectilinear { lons, lats } => resample_rectilinear(lons, lats, values, dst),
        SourceGrid::Curvilinear { lons, lats } => resample_curvilinear(lons, lats, values, dst)?,
    };
    Field2D::new(dst.num_lat(), dst.num_lon(), out)
}

/// On a lattice the planar nearest sample is separable: the closest longitude
/// column and the closest latitude row give the closest point.
fn resample_rectilinear(lons: &[f64], lats: &[f64], values: &Field2D, dst: &Grid) -> Vec<f64> {
    let col_for: Vec<usize> = dst.lons().iter().map(|&lon| nearest_axis(lons, lon)).collect();
    let row_for: Vec<usize> = dst.lats().iter().map(|&lat| nearest_axis(lats, lat)).collect();

    let mut out = Vec::with_capacity(dst.num_nodes());
    for &row in &row_for {
        for &col in &col_for {
            out.push(values.value(col, row));
        }
    }
    out
}

fn nearest_axis(axis: &[f64], target: f64) -> usize {
    let mut best = 0usize;
    let mut best_delta = f64::INFINITY;
    for (idx, value) in axis.iter().enumerate() {
        let delta = (value - target).abs();
        if delta < best_delta {
            best = idx;
            best_delta = delta;
        }
    }
    best
}

fn resample_curvilinear(
    lons: &Field2D,
    lats: &Field2D,
    values: &Field2D,
    dst: &Grid,
) -> Result<Vec<f64>> {
    let points: Vec<(f64, f64)> = lons
        .values()
        .iter()
        .zip(lats.values())
        .map(|(&lon, &lat)| (lon, lat))
        .collect();
    let index = NearestIndex::build(&points)?;

    let mut out = Vec::with_capacity(dst.num_nodes());
    for &lat in dst.lats() {
        for &lon in dst.lons() {
            let nearest = index
                .nearest(lon, lat)
                .ok_or_else(|| RouteError::data("source grid has no finite coordinates"))?;
            out.push(values.values()[nearest]);
        }
    }
    Ok(out)
}

/// Uniform bucket index over scattered points for exact nearest lookups.
///
/// Points are hashed into square-ish cells over their bounding box. A query
/// scans rings of cells outward and stops once the next ring cannot hold
/// anything closer than the best candidate.
#[derive(Debug)]
pub struct NearestIndex<'a> {
    points: &'a [(f64, f64)],
    min_lon: f64,
    min_lat: f64,
    cell_w: f64,
    cell_h: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<usize>>,
}

impl<'a> NearestIndex<'a> {
    /// Points with non-finite coordinates are never returned.
    pub fn build(points: &'a [(f64, f64)]) -> Result<Self> {
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut finite = 0usize;
        for &(lon, lat) in points {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            finite += 1;
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
        }
        if finite == 0 {
            return Err(RouteError::data("source grid has no finite coordinates"));
        }

        let side = (finite as f64).sqrt().ceil().max(1.0) as usize;
        let span_lon = max_lon - min_lon;
        let span_lat = max_lat - min_lat;
        let cols = if span_lon > 0.0 { side } else { 1 };
        let rows = if span_lat > 0.0 { side } else { 1 };
        let cell_w = if span_lon > 0.0 { span_lon / cols as f64 } else { 1.0 };
        let cell_h = if span_lat > 0.0 { span_lat / rows as f64 } else { 1.0 };

        let mut index = Self {
            points,
            min_lon,
            min_lat,
            cell_w,
            cell_h,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        };
        for (idx, &(lon, lat)) in points.iter().enumerate() {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            let (cx, cy) = index.cell_of(lon, lat);
            index.cells[cy * cols + cx].push(idx);
        }
        Ok(index)
    }

    fn cell_of(&self, lon: f64, lat: f64) -> (usize, usize) {
        let x = ((lon - self.min_lon) / self.cell_w).floor();
        let y = ((lat - self.min_lat) / self.cell_h).floor();
        let cx = x.clamp(0.0, (self.cols - 1) as f64) as usize;
        let cy = y.clamp(0.0, (self.rows - 1) as f64) as usize;
        (cx, cy)
    }

    /// Index of the closest point, lowest index on ties.
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<usize> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let (cx, cy) = self.cell_of(lon, lat);
        let min_cell = self.cell_w.min(self.cell_h);
        let max_ring = self.cols.max(self.rows);

        let mut best: Option<(f64, usize)> = None;
        for ring in 0..=max_ring {
            if let Some((best_d2, _)) = best {
                // Cells in `ring` are at least `ring - 1` whole cells away.
                let gap = ring.saturating_sub(1) as f64 * min_cell;
                if gap * gap > best_d2 {
                    break;
                }
            }
            self.scan_ring(cx, cy, ring, lon, lat, &mut best);
        }
        best.map(|(_, idx)| idx)
    }

    fn scan_ring(
        &self,
        cx: usize,
        cy: usize,
        ring: usize,
        lon: f64,
        lat: f64,
        best: &mut Option<(f64, usize)>,
    ) {
        let ring = ring as isize;
        let (cx, cy) = (cx as isize, cy as isize);
        for dy in -ring..=ring {
            for dx in -ring..=ring {
                if dx.abs() != ring && dy.abs() != ring {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x >= self.cols as isize || y >= self.rows as isize {
                    continue;
                }
                for &idx in &self.cells[y as usize * self.cols + x as usize] {
                    let (plon, plat) = self.points[idx];
                    let d2 = planar_distance_sq(lon, lat, plon, plat);
                    let better = match *best {
                        None => true,
                        Some((best_d2, best_idx)) => {
                            d2 < best_d2 || (d2 == best_d2 && idx < best_idx)
                        }
                    };
                    if better {
                        *best = Some((d2, idx));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_nearest(points: &[(f64, f64)], lon: f64, lat: f64) -> usize {
        let mut best = (f64::INFINITY, 0usize);
        for (idx, &(plon, plat)) in points.iter().enumerate() {
            let d2 = planar_distance_sq(lon, lat, plon, plat);
            if d2 < best.0 {
                best = (d2, idx);
            }
        }
        best.1
    }

    #[test]
    fn resampling_onto_source_grid_is_identity() {
        let lons = vec![70.0, 70.5, 71.0, 71.5];
        let lats = vec![10.0, 10.25, 10.5];
        let values = Field2D::new(3, 4, (0..12).map(|v| v as f64).collect()).unwrap();
        let source = SourceGrid::Rectilinear {
            lons: lons.clone(),
            lats: lats.clone(),
        };
        let dst = Grid::new(lons, lats).unwrap();

        let out = resample_nearest(&source, &values, &dst).unwrap();
        assert_eq!(out, values);
    }

    #[test]
    fn curvilinear_identity_keeps_values() {
        let lons = Field2D::from_rows(&[vec![0.0, 1.0], vec![0.0, 1.0]]).unwrap();
        let lats = Field2D::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
        let values = Field2D::from_rows(&[vec![1.0, 2.0], vec![3.0, f64::NAN]]).unwrap();
        let dst = Grid::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();

        let out = resample_nearest(&SourceGrid::Curvilinear { lons, lats }, &values, &dst).unwrap();
        assert_eq!(out.value(0, 0), 1.0);
        assert_eq!(out.value(1, 0), 2.0);
        assert_eq!(out.value(0, 1), 3.0);
        assert!(out.value(1, 1).is_nan());
    }

    #[test]
    fn coarse_source_fills_fine_destination() {
        let source = SourceGrid::Rectilinear {
            lons: vec![0.0, 10.0],
            lats: vec![0.0, 10.0],
        };
        let values = Field2D::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let dst = Grid::new(vec![1.0, 4.0, 6.0, 9.0], vec![2.0, 8.0]).unwrap();

        let out = resample_nearest(&source, &values, &dst).unwrap();
        assert_eq!(out.shape(), (2, 4));
        assert_eq!(out.values(), &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn mismatched_shapes_are_data_errors() {
        let source = SourceGrid::Rectilinear {
            lons: vec![0.0, 1.0, 2.0],
            lats: vec![0.0, 1.0],
        };
        let values = Field2D::filled(3, 2, 0.0).unwrap();
        let dst = Grid::new(vec![0.0], vec![0.0]).unwrap();
        assert!(matches!(
            resample_nearest(&source, &values, &dst),
            Err(RouteError::Data(_))
        ));

        let empty = SourceGrid::Rectilinear {
            lons: vec![],
            lats: vec![0.0],
        };
        assert!(matches!(
            resample_nearest(&empty, &values, &dst),
            Err(RouteError::Data(_))
        ));
    }

    #[test]
    fn bucket_index_matches_brute_force() {
        // Skewed, irregular point cloud.
        let mut points = Vec::new();
        for k in 0..200 {
            let t = k as f64;
            points.push(((t * 0.37).sin() * 5.0 + t * 0.01, (t * 0.11).cos() * 3.0));
        }
        let index = NearestIndex::build(&points).unwrap();
        for q in 0..60 {
            let qlon = -7.0 + q as f64 * 0.25;
            let qlat = -4.0 + (q % 17) as f64 * 0.5;
            assert_eq!(
                index.nearest(qlon, qlat),
                Some(brute_nearest(&points, qlon, qlat)),
                "query ({qlon}, {qlat})"
            );
        }
    }

    #[test]
    fn bucket_index_skips_non_finite_points() {
        let points = vec![(f64::NAN, 0.0), (5.0, 5.0), (0.0, f64::INFINITY)];
        let index = NearestIndex::build(&points).unwrap();
        assert_eq!(index.nearest(0.0, 0.0), Some(1));

        let none = vec![(f64::NAN, f64::NAN)];
        assert!(NearestIndex::build(&none).is_err());
    }

    #[test]
    fn bucket_index_breaks_ties_by_lowest_index() {
        let points = vec![(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0)];
        let index = NearestIndex::build(&points).unwrap();
        assert_eq!(index.nearest(0.0, 0.0), Some(0));
    }
}
