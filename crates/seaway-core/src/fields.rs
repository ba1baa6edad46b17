//! Time-indexed source datasets and the resampled per-request field bundle.

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::error::{Result, RouteError};
use crate::grid::{Field2D, Grid};
use crate::resample::{resample_nearest, SourceGrid};

/// One time step of a source variable.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlice {
    pub time: DateTime<Utc>,
    pub values: Field2D,
}

/// A single scientific variable on its native grid, with one or more time steps.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDataset {
    pub name: String,
    pub grid: SourceGrid,
    pub slices: Vec<TimeSlice>,
}

impl SourceDataset {
    pub fn new(name: impl Into<String>, grid: SourceGrid, slices: Vec<TimeSlice>) -> Result<Self> {
        let name = name.into();
        if slices.is_empty() {
            return Err(RouteError::data(format!("dataset {name} has no time slices")));
        }
        let expected = grid.shape();
        if let Some(bad) = slices.iter().find(|slice| slice.values.shape() != expected) {
            return Err(RouteError::data(format!(
                "dataset {name}: slice at {} is shaped {:?}, grid is {:?}",
                bad.time,
                bad.values.shape(),
                expected
            )));
        }
        Ok(Self { name, grid, slices })
    }

    /// Dataset with a single slice, for data that does not vary with time.
    pub fn constant(name: impl Into<String>, grid: SourceGrid, values: Field2D) -> Result<Self> {
        Self::new(
            name,
            grid,
            vec![TimeSlice {
                time: DateTime::<Utc>::default(),
                values,
            }],
        )
    }

    /// Slice closest in time to `reference`; the earlier one wins a tie.
    pub fn select_slice(&self, reference: DateTime<Utc>) -> &TimeSlice {
        let mut best = &self.slices[0];
        let mut best_gap = (best.time - reference).abs();
        for slice in &self.slices[1..] {
            let gap = (slice.time - reference).abs();
            if gap < best_gap || (gap == best_gap && slice.time < best.time) {
                best = slice;
                best_gap = gap;
            }
        }
        best
    }

    fn resample_at(&self, reference: DateTime<Utc>, dst: &Grid) -> Result<Field2D> {
        let slice = self.select_slice(reference);
        tracing::debug!(dataset = %self.name, slice_time = %slice.time, "resampling dataset");
        resample_nearest(&self.grid, &slice.values, dst).map_err(|err| match err {
            RouteError::Data(message) => RouteError::Data(format!("{}: {message}", self.name)),
            other => other,
        })
    }
}

/// Everything the dataset loader hands to the engine for one request.
///
/// The routing grid is supplied explicitly (by convention the wave model grid).
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub grid: Grid,
    pub wave_height: SourceDataset,
    pub wind_speed: SourceDataset,
    pub sea_surface_temperature: SourceDataset,
    pub current_u: Option<SourceDataset>,
    pub current_v: Option<SourceDataset>,
    pub salinity: Option<SourceDataset>,
}

/// Environmental readings at one grid node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvSample {
    /// Significant wave height in meters.
    pub wave_height: f64,
    /// Wind speed in m/s.
    pub wind_speed: f64,
    /// Sea-surface temperature in °C.
    pub temperature: f64,
    /// Eastward surface current in m/s.
    pub current_u: f64,
    /// Northward surface current in m/s.
    pub current_v: f64,
    /// Salinity in PSU, `None` when no salinity data was supplied.
    pub salinity: Option<f64>,
}

/// Resampled fields, all aligned to one routing grid.
#[derive(Debug, Clone)]
pub struct EnvironmentalFields {
    pub wave_height: Field2D,
    pub wind_speed: Field2D,
    pub sea_surface_temperature: Field2D,
    pub current_u: Option<Field2D>,
    pub current_v: Option<Field2D>,
    pub salinity: Option<Field2D>,
}

impl EnvironmentalFields {
    /// Resample every dataset of `bundle` onto its routing grid, using the slice
    /// nearest to `reference`. Datasets are independent and run in parallel.
    pub fn resample(bundle: &DatasetBundle, reference: DateTime<Utc>) -> Result<Self> {
        let mut jobs: Vec<(&'static str, &SourceDataset)> = vec![
            ("wave_height", &bundle.wave_height),
            ("wind_speed", &bundle.wind_speed),
            ("sea_surface_temperature", &bundle.sea_surface_temperature),
        ];
        if let Some(dataset) = &bundle.current_u {
            jobs.push(("current_u", dataset));
        }
        if let Some(dataset) = &bundle.current_v {
            jobs.push(("current_v", dataset));
        }
        if let Some(dataset) = &bundle.salinity {
            jobs.push(("salinity", dataset));
        }

        let mut resampled = jobs
            .par_iter()
            .map(|(key, dataset)| Ok((*key, dataset.resample_at(reference, &bundle.grid)?)))
            .collect::<Result<Vec<(&'static str, Field2D)>>>()?;

        let mut take = |key: &str| -> Option<Field2D> {
            let pos = resampled.iter().position(|(k, _)| *k == key)?;
            Some(resampled.swap_remove(pos).1)
        };
        let missing = |key: &str| RouteError::data(format!("{key} was not resampled"));

        let fields = Self {
            wave_height: take("wave_height").ok_or_else(|| missing("wave_height"))?,
            wind_speed: take("wind_speed").ok_or_else(|| missing("wind_speed"))?,
            sea_surface_temperature: take("sea_surface_temperature")
                .ok_or_else(|| missing("sea_surface_temperature"))?,
            current_u: take("current_u"),
            current_v: take("current_v"),
            salinity: take("salinity"),
        };
        fields.validate(&bundle.grid)?;
        Ok(fields)
    }

    /// Fields already on the routing grid with no currents or salinity.
    pub fn uniform(
        grid: &Grid,
        wave_height: f64,
        wind_speed: f64,
        temperature: f64,
    ) -> Result<Self> {
        let (rows, cols) = (grid.num_lat(), grid.num_lon());
        Ok(Self {
            wave_height: Field2D::filled(rows, cols, wave_height)?,
            wind_speed: Field2D::filled(rows, cols, wind_speed)?,
            sea_surface_temperature: Field2D::filled(rows, cols, temperature)?,
            current_u: None,
            current_v: None,
            salinity: None,
        })
    }

    /// Check every field is aligned to `grid` and currents come in pairs.
    pub fn validate(&self, grid: &Grid) -> Result<()> {
        self.wave_height.ensure_matches(grid, "wave_height")?;
        self.wind_speed.ensure_matches(grid, "wind_speed")?;
        self.sea_surface_temperature
            .ensure_matches(grid, "sea_surface_temperature")?;
        match (&self.current_u, &self.current_v) {
            (Some(u), Some(v)) => {
                u.ensure_matches(grid, "current_u")?;
                v.ensure_matches(grid, "current_v")?;
            }
            (None, None) => {}
            _ => {
                return Err(RouteError::data(
                    "current_u and current_v must be supplied together",
                ))
            }
        }
        if let Some(salinity) = &self.salinity {
            salinity.ensure_matches(grid, "salinity")?;
        }
        Ok(())
    }

    /// Readings at lon index `i`, lat index `j`. Absent currents read as still water.
    pub fn sample(&self, i: usize, j: usize) -> EnvSample {
        EnvSample {
            wave_height: self.wave_height.value(i, j),
            wind_speed: self.wind_speed.value(i, j),
            temperature: self.sea_surface_temperature.value(i, j),
            current_u: self.current_u.as_ref().map_or(0.0, |f| f.value(i, j)),
            current_v: self.current_v.as_ref().map_or(0.0, |f| f.value(i, j)),
            salinity: self.salinity.as_ref().map(|f| f.value(i, j)),
        }
    }
}
