//! Synthetic scenario generator.
//!
//! Produces a wave/wind model grid with a storm drifting east across the
//! slices, and a coarser, slightly skewed ocean model grid carrying SST,
//! surface currents and salinity. An island in the middle of the ocean grid is
//! written with the `-9999` land fill value.

use anyhow::{ensure, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scenario::{
    AxesSpec, CoordSpec, DatasetSpec, DatasetsSpec, RequestSpec, Scenario, SliceSpec,
};

/// Fill value the ocean model writes over land.
pub const LAND_FILL: f64 = -9999.0;

/// Hours between weather slices.
const SLICE_INTERVAL_HOURS: i64 = 6;

/// Ocean grid lat drift per lon index, in fine grid steps.
const OCEAN_GRID_SKEW: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub nlon: usize,
    pub nlat: usize,
    pub slices: usize,
    /// Random seed; drawn from the thread RNG when absent.
    pub seed: Option<u64>,
    pub lon0: f64,
    pub lat0: f64,
    pub step_deg: f64,
    pub start_time: DateTime<Utc>,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            nlon: 40,
            nlat: 30,
            slices: 3,
            seed: None,
            lon0: -65.0,
            lat0: 10.0,
            step_deg: 0.25,
            start_time: Utc
                .with_ymd_and_hms(2024, 8, 25, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }
}

/// Build a scenario; returns it with the seed that was used.
pub fn generate(options: &SynthOptions) -> Result<(Scenario, u64)> {
    ensure!(
        options.nlon >= 8 && options.nlat >= 8,
        "grid must be at least 8x8 (got {}x{})",
        options.nlon,
        options.nlat
    );
    ensure!(options.slices >= 1, "need at least one time slice");
    ensure!(
        options.step_deg.is_finite() && options.step_deg > 0.0,
        "step must be positive"
    );

    let seed = options.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let step = options.step_deg;

    let lons: Vec<f64> = (0..options.nlon)
        .map(|i| options.lon0 + i as f64 * step)
        .collect();
    let lats: Vec<f64> = (0..options.nlat)
        .map(|j| options.lat0 + j as f64 * step)
        .collect();

    let mut wave_slices = Vec::with_capacity(options.slices);
    let mut wind_slices = Vec::with_capacity(options.slices);
    let storm_radius = options.nlat as f64 / 6.0;
    for s in 0..options.slices {
        let time = options.start_time + Duration::hours(SLICE_INTERVAL_HOURS * s as i64);
        let storm_i = options.nlon as f64 * (s + 1) as f64 / (options.slices + 1) as f64;
        let storm_j = options.nlat as f64 * 0.4;

        let mut waves = Vec::with_capacity(options.nlat);
        let mut winds = Vec::with_capacity(options.nlat);
        for j in 0..options.nlat {
            let mut wave_row = Vec::with_capacity(options.nlon);
            let mut wind_row = Vec::with_capacity(options.nlon);
            for i in 0..options.nlon {
                let d2 = (i as f64 - storm_i).powi(2) + (j as f64 - storm_j).powi(2);
                let storm = (-d2 / (2.0 * storm_radius * storm_radius)).exp();
                let wave = 0.5 + 4.0 * storm + rng.random_range(0.0..0.3);
                let wind = 3.0 + 2.5 * wave + rng.random_range(0.0..1.5);
                wave_row.push(Some(wave));
                wind_row.push(Some(wind));
            }
            waves.push(wave_row);
            winds.push(wind_row);
        }
        wave_slices.push(SliceSpec { time, values: waves });
        wind_slices.push(SliceSpec { time, values: winds });
    }

    // Ocean model grid at half resolution, covering the wave grid.
    let ocean_nlon = options.nlon / 2 + 1;
    let ocean_nlat = options.nlat / 2 + 1;
    let mut lon_mesh = Vec::with_capacity(ocean_nlat);
    let mut lat_mesh = Vec::with_capacity(ocean_nlat);
    for jc in 0..ocean_nlat {
        lon_mesh.push(
            (0..ocean_nlon)
                .map(|ic| options.lon0 + 2.0 * step * ic as f64)
                .collect::<Vec<_>>(),
        );
        lat_mesh.push(
            (0..ocean_nlon)
                .map(|ic| {
                    options.lat0 + 2.0 * step * jc as f64 + OCEAN_GRID_SKEW * step * ic as f64
                })
                .collect::<Vec<_>>(),
        );
    }

    let island_i = ocean_nlon as f64 / 2.0;
    let island_j = ocean_nlat as f64 / 2.0;
    let island_radius = (ocean_nlon.min(ocean_nlat) as f64 / 5.0).max(1.0);
    let on_island = |ic: usize, jc: usize| {
        let d2 = (ic as f64 - island_i).powi(2) + (jc as f64 - island_j).powi(2);
        d2 <= island_radius * island_radius
    };

    let mut sst = Vec::with_capacity(ocean_nlat);
    let mut current_u = Vec::with_capacity(ocean_nlat);
    let mut current_v = Vec::with_capacity(ocean_nlat);
    let mut salinity = Vec::with_capacity(ocean_nlat);
    for jc in 0..ocean_nlat {
        let mut sst_row = Vec::with_capacity(ocean_nlon);
        let mut u_row = Vec::with_capacity(ocean_nlon);
        let mut v_row = Vec::with_capacity(ocean_nlon);
        let mut salt_row = Vec::with_capacity(ocean_nlon);
        for ic in 0..ocean_nlon {
            if on_island(ic, jc) {
                sst_row.push(Some(LAND_FILL));
                u_row.push(None);
                v_row.push(None);
                salt_row.push(None);
                continue;
            }
            // Warmer toward the equator.
            let sst = 29.0 - 0.1 * jc as f64 + rng.random_range(-0.3..0.3);
            sst_row.push(Some(sst));
            u_row.push(Some(rng.random_range(0.05..0.5)));
            v_row.push(Some(rng.random_range(-0.2..0.2)));
            salt_row.push(Some(rng.random_range(34.5..36.5)));
        }
        sst.push(sst_row);
        current_u.push(u_row);
        current_v.push(v_row);
        salinity.push(salt_row);
    }

    let wave_dataset = |variable: &str, slices: Vec<SliceSpec>| DatasetSpec {
        variable: Some(variable.to_string()),
        lons: CoordSpec::Axis(lons.clone()),
        lats: CoordSpec::Axis(lats.clone()),
        slices,
    };
    let ocean_dataset = |variable: &str, values: Vec<Vec<Option<f64>>>| DatasetSpec {
        variable: Some(variable.to_string()),
        lons: CoordSpec::Mesh(lon_mesh.clone()),
        lats: CoordSpec::Mesh(lat_mesh.clone()),
        slices: vec![SliceSpec {
            time: options.start_time,
            values,
        }],
    };

    let mid_lat = lats[options.nlat / 2];
    let request = RequestSpec {
        ship_type: Some("cargo".to_string()),
        start: Some([lons[1], mid_lat]),
        end: Some([lons[options.nlon - 2], mid_lat]),
        departure: Some(options.start_time),
        draft_m: None,
        ship_dimensions: None,
    };

    let scenario = Scenario {
        datasets: DatasetsSpec {
            wave_height: wave_dataset("SWH", wave_slices),
            wind_speed: wave_dataset("WS", wind_slices),
            sea_surface_temperature: ocean_dataset("SST", sst),
            current_u: Some(ocean_dataset("USURF", current_u)),
            current_v: Some(ocean_dataset("VSURF", current_v)),
            salinity: Some(ocean_dataset("SALT", salinity)),
        },
        grid: AxesSpec { lons, lats },
        request,
    };

    tracing::debug!(
        seed,
        nlon = options.nlon,
        nlat = options.nlat,
        slices = options.slices,
        "generated synthetic scenario"
    );
    Ok((scenario, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seaway_core::{EngineConfig, RouteEngine};

    fn seeded(seed: u64) -> SynthOptions {
        SynthOptions {
            nlon: 16,
            nlat: 12,
            seed: Some(seed),
            ..SynthOptions::default()
        }
    }

    #[test]
    fn same_seed_gives_same_scenario() {
        let (a, seed_a) = generate(&seeded(7)).unwrap();
        let (b, seed_b) = generate(&seeded(7)).unwrap();
        assert_eq!(seed_a, seed_b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn island_is_written_with_fill_values() {
        let (scenario, _) = generate(&seeded(1)).unwrap();
        let sst = &scenario.datasets.sea_surface_temperature.slices[0].values;
        let land = sst.iter().flatten().filter(|v| **v == Some(LAND_FILL)).count();
        assert!(land > 0);
        assert!(land < sst.len() * sst[0].len() / 2);
    }

    #[test]
    fn generated_scenario_routes_around_the_island() {
        let (scenario, _) = generate(&seeded(42)).unwrap();
        let bundle = scenario.to_bundle().unwrap();
        let request = scenario.request.clone().into_request().unwrap();

        let result = RouteEngine::new(EngineConfig::default())
            .optimize_route(&bundle, &request)
            .unwrap();

        assert_eq!(result.route.first(), scenario.request.start.as_ref());
        assert_eq!(result.route.last(), scenario.request.end.as_ref());
        assert!(result.total_cost > 0.0);
        assert_eq!(result.num_steps, result.route.len() - 1);
    }

    #[test]
    fn tiny_grids_are_rejected() {
        let options = SynthOptions {
            nlon: 4,
            ..seeded(3)
        };
        assert!(generate(&options).is_err());
    }
}
