//! Effective traversal cost of an edge for a given vessel and conditions.
//!
//! One canonical model is used for every request:
//!
//! ```text
//! susceptibility  = 1 + draft_sensitivity * draft_m
//! weather_factor  = 1 + susceptibility * (wave_coeff * wave_height + wind_coeff * wind_speed)
//! effective_speed = max(nominal_speed + current_coeff * along_track_current_kn,
//!                       min_speed_fraction * nominal_speed)
//! salinity_factor = 1 + salinity_coeff * max(salinity - reference_salinity, 0)
//! thermal_factor  = 1 + temperature_coeff * |temperature - optimal_temperature|
//! cost            = base_km * weather_factor * salinity_factor * thermal_factor / effective_speed
//! ```
//!
//! With calm water the cost is exactly `base_km / nominal_speed`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};
use crate::fields::EnvSample;
use crate::models::{VesselClass, VesselProfile};
use crate::spatial::{along_bearing, MPS_TO_KNOTS};

/// Per-class vessel parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselClassConfig {
    /// Nominal service speed in knots.
    pub nominal_speed_kn: f64,
    /// Extra weather susceptibility per meter of draft.
    pub draft_sensitivity: f64,
}

/// Vessel class lookup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselTable {
    pub passenger: VesselClassConfig,
    pub cargo: VesselClassConfig,
    pub tanker: VesselClassConfig,
}

impl Default for VesselTable {
    fn default() -> Self {
        Self {
            passenger: VesselClassConfig {
                nominal_speed_kn: 20.0,
                draft_sensitivity: 0.02,
            },
            cargo: VesselClassConfig {
                nominal_speed_kn: 15.0,
                draft_sensitivity: 0.03,
            },
            tanker: VesselClassConfig {
                nominal_speed_kn: 10.0,
                draft_sensitivity: 0.05,
            },
        }
    }
}

impl VesselTable {
    pub fn get(&self, class: VesselClass) -> VesselClassConfig {
        match class {
            VesselClass::Passenger => self.passenger,
            VesselClass::Cargo => self.cargo,
            VesselClass::Tanker => self.tanker,
        }
    }
}

/// Penalty coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModelConfig {
    /// Weight per meter of significant wave height.
    pub wave_coeff: f64,
    /// Weight per m/s of wind speed.
    pub wind_coeff: f64,
    /// Fraction of the along-track current added to vessel speed.
    pub current_coeff: f64,
    /// Floor on effective speed as a fraction of nominal speed (strong head currents).
    pub min_speed_fraction: f64,
    /// Current components beyond this many m/s are treated as fill values.
    pub max_current_mps: f64,
    /// Corrosion-risk weight per PSU above `reference_salinity`.
    pub salinity_coeff: f64,
    pub reference_salinity: f64,
    /// Weight per °C away from `optimal_temperature`. Off by default.
    pub temperature_coeff: f64,
    pub optimal_temperature: f64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            wave_coeff: 0.1,
            wind_coeff: 0.05,
            current_coeff: 1.0,
            min_speed_fraction: 0.25,
            max_current_mps: 10.0,
            salinity_coeff: 0.01,
            reference_salinity: 35.0,
            temperature_coeff: 0.0,
            optimal_temperature: 15.0,
        }
    }
}

/// Cost model bound to one vessel for the duration of a request.
#[derive(Debug, Clone)]
pub struct CostModel<'a> {
    config: &'a CostModelConfig,
    vessel: VesselClassConfig,
    susceptibility: f64,
}

impl<'a> CostModel<'a> {
    pub fn new(
        config: &'a CostModelConfig,
        table: &VesselTable,
        profile: &VesselProfile,
    ) -> Result<Self> {
        let vessel = table.get(profile.class);
        if !vessel.nominal_speed_kn.is_finite() || vessel.nominal_speed_kn <= 0.0 {
            return Err(RouteError::invalid_request(format!(
                "{} nominal speed must be positive, got {}",
                profile.class, vessel.nominal_speed_kn
            )));
        }
        let draft_m = match profile.draft_m {
            Some(draft) if !draft.is_finite() || draft < 0.0 => {
                return Err(RouteError::invalid_request(format!(
                    "draft must be a non-negative number of meters, got {draft}"
                )));
            }
            Some(draft) => draft,
            None => 0.0,
        };
        Ok(Self {
            config,
            vessel,
            susceptibility: 1.0 + vessel.draft_sensitivity * draft_m,
        })
    }

    /// Cost of moving `base_km` along `bearing_rad` under the conditions in `sample`.
    ///
    /// Negative wave height, wind speed or salinity and currents faster than
    /// `max_current_mps` are fill values, not readings, and fail the edge.
    pub fn edge_cost(&self, base_km: f64, bearing_rad: f64, sample: &EnvSample) -> Result<f64> {
        let c = self.config;
        require_finite("base distance", base_km)?;
        if base_km < 0.0 {
            return Err(RouteError::computation(format!("negative edge distance {base_km}")));
        }
        require_non_negative("wave height", sample.wave_height)?;
        require_non_negative("wind speed", sample.wind_speed)?;
        require_current("current u", sample.current_u, c.max_current_mps)?;
        require_current("current v", sample.current_v, c.max_current_mps)?;

        let weather = sample.wave_height * c.wave_coeff + sample.wind_speed * c.wind_coeff;
        let weather_factor = 1.0 + self.susceptibility * weather;

        let nominal = self.vessel.nominal_speed_kn;
        let along_kn =
            along_bearing(sample.current_u, sample.current_v, bearing_rad) * MPS_TO_KNOTS;
        let effective_speed =
            (nominal + c.current_coeff * along_kn).max(c.min_speed_fraction * nominal);

        let salinity_factor = match sample.salinity {
            Some(salinity) => {
                require_non_negative("salinity", salinity)?;
                1.0 + c.salinity_coeff * (salinity - c.reference_salinity).max(0.0)
            }
            None => 1.0,
        };

        let thermal_factor = if c.temperature_coeff != 0.0 {
            require_finite("temperature", sample.temperature)?;
            1.0 + c.temperature_coeff * (sample.temperature - c.optimal_temperature).abs()
        } else {
            1.0
        };

        let cost = base_km * weather_factor * salinity_factor * thermal_factor / effective_speed;
        if !cost.is_finite() || cost < 0.0 {
            return Err(RouteError::computation(format!(
                "edge cost evaluated to {cost} (base {base_km} km, speed {effective_speed} kn)"
            )));
        }
        Ok(cost)
    }
}

fn require_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RouteError::computation(format!("{name} is {value}")))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<()> {
    require_finite(name, value)?;
    if value < 0.0 {
        return Err(RouteError::computation(format!(
            "{name} reading {value} is negative (fill value?)"
        )));
    }
    Ok(())
}

fn require_current(name: &str, value: f64, limit: f64) -> Result<()> {
    require_finite(name, value)?;
    if value.abs() > limit {
        return Err(RouteError::computation(format!(
            "{name} of {value} m/s exceeds plausible {limit} m/s"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn calm() -> EnvSample {
        EnvSample {
            wave_height: 0.0,
            wind_speed: 0.0,
            temperature: 15.0,
            current_u: 0.0,
            current_v: 0.0,
            salinity: None,
        }
    }

    fn model<'a>(config: &'a CostModelConfig, profile: VesselProfile) -> CostModel<'a> {
        CostModel::new(config, &VesselTable::default(), &profile).unwrap()
    }

    #[test]
    fn calm_water_reduces_to_distance_over_speed() {
        let config = CostModelConfig::default();
        let cost = model(&config, VesselProfile::new(VesselClass::Tanker))
            .edge_cost(111.0, 0.0, &calm())
            .unwrap();
        assert!((cost - 11.1).abs() < 1e-12);
    }

    #[test]
    fn waves_and_wind_scale_cost() {
        let config = CostModelConfig::default();
        let m = model(&config, VesselProfile::new(VesselClass::Cargo));
        let sample = EnvSample {
            wave_height: 2.0,
            wind_speed: 10.0,
            ..calm()
        };
        let cost = m.edge_cost(30.0, 0.0, &sample).unwrap();
        // 1 + 0.1 * 2 + 0.05 * 10 = 1.7
        assert!((cost - 30.0 * 1.7 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn deeper_draft_is_more_weather_sensitive() {
        let config = CostModelConfig::default();
        let sample = EnvSample {
            wave_height: 3.0,
            ..calm()
        };
        let shallow = model(&config, VesselProfile::new(VesselClass::Tanker).with_draft(2.0))
            .edge_cost(10.0, 0.0, &sample)
            .unwrap();
        let deep = model(&config, VesselProfile::new(VesselClass::Tanker).with_draft(15.0))
            .edge_cost(10.0, 0.0, &sample)
            .unwrap();
        assert!(deep > shallow);

        // Draft has no effect in calm water.
        let calm_deep = model(&config, VesselProfile::new(VesselClass::Tanker).with_draft(15.0))
            .edge_cost(10.0, 0.0, &calm())
            .unwrap();
        assert!((calm_deep - 1.0).abs() < 1e-12);
    }

    #[test]
    fn following_current_is_cheaper_than_opposing() {
        let config = CostModelConfig::default();
        let m = model(&config, VesselProfile::new(VesselClass::Cargo));
        let eastward = EnvSample {
            current_u: 1.0,
            ..calm()
        };
        let with = m.edge_cost(10.0, FRAC_PI_2, &eastward).unwrap();
        let against = m.edge_cost(10.0, -FRAC_PI_2, &eastward).unwrap();
        let still = m.edge_cost(10.0, FRAC_PI_2, &calm()).unwrap();
        assert!(with < still && still < against);
    }

    #[test]
    fn head_current_speed_is_floored() {
        let config = CostModelConfig::default();
        let m = model(&config, VesselProfile::new(VesselClass::Tanker));
        let torrent = EnvSample {
            current_v: -5.0,
            ..calm()
        };
        let cost = m.edge_cost(10.0, 0.0, &torrent).unwrap();
        assert!((cost - 10.0 / 2.5).abs() < 1e-12);
    }

    #[test]
    fn fill_values_are_not_readings() {
        let config = CostModelConfig::default();
        let m = model(&config, VesselProfile::new(VesselClass::Cargo));
        let samples = [
            EnvSample {
                wave_height: -9999.0,
                ..calm()
            },
            EnvSample {
                wind_speed: -9999.0,
                ..calm()
            },
            EnvSample {
                salinity: Some(-9999.0),
                ..calm()
            },
            EnvSample {
                current_u: -9999.0,
                ..calm()
            },
            EnvSample {
                current_v: 12.0,
                ..calm()
            },
        ];
        for sample in samples {
            assert!(
                matches!(m.edge_cost(10.0, 0.0, &sample), Err(RouteError::Computation(_))),
                "{sample:?}"
            );
        }
    }

    #[test]
    fn current_bound_is_configurable() {
        let config = CostModelConfig {
            max_current_mps: 20.0,
            ..CostModelConfig::default()
        };
        let m = model(&config, VesselProfile::new(VesselClass::Cargo));
        let fast = EnvSample {
            current_v: 12.0,
            ..calm()
        };
        assert!(m.edge_cost(10.0, 0.0, &fast).is_ok());
    }

    #[test]
    fn salinity_above_reference_adds_penalty() {
        let config = CostModelConfig::default();
        let m = model(&config, VesselProfile::new(VesselClass::Passenger));
        let brackish = EnvSample {
            salinity: Some(30.0),
            ..calm()
        };
        let salty = EnvSample {
            salinity: Some(40.0),
            ..calm()
        };
        assert!((m.edge_cost(20.0, 0.0, &brackish).unwrap() - 1.0).abs() < 1e-12);
        assert!((m.edge_cost(20.0, 0.0, &salty).unwrap() - 1.05).abs() < 1e-12);
    }

    #[test]
    fn temperature_penalty_applies_when_enabled() {
        let config = CostModelConfig {
            temperature_coeff: 0.02,
            ..CostModelConfig::default()
        };
        let m = model(&config, VesselProfile::new(VesselClass::Tanker));
        let warm = EnvSample {
            temperature: 25.0,
            ..calm()
        };
        assert!((m.edge_cost(10.0, 0.0, &warm).unwrap() - 1.2).abs() < 1e-12);
    }

    #[test]
    fn missing_readings_are_computation_errors() {
        let config = CostModelConfig::default();
        let m = model(&config, VesselProfile::new(VesselClass::Cargo));
        let gap = EnvSample {
            wave_height: f64::NAN,
            ..calm()
        };
        assert!(matches!(
            m.edge_cost(10.0, 0.0, &gap),
            Err(RouteError::Computation(_))
        ));
        let salt_gap = EnvSample {
            salinity: Some(f64::NAN),
            ..calm()
        };
        assert!(matches!(
            m.edge_cost(10.0, 0.0, &salt_gap),
            Err(RouteError::Computation(_))
        ));
    }

    #[test]
    fn negative_draft_is_rejected() {
        let config = CostModelConfig::default();
        let profile = VesselProfile::new(VesselClass::Cargo).with_draft(-3.0);
        assert!(matches!(
            CostModel::new(&config, &VesselTable::default(), &profile),
            Err(RouteError::InvalidRequest(_))
        ));
    }
}
