//! JSON scenario files: extracted dataset arrays plus a route request.
//!
//! Missing samples are written as `null` and become `NaN` on load.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use seaway_core::{
    DatasetBundle, Field2D, Grid, Position, RouteError, RouteRequest, SourceDataset, SourceGrid,
    TimeSlice, VesselClass, VesselProfile,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Top-level scenario document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Routing grid axes (by convention the wave model grid).
    pub grid: AxesSpec,
    pub datasets: DatasetsSpec,
    #[serde(default)]
    pub request: RequestSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxesSpec {
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsSpec {
    pub wave_height: DatasetSpec,
    pub wind_speed: DatasetSpec,
    pub sea_surface_temperature: DatasetSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_u: Option<DatasetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_v: Option<DatasetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salinity: Option<DatasetSpec>,
}

/// Source coordinates: 1-D axes or 2-D per-sample meshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordSpec {
    Axis(Vec<f64>),
    Mesh(Vec<Vec<f64>>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Variable name in the source file, for diagnostics.
    #[serde(default)]
    pub variable: Option<String>,
    pub lons: CoordSpec,
    pub lats: CoordSpec,
    pub slices: Vec<SliceSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceSpec {
    pub time: DateTime<Utc>,
    /// Rows of samples, one row per source latitude.
    pub values: Vec<Vec<Option<f64>>>,
}

/// Route request as written in a scenario. Every field may also come from the
/// command line, so all are optional here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestSpec {
    #[serde(default, alias = "shipType")]
    pub ship_type: Option<String>,
    #[serde(default, alias = "startPort")]
    pub start: Option<[f64; 2]>,
    #[serde(default, alias = "endPort")]
    pub end: Option<[f64; 2]>,
    /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date meaning midnight UTC.
    #[serde(
        default,
        alias = "departureDate",
        alias = "departureDateTime",
        deserialize_with = "deserialize_departure"
    )]
    pub departure: Option<DateTime<Utc>>,
    #[serde(default, alias = "draft")]
    pub draft_m: Option<f64>,
    /// Hull dimensions as sent by the web form; only `draft` feeds the cost model.
    #[serde(default, alias = "shipDimensions", skip_serializing_if = "Option::is_none")]
    pub ship_dimensions: Option<ShipDimensions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipDimensions {
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub draft: Option<f64>,
}

fn deserialize_departure<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    parse_departure(&raw).map(Some).map_err(serde::de::Error::custom)
}

/// Parse an RFC 3339 timestamp or a plain date at 00:00 UTC.
pub fn parse_departure(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| time.and_utc())
        .ok_or_else(|| format!("invalid departure {raw:?}: expected RFC 3339 or YYYY-MM-DD"))
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing scenario {}", path.display()))
    }

    pub fn to_bundle(&self) -> Result<DatasetBundle, RouteError> {
        let optional = |spec: &Option<DatasetSpec>, name: &str| {
            spec.as_ref().map(|spec| spec.to_dataset(name)).transpose()
        };
        Ok(DatasetBundle {
            grid: Grid::new(self.grid.lons.clone(), self.grid.lats.clone())?,
            wave_height: self.datasets.wave_height.to_dataset("wave_height")?,
            wind_speed: self.datasets.wind_speed.to_dataset("wind_speed")?,
            sea_surface_temperature: self
                .datasets
                .sea_surface_temperature
                .to_dataset("sea_surface_temperature")?,
            current_u: optional(&self.datasets.current_u, "current_u")?,
            current_v: optional(&self.datasets.current_v, "current_v")?,
            salinity: optional(&self.datasets.salinity, "salinity")?,
        })
    }
}

impl DatasetSpec {
    fn to_dataset(&self, name: &str) -> Result<SourceDataset, RouteError> {
        let label = match &self.variable {
            Some(variable) => format!("{name} ({variable})"),
            None => name.to_string(),
        };
        let grid = match (&self.lons, &self.lats) {
            (CoordSpec::Axis(lons), CoordSpec::Axis(lats)) => SourceGrid::Rectilinear {
                lons: lons.clone(),
                lats: lats.clone(),
            },
            (CoordSpec::Mesh(lons), CoordSpec::Mesh(lats)) => SourceGrid::Curvilinear {
                lons: Field2D::from_rows(lons)?,
                lats: Field2D::from_rows(lats)?,
            },
            _ => {
                return Err(RouteError::data(format!(
                    "{label}: lons and lats must both be 1-D axes or both 2-D meshes"
                )))
            }
        };
        let slices = self
            .slices
            .iter()
            .map(|slice| {
                let rows: Vec<Vec<f64>> = slice
                    .values
                    .iter()
                    .map(|row| row.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
                    .collect();
                Ok(TimeSlice {
                    time: slice.time,
                    values: Field2D::from_rows(&rows)?,
                })
            })
            .collect::<Result<Vec<_>, RouteError>>()?;
        SourceDataset::new(label, grid, slices)
    }
}

impl RequestSpec {
    /// Fill unset fields from `other`.
    pub fn or(self, other: RequestSpec) -> RequestSpec {
        RequestSpec {
            ship_type: self.ship_type.or(other.ship_type),
            start: self.start.or(other.start),
            end: self.end.or(other.end),
            departure: self.departure.or(other.departure),
            draft_m: self.draft_m.or(other.draft_m),
            ship_dimensions: self.ship_dimensions.or(other.ship_dimensions),
        }
    }

    /// Build a request, naming every missing field at once.
    pub fn into_request(self) -> Result<RouteRequest, RouteError> {
        let mut missing = Vec::new();
        if self.ship_type.is_none() {
            missing.push("ship_type");
        }
        if self.start.is_none() {
            missing.push("start");
        }
        if self.end.is_none() {
            missing.push("end");
        }
        if self.departure.is_none() {
            missing.push("departure");
        }
        let (Some(ship_type), Some(start), Some(end), Some(departure)) =
            (self.ship_type, self.start, self.end, self.departure)
        else {
            return Err(RouteError::invalid_request(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        };

        let class: VesselClass = ship_type.parse()?;
        let draft_m = self
            .draft_m
            .or_else(|| self.ship_dimensions.and_then(|dims| dims.draft));
        Ok(RouteRequest {
            start: Position::new(start[0], start[1]),
            end: Position::new(end[0], end[1]),
            vessel: VesselProfile { class, draft_m },
            departure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"{
        "grid": {"lons": [0.0, 1.0, 2.0], "lats": [0.0, 1.0]},
        "datasets": {
            "wave_height": {
                "variable": "SWH",
                "lons": [0.0, 1.0, 2.0], "lats": [0.0, 1.0],
                "slices": [{"time": "2024-08-25T00:00:00Z", "values": [[0.5, 0.6, 0.7], [0.5, null, 0.7]]}]
            },
            "wind_speed": {
                "lons": [0.0, 1.0, 2.0], "lats": [0.0, 1.0],
                "slices": [{"time": "2024-08-25T00:00:00Z", "values": [[3, 3, 3], [3, 3, 3]]}]
            },
            "sea_surface_temperature": {
                "lons": [[0.0, 2.0], [0.0, 2.0]], "lats": [[0.0, 0.0], [1.0, 1.0]],
                "slices": [{"time": "2024-08-25T00:00:00Z", "values": [[28.0, 28.5], [null, 29.0]]}]
            }
        },
        "request": {"shipType": "Cargo Ship", "startPort": [0.0, 0.0], "endPort": [2.0, 1.0]}
    }"#;

    #[test]
    fn scenario_converts_to_bundle() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let bundle = scenario.to_bundle().unwrap();

        assert_eq!(bundle.grid.num_nodes(), 6);
        assert_eq!(bundle.wave_height.name, "wave_height (SWH)");
        assert!(bundle.wave_height.slices[0].values.value(1, 1).is_nan());
        assert!(matches!(
            bundle.sea_surface_temperature.grid,
            SourceGrid::Curvilinear { .. }
        ));
        assert!(bundle.current_u.is_none());
    }

    #[test]
    fn legacy_request_keys_are_accepted_and_missing_fields_named() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        assert_eq!(scenario.request.ship_type.as_deref(), Some("Cargo Ship"));

        let err = scenario.request.clone().into_request().unwrap_err();
        match err {
            RouteError::InvalidRequest(message) => {
                assert!(message.contains("departure"), "{message}");
                assert!(!message.contains("start"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn command_line_values_take_precedence() {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        let overrides = RequestSpec {
            ship_type: Some("tanker".to_string()),
            departure: Some("2024-08-26T12:00:00Z".parse().unwrap()),
            ..RequestSpec::default()
        };
        let request = overrides.or(scenario.request).into_request().unwrap();
        assert_eq!(request.vessel.class, VesselClass::Tanker);
        assert_eq!(request.end, Position::new(2.0, 1.0));
    }

    #[test]
    fn web_form_request_shape_is_understood() {
        let spec: RequestSpec = serde_json::from_str(
            r#"{
                "shipType": "Tanker",
                "startPort": [-64.5, 11.0],
                "endPort": [-60.0, 12.5],
                "departureDate": "2024-08-25",
                "shipDimensions": {"length": 200, "width": 30, "draft": 12}
            }"#,
        )
        .unwrap();

        let request = spec.into_request().unwrap();
        assert_eq!(request.departure, "2024-08-25T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(request.vessel.draft_m, Some(12.0));
    }

    #[test]
    fn explicit_draft_wins_over_dimensions() {
        let spec = RequestSpec {
            draft_m: Some(8.0),
            ship_dimensions: Some(ShipDimensions {
                draft: Some(12.0),
                ..ShipDimensions::default()
            }),
            ..RequestSpec::default()
        };
        let merged = spec.or(RequestSpec {
            ship_type: Some("cargo".to_string()),
            start: Some([0.0, 0.0]),
            end: Some([1.0, 1.0]),
            departure: Some(parse_departure("2024-08-25T06:00:00+02:00").unwrap()),
            ..RequestSpec::default()
        });
        let request = merged.into_request().unwrap();
        assert_eq!(request.vessel.draft_m, Some(8.0));
        assert_eq!(request.departure, parse_departure("2024-08-25T04:00:00Z").unwrap());
    }

    #[test]
    fn unparseable_departure_names_the_field() {
        let err = serde_json::from_str::<RequestSpec>(r#"{"departureDate": "25/08/2024"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("departure"), "{err}");
        assert!(parse_departure("tomorrow").is_err());
    }

    #[test]
    fn mixed_coordinate_kinds_are_rejected() {
        let mut scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        scenario.datasets.wind_speed.lats = CoordSpec::Mesh(vec![vec![0.0, 1.0]]);
        assert!(matches!(scenario.to_bundle(), Err(RouteError::Data(_))));
    }
}
