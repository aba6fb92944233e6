// crates/geopop-core/src/model/raw.rs
use serde::{Deserialize, Serialize};

/// One row of the long-format population table: residents of one
/// municipality with a given age.
///
/// ```json
/// { "municipality_code": 1001, "age": 34, "F": 12, "M": 15, "tot": 27 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeCount {
    pub municipality_code: u32,
    pub age: u32,
    #[serde(rename = "F", default)]
    pub female: Option<f64>,
    #[serde(rename = "M", default)]
    pub male: Option<f64>,
    #[serde(rename = "tot", default)]
    pub total: Option<f64>,
}

impl AgeCount {
    pub fn new(municipality_code: u32, age: u32, female: f64, male: f64) -> Self {
        AgeCount {
            municipality_code,
            age,
            female: Some(female),
            male: Some(male),
            total: Some(female + male),
        }
    }
}

/// Minimal GeoJSON FeatureCollection: only what is needed to key a geometry
/// by its ISTAT code. Geometries stay opaque.
/// NOTE: This type mirrors the external boundary files and is not exposed
/// from the public API.
#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollectionRaw {
    #[serde(default)]
    pub features: Vec<FeatureRaw>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureRaw {
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub geometry: serde_json::Value,
}
