// crates/geopop-core/src/model/domain.rs
use crate::common::Level;
use crate::traits::{AdminRecord, NameMatch};
use serde::{Deserialize, Serialize};

/// A municipality (comune) as stored in the administrative snapshot.
///
/// This is also the on-disk row shape of `{year}_municipalities.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    pub municipality_code: u32,
    pub municipality: String,
    /// Belfiore code, one letter and three digits (e.g. `A074`).
    pub cadastral_code: String,
    pub province_code: u32,
    pub province: String,
    pub province_short: String,
    #[serde(default)]
    pub region_code: Option<u32>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub population: Option<f64>,
    #[serde(rename = "population_F", default)]
    pub population_f: Option<f64>,
    #[serde(rename = "population_M", default)]
    pub population_m: Option<f64>,
}

/// `{code, name}` pair listed inside a province.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MunicipalityRef {
    pub municipality_code: u32,
    pub municipality: String,
}

/// A province, rolled up from its municipalities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Province {
    pub province_code: u32,
    pub province: String,
    pub province_short: String,
    pub region_code: Option<u32>,
    pub region: Option<String>,
    /// Member municipalities in snapshot row order.
    pub municipalities: Vec<MunicipalityRef>,
    pub population: f64,
    #[serde(rename = "population_F")]
    pub population_f: f64,
    #[serde(rename = "population_M")]
    pub population_m: f64,
}

/// Province entry nested inside a region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvinceSummary {
    pub province_code: u32,
    pub province: String,
    pub province_short: String,
    pub municipalities: Vec<MunicipalityRef>,
}

/// A region, rolled up from its provinces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub region_code: u32,
    pub region: String,
    pub provinces: Vec<ProvinceSummary>,
    pub population: f64,
    #[serde(rename = "population_F")]
    pub population_f: f64,
    #[serde(rename = "population_M")]
    pub population_m: f64,
}

/// Population columns every administrative table carries.
pub const POPULATION_COLUMNS: [&str; 3] = ["population", "population_F", "population_M"];

impl Municipality {
    pub fn name(&self) -> &str {
        &self.municipality
    }

    /// True when the three population figures are present and the total
    /// disagrees with `F + M` after rounding.
    pub fn population_mismatch(&self) -> bool {
        match (self.population, self.population_f, self.population_m) {
            (Some(tot), Some(f), Some(m)) => (f + m).round() != tot.round(),
            _ => false,
        }
    }
}

impl Province {
    pub fn name(&self) -> &str {
        &self.province
    }

    pub fn summary(&self) -> ProvinceSummary {
        ProvinceSummary {
            province_code: self.province_code,
            province: self.province.clone(),
            province_short: self.province_short.clone(),
            municipalities: self.municipalities.clone(),
        }
    }
}

impl Region {
    pub fn name(&self) -> &str {
        &self.region
    }
}

impl NameMatch for Municipality {
    #[inline]
    fn name_str(&self) -> &str {
        self.name()
    }
}

impl NameMatch for Province {
    #[inline]
    fn name_str(&self) -> &str {
        self.name()
    }
}

impl NameMatch for Region {
    #[inline]
    fn name_str(&self) -> &str {
        self.name()
    }
}

impl AdminRecord for Municipality {
    const LEVEL: Level = Level::Municipality;
    const COLUMNS: &'static [&'static str] = &[
        "municipality",
        "municipality_code",
        "cadastral_code",
        "province",
        "province_code",
        "province_short",
        "region",
        "region_code",
        "population",
        "population_F",
        "population_M",
    ];

    fn code(&self) -> u32 {
        self.municipality_code
    }

    fn alternate_key(&self) -> Option<String> {
        Some(self.cadastral_code.trim().to_lowercase())
    }
}

impl AdminRecord for Province {
    const LEVEL: Level = Level::Province;
    const COLUMNS: &'static [&'static str] = &[
        "province",
        "province_code",
        "province_short",
        "region",
        "region_code",
        "municipalities",
        "population",
        "population_F",
        "population_M",
    ];

    fn code(&self) -> u32 {
        self.province_code
    }

    fn alternate_key(&self) -> Option<String> {
        Some(self.province_short.trim().to_uppercase())
    }
}

impl AdminRecord for Region {
    const LEVEL: Level = Level::Region;
    const COLUMNS: &'static [&'static str] = &[
        "region",
        "region_code",
        "provinces",
        "population",
        "population_F",
        "population_M",
    ];

    fn code(&self) -> u32 {
        self.region_code
    }
}
