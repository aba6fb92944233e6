// crates/geopop-core/src/common.rs
use crate::error::{GeopopError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative level a query operates on.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Municipality,
    Province,
    Region,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Municipality => "municipality",
            Level::Province => "province",
            Level::Region => "region",
        }
    }

    /// Name of the column holding the level's numeric code, also used as
    /// the index name of every table at this level.
    pub fn code_column(&self) -> &'static str {
        match self {
            Level::Municipality => "municipality_code",
            Level::Province => "province_code",
            Level::Region => "region_code",
        }
    }

    /// Geometry key property used by the upstream GeoJSON boundary files.
    pub fn geojson_code_property(&self) -> &'static str {
        match self {
            Level::Municipality => "com_istat_code_num",
            Level::Province => "prov_istat_code_num",
            Level::Region => "reg_istat_code_num",
        }
    }

    pub(crate) fn slot(self) -> usize {
        self as usize
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Level::Municipality => "municipalities",
            Level::Province => "provinces",
            Level::Region => "regions",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = GeopopError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "municipality" => Ok(Level::Municipality),
            "province" => Ok(Level::Province),
            "region" => Ok(Level::Region),
            other => Err(GeopopError::invalid(format!(
                "level must be one of municipality, province, region (got {other:?})"
            ))),
        }
    }
}

/// Simple aggregate statistics for a snapshot.
///
/// Returned by [`Snapshot::stats`](crate::snapshot::Snapshot::stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub year: u16,
    pub regions: usize,
    pub provinces: usize,
    pub municipalities: usize,
    pub population_rows: usize,
}
