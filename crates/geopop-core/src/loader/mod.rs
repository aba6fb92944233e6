// crates/geopop-core/src/loader/mod.rs

//! # Data Loader
//!
//! Handles the physical layer (file discovery, decompression, bincode
//! cache) and hands parsed tables to [`Snapshot`].
//!
//! A data directory looks like:
//!
//! ```text
//! 2022_municipalities.json[.gz]     municipality rows
//! 2022_population.json[.gz]         {municipality_code, age, F, M, tot} rows
//! 2022.snapshot.bin                 cache, written on first load
//! limits_IT_municipalities.geojson[.gz]
//! limits_IT_provinces.geojson[.gz]
//! limits_IT_regions.geojson[.gz]
//! ```

use crate::common::Level;
use crate::error::Result;
use crate::frame::{Frame, IndexLabel};
use crate::model::raw::FeatureCollectionRaw;
use crate::model::{AgeCount, Municipality};
use crate::snapshot::Snapshot;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub mod cache;
pub mod catalog;
pub mod common_io;

pub use catalog::{available_years, latest_year};

// One snapshot per (directory, year) per process.
static SNAPSHOT_CACHE: Lazy<RwLock<HashMap<(PathBuf, u16), Arc<Snapshot>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// `data/` next to this crate's manifest, overridable with `GEOPOP_DATA_DIR`.
pub fn default_data_dir() -> PathBuf {
    std::env::var_os("GEOPOP_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data"))
}

pub fn municipalities_file(year: u16) -> String {
    format!("{year}_municipalities.json")
}

pub fn population_file(year: u16) -> String {
    format!("{year}_population.json")
}

pub fn geometry_file(level: Level) -> String {
    format!("limits_IT_{}.geojson", level.plural())
}

/// Loads the snapshot of `year` (latest when `None`) from `dir`, reusing an
/// already loaded one.
pub fn load_snapshot(dir: impl AsRef<Path>, year: Option<u16>) -> Result<Arc<Snapshot>> {
    let dir = dir.as_ref();
    let year = catalog::resolve_year(dir, year)?;
    let key = (dir.to_path_buf(), year);

    if let Some(hit) = SNAPSHOT_CACHE.read().ok().and_then(|m| m.get(&key).cloned()) {
        return Ok(hit);
    }

    let snapshot = Arc::new(load_snapshot_uncached(dir, year)?);
    Ok(match SNAPSHOT_CACHE.write() {
        Ok(mut map) => map.entry(key).or_insert(snapshot).clone(),
        Err(_) => snapshot,
    })
}

/// Reads a snapshot from disk without touching the process-wide cache.
///
/// The bincode cache is used when it is newer than both sources;
/// otherwise the JSON sources are parsed and the cache rewritten
/// (best effort).
pub fn load_snapshot_uncached(dir: &Path, year: u16) -> Result<Snapshot> {
    let municipalities_path = common_io::find_source(dir, &municipalities_file(year))?;
    let population_path = common_io::find_source(dir, &population_file(year))?;
    let cache_path = cache::cache_path(dir, year);

    let sources = [municipalities_path.as_path(), population_path.as_path()];
    if cache::is_cache_fresh(&sources, &cache_path) {
        match cache::read_cache(&cache_path, year) {
            Ok(tables) => {
                log::debug!("loaded {year} from cache {}", cache_path.display());
                return Ok(
                    Snapshot::from_tables(year, tables.municipalities, tables.population)
                        .with_geometry_dir(dir.to_path_buf()),
                );
            }
            Err(e) => log::debug!("ignoring cache {}: {e}", cache_path.display()),
        }
    }

    let municipalities: Vec<Municipality> = common_io::read_json(&municipalities_path)?;
    let population: Vec<AgeCount> = common_io::read_json(&population_path)?;
    log::debug!(
        "parsed {year}: {} municipalities, {} population rows",
        municipalities.len(),
        population.len()
    );

    let tables = cache::CachedTables {
        format: cache::CACHE_FORMAT,
        year,
        municipalities,
        population,
    };
    if let Err(e) = cache::write_cache(&cache_path, &tables) {
        log::debug!("could not write cache {}: {e}", cache_path.display());
    }

    Ok(
        Snapshot::from_tables(year, tables.municipalities, tables.population)
            .with_geometry_dir(dir.to_path_buf()),
    )
}

/// Reads the boundary file of a level into a one-column `geometry` frame
/// indexed by ISTAT code. Features without a usable code are skipped.
pub fn load_geometry(dir: &Path, level: Level) -> Result<Frame> {
    let path = common_io::find_source(dir, &geometry_file(level))?;
    let collection: FeatureCollectionRaw = common_io::read_json(&path)?;
    let frame = geometry_frame(level, collection)?;
    log::debug!("loaded {} {} geometries", frame.len(), level);
    Ok(frame)
}

pub(crate) fn geometry_frame(level: Level, collection: FeatureCollectionRaw) -> Result<Frame> {
    let property = level.geojson_code_property();
    let mut frame = Frame::new(Some(level.code_column()), vec!["geometry".to_owned()]);
    for feature in collection.features {
        match feature.properties.get(property).and_then(code_of) {
            Some(code) => frame.push_row(IndexLabel::Int(code), vec![feature.geometry])?,
            None => log::debug!("{level} feature without {property}, skipped"),
        }
    }
    Ok(frame)
}

fn code_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn geometry_codes_accept_numbers_and_strings() {
        let collection: FeatureCollectionRaw = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                {"properties": {"prov_istat_code_num": 1}, "geometry": {"type": "Point", "coordinates": [7.6, 45.0]}},
                {"properties": {"prov_istat_code_num": "5"}, "geometry": null},
                {"properties": {"name": "nowhere"}, "geometry": null}
            ]
        }))
        .unwrap();
        let frame = geometry_frame(Level::Province, collection).unwrap();
        assert_eq!(frame.index(), [IndexLabel::Int(1), IndexLabel::Int(5)]);
        assert_eq!(frame.get(0, "geometry").unwrap()["type"], "Point");
    }

    #[test]
    fn file_names() {
        assert_eq!(municipalities_file(2022), "2022_municipalities.json");
        assert_eq!(geometry_file(Level::Region), "limits_IT_regions.geojson");
    }
}
