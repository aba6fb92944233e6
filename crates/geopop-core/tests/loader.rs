mod common;

use geopop_core::loader::{self, cache};
use geopop_core::{available_years, latest_year, GeopopError, Geopop, Level, QueryOptions};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

fn data_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("geopop-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_year(dir: &Path, year: u16, municipalities: usize) {
    let munis = &common::municipalities()[..municipalities];
    fs::write(
        dir.join(loader::municipalities_file(year)),
        serde_json::to_vec(munis).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join(loader::population_file(year)),
        serde_json::to_vec(&common::counts()).unwrap(),
    )
    .unwrap();
}

#[test]
fn years_are_discovered_from_file_names() {
    let dir = data_dir("years");
    write_year(&dir, 2021, 3);
    write_year(&dir, 2022, 10);
    fs::write(dir.join("notes.txt"), "not data").unwrap();

    assert_eq!(available_years(&dir).unwrap(), [2021, 2022]);
    assert_eq!(latest_year(&dir).unwrap(), 2022);

    let latest = Geopop::open(&dir, None).unwrap();
    assert_eq!(latest.year(), 2022);
    assert_eq!(latest.municipalities().len(), 10);

    let older = Geopop::open(&dir, Some(2021)).unwrap();
    let frame = older.compose(&QueryOptions::new(Level::Municipality)).unwrap();
    assert_eq!(frame.len(), 3);

    let err = Geopop::open(&dir, Some(1999)).unwrap_err();
    assert!(matches!(err, GeopopError::InvalidArgument(_)));
}

#[test]
fn empty_directory_has_no_latest_year() {
    let dir = data_dir("empty");
    assert!(available_years(&dir).unwrap().is_empty());
    assert!(matches!(latest_year(&dir), Err(GeopopError::NotFound(_))));
    assert!(available_years(dir.join("missing")).is_err());
}

#[test]
fn snapshots_are_shared_per_directory_and_year() {
    let dir = data_dir("shared");
    write_year(&dir, 2022, 4);
    let a = loader::load_snapshot(&dir, None).unwrap();
    let b = loader::load_snapshot(&dir, Some(2022)).unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[test]
fn cache_is_written_and_read_back() {
    let dir = data_dir("cache");
    write_year(&dir, 2022, 10);

    let parsed = loader::load_snapshot_uncached(&dir, 2022).unwrap();
    let path = cache::cache_path(&dir, 2022);
    assert!(path.exists());

    let cached = cache::read_cache(&path, 2022).unwrap();
    assert_eq!(cached.municipalities, parsed.municipalities());
    assert_eq!(cached.population, parsed.population());
    assert!(cache::read_cache(&path, 2021).is_err());

    let reloaded = loader::load_snapshot_uncached(&dir, 2022).unwrap();
    assert_eq!(reloaded.municipalities(), parsed.municipalities());
}

#[test]
fn corrupt_cache_falls_back_to_sources() {
    let dir = data_dir("corrupt");
    write_year(&dir, 2022, 2);
    fs::write(cache::cache_path(&dir, 2022), b"garbage").unwrap();

    let snapshot = loader::load_snapshot_uncached(&dir, 2022).unwrap();
    assert_eq!(snapshot.municipalities().len(), 2);
}

#[test]
fn geometry_is_read_on_demand() {
    let dir = data_dir("geometry");
    write_year(&dir, 2022, 10);
    let collection = json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"reg_istat_code_num": 5}, "geometry": {"type": "Point", "coordinates": [11.9, 45.4]}},
            {"type": "Feature", "properties": {"reg_istat_code_num": "12"}, "geometry": {"type": "Point", "coordinates": [13.3, 41.6]}}
        ]
    });
    fs::write(
        dir.join(loader::geometry_file(Level::Region)),
        serde_json::to_vec(&collection).unwrap(),
    )
    .unwrap();

    let geo = Geopop::open(&dir, None).unwrap().with_geometry(true);
    let regions = geo
        .from_region(&geopop_core::Series::from_values(["Veneto", "Lazio", "Toscana"]))
        .unwrap();
    assert_eq!(regions.get(0, "geometry").unwrap()["coordinates"][0], json!(11.9));
    assert_eq!(regions.get(1, "geometry").unwrap()["type"], json!("Point"));
    assert_eq!(regions.get(2, "geometry"), Some(&serde_json::Value::Null));

    let err = geo
        .from_province(&geopop_core::Series::from_values(["VR"]))
        .unwrap_err();
    assert!(matches!(err, GeopopError::NotFound(_)));
}
