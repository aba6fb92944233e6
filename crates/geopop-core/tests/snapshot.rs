mod common;

use geopop_core::snapshot::{EXPECTED_PROVINCES, EXPECTED_REGIONS};
use geopop_core::{
    ComposeOptions, Frame, GeopopError, IndexLabel, IntegrityIssue, Level, Series, SmartItem,
    Snapshot,
};
use serde_json::{json, Value};

fn region_geometry() -> Frame {
    let mut frame = Frame::new(Some("region_code"), vec!["geometry".to_owned()]);
    frame
        .push_row(
            IndexLabel::from(12u32),
            vec![json!({"type": "Point", "coordinates": [13.35, 41.64]})],
        )
        .unwrap();
    frame
}

#[test]
fn fixture_only_misses_the_national_counts() {
    let issues = common::snapshot().validate();
    assert_eq!(
        issues,
        [
            IntegrityIssue::UnexpectedCount {
                level: Level::Region,
                expected: EXPECTED_REGIONS,
                found: 7,
            },
            IntegrityIssue::UnexpectedCount {
                level: Level::Province,
                expected: EXPECTED_PROVINCES,
                found: 9,
            },
        ]
    );
}

#[test]
fn validate_reports_broken_rows() {
    let mut munis = common::municipalities();
    munis[0].population = Some(1.0);
    munis[1].region_code = None;
    munis[2].cadastral_code = "a074".into();

    let issues = Snapshot::from_tables(common::YEAR, munis, common::counts()).validate();
    assert!(issues.iter().any(|i| matches!(
        i,
        IntegrityIssue::PopulationMismatch { municipality_code: 1001, .. }
    )));
    assert!(issues.contains(&IntegrityIssue::DanglingReference {
        municipality_code: 1002,
        level: Level::Region,
        code: None,
    }));
    assert!(issues.contains(&IntegrityIssue::DuplicateKey {
        level: Level::Municipality,
        key: "a074".into(),
    }));
    for issue in &issues {
        assert!(!issue.to_string().is_empty());
    }
}

#[test]
fn geometry_joins_by_code() {
    let snapshot = common::snapshot().with_geometry(Level::Region, region_geometry());
    let options = ComposeOptions::new(Level::Region).with_geometry(true);
    let frame = snapshot.compose(&options).unwrap();

    assert_eq!(frame.len(), 7);
    let lazio = frame.get_by_label(&IndexLabel::from(12u32), "geometry").unwrap();
    assert_eq!(lazio["type"], "Point");
    let veneto = frame.get_by_label(&IndexLabel::from(5u32), "geometry");
    assert_eq!(veneto, Some(&Value::Null));
}

#[test]
fn geometry_without_a_source_is_not_found() {
    let snapshot = common::snapshot();
    let options = ComposeOptions::new(Level::Province).with_geometry(true);
    assert!(matches!(snapshot.compose(&options), Err(GeopopError::NotFound(_))));
    assert!(snapshot.compose(&ComposeOptions::new(Level::Province)).is_ok());
}

#[test]
fn composed_tables_are_cached() {
    let snapshot = common::snapshot();
    let options = ComposeOptions::new(Level::Municipality);
    let first = snapshot.compose(&options).unwrap();
    let second = snapshot.compose(&options.clone()).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let a = snapshot.index(Level::Province, false);
    let b = snapshot.index(Level::Province, false);
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}

#[test]
fn composed_frame_serializes_as_records() {
    let geo = common::geopop();
    let frame = geo
        .from_province(&Series::from_values(["MS"]))
        .unwrap();
    let value = serde_json::to_value(&frame).unwrap();
    let record = &value[0];
    assert_eq!(record["index"], json!(0));
    assert_eq!(record["province"], json!("Massa-Carrara"));
    assert_eq!(record["municipalities"][0]["municipality"], json!("Massa"));
}

#[test]
fn search_ranks_abbreviations_first() {
    let geo = common::geopop();
    let hits = geo.search("MI");
    assert!(matches!(hits[0].item, SmartItem::Province(p) if p.province_code == 15));
    assert_eq!(hits[0].score, 100);

    let hits = geo.search("milano");
    let levels: Vec<&str> = hits
        .iter()
        .map(|h| match h.item {
            SmartItem::Region(_) => "region",
            SmartItem::Province(_) => "province",
            SmartItem::Municipality(_) => "municipality",
        })
        .collect();
    assert_eq!(levels, ["province", "municipality"]);

    let hits = geo.search("terme");
    let names: Vec<&str> = hits.iter().map(|h| h.item.name()).collect();
    assert_eq!(names, ["Agliano Terme", "Abano Terme"]);
    assert!(geo.search(" ").is_empty());
}

#[test]
fn substring_lookups_ignore_accents() {
    let geo = common::geopop();
    let names: Vec<&str> = geo
        .find_municipalities("AGLI")
        .into_iter()
        .map(|m| m.municipality.as_str())
        .collect();
    assert_eq!(names, ["Agliè", "Agliano Terme"]);
    assert_eq!(geo.find_municipalities("aglie").len(), 1);

    let provinces = geo.find_provinces("bozen");
    assert_eq!(provinces.len(), 1);
    assert_eq!(provinces[0].province_short, "BZ");
}
