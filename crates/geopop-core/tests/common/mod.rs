// Shared in-memory fixture: a handful of real municipalities spread over
// seven regions, with a synthetic age table consistent with their totals.
#![allow(dead_code)]

use geopop_core::{AgeCount, Geopop, Municipality, Snapshot};
use std::sync::Arc;

pub const YEAR: u16 = 2022;

pub const AGES: [u32; 6] = [1, 7, 15, 40, 70, 90];

type Row = (u32, &'static str, &'static str, u32, &'static str, &'static str, u32, &'static str);

pub const ROWS: [Row; 10] = [
    (1001, "Agliè", "A074", 1, "Torino", "TO", 1, "Piemonte"),
    (1002, "Airasca", "A109", 1, "Torino", "TO", 1, "Piemonte"),
    (5001, "Agliano Terme", "A072", 5, "Asti", "AT", 1, "Piemonte"),
    (15146, "Milano", "F205", 15, "Milano", "MI", 3, "Lombardia"),
    (21008, "Bolzano/Bozen", "A952", 21, "Bolzano/Bozen", "BZ", 4, "Trentino-Alto Adige/Südtirol"),
    (23091, "Verona", "L781", 23, "Verona", "VR", 5, "Veneto"),
    (28001, "Abano Terme", "A001", 28, "Padova", "PD", 5, "Veneto"),
    (35033, "Reggio nell'Emilia", "H223", 35, "Reggio nell'Emilia", "RE", 8, "Emilia-Romagna"),
    (45010, "Massa", "F023", 45, "Massa-Carrara", "MS", 9, "Toscana"),
    (60038, "Frosinone", "D810", 60, "Frosinone", "FR", 12, "Lazio"),
];

/// Residents of `code` aged `age`, split by sex.
pub fn residents(code: u32, age: u32) -> (f64, f64) {
    let base = f64::from(code % 97);
    (base + f64::from(age % 7), base + f64::from(age % 5))
}

pub fn counts() -> Vec<AgeCount> {
    let mut out = Vec::new();
    for row in ROWS {
        for age in AGES {
            let (f, m) = residents(row.0, age);
            out.push(AgeCount::new(row.0, age, f, m));
        }
    }
    out
}

pub fn municipality(row: Row) -> Municipality {
    let (female, male) = AGES
        .iter()
        .map(|&age| residents(row.0, age))
        .fold((0.0, 0.0), |(f, m), (af, am)| (f + af, m + am));
    Municipality {
        municipality_code: row.0,
        municipality: row.1.into(),
        cadastral_code: row.2.into(),
        province_code: row.3,
        province: row.4.into(),
        province_short: row.5.into(),
        region_code: Some(row.6),
        region: Some(row.7.into()),
        population: Some(female + male),
        population_f: Some(female),
        population_m: Some(male),
    }
}

pub fn municipalities() -> Vec<Municipality> {
    ROWS.into_iter().map(municipality).collect()
}

pub fn snapshot() -> Snapshot {
    Snapshot::from_tables(YEAR, municipalities(), counts())
}

pub fn geopop() -> Geopop {
    Geopop::new(Arc::new(snapshot()))
}

pub fn total_population() -> f64 {
    municipalities().iter().filter_map(|m| m.population).sum()
}
