// crates/geopop-core/src/loader/catalog.rs
use crate::error::{GeopopError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

static YEAR_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})_").expect("static regex"));

/// Years with at least one `{year}_*` file in `dir`, ascending.
pub fn available_years(dir: impl AsRef<Path>) -> Result<Vec<u16>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| {
        GeopopError::NotFound(format!("Data directory {} unreadable: {}", dir.display(), e))
    })?;

    let mut years = BTreeSet::new();
    for entry in entries {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if let Some(year) = YEAR_PREFIX
            .captures(&name)
            .and_then(|c| c[1].parse::<u16>().ok())
        {
            years.insert(year);
        }
    }
    Ok(years.into_iter().collect())
}

pub fn latest_year(dir: impl AsRef<Path>) -> Result<u16> {
    let dir = dir.as_ref();
    available_years(dir)?
        .last()
        .copied()
        .ok_or_else(|| GeopopError::NotFound(format!("no data years in {}", dir.display())))
}

/// The requested year if available, else the latest one.
pub fn resolve_year(dir: &Path, requested: Option<u16>) -> Result<u16> {
    match requested {
        None => latest_year(dir),
        Some(year) => {
            let years = available_years(dir)?;
            if years.contains(&year) {
                Ok(year)
            } else {
                Err(GeopopError::invalid(format!(
                    "data year {year} is not available, choose one of {years:?}"
                )))
            }
        }
    }
}
