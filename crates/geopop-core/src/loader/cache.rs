// crates/geopop-core/src/loader/cache.rs

//! Bincode cache of the parsed source tables, one file per data year.

use crate::error::{GeopopError, Result};
use crate::model::{AgeCount, Municipality};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "compact")]
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

/// Bumped whenever [`CachedTables`] changes shape.
pub const CACHE_FORMAT: u32 = 1;

pub const CACHE_SUFFIX: &str = "snapshot.bin";

/// What goes into `{year}.snapshot.bin`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CachedTables {
    pub format: u32,
    pub year: u16,
    pub municipalities: Vec<Municipality>,
    pub population: Vec<AgeCount>,
}

pub fn cache_path(dir: &Path, year: u16) -> PathBuf {
    dir.join(format!("{year}.{CACHE_SUFFIX}"))
}

/// The cache is fresh when it exists and no source file is newer.
pub fn is_cache_fresh(sources: &[&Path], cache_path: &Path) -> bool {
    let cache_time = match fs::metadata(cache_path).and_then(|m| m.modified()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    for source in sources {
        if let Ok(source_time) = fs::metadata(source).and_then(|m| m.modified()) {
            if source_time > cache_time {
                return false;
            }
        }
    }
    true
}

pub fn read_cache(path: &Path, year: u16) -> Result<CachedTables> {
    let file = File::open(path).map_err(GeopopError::Io)?;
    let reader = BufReader::new(file);

    #[cfg(feature = "compact")]
    let mut decoder: Box<dyn Read> = Box::new(GzDecoder::new(reader));
    #[cfg(not(feature = "compact"))]
    let mut decoder: Box<dyn Read> = Box::new(reader);

    let tables: CachedTables =
        bincode::deserialize_from(&mut decoder).map_err(GeopopError::Bincode)?;
    if tables.format != CACHE_FORMAT || tables.year != year {
        return Err(GeopopError::InvalidData(format!(
            "stale cache {} (format {}, year {})",
            path.display(),
            tables.format,
            tables.year
        )));
    }
    Ok(tables)
}

pub fn write_cache(path: &Path, tables: &CachedTables) -> Result<()> {
    let file = File::create(path).map_err(GeopopError::Io)?;
    let writer = BufWriter::new(file);

    #[cfg(feature = "compact")]
    let mut encoder: Box<dyn Write> = Box::new(GzEncoder::new(writer, Compression::default()));
    #[cfg(not(feature = "compact"))]
    let mut encoder: Box<dyn Write> = Box::new(writer);

    bincode::serialize_into(&mut encoder, tables).map_err(GeopopError::Bincode)?;
    encoder.flush().map_err(GeopopError::Io)?;
    Ok(())
}
