// crates/geopop-core/src/snapshot.rs

//! # Snapshot
//!
//! All tables of one data year. The source tables never change after
//! construction; everything derived from them (rollups, indices, composed
//! tables) is computed on first use and cached on the snapshot.

use crate::common::{Level, SnapshotStats};
use crate::compose::{
    admin_frame, compose_tables, population_frame, ComposeKey, ComposeOptions,
};
use crate::error::{GeopopError, Result};
use crate::frame::Frame;
use crate::index::LevelIndex;
use crate::model::{rollup_administrative, AgeCount, Municipality, Province, Region};
use once_cell::sync::OnceCell;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Number of Italian regions.
pub const EXPECTED_REGIONS: usize = 20;
/// Number of Italian provinces and equivalent bodies.
pub const EXPECTED_PROVINCES: usize = 107;

/// A data-quality finding reported by [`Snapshot::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityIssue {
    /// `population` differs from `population_F + population_M` after rounding.
    PopulationMismatch {
        municipality_code: u32,
        population: f64,
        female: f64,
        male: f64,
    },
    UnexpectedCount {
        level: Level,
        expected: usize,
        found: usize,
    },
    /// A municipality points at a province or region code that does not
    /// resolve to exactly one record.
    DanglingReference {
        municipality_code: u32,
        level: Level,
        code: Option<u32>,
    },
    /// A key shared by several rows of a level.
    DuplicateKey { level: Level, key: String },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::PopulationMismatch {
                municipality_code,
                population,
                female,
                male,
            } => write!(
                f,
                "municipality {municipality_code}: population {population} != {female} F + {male} M"
            ),
            IntegrityIssue::UnexpectedCount {
                level,
                expected,
                found,
            } => write!(f, "expected {expected} {}, found {found}", level.plural()),
            IntegrityIssue::DanglingReference {
                municipality_code,
                level,
                code: Some(code),
            } => write!(
                f,
                "municipality {municipality_code}: {level} code {code} is not exactly one {level}"
            ),
            IntegrityIssue::DanglingReference {
                municipality_code,
                level,
                code: None,
            } => write!(f, "municipality {municipality_code}: missing {level} code"),
            IntegrityIssue::DuplicateKey { level, key } => {
                write!(f, "{level} key {key:?} is shared by several rows")
            }
        }
    }
}

type Rollup = (Vec<Province>, Vec<Region>);

/// Tables of one data year plus their lazily built derivatives.
pub struct Snapshot {
    year: u16,
    municipalities: Vec<Municipality>,
    population: Vec<AgeCount>,
    geometry_dir: Option<PathBuf>,
    geometry: [OnceCell<Frame>; 3],
    rollup: OnceCell<Rollup>,
    admin: [OnceCell<Frame>; 3],
    indices: RwLock<HashMap<(Level, bool), Arc<LevelIndex>>>,
    composed: RwLock<HashMap<ComposeKey, Arc<Frame>>>,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("year", &self.year)
            .field("municipalities", &self.municipalities.len())
            .field("population", &self.population.len())
            .field("geometry_dir", &self.geometry_dir)
            .finish_non_exhaustive()
    }
}

impl Snapshot {
    /// Builds a snapshot from in-memory tables. Geometry is absent until
    /// attached with [`Snapshot::with_geometry`].
    pub fn from_tables(
        year: u16,
        municipalities: Vec<Municipality>,
        population: Vec<AgeCount>,
    ) -> Self {
        Snapshot {
            year,
            municipalities,
            population,
            geometry_dir: None,
            geometry: Default::default(),
            rollup: OnceCell::new(),
            admin: Default::default(),
            indices: RwLock::new(HashMap::new()),
            composed: RwLock::new(HashMap::new()),
        }
    }

    /// Attaches a geometry table (one `geometry` column, indexed by code).
    pub fn with_geometry(mut self, level: Level, geometry: Frame) -> Self {
        self.geometry[level.slot()] = OnceCell::from(geometry);
        self
    }

    /// Directory holding the `limits_IT_*.geojson` files, read on demand.
    pub(crate) fn with_geometry_dir(mut self, dir: PathBuf) -> Self {
        self.geometry_dir = Some(dir);
        self
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn municipalities(&self) -> &[Municipality] {
        &self.municipalities
    }

    /// Long population table.
    pub fn population(&self) -> &[AgeCount] {
        &self.population
    }

    fn rollup(&self) -> &Rollup {
        self.rollup.get_or_init(|| {
            log::debug!(
                "rolling up {} municipalities of {}",
                self.municipalities.len(),
                self.year
            );
            rollup_administrative(&self.municipalities)
        })
    }

    pub fn provinces(&self) -> &[Province] {
        &self.rollup().0
    }

    pub fn regions(&self) -> &[Region] {
        &self.rollup().1
    }

    /// Administrative table of a level, population totals included.
    pub fn admin_frame(&self, level: Level) -> Result<&Frame> {
        self.admin[level.slot()].get_or_try_init(|| match level {
            Level::Municipality => admin_frame(self.municipalities()),
            Level::Province => admin_frame(self.provinces()),
            Level::Region => admin_frame(self.regions()),
        })
    }

    /// Geometry table of a level.
    ///
    /// Fails with [`GeopopError::NotFound`] when the snapshot has neither an
    /// attached table nor a data directory with the boundary file.
    pub fn geometry(&self, level: Level) -> Result<&Frame> {
        self.geometry[level.slot()].get_or_try_init(|| match &self.geometry_dir {
            Some(dir) => crate::loader::load_geometry(dir, level),
            None => Err(GeopopError::NotFound(format!(
                "no geometry available for {} in {}",
                level.plural(),
                self.year
            ))),
        })
    }

    /// Lookup index of a level, built on first use.
    ///
    /// Geometry never changes row order or keys, so both variants index
    /// the same positions.
    pub fn index(&self, level: Level, include_geometry: bool) -> Arc<LevelIndex> {
        let key = (level, include_geometry);
        if let Some(hit) = self.indices.read().ok().and_then(|m| m.get(&key).cloned()) {
            return hit;
        }

        let built = Arc::new(match level {
            Level::Municipality => LevelIndex::build(self.municipalities()),
            Level::Province => LevelIndex::build(self.provinces()),
            Level::Region => LevelIndex::build(self.regions()),
        });
        log::debug!("built {level} index for {} ({} rows)", self.year, built.len());
        match self.indices.write() {
            Ok(mut map) => map.entry(key).or_insert(built).clone(),
            Err(_) => built,
        }
    }

    /// Administrative, geometry and population tables of a level joined
    /// into one, cached per argument set.
    pub fn compose(&self, options: &ComposeOptions) -> Result<Arc<Frame>> {
        let key = options.key();
        if let Some(hit) = self.composed.read().ok().and_then(|m| m.get(&key).cloned()) {
            return Ok(hit);
        }

        let admin = self.admin_frame(options.level)?;
        let geometry = if options.include_geometry {
            Some(self.geometry(options.level)?)
        } else {
            None
        };
        let population = population_frame(options, &self.population, &self.municipalities)?;
        let built = Arc::new(compose_tables(admin, geometry, &population));
        log::debug!(
            "composed {} table for {}: {} rows x {} columns",
            options.level,
            self.year,
            built.len(),
            built.columns().len()
        );

        Ok(match self.composed.write() {
            Ok(mut map) => map.entry(key).or_insert(built).clone(),
            Err(_) => built,
        })
    }

    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            year: self.year,
            regions: self.regions().len(),
            provinces: self.provinces().len(),
            municipalities: self.municipalities.len(),
            population_rows: self.population.len(),
        }
    }

    /// Checks the snapshot against the invariants of the administrative
    /// data. Every issue is also logged as a warning; none is fatal.
    pub fn validate(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        for m in &self.municipalities {
            if m.population_mismatch() {
                issues.push(IntegrityIssue::PopulationMismatch {
                    municipality_code: m.municipality_code,
                    population: m.population.unwrap_or_default(),
                    female: m.population_f.unwrap_or_default(),
                    male: m.population_m.unwrap_or_default(),
                });
            }
        }

        for (level, expected, found) in [
            (Level::Region, EXPECTED_REGIONS, self.regions().len()),
            (Level::Province, EXPECTED_PROVINCES, self.provinces().len()),
        ] {
            if expected != found {
                issues.push(IntegrityIssue::UnexpectedCount {
                    level,
                    expected,
                    found,
                });
            }
        }

        let province_counts = count_codes(self.provinces().iter().map(|p| p.province_code));
        let region_counts = count_codes(self.regions().iter().map(|r| r.region_code));
        for m in &self.municipalities {
            if province_counts.get(&m.province_code) != Some(&1) {
                issues.push(IntegrityIssue::DanglingReference {
                    municipality_code: m.municipality_code,
                    level: Level::Province,
                    code: Some(m.province_code),
                });
            }
            let region_ok = m
                .region_code
                .is_some_and(|code| region_counts.get(&code) == Some(&1));
            if !region_ok {
                issues.push(IntegrityIssue::DanglingReference {
                    municipality_code: m.municipality_code,
                    level: Level::Region,
                    code: m.region_code,
                });
            }
        }

        for (level, keys) in [
            (
                Level::Municipality,
                duplicates(self.municipalities.iter().map(|m| m.cadastral_code.to_lowercase())),
            ),
            (
                Level::Province,
                duplicates(self.provinces().iter().map(|p| p.province_short.to_uppercase())),
            ),
        ] {
            issues.extend(keys.into_iter().map(|key| IntegrityIssue::DuplicateKey { level, key }));
        }

        for issue in &issues {
            log::warn!("{}: {issue}", self.year);
        }
        issues
    }
}

fn count_codes<I: IntoIterator<Item = u32>>(codes: I) -> HashMap<u32, usize> {
    let mut counts = HashMap::new();
    for code in codes {
        *counts.entry(code).or_insert(0) += 1;
    }
    counts
}

fn duplicates<I: IntoIterator<Item = String>>(keys: I) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut dup = BTreeSet::new();
    for key in keys {
        if !seen.insert(key.clone()) {
            dup.insert(key);
        }
    }
    dup
}
