// crates/geopop-core/src/geopop.rs
use crate::age::PopulationLimits;
use crate::common::{Level, SnapshotStats};
use crate::compose::ComposeOptions;
use crate::error::{GeopopError, Result};
use crate::frame::{ColumnFilter, Frame, Series};
use crate::loader;
use crate::model::{Municipality, Province, Region};
use crate::resolve::{self, Lookup};
use crate::search::{self, SmartHit};
use crate::snapshot::{IntegrityIssue, Snapshot};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Every knob of a query, deserializable from JSON or built in code.
///
/// ```rust
/// use geopop_core::{Level, QueryOptions};
///
/// let opts: QueryOptions = serde_json::from_str(
///     r#"{"level": "province", "population_limits": "total", "return_cols": ["population"]}"#,
/// ).unwrap();
/// assert_eq!(opts.level, Level::Province);
/// assert!(!opts.regex);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    pub level: Level,
    pub include_geometry: bool,
    pub population_limits: PopulationLimits,
    pub population_labels: Option<Vec<String>>,
    /// Columns to keep: names, or a single pattern when `regex` is set.
    pub return_cols: Option<Vec<String>>,
    pub regex: bool,
    /// Data year; the latest available when `None`.
    pub data_year: Option<u16>,
}

impl QueryOptions {
    pub fn new(level: Level) -> Self {
        QueryOptions {
            level,
            ..Default::default()
        }
    }

    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            level: self.level,
            include_geometry: self.include_geometry,
            population_limits: self.population_limits.clone(),
            population_labels: self.population_labels.clone(),
        }
    }

    pub fn column_filter(&self) -> Result<ColumnFilter> {
        ColumnFilter::from_options(self.return_cols.as_deref(), self.regex)
    }
}

/// Query service over one data year.
///
/// Cheap to clone; clones share the snapshot and its caches.
#[derive(Debug, Clone)]
pub struct Geopop {
    snapshot: Arc<Snapshot>,
    include_geometry: bool,
}

impl Geopop {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Geopop {
            snapshot,
            include_geometry: false,
        }
    }

    /// Latest year found in the default data directory.
    pub fn load() -> Result<Self> {
        Self::open(loader::default_data_dir(), None)
    }

    pub fn open(dir: impl AsRef<Path>, year: Option<u16>) -> Result<Self> {
        Ok(Self::new(loader::load_snapshot(dir, year)?))
    }

    /// Sets whether the convenience lookups (`from_*`) join geometry.
    pub fn with_geometry(mut self, include_geometry: bool) -> Self {
        self.include_geometry = include_geometry;
        self
    }

    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    pub fn year(&self) -> u16 {
        self.snapshot.year()
    }

    pub fn include_geometry(&self) -> bool {
        self.include_geometry
    }

    /// Default options of this service at `level`.
    pub fn options(&self, level: Level) -> QueryOptions {
        QueryOptions {
            level,
            include_geometry: self.include_geometry,
            data_year: Some(self.year()),
            ..Default::default()
        }
    }

    /// Composed table of a level, unfiltered and shared with the cache.
    ///
    /// Fails with [`GeopopError::InvalidArgument`] when `data_year` names a
    /// year other than the one this service was opened on.
    pub fn compose_table(&self, options: &QueryOptions) -> Result<Arc<Frame>> {
        self.check_year(options.data_year)?;
        self.snapshot.compose(&options.compose_options())
    }

    fn check_year(&self, requested: Option<u16>) -> Result<()> {
        match requested {
            Some(year) if year != self.year() => Err(GeopopError::invalid(format!(
                "data year {year} requested from a service holding {}",
                self.year()
            ))),
            _ => Ok(()),
        }
    }

    /// Composed table of a level with `return_cols` applied.
    pub fn compose(&self, options: &QueryOptions) -> Result<Frame> {
        let filter = options.column_filter()?;
        self.compose_table(options)?.select(&filter)
    }

    /// One row per input value, indexed like `series`.
    pub fn resolve(&self, series: &Series, options: &QueryOptions) -> Result<Frame> {
        let filter = options.column_filter()?;
        let table = self.compose_table(options)?;
        let index = self.snapshot.index(options.level, options.include_geometry);
        resolve::resolve(series, &index, &table)?.select(&filter)
    }

    /// [`resolve`](Self::resolve) with a free-text second pass for misses.
    pub fn smart_resolve(&self, series: &Series, options: &QueryOptions) -> Result<Frame> {
        let filter = options.column_filter()?;
        let table = self.compose_table(options)?;
        let index = self.snapshot.index(options.level, options.include_geometry);
        resolve::smart_resolve(series, &index, &table)?.select(&filter)
    }

    pub fn from_municipality(&self, series: &Series) -> Result<Frame> {
        self.resolve(series, &self.options(Level::Municipality))
    }

    pub fn from_province(&self, series: &Series) -> Result<Frame> {
        self.resolve(series, &self.options(Level::Province))
    }

    pub fn from_region(&self, series: &Series) -> Result<Frame> {
        self.resolve(series, &self.options(Level::Region))
    }

    pub fn smart_from_municipality(&self, series: &Series) -> Result<Frame> {
        self.smart_resolve(series, &self.options(Level::Municipality))
    }

    pub fn smart_from_province(&self, series: &Series) -> Result<Frame> {
        self.smart_resolve(series, &self.options(Level::Province))
    }

    pub fn smart_from_region(&self, series: &Series) -> Result<Frame> {
        self.smart_resolve(series, &self.options(Level::Region))
    }

    pub fn municipalities(&self) -> &[Municipality] {
        self.snapshot.municipalities()
    }

    pub fn provinces(&self) -> &[Province] {
        self.snapshot.provinces()
    }

    pub fn regions(&self) -> &[Region] {
        self.snapshot.regions()
    }

    /// Municipality by code, name or cadastral code.
    pub fn municipality(&self, key: &str) -> Option<&Municipality> {
        self.find(key, Level::Municipality)
            .and_then(|i| self.municipalities().get(i))
    }

    /// Province by code, name or abbreviation.
    pub fn province(&self, key: &str) -> Option<&Province> {
        self.find(key, Level::Province)
            .and_then(|i| self.provinces().get(i))
    }

    /// Region by code or name.
    pub fn region(&self, key: &str) -> Option<&Region> {
        self.find(key, Level::Region).and_then(|i| self.regions().get(i))
    }

    fn find(&self, key: &str, level: Level) -> Option<usize> {
        let lookup: Lookup = resolve::classify(&key.into(), level)?;
        self.snapshot.index(level, false).get(&lookup)
    }

    /// Municipalities whose name contains `q`, ignoring accents and case.
    pub fn find_municipalities(&self, q: &str) -> Vec<&Municipality> {
        search::find_by_substring(self.municipalities(), q)
    }

    pub fn find_provinces(&self, q: &str) -> Vec<&Province> {
        search::find_by_substring(self.provinces(), q)
    }

    pub fn search(&self, query: &str) -> Vec<SmartHit<'_>> {
        search::smart_search(&self.snapshot, query)
    }

    pub fn stats(&self) -> SnapshotStats {
        self.snapshot.stats()
    }

    pub fn validate(&self) -> Vec<IntegrityIssue> {
        self.snapshot.validate()
    }
}
