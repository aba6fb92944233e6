// crates/geopop-core/src/compose.rs
use crate::age::{total, LimitsKey, PopulationLimits};
use crate::aggregate::aggregate;
use crate::common::Level;
use crate::error::{GeopopError, Result};
use crate::frame::Frame;
use crate::model::{AgeCount, Municipality, POPULATION_COLUMNS};
use crate::traits::AdminRecord;
use serde::Deserialize;
use serde_json::Value;

/// Arguments of a compose query.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ComposeOptions {
    pub level: Level,
    pub include_geometry: bool,
    pub population_limits: PopulationLimits,
    pub population_labels: Option<Vec<String>>,
}

impl ComposeOptions {
    pub fn new(level: Level) -> Self {
        ComposeOptions {
            level,
            ..Default::default()
        }
    }

    pub fn with_geometry(mut self, include_geometry: bool) -> Self {
        self.include_geometry = include_geometry;
        self
    }

    pub fn with_limits(mut self, limits: PopulationLimits) -> Self {
        self.population_limits = limits;
        self
    }

    pub fn with_labels(mut self, labels: Option<Vec<String>>) -> Self {
        self.population_labels = labels;
        self
    }

    pub(crate) fn key(&self) -> ComposeKey {
        ComposeKey {
            level: self.level,
            include_geometry: self.include_geometry,
            limits: self.population_limits.key(),
            labels: self.population_labels.clone(),
        }
    }
}

/// Cache key of a composed table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ComposeKey {
    level: Level,
    include_geometry: bool,
    limits: LimitsKey,
    labels: Option<Vec<String>>,
}

/// Serializes records into a frame with [`AdminRecord::COLUMNS`], indexed
/// by the record code.
pub fn admin_frame<R: AdminRecord>(records: &[R]) -> Result<Frame> {
    let objects = records
        .iter()
        .map(|r| match serde_json::to_value(r)? {
            Value::Object(map) => Ok((r.label(), map)),
            other => Err(GeopopError::InvalidData(format!(
                "{} record {} did not serialize to an object: {other}",
                R::LEVEL,
                r.code()
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Frame::from_objects(None, R::COLUMNS, objects))
}

/// Population table for `options`, bucketed per municipality and rolled up
/// when the level is above municipality.
///
/// Bucketed modes also carry the three totals after the bucket columns, so
/// every composed table has `population`, `population_M` and `population_F`.
pub fn population_frame(
    options: &ComposeOptions,
    counts: &[AgeCount],
    municipalities: &[Municipality],
) -> Result<Frame> {
    let mut per_municipality = options
        .population_limits
        .apply(counts, options.population_labels.as_deref())?;
    if options.population_limits != PopulationLimits::Total {
        per_municipality = per_municipality.left_join(&total(counts)?);
    }
    aggregate(options.level, &per_municipality, municipalities)
}

/// Joins the administrative table of a level with optional geometry and a
/// population table.
///
/// The administrative population totals are dropped first, so the totals
/// always come from `population`. Row count and order are those of
/// `admin`; on a column collision the joined side wins.
pub fn compose_tables(admin: &Frame, geometry: Option<&Frame>, population: &Frame) -> Frame {
    let mut out = admin.drop_columns(&POPULATION_COLUMNS);
    if let Some(geometry) = geometry {
        out = out.left_join(geometry);
    }
    out.left_join(population)
}
