// crates/geopop-core/src/age.rs

//! # Age buckets
//!
//! Re-bins the long population table (one row per municipality and age)
//! into wide per-bucket columns split by sex.
//!
//! Cutoffs are half-open intervals `[lower, upper)`. With the default
//! cutoffs a municipality row gets the columns
//!
//! ```text
//! <3_F 3-11_F ... >=75_F   <3_M 3-11_M ... >=75_M   <3 3-11 ... >=75
//! ```

use crate::error::{GeopopError, Result};
use crate::frame::{Frame, IndexLabel};
use crate::model::AgeCount;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Interior cutoffs used by [`PopulationLimits::Auto`].
pub const DEFAULT_LIMITS: [f64; 7] = [3.0, 11.0, 19.0, 25.0, 50.0, 65.0, 75.0];

/// Largest accepted cutoff.
pub const MAX_AGE_LIMIT: i64 = 100;

/// Column names of the `total` population mode, in output order.
pub const TOTAL_COLUMNS: [&str; 3] = ["population", "population_M", "population_F"];

/// Sorted, de-duplicated cutoffs `0 < l1 < ... < lk`, implicitly bounded by
/// `0` and `+inf`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AgeCutoffs {
    interior: Vec<u32>,
}

impl AgeCutoffs {
    pub fn interior(&self) -> &[u32] {
        &self.interior
    }

    /// Full boundary list, `0` first and `+inf` last.
    pub fn boundaries(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(self.interior.iter().map(|&v| f64::from(v)))
            .chain(std::iter::once(f64::INFINITY))
            .collect()
    }

    /// Number of buckets, always at least one.
    pub fn buckets(&self) -> usize {
        self.interior.len() + 1
    }

    /// Bucket position of `age` under right-open intervals.
    pub fn bucket_of(&self, age: u32) -> usize {
        self.interior.partition_point(|&c| c <= age)
    }
}

impl fmt::Display for AgeCutoffs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[0")?;
        for v in &self.interior {
            write!(f, ", {v}")?;
        }
        f.write_str(", inf]")
    }
}

/// Turns raw user limits into [`AgeCutoffs`].
///
/// Values are truncated to integers and de-duplicated. Limits above
/// [`MAX_AGE_LIMIT`], at or below zero, or not finite are dropped with a
/// warning.
///
/// ```rust
/// use geopop_core::age::prepare_limits;
///
/// let cutoffs = prepare_limits(&[150.0, -5.0, 40.0, 40.0, 60.0]);
/// assert_eq!(cutoffs.interior(), &[40, 60]);
/// assert_eq!(cutoffs.boundaries(), vec![0.0, 40.0, 60.0, f64::INFINITY]);
/// ```
pub fn prepare_limits(raw_limits: &[f64]) -> AgeCutoffs {
    let mut kept = BTreeSet::new();
    for &raw in raw_limits {
        if !raw.is_finite() {
            log::warn!("age limit {raw} is not a number, it will be ignored");
            continue;
        }
        let limit = raw.trunc() as i64;
        if limit > MAX_AGE_LIMIT {
            log::warn!("ages above {MAX_AGE_LIMIT} are not supported, {limit} will be ignored");
        } else if limit <= 0 {
            log::warn!("ages <= 0 are not supported, {limit} will be ignored");
        } else {
            kept.insert(limit as u32);
        }
    }
    AgeCutoffs {
        interior: kept.into_iter().collect(),
    }
}

/// Default bucket labels for a cutoff set: `<upper` for the first bucket,
/// `>=lower` for the last and `lower-upper` in between.
///
/// A cutoff set without interior limits has the single label `<inf`.
///
/// ```rust
/// use geopop_core::age::{generate_labels, prepare_limits};
///
/// let labels = generate_labels(&prepare_limits(&[40.0, 60.0]));
/// assert_eq!(labels, ["<40", "40-60", ">=60"]);
/// ```
pub fn generate_labels(cutoffs: &AgeCutoffs) -> Vec<String> {
    let bounds = cutoffs.boundaries();
    let n = bounds.len() - 1;
    bounds
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (lower, upper) = (pair[0], pair[1]);
            if i == 0 {
                format!("<{upper}")
            } else if i + 1 == n {
                format!(">={lower}")
            } else {
                format!("{lower}-{upper}")
            }
        })
        .collect()
}

/// Checks caller-supplied labels against the bucket count, or generates
/// the defaults.
pub fn resolve_labels(cutoffs: &AgeCutoffs, labels: Option<&[String]>) -> Result<Vec<String>> {
    match labels {
        None => Ok(generate_labels(cutoffs)),
        Some(labels) if labels.len() == cutoffs.buckets() => Ok(labels.to_vec()),
        Some(labels) => Err(GeopopError::invalid(format!(
            "{} population labels given for {} age buckets {cutoffs}",
            labels.len(),
            cutoffs.buckets()
        ))),
    }
}

#[derive(Default, Clone, Copy)]
struct Sums {
    female: f64,
    male: f64,
    total: f64,
}

impl Sums {
    fn add(&mut self, row: &AgeCount) {
        self.female += row.female.unwrap_or(0.0);
        self.male += row.male.unwrap_or(0.0);
        self.total += row.total.unwrap_or(0.0);
    }
}

fn f64_cell(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Pivots the long table into one row per municipality.
///
/// Columns are every `{label}_F`, then every `{label}_M`, then every
/// `{label}`. Rows are sorted by municipality code and indexed by it.
/// A bucket with no residents is `0`, never missing.
pub fn bucket(counts: &[AgeCount], cutoffs: &AgeCutoffs, labels: &[String]) -> Result<Frame> {
    if labels.len() != cutoffs.buckets() {
        return Err(GeopopError::invalid(format!(
            "{} population labels given for {} age buckets {cutoffs}",
            labels.len(),
            cutoffs.buckets()
        )));
    }

    let n = cutoffs.buckets();
    let mut groups: BTreeMap<u32, Vec<Sums>> = BTreeMap::new();
    for row in counts {
        let sums = groups
            .entry(row.municipality_code)
            .or_insert_with(|| vec![Sums::default(); n]);
        sums[cutoffs.bucket_of(row.age)].add(row);
    }

    let columns = labels
        .iter()
        .map(|l| format!("{l}_F"))
        .chain(labels.iter().map(|l| format!("{l}_M")))
        .chain(labels.iter().cloned())
        .collect();
    let mut frame = Frame::new(Some("municipality_code"), columns);
    for (code, sums) in groups {
        let row = sums
            .iter()
            .map(|s| f64_cell(s.female))
            .chain(sums.iter().map(|s| f64_cell(s.male)))
            .chain(sums.iter().map(|s| f64_cell(s.total)))
            .collect();
        frame.push_row(IndexLabel::from(code), row)?;
    }
    Ok(frame)
}

/// Per-municipality totals: `population`, `population_M`, `population_F`.
pub fn total(counts: &[AgeCount]) -> Result<Frame> {
    let mut groups: BTreeMap<u32, Sums> = BTreeMap::new();
    for row in counts {
        groups.entry(row.municipality_code).or_default().add(row);
    }

    let columns = TOTAL_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut frame = Frame::new(Some("municipality_code"), columns);
    for (code, s) in groups {
        frame.push_row(
            IndexLabel::from(code),
            vec![f64_cell(s.total), f64_cell(s.male), f64_cell(s.female)],
        )?;
    }
    Ok(frame)
}

/// How population is attached to a composed table.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PopulationLimits {
    /// Default age buckets, see [`DEFAULT_LIMITS`].
    #[default]
    Auto,
    /// No age split, only the three totals.
    Total,
    /// Caller supplied interior limits.
    Custom(Vec<f64>),
}

impl PopulationLimits {
    /// Cutoffs for a bucketed mode, `None` for [`PopulationLimits::Total`].
    pub fn cutoffs(&self) -> Option<AgeCutoffs> {
        match self {
            PopulationLimits::Auto => Some(prepare_limits(&DEFAULT_LIMITS)),
            PopulationLimits::Total => None,
            PopulationLimits::Custom(v) => Some(prepare_limits(v)),
        }
    }

    /// Builds the municipality-level population table for this mode.
    pub fn apply(&self, counts: &[AgeCount], labels: Option<&[String]>) -> Result<Frame> {
        match self.cutoffs() {
            None => total(counts),
            Some(cutoffs) => {
                let labels = resolve_labels(&cutoffs, labels)?;
                bucket(counts, &cutoffs, &labels)
            }
        }
    }

    /// Hashable cache key; custom limits are keyed by their prepared
    /// cutoffs so equivalent inputs share an entry.
    pub(crate) fn key(&self) -> LimitsKey {
        match self {
            PopulationLimits::Total => LimitsKey::Total,
            other => LimitsKey::Buckets(other.cutoffs().unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum LimitsKey {
    Total,
    Buckets(AgeCutoffs),
}

impl fmt::Display for PopulationLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopulationLimits::Auto => f.write_str("auto"),
            PopulationLimits::Total => f.write_str("total"),
            PopulationLimits::Custom(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl FromStr for PopulationLimits {
    type Err = GeopopError;

    /// `"auto"`, `"total"` or a comma-separated list of numbers.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "auto" => return Ok(PopulationLimits::Auto),
            "total" => return Ok(PopulationLimits::Total),
            _ => {}
        }
        trimmed
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(PopulationLimits::Custom)
            .map_err(|_| {
                GeopopError::invalid(format!(
                    "population_limits must be \"auto\", \"total\" or a list of ages (got {s:?})"
                ))
            })
    }
}

impl Serialize for PopulationLimits {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            PopulationLimits::Custom(values) => values.serialize(serializer),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for PopulationLimits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Literal(String),
            Limits(Vec<f64>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Literal(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Limits(v) => Ok(PopulationLimits::Custom(v)),
        }
    }
}
