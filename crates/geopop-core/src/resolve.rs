// crates/geopop-core/src/resolve.rs

//! # Resolution
//!
//! Maps raw identifiers to rows of a composed table. Every input yields
//! exactly one output row under the input's own label; values that match
//! nothing, or match several rows, yield a row of missing values.

use crate::common::Level;
use crate::error::Result;
use crate::frame::{Frame, IndexLabel, RawValue, Series};
use crate::index::LevelIndex;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static CADASTRAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][0-9]{3}$").expect("static regex"));

/// A classified raw identifier, ready for index lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    NumericCode(i64),
    /// Uppercased two-letter province abbreviation.
    ShortCode(String),
    /// Lowercased cadastral code.
    CadastralCode(String),
    /// Lowercased display name.
    Name(String),
}

/// Classifies a raw value for lookup at `level`.
///
/// Steps, first hit wins:
/// 1. numeric values, and text parsing to a finite number, are truncated
///    to an integer code;
/// 2. at province level, text of exactly two characters is an abbreviation;
/// 3. at municipality level, one letter followed by three digits is a
///    cadastral code;
/// 4. anything else is a name.
///
/// Text is stripped first. Missing values classify to `None`.
///
/// ```rust
/// use geopop_core::common::Level;
/// use geopop_core::frame::RawValue;
/// use geopop_core::resolve::{classify, Lookup};
///
/// let raw = RawValue::from(" 1001.0 ");
/// assert_eq!(classify(&raw, Level::Municipality), Some(Lookup::NumericCode(1001)));
/// let raw = RawValue::from("to");
/// assert_eq!(classify(&raw, Level::Province), Some(Lookup::ShortCode("TO".into())));
/// ```
pub fn classify(raw: &RawValue, level: Level) -> Option<Lookup> {
    let text = match raw {
        RawValue::Missing => return None,
        RawValue::Int(v) => return Some(Lookup::NumericCode(*v)),
        RawValue::Float(v) if v.is_finite() => return Some(Lookup::NumericCode(v.trunc() as i64)),
        RawValue::Float(v) => v.to_string(),
        RawValue::Text(s) => s.trim().to_owned(),
    };

    if let Ok(v) = text.parse::<f64>() {
        if v.is_finite() {
            return Some(Lookup::NumericCode(v.trunc() as i64));
        }
    }
    if level == Level::Province && text.chars().count() == 2 {
        return Some(Lookup::ShortCode(text.to_uppercase()));
    }
    if level == Level::Municipality && CADASTRAL.is_match(&text) {
        return Some(Lookup::CadastralCode(text.to_lowercase()));
    }
    Some(Lookup::Name(text.to_lowercase()))
}

/// Row position for a lookup, treating keys shared by several rows as a
/// miss.
fn unique_position(
    index: &LevelIndex,
    lookup: &Lookup,
    raw: &dyn std::fmt::Display,
) -> Option<usize> {
    match index.positions(lookup) {
        [] => None,
        [single] => Some(*single),
        many => {
            log::warn!(
                "{:?} matches {} {} rows, returning missing values",
                raw.to_string(),
                many.len(),
                index.level()
            );
            None
        }
    }
}

fn assemble(table: &Frame, labels: &[IndexLabel], hits: &[Option<usize>]) -> Result<Frame> {
    let mut out = Frame::new(None, table.columns().to_vec());
    for (label, hit) in labels.iter().zip(hits) {
        match hit.and_then(|i| table.row(i)) {
            Some(row) => out.push_row(label.clone(), row.to_vec())?,
            None => out.push_missing(label.clone()),
        }
    }
    Ok(out)
}

fn direct_hits(series: &Series, index: &LevelIndex) -> Vec<Option<usize>> {
    let mut memo: HashMap<Lookup, Option<usize>> = HashMap::new();
    series
        .values()
        .iter()
        .map(|raw| {
            let lookup = classify(raw, index.level())?;
            if let Some(hit) = memo.get(&lookup) {
                return *hit;
            }
            let hit = unique_position(index, &lookup, raw);
            memo.insert(lookup, hit);
            hit
        })
        .collect()
}

/// Resolves every value of `series` against `table`.
///
/// `table` must have the row order `index` was built from. The output has
/// the columns of `table` and the labels of `series`; identical values are
/// looked up once.
pub fn resolve(series: &Series, index: &LevelIndex, table: &Frame) -> Result<Frame> {
    debug_assert_eq!(index.len(), table.len());
    let hits = direct_hits(series, index);
    assemble(table, series.index(), &hits)
}

/// Like [`resolve`], then gives every missed text value a second chance
/// through the free-text [`Disambiguator`](crate::text::Disambiguator).
///
/// ```text
/// "Comune di Abano Terme"  ->  row of "abano terme"
/// ```
pub fn smart_resolve(series: &Series, index: &LevelIndex, table: &Frame) -> Result<Frame> {
    debug_assert_eq!(index.len(), table.len());
    let mut hits = direct_hits(series, index);

    let mut memo: HashMap<String, Option<usize>> = HashMap::new();
    for (hit, raw) in hits.iter_mut().zip(series.values()) {
        if hit.is_some() {
            continue;
        }
        let RawValue::Text(text) = raw else {
            continue;
        };
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            continue;
        }
        if let Some(found) = memo.get(&text) {
            *hit = *found;
            continue;
        }
        let found = index.disambiguator().find(&text).and_then(|name| {
            unique_position(index, &Lookup::Name(name.to_owned()), &text)
        });
        memo.insert(text, found);
        *hit = found;
    }

    assemble(table, series.index(), &hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_order() {
        let m = Level::Municipality;
        let p = Level::Province;
        assert_eq!(classify(&RawValue::from(1001), m), Some(Lookup::NumericCode(1001)));
        assert_eq!(classify(&RawValue::from(1001.9), m), Some(Lookup::NumericCode(1001)));
        assert_eq!(classify(&RawValue::from("  agliè "), m), Some(Lookup::Name("agliè".into())));
        assert_eq!(
            classify(&RawValue::from("A074"), m),
            Some(Lookup::CadastralCode("a074".into()))
        );
        assert_eq!(classify(&RawValue::from("A074"), p), Some(Lookup::Name("a074".into())));
        assert_eq!(classify(&RawValue::from("to"), m), Some(Lookup::Name("to".into())));
        assert_eq!(classify(&RawValue::from(" To "), p), Some(Lookup::ShortCode("TO".into())));
        assert_eq!(classify(&RawValue::from("12"), p), Some(Lookup::NumericCode(12)));
        assert_eq!(classify(&RawValue::Missing, p), None);
    }

    #[test]
    fn non_finite_numbers_fall_back_to_names() {
        assert_eq!(
            classify(&RawValue::from(f64::INFINITY), Level::Region),
            Some(Lookup::Name("inf".into()))
        );
        assert_eq!(
            classify(&RawValue::from("nan"), Level::Region),
            Some(Lookup::Name("nan".into()))
        );
    }
}
