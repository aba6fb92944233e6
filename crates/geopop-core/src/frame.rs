// crates/geopop-core/src/frame.rs

//! # Tables
//!
//! [`Frame`] is the homogeneous table every query returns: an ordered index
//! of [`IndexLabel`]s, a list of named columns and one row of JSON cells per
//! label. A missing value is `Value::Null`, so a row for an unresolved input
//! has exactly the same shape as a found one.
//!
//! [`Series`] is the input side: raw values to resolve, each carrying the
//! label it must keep in the output.

use crate::error::{GeopopError, Result};
use regex::Regex;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Row label of a [`Frame`] or [`Series`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexLabel {
    Int(i64),
    Str(String),
}

impl From<i64> for IndexLabel {
    fn from(value: i64) -> Self {
        IndexLabel::Int(value)
    }
}

impl From<u32> for IndexLabel {
    fn from(value: u32) -> Self {
        IndexLabel::Int(i64::from(value))
    }
}

impl From<usize> for IndexLabel {
    fn from(value: usize) -> Self {
        IndexLabel::Int(value as i64)
    }
}

impl From<&str> for IndexLabel {
    fn from(value: &str) -> Self {
        IndexLabel::Str(value.to_owned())
    }
}

impl From<String> for IndexLabel {
    fn from(value: String) -> Self {
        IndexLabel::Str(value)
    }
}

impl fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexLabel::Int(v) => write!(f, "{v}"),
            IndexLabel::Str(v) => f.write_str(v),
        }
    }
}

/// Which columns a query should return.
#[derive(Debug, Clone, Default)]
pub enum ColumnFilter {
    #[default]
    All,
    /// Explicit list, returned in the given order. Unknown names are errors.
    Columns(Vec<String>),
    /// Keep every column whose whole name matches the pattern.
    Pattern(Regex),
}

impl ColumnFilter {
    /// Builds a filter from the `return_cols` / `regex` option pair.
    ///
    /// With `regex = true` exactly one entry is expected and it is compiled
    /// with full-match semantics.
    pub fn from_options(return_cols: Option<&[String]>, regex: bool) -> Result<Self> {
        let Some(cols) = return_cols else {
            return Ok(ColumnFilter::All);
        };
        if !regex {
            return Ok(ColumnFilter::Columns(cols.to_vec()));
        }
        match cols {
            [pattern] => Self::pattern(pattern),
            _ => Err(GeopopError::invalid(format!(
                "regex column filter expects exactly one pattern, got {}",
                cols.len()
            ))),
        }
    }

    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(&format!("^(?:{pattern})$"))
            .map(ColumnFilter::Pattern)
            .map_err(|e| GeopopError::invalid(format!("bad column pattern {pattern:?}: {e}")))
    }
}

/// A small row-major table with labelled rows and named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index_name: Option<String>,
    index: Vec<IndexLabel>,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new(index_name: Option<&str>, columns: Vec<String>) -> Self {
        Frame {
            index_name: index_name.map(str::to_owned),
            index: Vec::new(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a frame from already serialized records, taking `columns` from
    /// each JSON object in order. Absent keys become missing cells.
    pub fn from_objects<I>(index_name: Option<&str>, columns: &[&str], records: I) -> Self
    where
        I: IntoIterator<Item = (IndexLabel, Map<String, Value>)>,
    {
        let mut frame = Frame::new(index_name, columns.iter().map(|c| c.to_string()).collect());
        for (label, mut obj) in records {
            let row = columns
                .iter()
                .map(|c| obj.remove(*c).unwrap_or(Value::Null))
                .collect();
            frame.index.push(label);
            frame.rows.push(row);
        }
        frame
    }

    pub fn push_row(&mut self, label: IndexLabel, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(GeopopError::InvalidData(format!(
                "row {label} has {} values, frame has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        self.index.push(label);
        self.rows.push(values);
        Ok(())
    }

    /// Appends a row of missing values.
    pub fn push_missing(&mut self, label: IndexLabel) {
        self.index.push(label);
        self.rows.push(vec![Value::Null; self.columns.len()]);
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn index(&self) -> &[IndexLabel] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, i: usize) -> Option<&[Value]> {
        self.rows.get(i).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&IndexLabel, &[Value])> {
        self.index.iter().zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Cell at row `i` in `column`.
    pub fn get(&self, i: usize, column: &str) -> Option<&Value> {
        let pos = self.column_position(column)?;
        self.rows.get(i).map(|r| &r[pos])
    }

    /// Cell of the first row labelled `label` in `column`.
    pub fn get_by_label(&self, label: &IndexLabel, column: &str) -> Option<&Value> {
        let i = self.index.iter().position(|l| l == label)?;
        self.get(i, column)
    }

    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let pos = self.column_position(name)?;
        Some(self.rows.iter().map(move |r| &r[pos]))
    }

    /// Sum of a numeric column, ignoring missing values.
    pub fn sum(&self, name: &str) -> Option<f64> {
        self.column(name)
            .map(|values| values.filter_map(Value::as_f64).sum())
    }

    pub fn is_missing_row(&self, i: usize) -> bool {
        self.rows
            .get(i)
            .map(|r| r.iter().all(Value::is_null))
            .unwrap_or(true)
    }

    /// Applies a [`ColumnFilter`], keeping the index untouched.
    pub fn select(&self, filter: &ColumnFilter) -> Result<Frame> {
        let positions: Vec<usize> = match filter {
            ColumnFilter::All => return Ok(self.clone()),
            ColumnFilter::Columns(cols) => cols
                .iter()
                .map(|c| {
                    self.column_position(c)
                        .ok_or_else(|| GeopopError::UnknownColumn(c.clone()))
                })
                .collect::<Result<_>>()?,
            ColumnFilter::Pattern(re) => self
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| re.is_match(c))
                .map(|(i, _)| i)
                .collect(),
        };
        Ok(self.project(&positions))
    }

    /// Copy of the frame without the named columns; unknown names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Frame {
        let positions: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !names.contains(&c.as_str()))
            .map(|(i, _)| i)
            .collect();
        self.project(&positions)
    }

    fn project(&self, positions: &[usize]) -> Frame {
        Frame {
            index_name: self.index_name.clone(),
            index: self.index.clone(),
            columns: positions.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| positions.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        }
    }

    /// Left join on index labels.
    ///
    /// The output has exactly the rows of `self`, in order. Columns of
    /// `right` are appended; a column present on both sides takes the right
    /// value whenever the right side has a row for that label.
    pub fn left_join(&self, right: &Frame) -> Frame {
        let lookup: HashMap<&IndexLabel, usize> = right
            .index
            .iter()
            .enumerate()
            .map(|(i, l)| (l, i))
            .collect();

        let mut columns = self.columns.clone();
        let mut targets = Vec::with_capacity(right.columns.len());
        for c in &right.columns {
            match columns.iter().position(|x| x == c) {
                Some(pos) => targets.push(pos),
                None => {
                    targets.push(columns.len());
                    columns.push(c.clone());
                }
            }
        }

        let rows = self
            .index
            .iter()
            .zip(&self.rows)
            .map(|(label, left_row)| {
                let mut row = left_row.clone();
                row.resize(columns.len(), Value::Null);
                if let Some(&ri) = lookup.get(label) {
                    for (value, &target) in right.rows[ri].iter().zip(&targets) {
                        row[target] = value.clone();
                    }
                }
                row
            })
            .collect();

        Frame {
            index_name: self.index_name.clone(),
            index: self.index.clone(),
            columns,
            rows,
        }
    }
}

impl Serialize for Frame {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Record<'a>(&'a Frame, usize);

        impl Serialize for Record<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let Record(frame, i) = *self;
                let mut map = serializer.serialize_map(Some(frame.columns.len() + 1))?;
                map.serialize_entry(frame.index_name().unwrap_or("index"), &frame.index[i])?;
                for (c, v) in frame.columns.iter().zip(&frame.rows[i]) {
                    map.serialize_entry(c, v)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for i in 0..self.rows.len() {
            seq.serialize_element(&Record(self, i))?;
        }
        seq.end()
    }
}

/// A raw identifier handed to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Int(v) => write!(f, "{v}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Text(v) => f.write_str(v),
            RawValue::Missing => Ok(()),
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Int(i64::from(value))
    }
}

impl From<u32> for RawValue {
    fn from(value: u32) -> Self {
        RawValue::Int(i64::from(value))
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            RawValue::Missing
        } else {
            RawValue::Float(value)
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Missing)
    }
}

/// Labelled raw values to resolve. Output frames reuse the labels verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    index: Vec<IndexLabel>,
    values: Vec<RawValue>,
}

impl Series {
    /// Series with a positional `0..n` index.
    pub fn from_values<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RawValue>,
    {
        let values: Vec<RawValue> = values.into_iter().map(Into::into).collect();
        let index = (0..values.len()).map(IndexLabel::from).collect();
        Series { index, values }
    }

    pub fn with_index(index: Vec<IndexLabel>, values: Vec<RawValue>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(GeopopError::invalid(format!(
                "series index has {} labels for {} values",
                index.len(),
                values.len()
            )));
        }
        Ok(Series { index, values })
    }

    pub fn index(&self) -> &[IndexLabel] {
        &self.index
    }

    pub fn values(&self) -> &[RawValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IndexLabel, &RawValue)> {
        self.index.iter().zip(&self.values)
    }
}

impl<T: Into<RawValue>> FromIterator<T> for Series {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Series::from_values(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Frame {
        let mut f = Frame::new(Some("code"), vec!["name".into(), "pop".into()]);
        f.push_row(IndexLabel::Int(1), vec![json!("Agliè"), json!(2500.0)]).unwrap();
        f.push_row(IndexLabel::Int(2), vec![json!("Airasca"), Value::Null]).unwrap();
        f
    }

    #[test]
    fn left_join_keeps_left_rows_and_right_wins_on_collision() {
        let mut right = Frame::new(Some("code"), vec!["pop".into(), "area".into()]);
        right.push_row(IndexLabel::Int(1), vec![json!(2600.0), json!(13.1)]).unwrap();
        right.push_row(IndexLabel::Int(9), vec![json!(1.0), json!(1.0)]).unwrap();

        let joined = sample().left_join(&right);
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.columns(), ["name", "pop", "area"]);
        assert_eq!(joined.get(0, "pop"), Some(&json!(2600.0)));
        assert_eq!(joined.get(1, "area"), Some(&Value::Null));
    }

    #[test]
    fn select_by_pattern_uses_full_match() {
        let f = sample();
        let sel = f.select(&ColumnFilter::pattern("na").unwrap()).unwrap();
        assert!(sel.columns().is_empty());
        let sel = f.select(&ColumnFilter::pattern("na.*").unwrap()).unwrap();
        assert_eq!(sel.columns(), ["name"]);
    }

    #[test]
    fn select_unknown_column_fails() {
        let err = sample()
            .select(&ColumnFilter::Columns(vec!["geometry".into()]))
            .unwrap_err();
        assert!(matches!(err, GeopopError::UnknownColumn(c) if c == "geometry"));
    }

    #[test]
    fn serializes_as_records_with_index_first() {
        let out = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            out,
            json!([
                {"code": 1, "name": "Agliè", "pop": 2500.0},
                {"code": 2, "name": "Airasca", "pop": null}
            ])
        );
    }

    #[test]
    fn series_with_mismatched_index_is_rejected() {
        let err = Series::with_index(vec![0usize.into()], vec![]).unwrap_err();
        assert!(matches!(err, GeopopError::InvalidArgument(_)));
    }
}
