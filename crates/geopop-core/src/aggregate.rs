// crates/geopop-core/src/aggregate.rs
use crate::common::Level;
use crate::error::Result;
use crate::frame::{Frame, IndexLabel};
use crate::model::Municipality;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Rolls a municipality-indexed population table up to `level`.
///
/// Geography is left-joined to population on the municipality code, then
/// grouped by province or region code (ascending) and every column summed
/// with missing values skipped. Population rows for codes absent from
/// `municipalities` are dropped. Municipalities without population still
/// open their group but add nothing, so an incomplete population table
/// undercounts silently.
///
/// At [`Level::Municipality`] the table is returned unchanged.
pub fn aggregate(
    level: Level,
    population: &Frame,
    municipalities: &[Municipality],
) -> Result<Frame> {
    let group_of: fn(&Municipality) -> Option<u32> = match level {
        Level::Municipality => return Ok(population.clone()),
        Level::Province => |m: &Municipality| Some(m.province_code),
        Level::Region => |m: &Municipality| m.region_code,
    };

    let positions: HashMap<&IndexLabel, usize> = population
        .index()
        .iter()
        .enumerate()
        .map(|(i, label)| (label, i))
        .collect();

    let width = population.columns().len();
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for m in municipalities {
        let Some(key) = group_of(m) else {
            continue;
        };
        let sums = groups.entry(key).or_insert_with(|| vec![0.0; width]);
        let label = IndexLabel::from(m.municipality_code);
        let Some(row) = positions.get(&label).and_then(|&i| population.row(i)) else {
            continue;
        };
        for (acc, cell) in sums.iter_mut().zip(row) {
            if let Some(v) = cell.as_f64() {
                *acc += v;
            }
        }
    }

    let mut out = Frame::new(Some(level.code_column()), population.columns().to_vec());
    for (code, sums) in groups {
        let row = sums
            .into_iter()
            .map(|v| serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number))
            .collect();
        out.push_row(IndexLabel::from(code), row)?;
    }
    log::debug!(
        "aggregated {} population rows into {} {}",
        population.len(),
        out.len(),
        level.plural()
    );
    Ok(out)
}
