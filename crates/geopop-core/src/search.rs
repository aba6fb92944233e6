// crates/geopop-core/src/search.rs

//! # Name search
//!
//! Accent-insensitive substring search over the three administrative
//! levels. Unlike [`resolve`](crate::resolve), search returns every record
//! whose folded name contains the query, ranked by how well it matches.

use crate::model::{Municipality, Province, Region};
use crate::snapshot::Snapshot;
use crate::text::fold_key;
use crate::traits::{AdminRecord, NameMatch};
use serde::Serialize;

/// Records of one level whose name contains `q` (accent and case
/// insensitive), in table order. An empty query matches nothing.
pub fn find_by_substring<'a, R: NameMatch>(records: &'a [R], q: &str) -> Vec<&'a R> {
    let q = q.trim();
    if q.is_empty() {
        return Vec::new();
    }
    records.iter().filter(|r| r.name_contains(q)).collect()
}

/// Matched record of [`smart_search`].
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "level", content = "record", rename_all = "lowercase")]
pub enum SmartItem<'a> {
    Region(&'a Region),
    Province(&'a Province),
    Municipality(&'a Municipality),
}

impl SmartItem<'_> {
    pub fn name(&self) -> &str {
        match self {
            SmartItem::Region(r) => r.name(),
            SmartItem::Province(p) => p.name(),
            SmartItem::Municipality(m) => m.name(),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            SmartItem::Region(r) => r.code(),
            SmartItem::Province(p) => p.code(),
            SmartItem::Municipality(m) => m.code(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SmartHit<'a> {
    pub score: i32,
    #[serde(flatten)]
    pub item: SmartItem<'a>,
}

fn name_score(name: &str, q: &str, exact: i32) -> i32 {
    let name = fold_key(name);
    if name == q {
        exact
    } else if name.starts_with(q) {
        exact - 10
    } else if name.contains(q) {
        exact - 20
    } else {
        0
    }
}

/// Ranked search across regions, provinces and municipalities.
///
/// Abbreviations (`TO`) and cadastral codes (`A074`) score highest, then
/// exact names, prefixes and substrings; regions before provinces before
/// municipalities at equal match quality.
pub fn smart_search<'a>(snapshot: &'a Snapshot, query: &str) -> Vec<SmartHit<'a>> {
    let q_raw = query.trim();
    if q_raw.is_empty() {
        return Vec::new();
    }
    let q = fold_key(q_raw);

    let mut out: Vec<SmartHit<'a>> = Vec::new();

    for r in snapshot.regions() {
        let score = name_score(r.name(), &q, 90);
        if score > 0 {
            out.push(SmartHit {
                score,
                item: SmartItem::Region(r),
            });
        }
    }

    for p in snapshot.provinces() {
        let score = if p.province_short.eq_ignore_ascii_case(q_raw) {
            100
        } else {
            name_score(p.name(), &q, 85)
        };
        if score > 0 {
            out.push(SmartHit {
                score,
                item: SmartItem::Province(p),
            });
        }
    }

    for m in snapshot.municipalities() {
        let score = if m.cadastral_code.eq_ignore_ascii_case(q_raw) {
            100
        } else {
            name_score(m.name(), &q, 80)
        };
        if score > 0 {
            out.push(SmartHit {
                score,
                item: SmartItem::Municipality(m),
            });
        }
    }

    // Stable: equal scores keep level order.
    out.sort_by(|a, b| b.score.cmp(&a.score));
    out
}
