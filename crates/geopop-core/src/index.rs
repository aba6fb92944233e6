// crates/geopop-core/src/index.rs
use crate::common::Level;
use crate::resolve::Lookup;
use crate::text::Disambiguator;
use crate::traits::AdminRecord;
use once_cell::sync::OnceCell;
use std::collections::HashMap;

/// Multi-key lookup table over the rows of one administrative level.
///
/// Every key maps to the row positions carrying it, in row order:
///
/// | level        | keys                                              |
/// |--------------|---------------------------------------------------|
/// | municipality | lowercased name, code, lowercased cadastral code  |
/// | province     | lowercased name, code, uppercased abbreviation    |
/// | region       | lowercased name, code                             |
///
/// Positions refer to the record slice the index was built from, which is
/// also the row order of every table composed at that level.
#[derive(Debug)]
pub struct LevelIndex {
    level: Level,
    rows: usize,
    names: HashMap<String, Vec<usize>>,
    codes: HashMap<i64, Vec<usize>>,
    alternates: HashMap<String, Vec<usize>>,
    /// Distinct name keys in first-seen order.
    name_keys: Vec<String>,
    disambiguator: OnceCell<Disambiguator>,
}

impl LevelIndex {
    pub fn build<R: AdminRecord>(records: &[R]) -> Self {
        let mut names: HashMap<String, Vec<usize>> = HashMap::with_capacity(records.len());
        let mut codes: HashMap<i64, Vec<usize>> = HashMap::with_capacity(records.len());
        let mut alternates: HashMap<String, Vec<usize>> = HashMap::new();
        let mut name_keys = Vec::with_capacity(records.len());

        for (i, r) in records.iter().enumerate() {
            let name = r.name_str().to_lowercase();
            let slot = names.entry(name).or_default();
            if slot.is_empty() {
                name_keys.push(r.name_str().to_lowercase());
            }
            slot.push(i);
            codes.entry(i64::from(r.code())).or_default().push(i);
            if let Some(alt) = r.alternate_key() {
                alternates.entry(alt).or_default().push(i);
            }
        }

        let duplicates = names.values().filter(|v| v.len() > 1).count()
            + alternates.values().filter(|v| v.len() > 1).count()
            + codes.values().filter(|v| v.len() > 1).count();
        if duplicates > 0 {
            log::debug!("{} index has {duplicates} keys shared by several rows", R::LEVEL);
        }

        LevelIndex {
            level: R::LEVEL,
            rows: records.len(),
            names,
            codes,
            alternates,
            name_keys,
            disambiguator: OnceCell::new(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Every row position carrying the key, in row order.
    pub fn positions(&self, lookup: &Lookup) -> &[usize] {
        let hit = match lookup {
            Lookup::NumericCode(code) => self.codes.get(code),
            Lookup::Name(name) => self.names.get(name),
            Lookup::ShortCode(key) | Lookup::CadastralCode(key) => self.alternates.get(key),
        };
        hit.map(Vec::as_slice).unwrap_or_default()
    }

    /// Row position for a key. When several rows share it the last one wins.
    pub fn get(&self, lookup: &Lookup) -> Option<usize> {
        self.positions(lookup).last().copied()
    }

    /// Distinct lowercased names, the candidate list of free-text matching.
    pub fn name_keys(&self) -> &[String] {
        &self.name_keys
    }

    /// Free-text matcher over [`name_keys`](Self::name_keys), compiled on
    /// first use.
    pub fn disambiguator(&self) -> &Disambiguator {
        self.disambiguator.get_or_init(|| {
            log::debug!("compiling {} name patterns for {}", self.name_keys.len(), self.level);
            Disambiguator::new(&self.name_keys)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Municipality;

    fn municipality(code: u32, name: &str, cadastral: &str) -> Municipality {
        Municipality {
            municipality_code: code,
            municipality: name.into(),
            cadastral_code: cadastral.into(),
            province_code: 1,
            province: "Torino".into(),
            province_short: "TO".into(),
            region_code: Some(1),
            region: Some("Piemonte".into()),
            population: None,
            population_f: None,
            population_m: None,
        }
    }

    #[test]
    fn keys_point_at_rows() {
        let rows = vec![
            municipality(1001, "Agliè", "A074"),
            municipality(1002, "Airasca", "A109"),
        ];
        let index = LevelIndex::build(&rows);
        assert_eq!(index.get(&Lookup::NumericCode(1002)), Some(1));
        assert_eq!(index.get(&Lookup::Name("agliè".into())), Some(0));
        assert_eq!(index.get(&Lookup::CadastralCode("a109".into())), Some(1));
        assert_eq!(index.get(&Lookup::Name("Agliè".into())), None);
        assert_eq!(index.level(), Level::Municipality);
    }

    #[test]
    fn duplicate_names_keep_every_position() {
        let rows = vec![
            municipality(1001, "Samone", "H753"),
            municipality(22165, "Samone", "H754"),
        ];
        let index = LevelIndex::build(&rows);
        let key = Lookup::Name("samone".into());
        assert_eq!(index.positions(&key), [0, 1]);
        assert_eq!(index.get(&key), Some(1));
        assert_eq!(index.name_keys(), ["samone"]);
    }
}
