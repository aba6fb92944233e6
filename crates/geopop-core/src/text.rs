// crates/geopop-core/src/text.rs

//! # Text matching
//!
//! Normalization helpers and the free-text [`Disambiguator`], which picks
//! the single administrative name mentioned in a piece of text such as
//! `"Comune di Abano Terme"` or `"Università degli studi di Verona"`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").expect("static regex"));

/// Convert a string into a folded key suitable for loose comparison.
///
/// This performs:
/// 1\) Transliterate Unicode → ASCII (e.g. `Agliè` -> `Aglie`)
/// 2\) Normalize to lowercase
///
/// ```rust
/// use geopop_core::text::fold_key;
///
/// assert_eq!(fold_key("Forlì-Cesena"), "forli-cesena");
/// assert_eq!(fold_key("Südtirol"), "sudtirol");
/// ```
pub fn fold_key(s: &str) -> String {
    deunicode::deunicode(s).to_lowercase()
}

/// A compiled case-insensitive whole-word pattern.
///
/// `needle` is a cheap substring pre-check: a whole-word hit always implies
/// the lowercased text contains the lowercased key.
#[derive(Debug, Clone)]
struct WordPattern {
    needle: String,
    re: Regex,
}

impl WordPattern {
    fn new(key: &str) -> Option<Self> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(key))).ok()?;
        Some(WordPattern {
            needle: key.to_lowercase(),
            re,
        })
    }

    #[inline]
    fn is_found_in(&self, text: &str, lowered: &str) -> bool {
        lowered.contains(&self.needle) && self.re.is_match(text)
    }
}

/// Outcome of a single matching pass.
enum Pass {
    Unique(usize),
    Ambiguous,
    Nothing,
}

impl Pass {
    fn over<I: IntoIterator<Item = usize>>(hits: I) -> Self {
        let mut hits = hits.into_iter();
        match (hits.next(), hits.next()) {
            (Some(i), None) => Pass::Unique(i),
            (Some(_), Some(_)) => Pass::Ambiguous,
            _ => Pass::Nothing,
        }
    }
}

/// Finds the one candidate name mentioned in a free text.
///
/// Matching runs in up to three passes and stops at the first pass that
/// finds anything:
///
/// 1. every candidate as a case-insensitive whole word;
/// 2. synonyms: candidates containing `/` (e.g. `Bolzano/Bozen`) are split
///    into trimmed parts of at least 3 characters, each pointing back to its
///    candidate;
/// 3. word decomposition: candidates and synonyms are split on non-word
///    characters into words of at least 2 characters; entries with fewer
///    than 2 words are skipped and an entry matches when all its words occur
///    as whole words.
///
/// A pass that matches more than one entry yields no match: ambiguous text
/// is never resolved.
///
/// Patterns are compiled once in [`Disambiguator::new`]; build one per
/// candidate set and reuse it.
///
/// ```rust
/// use geopop_core::text::Disambiguator;
///
/// let d = Disambiguator::new(["Abano Terme", "Milano", "Verona"]);
/// assert_eq!(d.find("Comune di Abano Terme"), Some("Abano Terme"));
/// assert_eq!(d.find("Verona or Milano"), None);
/// ```
#[derive(Debug, Clone)]
pub struct Disambiguator {
    candidates: Vec<String>,
    names: Vec<(WordPattern, usize)>,
    synonyms: Vec<(WordPattern, usize)>,
    words: Vec<WordPattern>,
    word_sets: Vec<(Vec<usize>, usize)>,
}

impl Disambiguator {
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let candidates: Vec<String> = candidates
            .into_iter()
            .map(|c| c.as_ref().to_owned())
            .collect();

        let names = candidates
            .iter()
            .enumerate()
            .filter_map(|(i, c)| WordPattern::new(c).map(|p| (p, i)))
            .collect();

        let mut synonym_keys: Vec<(&str, usize)> = Vec::new();
        for (i, c) in candidates.iter().enumerate() {
            if !c.contains('/') {
                continue;
            }
            for part in c.split('/') {
                let part = part.trim();
                if part.chars().count() >= 3 {
                    synonym_keys.push((part, i));
                }
            }
        }
        let synonyms = synonym_keys
            .iter()
            .filter_map(|&(s, i)| WordPattern::new(s).map(|p| (p, i)))
            .collect();

        let mut words = Vec::new();
        let mut word_ids: HashMap<String, usize> = HashMap::new();
        let mut word_sets = Vec::new();
        let entries = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .chain(synonym_keys.iter().copied());
        for (entry, target) in entries {
            let parts: Vec<&str> = NON_WORD
                .split(entry)
                .map(str::trim)
                .filter(|w| w.chars().count() >= 2)
                .collect();
            if parts.len() < 2 {
                continue;
            }
            let mut ids = Vec::with_capacity(parts.len());
            for w in parts {
                let key = w.to_lowercase();
                let id = match word_ids.get(&key) {
                    Some(&id) => id,
                    None => match WordPattern::new(w) {
                        Some(p) => {
                            words.push(p);
                            word_ids.insert(key, words.len() - 1);
                            words.len() - 1
                        }
                        None => continue,
                    },
                };
                ids.push(id);
            }
            word_sets.push((ids, target));
        }

        Disambiguator {
            candidates,
            names,
            synonyms,
            words,
            word_sets,
        }
    }

    /// The candidate unambiguously mentioned in `text`, if any.
    pub fn find(&self, text: &str) -> Option<&str> {
        self.find_index(text).map(|i| self.candidates[i].as_str())
    }

    /// Like [`find`](Self::find) but returns the candidate position.
    pub fn find_index(&self, text: &str) -> Option<usize> {
        let lowered = text.to_lowercase();

        let primary = self
            .names
            .iter()
            .filter(|(p, _)| p.is_found_in(text, &lowered))
            .map(|&(_, i)| i);
        match Pass::over(primary) {
            Pass::Unique(i) => return Some(i),
            Pass::Ambiguous => return None,
            Pass::Nothing => {}
        }

        let synonyms = self
            .synonyms
            .iter()
            .filter(|(p, _)| p.is_found_in(text, &lowered))
            .map(|&(_, i)| i);
        match Pass::over(synonyms) {
            Pass::Unique(i) => return Some(i),
            Pass::Ambiguous => return None,
            Pass::Nothing => {}
        }

        let mut seen: Vec<Option<bool>> = vec![None; self.words.len()];
        let mut word_hit = |id: usize| -> bool {
            *seen[id].get_or_insert_with(|| self.words[id].is_found_in(text, &lowered))
        };
        let mut hits = Vec::new();
        for (ids, target) in &self.word_sets {
            if ids.iter().all(|&id| word_hit(id)) {
                hits.push(*target);
                if hits.len() > 1 {
                    break;
                }
            }
        }
        match Pass::over(hits) {
            Pass::Unique(i) => Some(i),
            _ => None,
        }
    }
}

/// One-shot form of [`Disambiguator::find`].
///
/// Compiles the candidate patterns on every call; prefer a cached
/// [`Disambiguator`] for batches.
pub fn disambiguate<'a, S: AsRef<str>>(text: &str, candidates: &'a [S]) -> Option<&'a str> {
    Disambiguator::new(candidates.iter().map(AsRef::as_ref))
        .find_index(text)
        .map(|i| candidates[i].as_ref())
}
