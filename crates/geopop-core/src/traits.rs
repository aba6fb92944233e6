// crates/geopop-core/src/traits.rs
use crate::common::Level;
use crate::frame::IndexLabel;
use crate::text::fold_key;
use serde::Serialize;

/// Records searchable by display name.
///
/// [`name_contains`](NameMatch::name_contains) compares [`fold_key`] forms,
/// so `"forli"` finds `Forlì-Cesena` and `"AGLIE"` finds `Agliè`.
///
/// ```rust
/// use geopop_core::traits::NameMatch;
///
/// struct Place(&'static str);
/// impl NameMatch for Place {
///     fn name_str(&self) -> &str { self.0 }
/// }
///
/// assert!(Place("Forlì-Cesena").name_contains("forli"));
/// assert!(!Place("Forlì-Cesena").name_contains("rimini"));
/// ```
pub trait NameMatch {
    fn name_str(&self) -> &str;

    /// True when the folded name contains the folded query.
    fn name_contains(&self, q: &str) -> bool {
        fold_key(self.name_str()).contains(&fold_key(q))
    }
}

/// A row of one of the three administrative tables.
///
/// Everything generic over levels (index construction, frame conversion,
/// substring search) goes through this trait, so the three record types
/// only describe their keys and column layout.
pub trait AdminRecord: Serialize + NameMatch {
    const LEVEL: Level;

    /// Output columns, in order. Every name must be a serialized field.
    const COLUMNS: &'static [&'static str];

    /// Official ISTAT numeric code.
    fn code(&self) -> u32;

    /// Level-specific alternate key: the cadastral code of a municipality
    /// or the abbreviation of a province, already normalized for lookup.
    fn alternate_key(&self) -> Option<String> {
        None
    }

    fn label(&self) -> IndexLabel {
        IndexLabel::from(self.code())
    }
}
