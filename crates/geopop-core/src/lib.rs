// crates/geopop-core/src/lib.rs

//! # geopop-core
//!
//! Italian municipalities, provinces and regions with age-bucketed
//! population, keyed interchangeably by name, ISTAT code, province
//! abbreviation or cadastral code.
//!
//! ```no_run
//! use geopop_core::{Geopop, Level, QueryOptions, Series};
//!
//! # fn main() -> geopop_core::Result<()> {
//! let geopop = Geopop::load()?;
//! let input = Series::from_values(["Torino", "MI", "Comune di Abano Terme"]);
//! let rows = geopop.smart_resolve(&input, &QueryOptions::new(Level::Province))?;
//! println!("{}", serde_json::to_string_pretty(&rows)?);
//! # Ok(())
//! # }
//! ```

pub mod age;
pub mod aggregate;
pub mod common;
pub mod compose;
pub mod error;
pub mod frame;
pub mod geopop;
pub mod index;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod search;
pub mod snapshot;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::age::{generate_labels, prepare_limits, AgeCutoffs, PopulationLimits};
pub use crate::common::{Level, SnapshotStats};
pub use crate::compose::ComposeOptions;
pub use crate::error::{GeopopError, Result};
pub use crate::frame::{ColumnFilter, Frame, IndexLabel, RawValue, Series};
pub use crate::geopop::{Geopop, QueryOptions};
pub use crate::index::LevelIndex;
pub use crate::loader::{available_years, latest_year, load_snapshot};
pub use crate::model::{AgeCount, Municipality, Province, Region};
pub use crate::resolve::{classify, Lookup};
pub use crate::search::{SmartHit, SmartItem};
pub use crate::snapshot::{IntegrityIssue, Snapshot};
pub use crate::text::{disambiguate, fold_key, Disambiguator};
pub use crate::traits::{AdminRecord, NameMatch};
