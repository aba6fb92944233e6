// crates/geopop-core/src/model/mod.rs
pub mod convert;
pub mod domain;
pub mod raw;

pub use convert::rollup_administrative;
pub use domain::{
    Municipality, MunicipalityRef, Province, ProvinceSummary, Region, POPULATION_COLUMNS,
};
pub use raw::AgeCount;
