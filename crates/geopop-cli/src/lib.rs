//! geopop-cli
//! ==========
//!
//! Command-line interface for the `geopop-core` Italian administrative and
//! population database.
//!
//! This crate primarily provides a binary (`geopop`). We include a small
//! library target so that docs.rs renders a documentation page and shows this
//! overview.
//!
//! Quick start
//! -----------
//!
//! ```text
//! cargo install geopop-cli
//! geopop --help
//! geopop --data-dir ./data years
//! geopop resolve municipality 1001 "Agliè" A074
//! geopop resolve province "Provincia di Padova" --smart --cols province,province_code
//! ```
//!
//! For programmatic access use the `geopop-core` crate directly.
//!
#![cfg_attr(docsrs, feature(doc_cfg))]

// The binary is the primary deliverable; this target only renders docs.
