use clap::{Args, Parser, Subcommand};
use geopop_core::{Level, PopulationLimits, QueryOptions};
use std::path::PathBuf;

/// CLI arguments for geopop
#[derive(Debug, Parser)]
#[command(
    name = "geopop",
    version,
    about = "CLI for resolving and aggregating Italian municipalities, provinces and regions"
)]
pub struct CliArgs {
    /// Data directory with `{year}_*.json[.gz]` and `limits_IT_*.geojson[.gz]` files
    /// (default: $GEOPOP_DATA_DIR or geopop-core/data)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Data year (default: latest available)
    #[arg(short = 'y', long = "year", global = true)]
    pub year: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the data years available in the data directory
    Years,

    /// Show a summary of the snapshot contents
    Stats,

    /// Run the data integrity checks and print every issue
    Validate,

    /// Resolve names, codes or abbreviations to records
    Resolve {
        /// municipality, province or region
        level: Level,

        /// Values to resolve (names, ISTAT codes, abbreviations, cadastral codes)
        #[arg(required = true)]
        values: Vec<String>,

        /// Retry misses by looking for a single name inside the text
        #[arg(long)]
        smart: bool,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Print the full table of a level
    Compose {
        /// municipality, province or region
        level: Level,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Search records whose name contains a substring (accent-insensitive)
    Search {
        query: String,

        /// Maximum number of hits to print
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },

    /// Show the age cutoffs and default labels of a population limits value
    Labels {
        /// "auto", "total" or comma-separated ages (e.g. 18,65)
        #[arg(default_value = "auto")]
        limits: PopulationLimits,
    },
}

/// Options shared by `resolve` and `compose`.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Join geometry from the boundary files
    #[arg(short = 'g', long)]
    pub geometry: bool,

    /// Population columns: "auto", "total" or comma-separated ages
    #[arg(short = 'l', long, default_value = "auto")]
    pub limits: PopulationLimits,

    /// Custom age bucket labels, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// Columns to return, comma-separated (a single pattern with --regex)
    #[arg(short = 'c', long, value_delimiter = ',')]
    pub cols: Option<Vec<String>>,

    /// Treat --cols as one full-match regular expression
    #[arg(long, requires = "cols")]
    pub regex: bool,
}

impl QueryArgs {
    pub fn to_options(&self, level: Level, year: Option<u16>) -> QueryOptions {
        QueryOptions {
            level,
            include_geometry: self.geometry,
            population_limits: self.limits.clone(),
            population_labels: self.labels.clone(),
            return_cols: self.cols.clone(),
            regex: self.regex,
            data_year: year,
        }
    }
}
