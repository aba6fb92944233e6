//! geopop: command-line interface for geopop-core
//!
//! Resolve mixed identifiers to administrative records, print whole
//! tables with age-bucketed population, and inspect a data directory.
//!
//! Usage examples
//! --------------
//!
//! - Years available and summary of the latest one
//!   $ geopop years
//!   $ geopop stats
//!
//! - Resolve names, codes, abbreviations or cadastral codes
//!   $ geopop resolve municipality 1001 "Agliè" A074
//!   $ geopop resolve province TO Milano 15 --limits total
//!   $ geopop resolve region "Regione Südtirol" --smart
//!
//! - Full table of a level, only some columns
//!   $ geopop compose region --limits 18,65 --cols 'region|<18|>=65' --regex
//!
//! - Search by substring
//!   $ geopop search forli
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (e.g. `RUST_LOG=geopop_core=debug`).
mod args;

use crate::args::{CliArgs, Commands};
use anyhow::Context;
use clap::Parser;
use geopop_core::{generate_labels, loader, Geopop, Level, QueryOptions, Series};

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let args = CliArgs::parse();

    let data_dir = args.data_dir.unwrap_or_else(loader::default_data_dir);

    if let Commands::Years = args.command {
        let years = loader::available_years(&data_dir)
            .with_context(|| format!("listing {}", data_dir.display()))?;
        for y in years {
            println!("{y}");
        }
        return Ok(());
    }

    if let Commands::Labels { limits } = &args.command {
        match limits.cutoffs() {
            Some(cutoffs) => {
                println!("Cutoffs: {cutoffs}");
                for label in generate_labels(&cutoffs) {
                    println!("- {label}");
                }
            }
            None => println!("Total mode: population, population_M, population_F"),
        }
        return Ok(());
    }

    let geopop = Geopop::open(&data_dir, args.year)
        .with_context(|| format!("loading data from {}", data_dir.display()))?;
    log::info!("using data year {}", geopop.year());

    match args.command {
        Commands::Years | Commands::Labels { .. } => {}

        Commands::Stats => {
            let stats = geopop.stats();
            println!("Snapshot {}:", stats.year);
            println!("  Regions: {}", stats.regions);
            println!("  Provinces: {}", stats.provinces);
            println!("  Municipalities: {}", stats.municipalities);
            println!("  Population rows: {}", stats.population_rows);
        }

        Commands::Validate => {
            let issues = geopop.validate();
            if issues.is_empty() {
                println!("No integrity issues in {}", geopop.year());
            } else {
                for issue in &issues {
                    println!("- {issue}");
                }
                println!("{} issue(s)", issues.len());
            }
        }

        Commands::Resolve {
            level,
            values,
            smart,
            query,
        } => {
            let options = query.to_options(level, args.year);
            let series = Series::from_values(values);
            let frame = if smart {
                geopop.smart_resolve(&series, &options)?
            } else {
                geopop.resolve(&series, &options)?
            };
            println!("{}", serde_json::to_string_pretty(&frame)?);
        }

        Commands::Compose { level, query } => {
            let options: QueryOptions = query.to_options(level, args.year);
            let frame = geopop.compose(&options)?;
            println!("{}", serde_json::to_string_pretty(&frame)?);
        }

        Commands::Search { query, limit } => {
            let hits = geopop.search(&query);
            if hits.is_empty() {
                println!("No records found matching: {query}");
            }
            for hit in hits.iter().take(limit) {
                let level = match hit.item {
                    geopop_core::SmartItem::Region(_) => Level::Region,
                    geopop_core::SmartItem::Province(_) => Level::Province,
                    geopop_core::SmartItem::Municipality(_) => Level::Municipality,
                };
                println!(
                    "[{:>3}] {} {} ({})",
                    hit.score,
                    level,
                    hit.item.name(),
                    hit.item.code()
                );
            }
        }
    }

    Ok(())
}
