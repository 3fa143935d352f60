//! Catalog browsing commands for CLI.

use clap::Subcommand;
use healthbridge_core::catalog;

use crate::app::resolve_metric;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List metric categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the metric types in a category
    Types {
        /// Category id (activity, body, vitals, sleep)
        category: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one metric type
    Show {
        /// Metric identifier (e.g. "stepCount")
        identifier: String,
    },
}

pub fn run(action: CatalogAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CatalogAction::Categories { json } => {
            let categories = catalog::list_categories();
            if json {
                println!("{}", serde_json::to_string_pretty(categories)?);
            } else {
                for c in categories {
                    println!("{:<10} {} ({} types)", c.id, c.name, c.types.len());
                }
            }
        }
        CatalogAction::Types { category, json } => {
            let c = catalog::category(&category)
                .ok_or_else(|| format!("unknown category: {category}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(c.types)?);
            } else {
                for t in c.types {
                    println!("{:<28} {}", t.identifier(), t.name());
                }
            }
        }
        CatalogAction::Show { identifier } => {
            let metric = resolve_metric(&identifier)?;
            println!("identifier: {}", metric.identifier());
            println!("name:       {}", metric.name());
            println!("kind:       {:?}", metric.kind());
            if let Some(unit) = metric.canonical_unit() {
                println!("unit:       {unit}");
            }
            if let Some(c) = catalog::category_of(metric) {
                println!("category:   {}", c.name);
            }
        }
    }
    Ok(())
}
