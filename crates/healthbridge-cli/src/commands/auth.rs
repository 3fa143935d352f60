//! Authorization command for CLI.
//!
//! The store may grant or deny each type silently; a denied type simply
//! reads back empty afterwards.

use clap::Args;
use healthbridge_core::catalog::{self, MetricType};

use crate::app::{resolve_metric, App};

#[derive(Args)]
pub struct AuthArgs {
    /// Metric identifiers to request access for
    identifiers: Vec<String>,
    /// Request every type in the catalog
    #[arg(long, conflicts_with = "identifiers")]
    all: bool,
}

pub async fn run(args: AuthArgs, app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let types: Vec<MetricType> = if args.all {
        catalog::list_categories()
            .iter()
            .flat_map(|c| c.types.iter().copied())
            .collect()
    } else {
        args.identifiers
            .iter()
            .map(|id| resolve_metric(id))
            .collect::<Result<_, _>>()?
    };
    if types.is_empty() {
        return Err("nothing to authorize: pass metric identifiers or --all".into());
    }

    let count = types.len();
    app.gateway.request_authorization(types).await?;
    println!("authorization requested for {count} types");
    Ok(())
}
