//! Export command for CLI: selected samples to a wire string on stdout.

use clap::Args;
use uuid::Uuid;

use super::query::{load_session, RangeArgs};
use crate::app::App;

#[derive(Args)]
pub struct ExportArgs {
    /// Metric identifier (e.g. "stepCount")
    identifier: String,
    #[command(flatten)]
    range: RangeArgs,
    /// Sample uuid to include (repeatable)
    #[arg(long = "select", value_name = "UUID", required_unless_present = "all")]
    select: Vec<Uuid>,
    /// Include every sample in the range
    #[arg(long, conflicts_with = "select")]
    all: bool,
}

pub async fn run(args: ExportArgs, app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = load_session(app, &args.identifier, &args.range).await?;

    if args.all {
        session.select_all();
    } else {
        for id in &args.select {
            if !session.select(*id) {
                return Err(format!("sample {id} is not in the selected date range").into());
            }
        }
    }

    match session.export_selection()? {
        Some(wire) => {
            eprintln!("exported {} samples", session.selection().len());
            println!("{wire}");
            Ok(())
        }
        None => Err("nothing to export: no samples selected".into()),
    }
}
