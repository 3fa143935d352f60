//! Import command for CLI: wire string into the sample store.

use clap::Args;
use healthbridge_core::BridgeSession;
use std::io::Read;

use crate::app::{resolve_metric, App};

#[derive(Args)]
pub struct ImportArgs {
    /// Metric identifier the samples belong to
    identifier: String,
    /// Wire string; read from stdin when omitted
    wire: Option<String>,
    /// Move a single imported sample so it ends now
    #[arg(long)]
    reset_to_now: bool,
}

pub async fn run(args: ImportArgs, app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let metric = resolve_metric(&args.identifier)?;
    let wire = match args.wire {
        Some(w) => w,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if wire.trim().is_empty() {
        return Err("nothing to import: empty input".into());
    }

    let mut session = BridgeSession::new(app.gateway.clone(), metric);
    session.set_reset_to_current_time(args.reset_to_now || app.config.import.reset_to_current_time);

    let summary = session.import_data(&wire).await?;
    if summary.shifted_to_now {
        println!("imported {} samples (moved to current time)", summary.saved);
    } else {
        println!("imported {} samples", summary.saved);
    }
    Ok(())
}
