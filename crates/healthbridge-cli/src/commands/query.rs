//! Sample listing command for CLI.

use chrono::Utc;
use clap::Args;
use healthbridge_core::display::{format_interval, format_value};
use healthbridge_core::{codec, BridgeSession, SessionState};

use crate::app::{resolve_metric, App};
use crate::dates::resolve_range;

/// Date range shared by query and export.
#[derive(Args)]
pub struct RangeArgs {
    /// Start date (YYYY-MM-DD or RFC 3339); defaults to the configured window
    #[arg(long)]
    pub from: Option<String>,
    /// End date (YYYY-MM-DD or RFC 3339); defaults to now
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Metric identifier (e.g. "stepCount")
    identifier: String,
    #[command(flatten)]
    range: RangeArgs,
    /// Output as JSON records
    #[arg(long)]
    json: bool,
}

/// Open a session for `identifier` and load `range` into it.
pub async fn load_session(
    app: &App,
    identifier: &str,
    range: &RangeArgs,
) -> Result<BridgeSession, Box<dyn std::error::Error>> {
    let metric = resolve_metric(identifier)?;
    let (start, end) = resolve_range(
        range.from.as_deref(),
        range.to.as_deref(),
        app.config.query.default_range_days,
        Utc::now(),
    )?;
    let mut session = BridgeSession::new(app.gateway.clone(), metric);
    session.load_data(start, end).await?;
    Ok(session)
}

pub async fn run(args: QueryArgs, app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let session = load_session(app, &args.identifier, &args.range).await?;
    if *session.state() == SessionState::Unsupported {
        println!("Unsupported data type");
        return Ok(());
    }

    let samples = session.samples();
    if args.json {
        let records = codec::encode(samples)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if samples.is_empty() {
        println!("No data found.");
    } else {
        for s in samples {
            println!("{}  {:<24} {}", s.uuid(), format_value(s), format_interval(s));
        }
    }
    Ok(())
}
