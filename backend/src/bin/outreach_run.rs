//! Run one re-engagement job against a JSON snapshot and print the report.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use outreach::OutreachSettings;
use outreach::domain::{OutreachJobKind, OutreachJobPorts, OutreachJobRunner};
use outreach::outbound::{TracingEmailSender, TracingPushSender, TracingSmsGateway, load_snapshot};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `outreach-run` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "outreach-run",
    about = "Detect users needing re-engagement and dispatch outreach",
    version
)]
struct CliArgs {
    /// Job to run: `missed_checkins`, `missed_reflections`, `inactive_users`, or `all`.
    #[arg(long, value_name = "job", default_value = "all")]
    job: OutreachJobKind,
    /// Snapshot file. Falls back to `OUTREACH_SNAPSHOT_PATH` when omitted.
    #[arg(long, value_name = "path")]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = OutreachSettings::load_from_iter([OsString::from("outreach-run")])
        .map_err(|error| eyre!("failed to load outreach settings: {error}"))?;
    let snapshot_path = args
        .snapshot
        .or_else(|| settings.snapshot_path.clone())
        .ok_or_else(|| eyre!("no snapshot given; pass --snapshot or set OUTREACH_SNAPSHOT_PATH"))?;

    let snapshot = load_snapshot(&snapshot_path)?;
    let (users, plans, history) = snapshot.into_adapters()?;
    info!(path = %snapshot_path.display(), job = %args.job, "snapshot loaded");

    let clock = Arc::new(DefaultClock);
    let runner = OutreachJobRunner::new(
        OutreachJobPorts {
            users: Arc::new(users),
            plans: Arc::new(plans),
            history: Arc::new(history),
            push: Arc::new(TracingPushSender::new(clock.clone())),
            email: Arc::new(TracingEmailSender),
            sms_gateway: Arc::new(TracingSmsGateway::default()),
        },
        clock,
        settings.config(),
    );

    let report = runner
        .run(args.job)
        .await
        .map_err(|error| eyre!("outreach job {} failed: {error}", args.job))?;
    let rendered = serde_json::to_string_pretty(&report).wrap_err("serialise job report")?;
    writeln!(io::stdout().lock(), "{rendered}").wrap_err("write job report")?;
    Ok(())
}
