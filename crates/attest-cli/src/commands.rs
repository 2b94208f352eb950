//! Command handlers. Each prints its result structure as JSON, matching
//! what the verification API returns to HTTP consumers.

use anyhow::Context;
use attest_core::entities::ReportingWindow;
use attest_db::repos::AppendRequest;
use attest_db::service::LedgerService;
use chrono::{Duration, Utc};

use crate::cli::{AppendArgs, Commands};

pub async fn dispatch(command: Commands, service: &LedgerService) -> anyhow::Result<()> {
    match command {
        Commands::Append(args) => append(args, service).await,
        Commands::VerifyEvent { org, event_id } => {
            let result = service
                .verify_event(&org, &event_id)
                .await
                .context("verification failed")?;
            print_json(&result)
        }
        Commands::VerifyChain { org } => {
            let status = service
                .verify_chain(&org)
                .await
                .context("chain verification failed")?;
            print_json(&status)
        }
        Commands::Report { org, days } => {
            let window = ReportingWindow::new(Utc::now() - Duration::days(days), None);
            let summary = service
                .compliance_summary(&org, &window)
                .await
                .context("reporting failed")?;
            print_json(&summary)
        }
        Commands::Export { org, path } => {
            let written = service
                .export_chain(&org, &path)
                .await
                .context("export failed")?;
            tracing::info!(org = %org, written, path = %path.display(), "chain exported");
            println!("{written}");
            Ok(())
        }
    }
}

async fn append(args: AppendArgs, service: &LedgerService) -> anyhow::Result<()> {
    let metadata: serde_json::Value =
        serde_json::from_str(&args.metadata).context("invalid --metadata JSON")?;

    let event = service
        .append(&AppendRequest {
            organization_id: args.org,
            actor_id: args.actor,
            event_name: args.event_name,
            target_type: args.target_type,
            target_id: args.target_id,
            metadata,
        })
        .await
        .context("append failed")?;
    print_json(&event)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
