//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `hrdesk_core` linkage.
//! - Print per-namespace record counts, shares and revisions of a database.
//!
//! Usage: `hrdesk_cli [ping | summary [db_path]]`. Without a path, `summary`
//! falls back to `HRDESK_DB_PATH` or an empty in-memory database.

use hrdesk_core::metrics::percentage;
use hrdesk_core::repo::slot_repo::{SlotRepository, SqliteSlotRepository};
use hrdesk_core::service::ALL_NAMESPACES;
use hrdesk_core::{init_logging_from_config, open_db, open_db_in_memory, CoreConfig};
use log::{error, info};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "ping".to_string());

    match command.as_str() {
        "ping" => {
            println!("hrdesk_core ping={}", hrdesk_core::ping());
            println!("hrdesk_core version={}", hrdesk_core::core_version());
            ExitCode::SUCCESS
        }
        "summary" => match summary(args.next().map(PathBuf::from)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                error!("event=cli_summary module=cli status=error error={message}");
                eprintln!("error: {message}");
                ExitCode::FAILURE
            }
        },
        other => {
            eprintln!("unknown command `{other}`; expected `ping` or `summary [db_path]`");
            ExitCode::from(2)
        }
    }
}

fn summary(db_path: Option<PathBuf>) -> Result<(), String> {
    let mut config = CoreConfig::default()
        .with_env_overrides()
        .map_err(|err| err.to_string())?;
    if db_path.is_some() {
        config.db_path = db_path;
    }
    init_logging_from_config(&config).map_err(|err| err.to_string())?;

    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    }
    .map_err(|err| err.to_string())?;
    let repo = SqliteSlotRepository::new(&conn);
    let slots = repo.list_slots().map_err(|err| err.to_string())?;
    info!(
        "event=cli_summary module=cli status=ok slots={}",
        slots.len()
    );

    let mut counts = Vec::with_capacity(ALL_NAMESPACES.len());
    for namespace in ALL_NAMESPACES {
        counts.push(record_count(&repo, namespace)?);
    }
    let total: usize = counts.iter().sum();

    for (namespace, count) in ALL_NAMESPACES.iter().zip(counts) {
        let share = percentage(count, total, config.percent_precision);
        match slots.iter().find(|slot| slot.namespace == *namespace) {
            Some(slot) => println!(
                "{namespace} records={count} share={share}% revision={} schema_version={}",
                slot.revision, slot.schema_version
            ),
            None => println!("{namespace} records=0 share={share}% revision=0"),
        }
    }
    for slot in slots
        .iter()
        .filter(|slot| !ALL_NAMESPACES.contains(&slot.namespace.as_str()))
    {
        println!("{} revision={} (unmanaged)", slot.namespace, slot.revision);
    }
    Ok(())
}

/// Counts the `records` array of a slot envelope without decoding records.
fn record_count(repo: &SqliteSlotRepository<'_>, namespace: &str) -> Result<usize, String> {
    let Some(slot) = repo.read_slot(namespace).map_err(|err| err.to_string())? else {
        return Ok(0);
    };
    let envelope: Value = serde_json::from_str(&slot.payload)
        .map_err(|err| format!("slot `{namespace}` is unreadable: {err}"))?;
    Ok(envelope
        .get("records")
        .and_then(Value::as_array)
        .map_or(0, Vec::len))
}
