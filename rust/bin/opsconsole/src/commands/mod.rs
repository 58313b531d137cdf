//! Subcommand implementations.
//!
//! Every command opens the console on the persisted state, restores the
//! page the previous run left on, does its work and prints the result.

pub mod nav;
pub mod resource;
pub mod session;

use anyhow::Result;
use console::{Console, RouteState};
use opsconsole_core::ConsoleConfig;
use tracing::debug;

/// Local-store key of the page the last run ended on.
pub const PATH_KEY: &str = "cli.path";

/// Build the console from configuration and restore the session and page.
pub async fn open(config: ConsoleConfig) -> Result<Console> {
    let console = Console::from_config(config)?;
    let last = console.context().local.get(PATH_KEY);
    debug!("CLI: resuming at {:?}", last);
    console.initialize(last.as_deref()).await;
    Ok(console)
}

/// Current route. Every command runs after `open`, so it is always set.
pub fn route(console: &Console) -> Result<RouteState> {
    console
        .route()
        .ok_or_else(|| anyhow::anyhow!("Console has not been initialized."))
}

/// Persist the requested path so the next run resumes there.
pub fn remember(console: &Console) -> Result<RouteState> {
    let route = route(console)?;
    console.context().local.set(PATH_KEY, &route.requested);
    Ok(route)
}

/// Print a JSON-serializable value.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a left-aligned text table.
pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }
    println!("{}", format_line(headers, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    println!("{}", format_line(&rule, &widths));
    for row in rows {
        println!("{}", format_line(row, &widths));
    }
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| {
            let pad = w.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
