//! Resource commands: list and export.

use anyhow::Result;
use console::{Console, ErrorBoundary, FetchState};
use opsconsole_client::Resource;
use opsconsole_table::{DirDownloader, ExportFormat};
use serde_json::Value;

use super::{print_json, print_table};

fn parse_resource(name: &str) -> Result<Resource> {
    name.parse::<Resource>().map_err(|_| {
        let known: Vec<&str> = Resource::ALL.iter().map(|r| r.name()).collect();
        anyhow::anyhow!("Unknown resource: {}. Available: {}", name, known.join(", "))
    })
}

/// Load a resource and return its data, or fail with the inline error.
async fn load(console: &Console, resource: Resource, keyword: &str) -> Result<Value> {
    console.load(resource, keyword).await;
    let state = console
        .resource(resource)
        .ok_or_else(|| anyhow::anyhow!("{} did not load.", resource))?;
    match state.status {
        FetchState::Loaded(data) => Ok(data),
        FetchState::Failed(failure) => {
            let hint = if failure.retryable { " (retryable)" } else { "" };
            anyhow::bail!("[{}] {}{}", failure.code, failure.message, hint)
        }
        FetchState::Idle | FetchState::Loading => {
            anyhow::bail!("{} is still loading.", resource)
        }
    }
}

/// Load a resource and print it.
pub async fn list(
    console: &Console,
    resource: &str,
    keyword: &str,
    page: usize,
    output_json: bool,
) -> Result<()> {
    let resource = parse_resource(resource)?;
    let data = load(console, resource, keyword).await?;

    let mut table = match console.table(resource) {
        Some(table) if !output_json => table,
        _ => return print_json(&data),
    };
    table.set_page(page);

    let mut boundary = ErrorBoundary::new();
    let view = match boundary.render(resource.name(), || table.view()) {
        Ok(view) => view,
        Err(panel) => {
            anyhow::bail!("{}: {}", panel.title(console.i18n()), panel.message)
        }
    };

    let headers: Vec<String> = view.headers.iter().map(|h| h.name.clone()).collect();
    let rows: Vec<Vec<String>> = view.rows.into_iter().map(|r| r.cells).collect();
    if let Some(empty) = view.empty {
        println!("{}", empty);
        return Ok(());
    }
    print_table(&headers, &rows);
    if view.page.has_controls() {
        println!(
            "\nPage {}/{} ({} rows)",
            view.page.page, view.page.total_pages, view.page.total_rows
        );
    }
    Ok(())
}

/// Load a list resource and write it to a CSV or JSON file.
pub async fn export(console: &Console, resource: &str, format: &str, dir: &str) -> Result<()> {
    let resource = parse_resource(resource)?;
    let format: ExportFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    if !resource.is_list() {
        anyhow::bail!("{} is not a list and cannot be exported.", resource);
    }
    load(console, resource, "").await?;

    let table = console
        .table(resource)
        .ok_or_else(|| anyhow::anyhow!("{} has no table.", resource))?;
    match table.export_to(format, &DirDownloader::new(dir))? {
        Some(location) => println!("Exported {} rows to {}.", table.rows().len(), location),
        None => println!("Nothing exported."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_parse() {
        assert_eq!(parse_resource("log-rules").unwrap(), Resource::LogRules);
        let err = parse_resource("printers").unwrap_err().to_string();
        assert!(err.contains("Unknown resource: printers"));
        assert!(err.contains("hosts"));
    }
}
