//! CSV and JSON export of table rows.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use opsconsole_core::filename_timestamp;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::column::Column;
use crate::row::display_value;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8;",
            ExportFormat::Json => "application/json;charset=utf-8;",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

/// Which rows an export draws from before the selection filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportScope {
    /// Every row, in sorted order.
    #[default]
    All,
    /// Only the current page.
    Page,
}

pub type ColumnFilter<R> = Arc<dyn Fn(&Column<R>) -> bool + Send + Sync>;
pub type RowMapper<R> = Arc<dyn Fn(&R) -> R + Send + Sync>;

pub struct ExportOptions<R> {
    pub enabled: bool,
    pub filename_prefix: Option<String>,
    pub formats: Vec<ExportFormat>,
    pub scope: ExportScope,
    pub map_row: Option<RowMapper<R>>,
    pub columns_filter: Option<ColumnFilter<R>>,
    pub respect_visibility: bool,
}

impl<R> Default for ExportOptions<R> {
    fn default() -> Self {
        Self {
            enabled: true,
            filename_prefix: None,
            formats: vec![ExportFormat::Csv, ExportFormat::Json],
            scope: ExportScope::All,
            map_row: None,
            columns_filter: None,
            respect_visibility: false,
        }
    }
}

impl<R> ExportOptions<R> {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filename_prefix = Some(prefix.into());
        self
    }

    pub fn scope(mut self, scope: ExportScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn respect_visibility(mut self) -> Self {
        self.respect_visibility = true;
        self
    }

    pub fn columns_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Column<R>) -> bool + Send + Sync + 'static,
    {
        self.columns_filter = Some(Arc::new(f));
        self
    }

    pub fn map_row<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> R + Send + Sync + 'static,
    {
        self.map_row = Some(Arc::new(f));
        self
    }
}

/// A finished export, ready to hand to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub content: String,
}

/// `{prefix}_{timestamp}.{ext}`, prefix defaulting to `export`.
pub fn export_filename(prefix: Option<&str>, at: DateTime<Utc>, format: ExportFormat) -> String {
    let prefix = prefix.filter(|p| !p.is_empty()).unwrap_or("export");
    format!("{}_{}.{}", prefix, filename_timestamp(at), format.extension())
}

/// Quote a CSV field when it contains a comma, a quote, CR or LF. Inner
/// quotes are doubled.
pub fn csv_field(raw: &str) -> String {
    if raw.contains(['"', ',', '\r', '\n']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Header line of display names, then one line per row, joined by `\n`.
pub fn to_csv<R: crate::row::TableRow>(rows: &[&R], columns: &[&Column<R>]) -> String {
    let header = columns
        .iter()
        .map(|c| csv_field(&c.name))
        .collect::<Vec<_>>()
        .join(",");
    let mut out = header;
    for row in rows {
        out.push('\n');
        let line = columns
            .iter()
            .map(|c| csv_field(&display_value(&c.export_cell(row))))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
    }
    out
}

/// Pretty-printed array of objects keyed by column key, in column order.
pub fn to_json<R: crate::row::TableRow>(
    rows: &[&R],
    columns: &[&Column<R>],
) -> Result<String, ExportError> {
    let records: Vec<OrderedRecord> = rows
        .iter()
        .map(|row| {
            OrderedRecord(
                columns
                    .iter()
                    .map(|c| (c.key.as_str(), c.export_cell(row)))
                    .collect(),
            )
        })
        .collect();
    serde_json::to_string_pretty(&records).map_err(|e| ExportError::Encode(e.to_string()))
}

/// Keeps column order in the JSON output.
struct OrderedRecord<'a>(Vec<(&'a str, Value)>);

impl Serialize for OrderedRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ── Delivery ──

/// Hands a finished export to the user.
pub trait Downloader: Send + Sync {
    /// Deliver the file. Returns where it ended up, for display.
    fn offer(&self, file: &ExportFile) -> Result<String, ExportError>;
}

/// Writes exports into a directory.
///
/// Content goes to a temporary file in the target directory first and is
/// then renamed into place; the temporary handle is released as soon as
/// the rename happens, or removed if anything fails.
pub struct DirDownloader {
    dir: PathBuf,
}

impl DirDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Downloader for DirDownloader {
    fn offer(&self, file: &ExportFile) -> Result<String, ExportError> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(file.content.as_bytes())?;
        tmp.flush()?;
        let target = self.dir.join(&file.filename);
        tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;
        debug!("DirDownloader: wrote {:?}", target);
        Ok(target.display().to_string())
    }
}

/// Keeps exports in memory until taken. Lets a front-end pull the bytes and
/// lets tests inspect what was offered.
#[derive(Default)]
pub struct MemoryDownloader {
    files: Mutex<Vec<ExportFile>>,
}

impl MemoryDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending file, releasing them from the downloader.
    pub fn take(&self) -> Vec<ExportFile> {
        std::mem::take(&mut *self.files.lock().unwrap())
    }

    pub fn pending(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl Downloader for MemoryDownloader {
    fn offer(&self, file: &ExportFile) -> Result<String, ExportError> {
        self.files.lock().unwrap().push(file.clone());
        Ok(file.filename.clone())
    }
}

impl fmt::Debug for MemoryDownloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDownloader")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn columns() -> Vec<Column<Value>> {
        vec![Column::new("id", "ID"), Column::new("name", "名称")]
    }

    fn rows() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": "Alpha"}),
            json!({"id": 2, "name": "Beta, Inc."}),
            json!({"id": 3, "name": "say \"hi\""}),
        ]
    }

    // ========================================================================
    // Formatting
    // ========================================================================

    #[test]
    fn csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
        assert_eq!(csv_field("a\rb"), "\"a\rb\"");
        assert_eq!(csv_field("dos\r\nline"), "\"dos\r\nline\"");
    }

    #[test]
    fn csv_has_header_plus_one_line_per_row() {
        let cols = columns();
        let col_refs: Vec<&Column<Value>> = cols.iter().collect();
        let data = rows();
        let row_refs: Vec<&Value> = data.iter().collect();

        let csv = to_csv(&row_refs, &col_refs);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ID,名称");
        assert_eq!(lines[1], "1,Alpha");
        assert_eq!(lines[2], "2,\"Beta, Inc.\"");
        assert_eq!(lines[3], "3,\"say \"\"hi\"\"\"");
    }

    #[test]
    fn json_objects_carry_exactly_the_column_keys_in_order() {
        let cols = columns();
        let col_refs: Vec<&Column<Value>> = cols.iter().collect();
        let data = rows();
        let row_refs: Vec<&Value> = data.iter().collect();

        let text = to_json(&row_refs, &col_refs).unwrap();
        assert!(text.contains("\n  {"));
        assert!(text.find("\"id\"").unwrap() < text.find("\"name\"").unwrap());

        let parsed: Vec<serde_json::Map<String, Value>> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.len(), 3);
        for obj in &parsed {
            let mut keys: Vec<&String> = obj.keys().collect();
            keys.sort();
            assert_eq!(keys, vec!["id", "name"]);
        }
        assert_eq!(parsed[1]["name"], "Beta, Inc.");
    }

    #[test]
    fn failing_transform_is_empty_in_csv_and_null_in_json() {
        let cols: Vec<Column<Value>> = vec![
            Column::new("id", "ID"),
            Column::<Value>::new("name", "名称").export_value(|r| {
                let name = r["name"].as_str().ok_or("no name")?;
                if name.starts_with('B') {
                    return Err("boom".into());
                }
                Ok(json!(name.to_uppercase()))
            }),
        ];
        let col_refs: Vec<&Column<Value>> = cols.iter().collect();
        let data = rows();
        let row_refs: Vec<&Value> = data.iter().collect();

        let csv = to_csv(&row_refs, &col_refs);
        assert_eq!(csv.split('\n').nth(1), Some("1,ALPHA"));
        assert_eq!(csv.split('\n').nth(2), Some("2,"));

        let parsed: Vec<Value> = serde_json::from_str(&to_json(&row_refs, &col_refs).unwrap()).unwrap();
        assert_eq!(parsed[1]["name"], Value::Null);
        assert_eq!(parsed[2]["name"], "SAY \"HI\"");
    }

    #[test]
    fn filename_pattern() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 8, 9, 10).unwrap();
        assert_eq!(
            export_filename(Some("hosts"), at, ExportFormat::Csv),
            "hosts_2024-03-05T08-09-10-000Z.csv"
        );
        assert_eq!(
            export_filename(None, at, ExportFormat::Json),
            "export_2024-03-05T08-09-10-000Z.json"
        );
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    // ========================================================================
    // Delivery
    // ========================================================================

    #[test]
    fn dir_downloader_writes_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = DirDownloader::new(dir.path().join("exports"));
        let file = ExportFile {
            filename: "hosts_x.csv".into(),
            mime: ExportFormat::Csv.mime(),
            content: "ID\n1".into(),
        };

        let location = downloader.offer(&file).unwrap();
        assert!(location.ends_with("hosts_x.csv"));
        let written = std::fs::read_to_string(downloader.dir().join("hosts_x.csv")).unwrap();
        assert_eq!(written, "ID\n1");
        assert_eq!(std::fs::read_dir(downloader.dir()).unwrap().count(), 1);
    }

    #[test]
    fn memory_downloader_releases_on_take() {
        let downloader = MemoryDownloader::new();
        let file = ExportFile {
            filename: "a.json".into(),
            mime: ExportFormat::Json.mime(),
            content: "[]".into(),
        };
        downloader.offer(&file).unwrap();
        assert_eq!(downloader.pending(), 1);
        assert_eq!(downloader.take(), vec![file]);
        assert_eq!(downloader.pending(), 0);
    }
}
