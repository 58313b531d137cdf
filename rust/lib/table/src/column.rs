use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::row::{display_value, TableRow};

/// Error type for export transforms.
pub type CellError = Box<dyn std::error::Error + Send + Sync>;

/// Cell renderer. Runs unguarded: a panic here propagates to the caller.
pub type RenderFn<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// Export transform. A failure becomes an empty value for that cell only.
pub type ExportFn<R> = Arc<dyn Fn(&R) -> Result<Value, CellError> + Send + Sync>;

/// One column of a table schema.
pub struct Column<R> {
    pub key: String,
    pub name: String,
    pub sortable: bool,
    render: Option<RenderFn<R>>,
    export_value: Option<ExportFn<R>>,
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            name: self.name.clone(),
            sortable: self.sortable,
            render: self.render.clone(),
            export_value: self.export_value.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("sortable", &self.sortable)
            .field("render", &self.render.is_some())
            .field("export_value", &self.export_value.is_some())
            .finish()
    }
}

impl<R: TableRow> Column<R> {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            sortable: false,
            render: None,
            export_value: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(f));
        self
    }

    pub fn export_value<F>(mut self, f: F) -> Self
    where
        F: Fn(&R) -> Result<Value, CellError> + Send + Sync + 'static,
    {
        self.export_value = Some(Arc::new(f));
        self
    }

    pub fn has_export_value(&self) -> bool {
        self.export_value.is_some()
    }

    /// Display text for a cell: the renderer if set, else the raw field.
    pub fn display(&self, row: &R) -> String {
        match &self.render {
            Some(render) => render(row),
            None => row
                .field(&self.key)
                .map(|v| display_value(&v))
                .unwrap_or_default(),
        }
    }

    /// Value written to an export: the transform's output, `null` if the
    /// transform failed, else the raw field, else an empty string.
    pub fn export_cell(&self, row: &R) -> Value {
        match &self.export_value {
            Some(transform) => match transform(row) {
                Ok(v) => v,
                Err(e) => {
                    debug!("Column {}: export transform failed: {}", self.key, e);
                    Value::Null
                }
            },
            None => row
                .field(&self.key)
                .map(|v| v.into_owned())
                .unwrap_or_else(|| Value::String(String::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_uses_renderer_or_raw() {
        let row = json!({"id": 1, "status": "在线"});
        let plain: Column<Value> = Column::new("status", "状态");
        assert_eq!(plain.display(&row), "在线");

        let badge = Column::<Value>::new("status", "状态")
            .render(|r| format!("[{}]", r["status"].as_str().unwrap_or("")));
        assert_eq!(badge.display(&row), "[在线]");

        let missing: Column<Value> = Column::new("ip", "IP");
        assert_eq!(missing.display(&row), "");
    }

    #[test]
    fn export_cell_degrades_failed_transform() {
        let row = json!({"id": 1, "ts": "not a number"});
        let col = Column::<Value>::new("ts", "时间").export_value(|r| {
            let ms = r["ts"].as_i64().ok_or("ts is not numeric")?;
            Ok(json!(ms / 1000))
        });
        assert_eq!(col.export_cell(&row), Value::Null);
        assert_eq!(col.export_cell(&json!({"ts": 5000})), json!(5));
    }

    #[test]
    fn export_cell_raw_or_empty() {
        let row = json!({"id": 1, "name": "web"});
        let name: Column<Value> = Column::new("name", "名称").sortable();
        assert!(name.sortable);
        assert_eq!(name.export_cell(&row), json!("web"));
        assert_eq!(Column::<Value>::new("ip", "IP").export_cell(&row), json!(""));
    }
}
