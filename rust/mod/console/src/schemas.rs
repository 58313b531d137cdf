//! Column schemas for the list resources.

use chrono::{DateTime, SecondsFormat, Utc};
use opsconsole_client::Resource;
use opsconsole_table::{display_value, CellError, Column, SortSpec};
use serde_json::Value;

use crate::role::{normalize_role, role_label};

/// How many permission tags a role row shows before collapsing to `+N`.
const ROLE_TAG_LIMIT: usize = 5;

fn millis(row: &Value, key: &str) -> Option<DateTime<Utc>> {
    row.get(key)
        .and_then(Value::as_i64)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// Timestamp cell as `YYYY-MM-DD HH:MM:SS`. Non-numeric values show raw.
fn time_cell(key: &'static str) -> impl Fn(&Value) -> String + Send + Sync + 'static {
    move |row| match millis(row, key) {
        Some(at) => at.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => row.get(key).map(display_value).unwrap_or_default(),
    }
}

/// Timestamp export as RFC 3339.
fn time_export(
    key: &'static str,
) -> impl Fn(&Value) -> Result<Value, CellError> + Send + Sync + 'static {
    move |row| {
        let at = millis(row, key).ok_or_else(|| format!("{} is not a timestamp", key))?;
        Ok(Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true)))
    }
}

fn role_text(row: &Value) -> String {
    let raw = row.get("role").and_then(Value::as_str).unwrap_or_default();
    role_label(normalize_role(raw))
}

pub fn hosts_columns() -> Vec<Column<Value>> {
    vec![
        Column::new("name", "主机名"),
        Column::new("ip", "IP 地址"),
        Column::new("status", "状态"),
        Column::new("createdAt", "添加时间")
            .render(time_cell("createdAt"))
            .export_value(time_export("createdAt")),
    ]
}

pub fn logs_columns() -> Vec<Column<Value>> {
    vec![
        Column::new("id", "ID").sortable(),
        Column::new("level", "级别").sortable(),
        Column::new("content", "内容"),
        Column::new("ts", "时间")
            .sortable()
            .render(time_cell("ts"))
            .export_value(time_export("ts")),
    ]
}

pub fn log_rules_columns() -> Vec<Column<Value>> {
    vec![
        Column::new("id", "ID").sortable(),
        Column::new("name", "名称").sortable(),
        Column::new("pattern", "匹配模式")
            .render(|r: &Value| format!("/{}/", r["pattern"].as_str().unwrap_or_default())),
        Column::new("enabled", "启用").render(|r: &Value| {
            if r["enabled"].as_bool().unwrap_or(false) {
                "是".to_string()
            } else {
                "否".to_string()
            }
        }),
    ]
}

pub fn users_columns() -> Vec<Column<Value>> {
    vec![
        Column::new("id", "ID").sortable(),
        Column::new("name", "用户名").sortable(),
        Column::new("email", "邮箱"),
        Column::new("role", "角色")
            .render(role_text)
            .export_value(|r: &Value| Ok(Value::String(role_text(r)))),
    ]
}

pub fn services_columns() -> Vec<Column<Value>> {
    vec![
        Column::new("name", "名称"),
        Column::new("status", "状态"),
        Column::new("uptime", "运行时长"),
        Column::new("version", "版本"),
    ]
}

pub fn alerts_columns() -> Vec<Column<Value>> {
    vec![
        Column::new("level", "级别"),
        Column::new("service", "服务"),
        Column::new("message", "描述"),
        Column::new("time", "时间")
            .render(time_cell("time"))
            .export_value(time_export("time")),
    ]
}

pub fn roles_columns() -> Vec<Column<Value>> {
    vec![
        Column::new("id", "ID").sortable(),
        Column::new("name", "名称").sortable(),
        Column::new("permissions", "权限").render(|r: &Value| {
            let perms: Vec<&str> = r["permissions"]
                .as_array()
                .map(|a| a.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let mut shown = perms
                .iter()
                .take(ROLE_TAG_LIMIT)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            if perms.len() > ROLE_TAG_LIMIT {
                shown.push_str(&format!(" +{}", perms.len() - ROLE_TAG_LIMIT));
            }
            shown
        }),
    ]
}

/// Schema for a list resource. `None` for single-record resources.
pub fn columns_for(resource: Resource) -> Option<Vec<Column<Value>>> {
    let columns = match resource {
        Resource::Hosts => hosts_columns(),
        Resource::Services => services_columns(),
        Resource::Alerts => alerts_columns(),
        Resource::Logs => logs_columns(),
        Resource::LogRules => log_rules_columns(),
        Resource::Users => users_columns(),
        Resource::Roles => roles_columns(),
        Resource::Settings | Resource::SecuritySettings | Resource::Reports => return None,
    };
    Some(columns)
}

/// Sort a list starts with, if any.
pub fn initial_sort_for(resource: Resource) -> Option<SortSpec> {
    match resource {
        Resource::Hosts => Some(SortSpec::asc("name")),
        Resource::Logs | Resource::LogRules | Resource::Users | Resource::Roles => {
            Some(SortSpec::asc("id"))
        }
        _ => None,
    }
}

/// Rows per page for a list.
pub fn page_size_for(resource: Resource, default: usize) -> usize {
    match resource {
        Resource::Users | Resource::Roles => 15,
        _ => default,
    }
}

/// Text shown when a list has no rows.
pub fn empty_text_for(resource: Resource) -> &'static str {
    match resource {
        Resource::Hosts => "暂无主机",
        Resource::Users => "暂无用户",
        Resource::Roles => "暂无角色",
        _ => "暂无数据",
    }
}
