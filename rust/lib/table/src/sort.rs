use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::Column;
use crate::row::TableRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sort state after a header click: a new column starts ascending, the
/// same column flips direction.
pub fn next_sort(current: Option<&SortSpec>, key: &str) -> SortSpec {
    match current {
        Some(spec) if spec.key == key => SortSpec {
            key: key.to_string(),
            direction: spec.direction.flipped(),
        },
        _ => SortSpec::asc(key),
    }
}

/// Precomputed sort key for one cell.
///
/// Kinds rank `Null < Num < Instant < Text`, so a column holding numbers,
/// dates and free text still sorts into one consistent order.
#[derive(Debug, Clone)]
enum SortKey {
    Null,
    Num(f64),
    Instant(i64),
    Text(String),
}

impl SortKey {
    fn of(v: Option<&Value>) -> Self {
        match v {
            None | Some(Value::Null) => SortKey::Null,
            Some(Value::Number(n)) => SortKey::Num(n.as_f64().unwrap_or(0.0)),
            Some(other) => match parse_instant(other) {
                Some(ms) => SortKey::Instant(ms),
                None => SortKey::Text(text_of(other)),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Null => 0,
            SortKey::Num(_) => 1,
            SortKey::Instant(_) => 2,
            SortKey::Text(_) => 3,
        }
    }

    /// Nulls stay first whatever the direction; everything else follows it.
    fn compare(&self, other: &Self, direction: SortDirection) -> Ordering {
        let ord = match (self, other) {
            (SortKey::Null, SortKey::Null) => return Ordering::Equal,
            (SortKey::Null, _) => return Ordering::Less,
            (_, SortKey::Null) => return Ordering::Greater,
            (SortKey::Num(x), SortKey::Num(y)) => x.total_cmp(y),
            (SortKey::Instant(x), SortKey::Instant(y)) => x.cmp(y),
            (SortKey::Text(x), SortKey::Text(y)) => locale_cmp(x, y),
            (x, y) => x.rank().cmp(&y.rank()),
        };
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Compare two cell values.
///
/// Missing and `null` values come first in either direction. Two numbers
/// compare numerically, two date-like strings compare as instants, and two
/// other values compare as text. Values of different kinds order numbers
/// before dates before text.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    SortKey::of(a).compare(&SortKey::of(b), direction)
}

/// Row order (indices into `rows`) for a sort spec. `None`, or a key that
/// names no column, keeps input order. The sort is stable.
pub fn sorted_indices<R: TableRow>(
    rows: &[R],
    columns: &[Column<R>],
    spec: Option<&SortSpec>,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    let Some(spec) = spec else {
        return order;
    };
    if !columns.iter().any(|c| c.key == spec.key) {
        return order;
    }

    let keys: Vec<SortKey> = rows
        .iter()
        .map(|r| SortKey::of(r.field(&spec.key).as_deref()))
        .collect();
    order.sort_by(|&i, &j| keys[i].compare(&keys[j], spec.direction));
    order
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Millisecond instant for strings that look like dates or timestamps.
fn parse_instant(v: &Value) -> Option<i64> {
    let s = v.as_str()?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

/// Text comparison in dictionary order: letters compare case-insensitively
/// first, and only strings that differ by case alone are ordered with the
/// lowercase form first.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if folded != Ordering::Equal {
        return folded;
    }
    for (x, y) in a.chars().zip(b.chars()) {
        if x != y {
            return match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            };
        }
    }
    a.len().cmp(&b.len())
}
