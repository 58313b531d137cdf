use chrono::{DateTime, SecondsFormat, Utc};

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render an instant as an ISO-8601 timestamp safe for file names:
/// millisecond precision, `Z` suffix, with `:` and `.` replaced by `-`.
///
/// `2024-03-05T08:09:10.123Z` becomes `2024-03-05T08-09-10-123Z`.
pub fn filename_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// Merge a JSON patch into a base value.
///
/// For each key in `patch`:
/// - If the value is `null`, the key is removed from `base`.
/// - Otherwise, the key is set to the patch value.
///
/// This follows RFC 7386 (JSON Merge Patch) semantics.
pub fn merge_patch(base: &mut serde_json::Value, patch: &serde_json::Value) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else if value.is_object() {
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = patch.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_millis() {
        assert!(now_millis() > 1_700_000_000_000);
    }

    #[test]
    fn test_filename_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 8, 9, 10).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(filename_timestamp(at), "2024-03-05T08-09-10-123Z");
    }

    #[test]
    fn test_merge_patch() {
        let mut base = serde_json::json!({"siteName": "Ops", "language": "zh-CN", "smtp": {"host": "a"}});
        let patch = serde_json::json!({"language": "en-US", "smtp": {"port": 25}, "banner": null});
        merge_patch(&mut base, &patch);
        assert_eq!(
            base,
            serde_json::json!({"siteName": "Ops", "language": "en-US", "smtp": {"host": "a", "port": 25}})
        );
    }
}
