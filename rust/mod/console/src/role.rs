//! Role codes. Logic always works with the English code; labels are for
//! display only.

/// Canonical role codes, most privileged first.
pub const ROLE_CODES: [&str; 4] = ["admin", "auditor", "operator", "viewer"];

/// Role a user gets when nothing usable was supplied.
pub const DEFAULT_ROLE: &str = "viewer";

/// Map a code or a localized label to its canonical code. Empty or
/// unrecognised input becomes `viewer`.
pub fn normalize_role(input: &str) -> &'static str {
    match input.trim() {
        "admin" | "管理员" => "admin",
        "auditor" | "审计" => "auditor",
        "operator" | "运维" => "operator",
        _ => DEFAULT_ROLE,
    }
}

/// Display label for a role code. Unknown codes are returned as-is.
pub fn role_label(code: &str) -> String {
    match code {
        "admin" => "管理员",
        "auditor" => "审计",
        "operator" => "运维",
        "viewer" => "只读",
        other => other,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_codes_normalize() {
        assert_eq!(normalize_role("管理员"), "admin");
        assert_eq!(normalize_role("admin"), "admin");
        assert_eq!(normalize_role("审计"), "auditor");
        assert_eq!(normalize_role("运维"), "operator");
        assert_eq!(normalize_role("只读"), "viewer");
        assert_eq!(normalize_role(""), "viewer");
        assert_eq!(normalize_role("root"), "viewer");
    }

    #[test]
    fn every_code_round_trips_through_its_label() {
        for code in ROLE_CODES {
            assert_eq!(normalize_role(&role_label(code)), code);
        }
        assert_eq!(role_label("ghost"), "ghost");
    }
}
