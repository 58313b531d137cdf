//! Console UI translations: zh-CN and en-US.

use opsconsole_flux::Translator;

pub const ZH_CN: &str = "zh-CN";
pub const EN_US: &str = "en-US";

/// Locales with built-in dictionaries.
pub const LOCALES: [&str; 2] = [ZH_CN, EN_US];

// key, [zh-CN, en-US]
const MESSAGES: &[(&str, [&str; 2])] = &[
    ("app.title", ["运维管理控制台", "Ops Admin Console"]),
    // Menu
    ("menu.dashboard", ["仪表盘", "Dashboard"]),
    ("menu.host.category", ["主机管理", "Host Management"]),
    ("menu.host.list", ["主机列表", "Hosts"]),
    ("menu.host.add", ["添加主机", "Add Host"]),
    ("menu.service.category", ["服务监控", "Service Monitoring"]),
    ("menu.service.list", ["服务列表", "Services"]),
    ("menu.service.alerts", ["告警管理", "Alerts"]),
    ("menu.log.category", ["日志审计", "Log Audit"]),
    ("menu.log.list", ["日志查询", "Logs"]),
    ("menu.log.rules", ["审计规则", "Audit Rules"]),
    ("menu.user.category", ["用户权限", "User & Access"]),
    ("menu.user.users", ["用户管理", "Users"]),
    ("menu.user.roles", ["角色管理", "Roles"]),
    ("menu.system.category", ["系统设置", "System Settings"]),
    ("menu.system.settings", ["基础设置", "Basic Settings"]),
    ("menu.system.security", ["安全设置", "Security"]),
    ("menu.reports", ["报表分析", "Reports"]),
    ("menu.profile", ["个人中心", "Profile"]),
    ("menu.section.other", ["其他", "Other"]),
    // Data table
    ("datatable.export.csv", ["导出 CSV", "Export CSV"]),
    ("datatable.export.json", ["导出 JSON", "Export JSON"]),
    ("datatable.column.config", ["列配置", "Columns"]),
    ("datatable.column.selectAll", ["全选", "Select All"]),
    ("datatable.column.clear", ["清空", "Clear"]),
    ("datatable.empty", ["暂无数据", "No Data"]),
    ("datatable.page.prev", ["上一页", "Prev"]),
    ("datatable.page.next", ["下一页", "Next"]),
    // Common
    (
        "common.forbidden",
        [
            "抱歉，您没有访问此页面的权限。",
            "Sorry, you are not authorized to view this page.",
        ],
    ),
    ("common.notFound", ["页面不存在", "Page not found"]),
    ("common.renderError", ["界面出现错误", "Something went wrong"]),
    ("common.retry", ["重试", "Retry"]),
    ("common.loading", ["加载中...", "Loading..."]),
];

/// Register every built-in dictionary.
pub fn register_all(i18n: &Translator) {
    for (idx, locale) in LOCALES.iter().enumerate() {
        i18n.add_messages(locale, MESSAGES.iter().map(|(k, v)| (*k, v[idx])));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsconsole_flux::Translate;

    #[test]
    fn both_locales_registered() {
        let i18n = Translator::new(ZH_CN);
        register_all(&i18n);
        assert_eq!(i18n.locales(), vec!["en-US".to_string(), "zh-CN".to_string()]);
        assert_eq!(i18n.translate("app.title", None), "运维管理控制台");
        i18n.set_locale(EN_US);
        assert_eq!(i18n.translate("app.title", None), "Ops Admin Console");
        assert_eq!(i18n.translate("datatable.empty", None), "No Data");
    }

    #[test]
    fn no_duplicate_keys() {
        let mut keys: Vec<&str> = MESSAGES.iter().map(|(k, _)| *k).collect();
        keys.sort();
        let n = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), n);
    }

    #[test]
    fn every_menu_label_translated() {
        let i18n = Translator::new(EN_US);
        register_all(&i18n);
        for entry in crate::menu::default_menu().entries() {
            if let Some(key) = &entry.label_key {
                assert_ne!(i18n.translate(key, None), *key, "{} missing", key);
            }
        }
    }
}
