use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use opsconsole_core::{merge_patch, now_millis};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::api::ConsoleApi;
use crate::error::ApiError;
use crate::model::*;

const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;

/// In-process backend with seeded data, simulated latency and a failure
/// switch. Lets the console run with no server at all.
pub struct MockApi {
    db: RwLock<MockDb>,
    delay: Duration,
    fail: AtomicBool,
}

struct MockDb {
    hosts: Vec<Host>,
    services: Vec<Service>,
    alerts: Vec<Alert>,
    logs: Vec<LogEntry>,
    log_rules: Vec<LogRule>,
    users: Vec<UserRecord>,
    roles: Vec<RoleRecord>,
    settings: Value,
    security: Value,
    reports: Reports,
    last_host_id: i64,
}

impl MockDb {
    fn seed(now: i64) -> Self {
        let host = |id: i64, name: &str, ip: &str, status: &str, age: i64| Host {
            id,
            name: name.into(),
            ip: ip.into(),
            status: status.into(),
            created_at: now - age,
        };
        let service = |id: &str, name: &str, status: &str, uptime: &str, version: &str| Service {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            uptime: uptime.into(),
            version: version.into(),
        };
        let levels = ["INFO", "WARN", "ERROR"];

        Self {
            hosts: vec![
                host(1, "web-server-1", "10.0.0.11", "在线", 24 * HOUR_MS),
                host(2, "db-server-1", "10.0.0.21", "维护", 12 * HOUR_MS),
                host(3, "cache-node-1", "10.0.0.31", "在线", 2 * HOUR_MS),
            ],
            services: vec![
                service("svc-gateway", "API 网关", "运行", "3d 4h", "1.4.2"),
                service("svc-auth", "认证服务", "运行", "7d 2h", "2.1.0"),
                service("svc-task", "任务调度", "告警", "12h", "0.9.8"),
            ],
            alerts: vec![
                Alert {
                    id: 101,
                    level: "高".into(),
                    service: "任务调度".into(),
                    message: "任务堆积超过 500 条".into(),
                    time: now - HOUR_MS,
                },
                Alert {
                    id: 102,
                    level: "中".into(),
                    service: "认证服务".into(),
                    message: "登录失败率升高".into(),
                    time: now - 90 * MINUTE_MS,
                },
            ],
            logs: (0..25)
                .map(|i| LogEntry {
                    id: i + 1,
                    level: levels[(i % 3) as usize].into(),
                    content: format!("示例日志内容 {}", i + 1),
                    ts: now - i * MINUTE_MS,
                })
                .collect(),
            log_rules: vec![
                LogRule {
                    id: 1,
                    name: "错误关键字监控".into(),
                    pattern: "ERROR".into(),
                    enabled: true,
                },
                LogRule {
                    id: 2,
                    name: "登录失败报警".into(),
                    pattern: "login failed".into(),
                    enabled: true,
                },
            ],
            users: vec![
                UserRecord {
                    id: 1,
                    name: "admin".into(),
                    email: "admin@example.com".into(),
                    role: "管理员".into(),
                },
                UserRecord {
                    id: 2,
                    name: "ops01".into(),
                    email: "ops01@example.com".into(),
                    role: "运维".into(),
                },
            ],
            roles: vec![
                RoleRecord {
                    id: 1,
                    name: "管理员".into(),
                    permissions: vec!["*".into()],
                },
                RoleRecord {
                    id: 2,
                    name: "运维".into(),
                    permissions: vec!["hosts.read".into(), "services.read".into()],
                },
            ],
            settings: json!({ "siteName": "运维管理控制台", "language": "zh-CN" }),
            security: json!({ "mfa": true, "passwordPolicy": "长度≥8，含数字与字母" }),
            reports: Reports {
                hosts_online: 12,
                services_running: 8,
                alerts_24h: 3,
            },
            last_host_id: 3,
        }
    }
}

impl MockApi {
    /// Seeded mock with the given per-request latency.
    pub fn new(delay: Duration) -> Self {
        Self {
            db: RwLock::new(MockDb::seed(now_millis())),
            delay,
            fail: AtomicBool::new(false),
        }
    }

    /// Seeded mock that answers immediately.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Make every subsequent request fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    /// Simulated round trip: wait, then fail if the switch is on.
    async fn respond<T>(&self, data: T) -> Result<Envelope<T>, ApiError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::Relaxed) {
            debug!("MockApi: failing request");
            return Err(ApiError::Mock("request failed".into()));
        }
        Ok(Envelope::new(data))
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, ApiError> {
    serde_json::from_value(value.clone()).map_err(|e| ApiError::Decode(e.to_string()))
}

fn encode<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl ConsoleApi for MockApi {
    async fn fetch_hosts(&self) -> Result<Envelope<Vec<Host>>, ApiError> {
        let hosts = self.db.read().await.hosts.clone();
        self.respond(hosts).await
    }

    async fn create_host(&self, new: NewHost) -> Result<Envelope<Host>, ApiError> {
        let host = {
            let mut db = self.db.write().await;
            let now = now_millis();
            // Ids are creation times, bumped when two hosts land in the same ms.
            let id = now.max(db.last_host_id + 1);
            db.last_host_id = id;
            let host = Host {
                id,
                name: new.name,
                ip: new.ip,
                status: new.status.unwrap_or_else(|| "在线".into()),
                created_at: now,
            };
            db.hosts.push(host.clone());
            host
        };
        self.respond(host).await
    }

    async fn fetch_services(&self) -> Result<Envelope<Vec<Service>>, ApiError> {
        let services = self.db.read().await.services.clone();
        self.respond(services).await
    }

    async fn fetch_alerts(&self) -> Result<Envelope<Vec<Alert>>, ApiError> {
        let alerts = self.db.read().await.alerts.clone();
        self.respond(alerts).await
    }

    async fn fetch_logs(&self, keyword: &str) -> Result<Envelope<Vec<LogEntry>>, ApiError> {
        let logs: Vec<LogEntry> = self
            .db
            .read()
            .await
            .logs
            .iter()
            .filter(|l| keyword.is_empty() || l.content.contains(keyword))
            .cloned()
            .collect();
        self.respond(logs).await
    }

    async fn fetch_log_rules(&self) -> Result<Envelope<Vec<LogRule>>, ApiError> {
        let rules = self.db.read().await.log_rules.clone();
        self.respond(rules).await
    }

    async fn fetch_users(&self) -> Result<Envelope<Vec<UserRecord>>, ApiError> {
        let users = self.db.read().await.users.clone();
        self.respond(users).await
    }

    async fn fetch_roles(&self) -> Result<Envelope<Vec<RoleRecord>>, ApiError> {
        let roles = self.db.read().await.roles.clone();
        self.respond(roles).await
    }

    async fn fetch_settings(&self) -> Result<Envelope<Settings>, ApiError> {
        let settings = decode(&self.db.read().await.settings)?;
        self.respond(settings).await
    }

    async fn update_settings(&self, patch: Value) -> Result<Envelope<Settings>, ApiError> {
        let settings = {
            let mut db = self.db.write().await;
            let mut next = db.settings.clone();
            merge_patch(&mut next, &patch);
            let typed: Settings = decode(&next)?;
            db.settings = encode(&typed)?;
            typed
        };
        self.respond(settings).await
    }

    async fn fetch_security_settings(&self) -> Result<Envelope<SecuritySettings>, ApiError> {
        let security = decode(&self.db.read().await.security)?;
        self.respond(security).await
    }

    async fn update_security_settings(
        &self,
        patch: Value,
    ) -> Result<Envelope<SecuritySettings>, ApiError> {
        let security = {
            let mut db = self.db.write().await;
            let mut next = db.security.clone();
            merge_patch(&mut next, &patch);
            let typed: SecuritySettings = decode(&next)?;
            db.security = encode(&typed)?;
            typed
        };
        self.respond(security).await
    }

    async fn fetch_reports(&self) -> Result<Envelope<Reports>, ApiError> {
        let reports = self.db.read().await.reports.clone();
        self.respond(reports).await
    }

    async fn login(&self, req: LoginRequest) -> Result<Envelope<User>, ApiError> {
        let user = User {
            email: Some(format!("{}@example.com", req.name)),
            name: req.name,
            role: req.role,
            permissions: req.permissions,
        };
        self.respond(user).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{fetch_resource, Resource};

    // ========================================================================
    // Seed data
    // ========================================================================

    #[tokio::test]
    async fn seeded_collections() {
        let api = MockApi::instant();
        assert_eq!(api.fetch_hosts().await.unwrap().data.len(), 3);
        assert_eq!(api.fetch_services().await.unwrap().data.len(), 3);
        assert_eq!(api.fetch_alerts().await.unwrap().data.len(), 2);
        assert_eq!(api.fetch_log_rules().await.unwrap().data.len(), 2);
        assert_eq!(api.fetch_users().await.unwrap().data.len(), 2);
        assert_eq!(api.fetch_roles().await.unwrap().data[0].permissions, vec!["*"]);
        assert_eq!(api.fetch_reports().await.unwrap().data.hosts_online, 12);
    }

    #[tokio::test]
    async fn logs_cycle_levels_and_filter_by_keyword() {
        let api = MockApi::instant();
        let logs = api.fetch_logs("").await.unwrap().data;
        assert_eq!(logs.len(), 25);
        assert_eq!(logs[0].level, "INFO");
        assert_eq!(logs[1].level, "WARN");
        assert_eq!(logs[2].level, "ERROR");
        assert!(logs[0].ts > logs[1].ts);

        // "内容 2" matches 2 and 20..=25.
        let filtered = api.fetch_logs("内容 2").await.unwrap().data;
        assert_eq!(filtered.len(), 7);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    #[tokio::test]
    async fn create_host_assigns_defaults() {
        let api = MockApi::instant();
        let a = api
            .create_host(NewHost {
                name: "edge-1".into(),
                ip: "10.0.1.1".into(),
                status: None,
            })
            .await
            .unwrap()
            .data;
        let b = api
            .create_host(NewHost {
                name: "edge-2".into(),
                ip: "10.0.1.2".into(),
                status: Some("维护".into()),
            })
            .await
            .unwrap()
            .data;

        assert_eq!(a.status, "在线");
        assert_eq!(b.status, "维护");
        assert!(b.id > a.id);
        assert!(a.created_at > 0);
        assert_eq!(api.fetch_hosts().await.unwrap().data.len(), 5);
    }

    #[tokio::test]
    async fn update_settings_merges_patch() {
        let api = MockApi::instant();
        let updated = api
            .update_settings(json!({ "language": "en-US", "banner": "maintenance" }))
            .await
            .unwrap()
            .data;
        assert_eq!(updated.language, "en-US");
        assert_eq!(updated.site_name, "运维管理控制台");
        assert_eq!(updated.extra.get("banner"), Some(&json!("maintenance")));

        let again = api.fetch_settings().await.unwrap().data;
        assert_eq!(again, updated);
    }

    #[tokio::test]
    async fn update_security_rejects_wrong_types() {
        let api = MockApi::instant();
        let err = api
            .update_security_settings(json!({ "mfa": "yes" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        // The stored value is untouched.
        assert!(api.fetch_security_settings().await.unwrap().data.mfa);
    }

    #[tokio::test]
    async fn login_derives_email() {
        let api = MockApi::instant();
        let user = api
            .login(LoginRequest {
                name: "ops01".into(),
                role: "operator".into(),
                permissions: Some(vec!["users.read".into()]),
            })
            .await
            .unwrap()
            .data;
        assert_eq!(user.email.as_deref(), Some("ops01@example.com"));
        assert_eq!(user.permissions, Some(vec!["users.read".to_string()]));
    }

    // ========================================================================
    // Failure switch and latency
    // ========================================================================

    #[tokio::test]
    async fn failure_switch() {
        let api = MockApi::instant();
        api.set_failing(true);
        assert!(matches!(api.fetch_hosts().await, Err(ApiError::Mock(_))));
        api.set_failing(false);
        assert!(api.fetch_hosts().await.is_ok());
    }

    #[tokio::test]
    async fn latency_is_applied() {
        let api = MockApi::new(Duration::from_millis(30));
        let started = std::time::Instant::now();
        api.fetch_reports().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn fetch_resource_returns_json_data() {
        let api = MockApi::instant();
        let hosts = fetch_resource(&api, Resource::Hosts, "").await.unwrap();
        assert_eq!(hosts.as_array().unwrap().len(), 3);
        assert_eq!(hosts[0]["name"], "web-server-1");

        let reports = fetch_resource(&api, Resource::Reports, "").await.unwrap();
        assert_eq!(reports["alerts24h"], 3);
    }
}
