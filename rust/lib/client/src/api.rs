use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::model::*;

/// The data-fetch collaborator: one call per resource, each answering
/// `{ data }` or failing.
#[async_trait::async_trait]
pub trait ConsoleApi: Send + Sync + 'static {
    async fn fetch_hosts(&self) -> Result<Envelope<Vec<Host>>, ApiError>;
    async fn create_host(&self, host: NewHost) -> Result<Envelope<Host>, ApiError>;

    async fn fetch_services(&self) -> Result<Envelope<Vec<Service>>, ApiError>;
    async fn fetch_alerts(&self) -> Result<Envelope<Vec<Alert>>, ApiError>;

    /// Logs whose content contains `keyword`; an empty keyword returns all.
    async fn fetch_logs(&self, keyword: &str) -> Result<Envelope<Vec<LogEntry>>, ApiError>;
    async fn fetch_log_rules(&self) -> Result<Envelope<Vec<LogRule>>, ApiError>;

    async fn fetch_users(&self) -> Result<Envelope<Vec<UserRecord>>, ApiError>;
    async fn fetch_roles(&self) -> Result<Envelope<Vec<RoleRecord>>, ApiError>;

    async fn fetch_settings(&self) -> Result<Envelope<Settings>, ApiError>;
    /// Apply a JSON merge patch and return the updated settings.
    async fn update_settings(&self, patch: Value) -> Result<Envelope<Settings>, ApiError>;
    async fn fetch_security_settings(&self) -> Result<Envelope<SecuritySettings>, ApiError>;
    async fn update_security_settings(
        &self,
        patch: Value,
    ) -> Result<Envelope<SecuritySettings>, ApiError>;

    async fn fetch_reports(&self) -> Result<Envelope<Reports>, ApiError>;

    async fn login(&self, req: LoginRequest) -> Result<Envelope<User>, ApiError>;
}

/// Resources that can be loaded by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Hosts,
    Services,
    Alerts,
    Logs,
    LogRules,
    Users,
    Roles,
    Settings,
    SecuritySettings,
    Reports,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Hosts,
        Resource::Services,
        Resource::Alerts,
        Resource::Logs,
        Resource::LogRules,
        Resource::Users,
        Resource::Roles,
        Resource::Settings,
        Resource::SecuritySettings,
        Resource::Reports,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Hosts => "hosts",
            Resource::Services => "services",
            Resource::Alerts => "alerts",
            Resource::Logs => "logs",
            Resource::LogRules => "log-rules",
            Resource::Users => "users",
            Resource::Roles => "roles",
            Resource::Settings => "settings",
            Resource::SecuritySettings => "security-settings",
            Resource::Reports => "reports",
        }
    }

    /// Whether the resource is a list (rendered in a table) rather than a
    /// single record.
    pub fn is_list(self) -> bool {
        !matches!(
            self,
            Resource::Settings | Resource::SecuritySettings | Resource::Reports
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| ApiError::Decode(format!("unknown resource: {}", s)))
    }
}

/// Fetch any resource as untyped JSON (the `data` part of the envelope).
///
/// `keyword` only applies to logs.
pub async fn fetch_resource(
    api: &dyn ConsoleApi,
    resource: Resource,
    keyword: &str,
) -> Result<Value, ApiError> {
    match resource {
        Resource::Hosts => to_json(api.fetch_hosts().await?),
        Resource::Services => to_json(api.fetch_services().await?),
        Resource::Alerts => to_json(api.fetch_alerts().await?),
        Resource::Logs => to_json(api.fetch_logs(keyword).await?),
        Resource::LogRules => to_json(api.fetch_log_rules().await?),
        Resource::Users => to_json(api.fetch_users().await?),
        Resource::Roles => to_json(api.fetch_roles().await?),
        Resource::Settings => to_json(api.fetch_settings().await?),
        Resource::SecuritySettings => to_json(api.fetch_security_settings().await?),
        Resource::Reports => to_json(api.fetch_reports().await?),
    }
}

fn to_json<T: Serialize>(env: Envelope<T>) -> Result<Value, ApiError> {
    serde_json::to_value(env.data).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_round_trip() {
        for r in Resource::ALL {
            assert_eq!(r.name().parse::<Resource>().unwrap(), r);
        }
        assert!("widgets".parse::<Resource>().is_err());
        assert_eq!(Resource::LogRules.to_string(), "log-rules");
    }

    #[test]
    fn list_resources() {
        assert!(Resource::Hosts.is_list());
        assert!(!Resource::Reports.is_list());
        assert_eq!(Resource::ALL.iter().filter(|r| r.is_list()).count(), 7);
    }
}
