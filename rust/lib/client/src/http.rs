use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::ConsoleApi;
use crate::error::ApiError;
use crate::model::*;

/// HTTP backend for [`ConsoleApi`].
///
/// Endpoints live under `{base_url}/api/`.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Parse an API response, mapping HTTP errors to `ApiError`.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: code,
                message: body,
            });
        }
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<Envelope<R>, ApiError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send().await?;
        Self::parse(resp).await
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope<R>, ApiError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let resp = self.http.post(&url).json(body).send().await?;
        Self::parse(resp).await
    }

    async fn put<R: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<Envelope<R>, ApiError> {
        let url = self.url(path);
        debug!("PUT {}", url);
        let resp = self.http.put(&url).json(body).send().await?;
        Self::parse(resp).await
    }
}

#[async_trait::async_trait]
impl ConsoleApi for HttpApi {
    async fn fetch_hosts(&self) -> Result<Envelope<Vec<Host>>, ApiError> {
        self.get("hosts").await
    }

    async fn create_host(&self, host: NewHost) -> Result<Envelope<Host>, ApiError> {
        self.post("hosts", &host).await
    }

    async fn fetch_services(&self) -> Result<Envelope<Vec<Service>>, ApiError> {
        self.get("services").await
    }

    async fn fetch_alerts(&self) -> Result<Envelope<Vec<Alert>>, ApiError> {
        self.get("alerts").await
    }

    async fn fetch_logs(&self, keyword: &str) -> Result<Envelope<Vec<LogEntry>>, ApiError> {
        if keyword.is_empty() {
            return self.get("logs").await;
        }
        let url = self.url("logs");
        debug!("GET {} keyword={}", url, keyword);
        let resp = self
            .http
            .get(&url)
            .query(&[("keyword", keyword)])
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn fetch_log_rules(&self) -> Result<Envelope<Vec<LogRule>>, ApiError> {
        self.get("log-rules").await
    }

    async fn fetch_users(&self) -> Result<Envelope<Vec<UserRecord>>, ApiError> {
        self.get("users").await
    }

    async fn fetch_roles(&self) -> Result<Envelope<Vec<RoleRecord>>, ApiError> {
        self.get("roles").await
    }

    async fn fetch_settings(&self) -> Result<Envelope<Settings>, ApiError> {
        self.get("settings").await
    }

    async fn update_settings(&self, patch: Value) -> Result<Envelope<Settings>, ApiError> {
        self.put("settings", &patch).await
    }

    async fn fetch_security_settings(&self) -> Result<Envelope<SecuritySettings>, ApiError> {
        self.get("settings/security").await
    }

    async fn update_security_settings(
        &self,
        patch: Value,
    ) -> Result<Envelope<SecuritySettings>, ApiError> {
        self.put("settings/security", &patch).await
    }

    async fn fetch_reports(&self) -> Result<Envelope<Reports>, ApiError> {
        self.get("reports").await
    }

    async fn login(&self, req: LoginRequest) -> Result<Envelope<User>, ApiError> {
        self.post("auth/login", &req).await
    }
}
