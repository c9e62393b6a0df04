//! HTTP client for the timesheet REST API.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, header};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::PingResponse;
use crate::error::{EngineError, EngineResult};
use crate::models::DayRecord;
use crate::store::Settings;

use super::backup::{LocalBackup, records_from_value};
use super::retry::RetryPolicy;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a loaded collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The server returned a non-empty collection.
    Remote,
    /// The server failed or returned nothing; the local backup was used.
    Backup,
    /// Neither the server nor the backup had records.
    Empty,
}

/// Result of [`TimesheetClient::load_work_days`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedWorkDays {
    /// The records, in stored order.
    pub records: Vec<DayRecord>,
    /// Where they came from.
    pub source: LoadSource,
}

/// Client for `/work-days`, `/settings` and `/ping` with retries and an
/// optional local backup.
///
/// # Example
///
/// ```no_run
/// use timesheet_engine::client::{LocalBackup, TimesheetClient};
///
/// # async fn example() -> timesheet_engine::error::EngineResult<()> {
/// let client = TimesheetClient::new("http://127.0.0.1:3000")?
///     .with_backup(LocalBackup::new("./backup"));
///
/// let loaded = client.load_work_days().await;
/// println!("{} records from {:?}", loaded.records.len(), loaded.source);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TimesheetClient {
    client: ReqwestClient,
    base_url: String,
    retry: RetryPolicy,
    backup: Option<LocalBackup>,
}

impl TimesheetClient {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> EngineResult<Self> {
        let client = ReqwestClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EngineError::Transport {
                attempts: 0,
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
            backup: None,
        })
    }

    /// Replaces the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enables the local backup fallback.
    pub fn with_backup(mut self, backup: LocalBackup) -> Self {
        self.backup = Some(backup);
        self
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request, retrying transport failures and non-2xx responses.
    ///
    /// Returns the decoded body when the response is JSON, `None` otherwise.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> EngineResult<Option<Value>> {
        let url = self.url(path);
        let attempts = self.retry.attempts();
        let mut last_error = String::new();

        for attempt in 0..attempts {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .header(header::CACHE_CONTROL, "no-cache");
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    let is_json = response
                        .headers()
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|v| v.contains("application/json"));
                    if !is_json {
                        return Ok(None);
                    }
                    match response.json::<Value>().await {
                        Ok(value) => return Ok(Some(value)),
                        Err(e) => last_error = e.to_string(),
                    }
                }
                Ok(response) => {
                    last_error = format!("HTTP error status: {}", response.status().as_u16());
                }
                Err(e) => last_error = e.to_string(),
            }

            warn!(
                attempt = attempt + 1,
                %method,
                %url,
                error = %last_error,
                "request attempt failed"
            );
            if attempt + 1 < attempts {
                let delay = self.retry.delay_for(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(EngineError::Transport {
            attempts,
            message: last_error,
        })
    }

    /// Fetches the collection from the server.
    ///
    /// A payload that is not an array is treated as empty.
    pub async fn fetch_work_days(&self) -> EngineResult<Vec<DayRecord>> {
        let body = self.send(Method::GET, "/work-days", None).await?;
        Ok(body.map(records_from_value).unwrap_or_default())
    }

    /// Loads the collection, falling back to the local backup when the
    /// server fails or returns nothing.
    pub async fn load_work_days(&self) -> LoadedWorkDays {
        let remote = match self.fetch_work_days().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to load work days from server");
                Vec::new()
            }
        };
        if !remote.is_empty() {
            return LoadedWorkDays {
                records: remote,
                source: LoadSource::Remote,
            };
        }

        let backed_up = match &self.backup {
            Some(backup) => backup.load_work_days().unwrap_or_else(|e| {
                warn!(error = %e, "failed to read local backup");
                Vec::new()
            }),
            None => Vec::new(),
        };
        if backed_up.is_empty() {
            return LoadedWorkDays {
                records: Vec::new(),
                source: LoadSource::Empty,
            };
        }

        info!(count = backed_up.len(), "restored work days from local backup");
        LoadedWorkDays {
            records: backed_up,
            source: LoadSource::Backup,
        }
    }

    /// Replaces the server collection with `records`.
    ///
    /// On failure the collection is written to the local backup before the
    /// error is returned.
    pub async fn save_work_days(&self, records: &[DayRecord]) -> EngineResult<()> {
        let body = serde_json::to_value(records)?;
        match self.send(Method::POST, "/work-days", Some(&body)).await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, count = records.len(), "saving work days failed");
                if let Some(backup) = &self.backup {
                    if let Err(backup_error) = backup.save_work_days(records) {
                        warn!(error = %backup_error, "local backup failed");
                    }
                }
                Err(e)
            }
        }
    }

    /// Fetches the settings document.
    pub async fn fetch_settings(&self) -> EngineResult<Settings> {
        match self.send(Method::GET, "/settings", None).await? {
            Some(Value::Object(settings)) => Ok(settings),
            _ => Ok(Settings::new()),
        }
    }

    /// Loads the settings, falling back to the local backup and then to an
    /// empty document.
    pub async fn load_settings(&self) -> Settings {
        match self.fetch_settings().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "failed to load settings from server");
                self.backup
                    .as_ref()
                    .and_then(|backup| backup.load_settings().ok())
                    .unwrap_or_default()
            }
        }
    }

    /// Merges `patch` into the server settings, backing it up locally on
    /// failure.
    pub async fn save_settings(&self, patch: &Settings) -> EngineResult<()> {
        let body = Value::Object(patch.clone());
        match self.send(Method::POST, "/settings", Some(&body)).await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "saving settings failed");
                if let Some(backup) = &self.backup {
                    if let Err(backup_error) = backup.save_settings(patch) {
                        warn!(error = %backup_error, "local settings backup failed");
                    }
                }
                Err(e)
            }
        }
    }

    /// Probes `/ping` once and reports whether the server's storage is up.
    pub async fn ping(&self) -> EngineResult<bool> {
        let url = self.url("/ping");
        let response = self
            .client
            .get(&url)
            .header(header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| EngineError::Transport {
                attempts: 1,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let ping = response
            .json::<PingResponse>()
            .await
            .map_err(|e| EngineError::Transport {
                attempts: 1,
                message: e.to_string(),
            })?;
        Ok(ping.db_connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_record(id: i64) -> DayRecord {
        DayRecord {
            id,
            date: "2024-06-03".to_string(),
            clock_in: "08:00".to_string(),
            break_out: String::new(),
            break_in: String::new(),
            clock_out: "17:00".to_string(),
            is_saturday: false,
        }
    }

    fn client_for(server: &MockServer) -> TimesheetClient {
        TimesheetClient::new(server.uri())
            .unwrap()
            .with_retry(RetryPolicy::immediate(3))
    }

    #[tokio::test]
    async fn test_fetch_work_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "date": "2024-06-03", "clockIn": "08:00", "clockOut": "17:00"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server).fetch_work_days().await.unwrap();
        assert_eq!(records, vec![make_record(1)]);
    }

    #[tokio::test]
    async fn test_non_array_payload_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
            .mount(&server)
            .await;

        assert!(client_for(&server).fetch_work_days().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5}])))
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server).fetch_work_days().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 5);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_work_days().await;
        match result {
            Err(EngineError::Transport { attempts, message }) => {
                assert_eq!(attempts, 3);
                assert!(message.contains("500"));
            }
            other => panic!("Expected Transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_save_posts_collection() {
        let server = MockServer::start().await;
        let records = vec![make_record(1), make_record(2)];
        Mock::given(method("POST"))
            .and(path("/work-days"))
            .and(body_json(serde_json::to_value(&records).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"saved": 2})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).save_work_days(&records).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_success_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .save_work_days(&[make_record(1)])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_save_writes_backup_and_load_restores_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = client_for(&server).with_backup(LocalBackup::new(dir.path()));
        let records = vec![make_record(1), make_record(2)];

        assert!(client.save_work_days(&records).await.is_err());

        let loaded = client.load_work_days().await;
        assert_eq!(loaded.source, LoadSource::Backup);
        assert_eq!(loaded.records, records);
    }

    #[tokio::test]
    async fn test_load_prefers_non_empty_remote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 9}])))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let backup = LocalBackup::new(dir.path());
        backup.save_work_days(&[make_record(1)]).unwrap();

        let loaded = client_for(&server).with_backup(backup).load_work_days().await;
        assert_eq!(loaded.source, LoadSource::Remote);
        assert_eq!(loaded.records[0].id, 9);
    }

    #[tokio::test]
    async fn test_load_without_anything_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/work-days"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let loaded = client_for(&server).load_work_days().await;
        assert_eq!(loaded.source, LoadSource::Empty);
        assert!(loaded.records.is_empty());
    }

    #[tokio::test]
    async fn test_settings_fall_back_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/settings"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        assert!(client_for(&server).load_settings().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_settings_save_is_backed_up() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/settings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/settings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let client = client_for(&server).with_backup(LocalBackup::new(dir.path()));
        let mut patch = Settings::new();
        patch.insert("theme".to_string(), json!("dark"));

        assert!(client.save_settings(&patch).await.is_err());
        assert_eq!(client.load_settings().await["theme"], json!("dark"));
    }

    #[tokio::test]
    async fn test_ping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ok",
                "dbConnected": false
            })))
            .mount(&server)
            .await;

        assert!(!client_for(&server).ping().await.unwrap());
    }

    #[tokio::test]
    async fn test_ping_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server).ping().await;
        assert!(matches!(
            result,
            Err(EngineError::UnexpectedStatus { status: 404, .. })
        ));
    }
}
