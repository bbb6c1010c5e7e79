use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    BaseHttpClientConfig, ConfigError, DatabaseConfig, StateConfig,
    deserialize_duration_from_seconds, serialize_duration_to_seconds,
};
use crate::models::{MessageTemplate, NotificationSettings, QuerySpec};

/// Base endpoint written into a freshly created default document.
fn default_base_notification_url() -> String {
    "https://ntfy.sh/sqlal".to_string()
}

/// Provides the default value for check_interval_secs.
fn default_check_interval() -> Duration {
    Duration::from_secs(60)
}

/// Application configuration for sqlal.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Connection parameters for the monitored database.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Endpoint for notifications of queries without their own override, and
    /// for the startup notification. Required.
    pub base_notification_url: String,

    /// Message template with one `%d` placeholder for the new row count.
    #[serde(default)]
    pub notification_message: MessageTemplate,

    /// The interval in seconds between two monitoring cycles.
    #[serde(
        rename = "check_interval_secs",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_check_interval"
    )]
    pub check_interval: Duration,

    /// The monitored queries, evaluated in this order every cycle.
    #[serde(default)]
    pub queries: Vec<QuerySpec>,

    /// Storage for already-notified identifiers.
    #[serde(default)]
    pub state: StateConfig,

    /// Configuration for the HTTP client delivering notifications.
    #[serde(default)]
    pub http: BaseHttpClientConfig,

    /// Directory the configuration was loaded from. Relative paths in the
    /// document are resolved against it.
    #[serde(skip)]
    pub config_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: "3306".to_string(),
                ..DatabaseConfig::default()
            },
            base_notification_url: default_base_notification_url(),
            notification_message: MessageTemplate::default(),
            check_interval: default_check_interval(),
            queries: vec![QuerySpec {
                name: "example".to_string(),
                query: "SELECT id FROM orders".to_string(),
                notification_url: None,
                enabled: false,
            }],
            state: StateConfig::default(),
            http: BaseHttpClientConfig::default(),
            config_dir: PathBuf::new(),
        }
    }
}

impl AppConfig {
    /// Loads and validates the configuration at `path`, applying `SQLAL__`
    /// environment overrides on top of the file.
    #[tracing::instrument(level = "debug")]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("SQLAL").separator("__").try_parsing(true))
            .build()?;
        let mut config: Self = s.try_deserialize()?;

        config.config_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.validate()?;

        tracing::debug!(
            queries = config.queries.len(),
            enabled = config.enabled_queries().count(),
            interval_secs = config.check_interval.as_secs(),
            "Configuration loaded."
        );
        Ok(config)
    }

    /// Writes the default document to `path`, creating parent directories.
    pub fn write_default(path: &Path) -> Result<Self, ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config = Self::default();
        let document = serde_json::to_string_pretty(&config)?;
        fs::write(path, document)?;
        tracing::info!(path = %path.display(), "Default configuration written.");
        Ok(config)
    }

    /// Checks the invariants the monitoring loop relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.check_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "check_interval_secs must be greater than zero".to_string(),
            ));
        }

        Url::parse(&self.base_notification_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "base_notification_url '{}' is not a valid URL: {e}",
                self.base_notification_url
            ))
        })?;

        self.database.connection_url()?;

        let mut names = HashSet::new();
        for spec in self.enabled_queries() {
            if spec.name.trim().is_empty() {
                return Err(ConfigError::Invalid("enabled query with an empty name".to_string()));
            }
            if spec.query.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("query '{}' has no SQL", spec.name)));
            }
            if !names.insert(spec.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "query name '{}' is used by more than one enabled query",
                    spec.name
                )));
            }
        }

        if let StateConfig::Sqlite { database_url } = &self.state {
            if database_url.trim().is_empty() {
                return Err(ConfigError::Invalid("state.database_url is required".to_string()));
            }
        }

        Ok(())
    }

    /// Queries that take part in the monitoring loop, in configuration order.
    pub fn enabled_queries(&self) -> impl Iterator<Item = &QuerySpec> {
        self.queries.iter().filter(|spec| spec.enabled)
    }

    /// The process-wide notification settings.
    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            base_url: self.base_notification_url.clone(),
            message_template: self.notification_message.clone(),
            poll_interval: self.check_interval,
        }
    }

    /// Creates a new `AppConfigBuilder` for tests.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances in tests.
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl Default for AppConfigBuilder {
    fn default() -> Self {
        let config = AppConfig {
            database: DatabaseConfig {
                url: Some("sqlite::memory:".to_string()),
                ..DatabaseConfig::default()
            },
            queries: Vec::new(),
            ..AppConfig::default()
        };
        Self { config }
    }
}

impl AppConfigBuilder {
    /// Sets the monitored database URL.
    pub fn database_url(mut self, url: &str) -> Self {
        self.config.database.url = Some(url.to_string());
        self
    }

    /// Sets the base notification endpoint.
    pub fn base_notification_url(mut self, url: &str) -> Self {
        self.config.base_notification_url = url.to_string();
        self
    }

    /// Sets the message template.
    pub fn notification_message(mut self, template: MessageTemplate) -> Self {
        self.config.notification_message = template;
        self
    }

    /// Sets the interval between cycles.
    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.config.check_interval = interval;
        self
    }

    /// Appends a query.
    pub fn query(mut self, spec: QuerySpec) -> Self {
        self.config.queries.push(spec);
        self
    }

    /// Sets the identifier store backend.
    pub fn state(mut self, state: StateConfig) -> Self {
        self.config.state = state;
        self
    }

    /// Sets the directory relative paths are resolved against.
    pub fn config_dir(mut self, dir: &Path) -> Self {
        self.config.config_dir = dir.to_path_buf();
        self
    }

    /// Returns the assembled configuration.
    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    const VALID: &str = r#"{
        "database": {
            "username": "monitor",
            "password": "secret",
            "host": "localhost",
            "port": "3306",
            "name": "shop"
        },
        "base_notification_url": "https://ntfy.sh/base",
        "notification_message": "New %d rows",
        "check_interval_secs": 30,
        "queries": [
            { "name": "Orders", "query": "SELECT id FROM orders" },
            {
                "name": "Refunds",
                "query": "SELECT id FROM refunds",
                "notification_url": "https://ntfy.sh/refunds",
                "enabled": false
            }
        ]
    }"#;

    #[test]
    fn test_app_config_builder() {
        let config = AppConfig::builder()
            .database_url("sqlite://monitored.db")
            .base_notification_url("http://localhost:1234")
            .check_interval(Duration::from_secs(5))
            .query(QuerySpec::new("Orders", "SELECT id FROM orders"))
            .build();

        assert_eq!(config.database.connection_url().unwrap(), "sqlite://monitored.db");
        assert_eq!(config.base_notification_url, "http://localhost:1234");
        assert_eq!(config.check_interval, Duration::from_secs(5));
        assert_eq!(config.queries.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_from_file() {
        let (temp_dir, path) = write_config(VALID);
        let config = AppConfig::load(&path).unwrap();

        assert_eq!(config.base_notification_url, "https://ntfy.sh/base");
        assert_eq!(config.notification_message.render(3), "New 3 rows");
        assert_eq!(config.check_interval, Duration::from_secs(30));
        assert_eq!(config.queries.len(), 2);
        assert_eq!(config.enabled_queries().count(), 1);
        assert_eq!(config.queries[1].notification_url.as_deref(), Some("https://ntfy.sh/refunds"));
        assert_eq!(config.state, StateConfig::File { directory: None });
        assert_eq!(config.config_dir, temp_dir.path());
    }

    #[test]
    fn test_notification_settings() {
        let (_temp_dir, path) = write_config(VALID);
        let settings = AppConfig::load(&path).unwrap().notification_settings();

        assert_eq!(settings.base_url, "https://ntfy.sh/base");
        assert_eq!(settings.message_template.as_str(), "New %d rows");
        assert_eq!(settings.poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let (_temp_dir, path) = write_config(
            &VALID.replace(r#""check_interval_secs": 30"#, r#""check_interval_secs": 0"#),
        );
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("check_interval_secs")));
    }

    #[test]
    fn test_template_without_placeholder_is_rejected() {
        let (_temp_dir, path) = write_config(&VALID.replace("New %d rows", "New rows"));
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_duplicate_enabled_names_are_rejected() {
        let config = AppConfig::builder()
            .query(QuerySpec::new("Orders", "SELECT id FROM orders"))
            .query(QuerySpec::new("Orders", "SELECT id FROM orders WHERE total > 100"))
            .build();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("more than one enabled query"));
    }

    #[test]
    fn test_duplicate_name_on_disabled_query_is_allowed() {
        let mut disabled = QuerySpec::new("Orders", "SELECT id FROM old_orders");
        disabled.enabled = false;
        let config = AppConfig::builder()
            .query(QuerySpec::new("Orders", "SELECT id FROM orders"))
            .query(disabled)
            .build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let config = AppConfig::builder().query(QuerySpec::new("  ", "SELECT 1")).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_database_fields_are_rejected() {
        let (_temp_dir, path) = write_config(&VALID.replace(r#""name": "shop""#, r#""name": """#));
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("database.name"));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let config = AppConfig::builder().base_notification_url("not a url").build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_write_default_then_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let written = AppConfig::write_default(&path).unwrap();
        assert!(path.exists());
        assert_eq!(written.enabled_queries().count(), 0);

        // The default document names no database, so it cannot be used as is.
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("database.name"));
    }

    #[test]
    fn test_app_config_from_file_with_env_var_override() {
        let (_temp_dir, path) = write_config(VALID);

        unsafe {
            std::env::set_var("SQLAL__HTTP__REQUEST_TIMEOUT", "7");
        }

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.http.request_timeout, Duration::from_secs(7));

        unsafe {
            std::env::remove_var("SQLAL__HTTP__REQUEST_TIMEOUT");
        }
    }

    #[test]
    fn test_missing_base_notification_url_is_rejected() {
        let (_temp_dir, path) = write_config(
            &VALID.replace(r#""base_notification_url": "https://ntfy.sh/base","#, ""),
        );
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
        assert!(err.to_string().contains("base_notification_url"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let (_temp_dir, path) =
            write_config(&VALID.replace(r#""check_interval_secs": 30"#, r#""check_interval": 30"#));
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Load(_))));

        let (_temp_dir, path) =
            write_config(&VALID.replace(r#""enabled": false"#, r#""disabled": true"#));
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_camel_case_document_is_rejected() {
        let (_temp_dir, path) = write_config(
            r#"{
                "database": {
                    "username": "monitor",
                    "password": "secret",
                    "host": "localhost",
                    "port": "3306",
                    "name": "shop"
                },
                "baseNotificationUrl": "https://ntfy.sh/my-private-topic",
                "notificationMessage": "Got %d",
                "checkIntervalMinutes": 5,
                "queries": [
                    { "name": "Refunds", "query": "SELECT id FROM refunds", "disabled": true }
                ]
            }"#,
        );
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Load(_))));
    }
}
