use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Which blob store backs uploaded objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    S3,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket name, also the leading segment of every stored url
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Owner segment of every blob key until real identities exist
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "data/filegate.db".to_string()
}

fn default_bucket() -> String {
    "filegate".to_string()
}

fn default_local_path() -> String {
    "data/blobs".to_string()
}

fn default_max_file_size() -> usize {
    5 * 1024 * 1024 // 5 MiB
}

fn default_owner_id() -> String {
    "default-user".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            local_path: default_local_path(),
            region: None,
            endpoint: None,
            force_path_style: false,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            owner_id: default_owner_id(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    /// Runs before logging is set up, so it logs nothing itself.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        Ok(config)
    }

    /// Load configuration from the first config file found
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = [
            "filegate.toml",
            "config.toml",
            "data/filegate.toml",
            "data/config.toml",
        ];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let mut config = Self::from_toml(&content)?;
                config.source = Some(path.to_string());
                return Ok(config);
            }
        }

        Ok(Config::default())
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment variable overrides
    /// Format: FG_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(val) = lookup("FG_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("FG_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        // Database overrides
        if let Some(val) = lookup("FG_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Storage overrides
        if let Some(val) = lookup("FG_CONF_STORAGE_BACKEND") {
            if let Ok(backend) = val.parse() {
                self.storage.backend = backend;
            }
        }
        if let Some(val) = lookup("FG_CONF_STORAGE_BUCKET") {
            if !val.trim().is_empty() {
                self.storage.bucket = val;
            }
        }
        if let Some(val) = lookup("FG_CONF_STORAGE_LOCAL_PATH") {
            self.storage.local_path = val;
        }
        if let Some(val) = lookup("FG_CONF_STORAGE_REGION") {
            self.storage.region = Some(val);
        }
        if let Some(val) = lookup("FG_CONF_STORAGE_ENDPOINT") {
            self.storage.endpoint = Some(val);
        }
        if let Some(val) = lookup("FG_CONF_STORAGE_FORCE_PATH_STYLE") {
            if let Ok(v) = val.parse() {
                self.storage.force_path_style = v;
            }
        }

        // Upload overrides
        if let Some(val) = lookup("FG_CONF_UPLOAD_MAX_FILE_SIZE") {
            if let Ok(size) = val.parse() {
                self.upload.max_file_size = size;
            }
        }
        if let Some(val) = lookup("FG_CONF_UPLOAD_OWNER_ID") {
            if !val.trim().is_empty() {
                self.upload.owner_id = val;
            }
        }

        // Metrics overrides
        if let Some(val) = lookup("FG_CONF_METRICS_ENABLED") {
            if let Ok(v) = val.parse() {
                self.metrics.enabled = v;
            }
        }

        // Logging overrides
        if let Some(val) = lookup("FG_CONF_LOGGING_FORMAT") {
            match val.trim().to_ascii_lowercase().as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "pretty" => self.logging.format = LogFormat::Pretty,
                _ => {}
            }
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        // Ensure database directory exists
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)?;
        }

        if self.storage.backend == StorageBackend::Local {
            fs::create_dir_all(&self.storage.local_path)?;
        }

        Ok(())
    }
}
