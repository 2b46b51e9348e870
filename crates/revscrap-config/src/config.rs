use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Apple's reviews API serves at most 20 reviews per request
const APP_STORE_PAGE_LIMIT: u32 = 20;

/// Google Play never returns more than 200 reviews per batch
const GOOGLE_PLAY_BATCH_LIMIT: u32 = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub google_play: GooglePlayConfig,
    #[serde(default)]
    pub app_store: AppStoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Hard ceiling for a whole HTTP request, fetch included
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Time allowed for one store fetch before it counts as a transient failure
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GooglePlayConfig {
    #[serde(default = "default_google_play_base_url")]
    pub base_url: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_max_reviews")]
    pub max_reviews: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppStoreConfig {
    /// iTunes lookup endpoint, used for the existence check and app name
    #[serde(default = "default_app_store_base_url")]
    pub base_url: String,
    /// Public app pages, which carry the reviews API token
    #[serde(default = "default_app_store_web_base_url")]
    pub web_base_url: String,
    #[serde(default = "default_app_store_reviews_base_url")]
    pub reviews_base_url: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_app_store_lang")]
    pub lang: String,
    #[serde(default = "default_app_store_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_reviews")]
    pub max_reviews: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json_logging")]
    pub json: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_bind() -> String {
    "127.0.0.1:8050".to_string()
}

fn default_request_timeout_secs() -> u64 {
    180
}

fn default_fetch_timeout_secs() -> u64 {
    120
}

fn default_google_play_base_url() -> String {
    "https://play.google.com".to_string()
}

fn default_app_store_base_url() -> String {
    "https://itunes.apple.com".to_string()
}

fn default_app_store_web_base_url() -> String {
    "https://apps.apple.com".to_string()
}

fn default_app_store_reviews_base_url() -> String {
    "https://amp-api.apps.apple.com".to_string()
}

fn default_app_store_lang() -> String {
    "en-US".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_batch_size() -> u32 {
    150
}

fn default_max_reviews() -> usize {
    100_000
}

fn default_app_store_page_size() -> u32 {
    APP_STORE_PAGE_LIMIT
}

fn default_cache_ttl_secs() -> u64 {
    600 // 10 minutes
}

fn default_cache_max_entries() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json_logging() -> bool {
    use std::io::IsTerminal;
    !std::io::stdout().is_terminal()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl Default for GooglePlayConfig {
    fn default() -> Self {
        Self {
            base_url: default_google_play_base_url(),
            lang: default_lang(),
            country: default_country(),
            batch_size: default_batch_size(),
            max_reviews: default_max_reviews(),
        }
    }
}

impl Default for AppStoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_app_store_base_url(),
            web_base_url: default_app_store_web_base_url(),
            reviews_base_url: default_app_store_reviews_base_url(),
            country: default_country(),
            lang: default_app_store_lang(),
            page_size: default_app_store_page_size(),
            max_reviews: default_max_reviews(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json_logging(),
            file: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid server.bind address '{}': {}", self.bind, e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.server.bind_addr()?;
        if self.server.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("server.request_timeout_secs must be greater than zero"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(anyhow::anyhow!("fetch.timeout_secs must be greater than zero"));
        }
        // Otherwise the request layer cuts the response off before the fetch can report its own failure
        if self.server.request_timeout_secs <= self.fetch.timeout_secs {
            return Err(anyhow::anyhow!(
                "server.request_timeout_secs ({}) must be greater than fetch.timeout_secs ({})",
                self.server.request_timeout_secs,
                self.fetch.timeout_secs
            ));
        }

        validate_base_url("google_play.base_url", &self.google_play.base_url)?;
        validate_base_url("app_store.base_url", &self.app_store.base_url)?;
        validate_base_url("app_store.web_base_url", &self.app_store.web_base_url)?;
        validate_base_url("app_store.reviews_base_url", &self.app_store.reviews_base_url)?;

        if self.google_play.batch_size == 0 || self.google_play.batch_size > GOOGLE_PLAY_BATCH_LIMIT {
            return Err(anyhow::anyhow!(
                "google_play.batch_size must be between 1 and {}",
                GOOGLE_PLAY_BATCH_LIMIT
            ));
        }
        if self.google_play.max_reviews == 0 {
            return Err(anyhow::anyhow!("google_play.max_reviews must be greater than zero"));
        }
        if self.app_store.page_size == 0 || self.app_store.page_size > APP_STORE_PAGE_LIMIT {
            return Err(anyhow::anyhow!(
                "app_store.page_size must be between 1 and {}",
                APP_STORE_PAGE_LIMIT
            ));
        }
        if self.app_store.max_reviews == 0 {
            return Err(anyhow::anyhow!("app_store.max_reviews must be greater than zero"));
        }
        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(anyhow::anyhow!("cache.max_entries must be greater than zero when the cache is enabled"));
        }

        Ok(())
    }
}

fn validate_base_url(field: &str, value: &str) -> anyhow::Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", field, value, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow::anyhow!("{} must use http or https, got '{}'", field, other)),
    }
}
