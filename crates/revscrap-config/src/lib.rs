pub mod config;
pub mod paths;

pub use config::{AppStoreConfig, CacheConfig, Config, FetchConfig, GooglePlayConfig, LoggingConfig, ServerConfig};
pub use paths::{PathManager, container_base_path};
