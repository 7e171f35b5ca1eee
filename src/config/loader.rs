//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::application::gateway::GatewayConfig;
use crate::infrastructure::ReqwestTransportConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "BOOKSTORE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `BOOKSTORE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `BOOKSTORE_API__BASE_URL=https://shop.example.com/api`
/// - `BOOKSTORE_API__TIMEOUT_SECS=10`
/// - `BOOKSTORE_API__REFRESH_MODE=single_flight`
/// - `BOOKSTORE_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    let defaults = AppConfig::default();
    builder = builder
        .set_default("api.base_url", defaults.api.base_url)?
        .set_default("api.timeout_secs", defaults.api.timeout_secs)?
        .set_default("api.reissue_path", defaults.api.reissue_path)?
        .set_default("api.refresh_mode", "per_request")?
        .set_default("api.user_agent", defaults.api.user_agent)?
        .set_default("log.level", defaults.log.level)?
        .set_default("log.json", defaults.log.json)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: BOOKSTORE_API__BASE_URL=http://backend:8080/api
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "API base URL cannot be empty".to_string(),
        ));
    }

    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "API base URL must start with http:// or https://: {}",
            base_url
        )));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "API timeout cannot be 0".to_string(),
        ));
    }

    if !config.api.reissue_path.starts_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "Reissue path must start with '/': {}",
            config.api.reissue_path
        )));
    }

    Ok(())
}

impl AppConfig {
    /// 传输层配置
    pub fn transport_config(&self) -> ReqwestTransportConfig {
        ReqwestTransportConfig {
            base_url: self.api.base_url.trim().to_string(),
            timeout_secs: self.api.timeout_secs,
            user_agent: self.api.user_agent.clone(),
        }
    }

    /// 网关配置
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            reissue_path: self.api.reissue_path.clone(),
            refresh_mode: self.api.refresh_mode,
            ..GatewayConfig::default()
        }
    }
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Gateway Configuration ===");
    tracing::info!("API Base URL: {}", config.api.base_url);
    tracing::info!("API Timeout: {}s", config.api.timeout_secs);
    tracing::info!("Reissue Path: {}", config.api.reissue_path);
    tracing::info!("Refresh Mode: {:?}", config.api.refresh_mode);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=============================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RefreshMode;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_base_url() {
        let mut config = AppConfig::default();
        config.api.base_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_bad_scheme() {
        let mut config = AppConfig::default();
        config.api.base_url = "localhost:8080".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_timeout() {
        let mut config = AppConfig::default();
        config.api.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_relative_reissue_path() {
        let mut config = AppConfig::default();
        config.api.reissue_path = "auth/reissue".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://shop.example.com/api"
timeout_secs = 5
refresh_mode = "single_flight"

[log]
level = "debug"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.api.base_url, "https://shop.example.com/api");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.refresh_mode, RefreshMode::SingleFlight);
        assert_eq!(config.api.reissue_path, "/auth/reissue");
        assert_eq!(config.log.level, "debug");

        let transport = config.transport_config();
        assert_eq!(transport.timeout_secs, 5);
        let gateway = config.gateway_config();
        assert_eq!(gateway.refresh_mode, RefreshMode::SingleFlight);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[api]\ntimeout_secs = 0").unwrap();
        assert!(matches!(
            load_config_from_path(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
