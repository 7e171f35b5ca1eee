//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::application::gateway::{RefreshMode, DEFAULT_REISSUE_PATH};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 后端 API 配置
    #[serde(default)]
    pub api: ApiConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 后端 API 配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// 后端基础 URL，启动时读取一次
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 凭证续期接口
    #[serde(default = "default_reissue_path")]
    pub reissue_path: String,

    /// 并发 401 时的续期策略
    #[serde(default)]
    pub refresh_mode: RefreshMode,

    /// User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_reissue_path() -> String {
    DEFAULT_REISSUE_PATH.to_string()
}

fn default_user_agent() -> String {
    concat!("bookstore-gateway/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            reissue_path: default_reissue_path(),
            refresh_mode: RefreshMode::default(),
            user_agent: default_user_agent(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
