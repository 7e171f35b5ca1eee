//! HTTP Transport Port - 出站 HTTP 传输抽象
//!
//! 网关只依赖此接口，具体实现在 infrastructure/adapters 层。
//! 会话凭证（access / refresh token cookie）完全由传输层持有和携带，
//! 网关与调用方既不读取也不写入。

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::domain::PendingRequest;

/// 传输错误（未拿到 HTTP 响应）
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Cannot connect to backend: {0}")]
    Connect(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// 传输层响应
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// 响应体：空响应为 `null`，非 JSON 响应为原始文本字符串
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// 从原始字节构造响应体
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, bytes: &[u8]) -> Self {
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
        };
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

/// HTTP Transport Port
///
/// 发送一次请求并返回原始响应，不做任何信封解析或重试
#[async_trait]
pub trait HttpTransportPort: Send + Sync {
    /// 发送请求
    ///
    /// 任何 HTTP 状态码都返回 `Ok`；只有拿不到响应时才返回 `Err`
    async fn send(&self, request: &PendingRequest) -> Result<TransportResponse, TransportError>;
}
