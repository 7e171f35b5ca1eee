//! 网关错误定义
//!
//! 所有失败（业务失败、传输失败、凭证刷新失败）都归一为 `GatewayError`，
//! 调用方只需展示 `message()`。

use http::StatusCode;
use serde_json::Value;
use std::error::Error as StdError;
use thiserror::Error;

use crate::application::ports::TransportError;

/// 未提供 message 时的默认业务错误文案
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// 凭证刷新失败时的默认文案
pub const REFRESH_FAILED_MESSAGE: &str = "Session expired: credential reissue failed";

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 后端返回信封且 `success: false`，或非 2xx 响应携带了 `meta`
    Business,
    /// 非 2xx 且没有可用信封，或网络层失败
    Transport,
    /// `/auth/reissue` 本身失败，调用方需要重新登录
    Refresh,
    /// 负载无法反序列化为调用方期望的类型
    Decode,
}

/// 归一化错误
///
/// 在失败处构造，原样传递给调用方，之后不再修改
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GatewayError {
    kind: ErrorKind,
    message: String,
    code: Option<String>,
    http_status: Option<StatusCode>,
    /// 底层错误：传输错误或反序列化错误
    #[source]
    cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
    body: Option<Value>,
}

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            message: if message.is_empty() {
                UNKNOWN_ERROR_MESSAGE.to_string()
            } else {
                message
            },
            code: None,
            http_status: None,
            cause: None,
            body: None,
        }
    }

    /// 网络层失败（没有响应）
    pub fn transport(cause: TransportError) -> Self {
        Self::new(ErrorKind::Transport, cause.to_string()).with_cause(cause)
    }

    /// 负载反序列化失败
    pub fn decode(err: serde_json::Error) -> Self {
        let message = format!("Unexpected response payload: {}", err);
        let mut error = Self::new(ErrorKind::Decode, message);
        error.cause = Some(Box::new(err));
        error
    }

    pub(crate) fn with_code(mut self, code: Option<String>) -> Self {
        self.code = code;
        self
    }

    pub(crate) fn with_status(mut self, status: StatusCode) -> Self {
        self.http_status = Some(status);
        self
    }

    pub(crate) fn with_cause(mut self, cause: TransportError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub(crate) fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 面向用户的错误信息，始终非空
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 后端 `meta.errorCode`
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn http_status(&self) -> Option<StatusCode> {
        self.http_status
    }

    /// 原始传输错误
    pub fn cause(&self) -> Option<&TransportError> {
        self.cause.as_deref()?.downcast_ref::<TransportError>()
    }

    /// 失败响应的原始响应体
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.http_status == Some(StatusCode::UNAUTHORIZED)
    }

    /// 调用方是否需要引导用户重新登录
    pub fn must_reauthenticate(&self) -> bool {
        self.kind == ErrorKind::Refresh || self.is_unauthorized()
    }
}
