//! Envelope Codec - 信封解码
//!
//! 把传输层响应转换为调用方拿到的负载或 `GatewayError`

use serde_json::Value;

use crate::application::error::{ErrorKind, GatewayError, UNKNOWN_ERROR_MESSAGE};
use crate::application::ports::TransportResponse;
use crate::domain::{Envelope, EnvelopeMeta};

/// 解码响应
///
/// - 2xx + `success: true`：返回 `data`（而不是整个信封）
/// - 2xx + `success: false`：业务失败，message 取 `meta.message`，缺省为 `"Unknown error"`
/// - 2xx + 无布尔 `success`：旧接口，原样返回响应体
/// - 非 2xx：失败；响应体带 `meta` 时用其中的 message / errorCode
pub fn decode_envelope(response: TransportResponse) -> Result<Value, GatewayError> {
    let TransportResponse { status, body, .. } = response;

    if !status.is_success() {
        return Err(http_failure(status, body));
    }

    match Envelope::parse(&body) {
        Some(envelope) if envelope.success => Ok(envelope.data),
        Some(envelope) => {
            let meta = envelope.meta.unwrap_or_default();
            tracing::warn!(
                status = %status.as_u16(),
                error_code = ?meta.error_code(),
                message = ?meta.message(),
                "Business failure response"
            );
            Err(GatewayError::new(
                ErrorKind::Business,
                meta.message().unwrap_or(UNKNOWN_ERROR_MESSAGE),
            )
            .with_code(meta.error_code().map(str::to_string))
            .with_status(status)
            .with_body(body))
        }
        None => Ok(body),
    }
}

/// 非 2xx 响应转换为错误
fn http_failure(status: http::StatusCode, body: Value) -> GatewayError {
    let default_message = format!("Request failed with status code {}", status.as_u16());

    let error = match body.get("meta").and_then(EnvelopeMeta::from_value) {
        Some(meta) => GatewayError::new(
            ErrorKind::Business,
            meta.message().unwrap_or(&default_message),
        )
        .with_code(meta.error_code().map(str::to_string)),
        None => GatewayError::new(ErrorKind::Transport, default_message),
    };

    error.with_status(status).with_body(body)
}
