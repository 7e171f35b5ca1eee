//! Request Gateway - 后端调用的唯一入口
//!
//! 组合方式: `with_auth_refresh(decode_envelope(transport(..)))`
//!
//! 会话凭证由传输层自动携带，调用方从不传递 token

use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::auth_refresh::{AuthRefreshCoordinator, RefreshMode, DEFAULT_REISSUE_PATH};
use crate::application::error::GatewayError;
use crate::application::ports::HttpTransportPort;
use crate::domain::{PendingRequest, RequestBody, RequestOptions};

/// 网关配置
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// 续期接口路径
    pub reissue_path: String,
    /// 并发续期策略
    pub refresh_mode: RefreshMode,
    /// 每个请求附带的默认头（调用方设置的同名头优先）
    pub default_headers: HeaderMap,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            reissue_path: DEFAULT_REISSUE_PATH.to_string(),
            refresh_mode: RefreshMode::default(),
            default_headers: HeaderMap::new(),
        }
    }
}

/// 把负载反序列化为调用方期望的类型
pub fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T, GatewayError> {
    serde_json::from_value(payload).map_err(GatewayError::decode)
}

/// Request Gateway
///
/// 显式构造、可注入；测试时替换传输实现即可
pub struct RequestGateway {
    transport: Arc<dyn HttpTransportPort>,
    coordinator: AuthRefreshCoordinator,
    default_headers: HeaderMap,
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn HttpTransportPort>, config: GatewayConfig) -> Self {
        Self {
            transport,
            coordinator: AuthRefreshCoordinator::new(config.reissue_path, config.refresh_mode),
            default_headers: config.default_headers,
        }
    }

    pub fn with_default_config(transport: Arc<dyn HttpTransportPort>) -> Self {
        Self::new(transport, GatewayConfig::default())
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn coordinator(&self) -> &AuthRefreshCoordinator {
        &self.coordinator
    }

    /// 发送任意请求
    ///
    /// 成功返回解包后的负载，失败返回 `GatewayError`
    pub async fn send(&self, request: PendingRequest) -> Result<Value, GatewayError> {
        let request = request
            .with_default_headers(&self.default_headers)
            .with_request_id();

        let method = request.method.clone();
        let path = request.path.clone();
        let request_id = request.request_id().map(str::to_string);

        tracing::debug!(
            method = %method,
            path = %path,
            request_id = ?request_id,
            params = request.params.len(),
            "Sending backend request"
        );

        let result = self
            .coordinator
            .execute(self.transport.as_ref(), request)
            .await;

        match &result {
            Ok(_) => tracing::debug!(
                method = %method,
                path = %path,
                request_id = ?request_id,
                "Backend request resolved"
            ),
            Err(err) => tracing::debug!(
                method = %method,
                path = %path,
                request_id = ?request_id,
                kind = ?err.kind(),
                status = ?err.http_status().map(|s| s.as_u16()),
                code = ?err.code(),
                error = %err,
                "Backend request rejected"
            ),
        }

        result
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Value, GatewayError> {
        self.send(PendingRequest::new(Method::GET, path).with_options(options))
            .await
    }

    pub async fn post(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        self.send(
            PendingRequest::new(Method::POST, path)
                .with_body(body)
                .with_options(options),
        )
        .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        self.send(
            PendingRequest::new(Method::PUT, path)
                .with_body(body)
                .with_options(options),
        )
        .await
    }

    /// DELETE 也允许携带请求体（例如批量删除购物车条目）
    pub async fn delete(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        self.send(
            PendingRequest::new(Method::DELETE, path)
                .with_body(body)
                .with_options(options),
        )
        .await
    }

    pub async fn get_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        decode_payload(self.get(path, options).await?)
    }

    pub async fn post_as<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        decode_payload(self.post(path, body, options).await?)
    }

    pub async fn put_as<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        decode_payload(self.put(path, body, options).await?)
    }

    pub async fn delete_as<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<T, GatewayError> {
        decode_payload(self.delete(path, body, options).await?)
    }
}
