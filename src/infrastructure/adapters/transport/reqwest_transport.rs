//! Reqwest Transport - 调用后端 REST API
//!
//! 实现 HttpTransportPort，通过 reqwest 发送请求
//!
//! - 会话凭证：启用 cookie jar，登录 / 续期接口下发的 cookie 自动随后续请求发送
//! - 内容类型：默认 `application/json`；multipart 由 reqwest 生成带 boundary 的头
//! - 超时：每个请求统一超时

use async_trait::async_trait;
use http::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{HttpTransportPort, TransportError, TransportResponse};
use crate::domain::{FormPart, FormPartContent, PendingRequest, RequestBody};

/// Reqwest 传输配置
#[derive(Debug, Clone)]
pub struct ReqwestTransportConfig {
    /// 后端基础 URL（例如 `http://localhost:8080/api`）
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// User-Agent
    pub user_agent: String,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
            user_agent: concat!("bookstore-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ReqwestTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Reqwest 传输
pub struct ReqwestTransport {
    client: Client,
    config: ReqwestTransportConfig,
}

impl ReqwestTransport {
    /// 创建新的传输实例
    pub fn new(config: ReqwestTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 使用默认配置创建
    pub fn with_default_config() -> Result<Self, TransportError> {
        Self::new(ReqwestTransportConfig::default())
    }

    pub fn config(&self) -> &ReqwestTransportConfig {
        &self.config
    }

    /// 拼接完整 URL；路径本身是绝对 URL 时原样使用
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn build_form(parts: &[FormPart]) -> Result<Form, TransportError> {
        parts.iter().try_fold(Form::new(), |form, part| {
            let field = match &part.content {
                FormPartContent::Text(value) => Part::text(value.clone()),
                FormPartContent::Bytes {
                    data,
                    file_name,
                    mime,
                } => {
                    let mut field = Part::bytes(data.clone());
                    if let Some(file_name) = file_name {
                        field = field.file_name(file_name.clone());
                    }
                    if let Some(mime) = mime {
                        field = field
                            .mime_str(mime)
                            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                    }
                    field
                }
            };
            Ok(form.part(part.name.clone(), field))
        })
    }

    fn map_send_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransportPort for ReqwestTransport {
    async fn send(&self, request: &PendingRequest) -> Result<TransportResponse, TransportError> {
        let url = self.url(&request.path);

        // Content-Type 单独处理：multipart 需要 reqwest 生成 boundary
        let mut headers: HeaderMap = request.headers.clone();
        headers.remove(CONTENT_TYPE);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(headers);

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(content_type) = request.content_type() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                builder.body(bytes)
            }
            RequestBody::Multipart(parts) => builder.multipart(Self::build_form(parts)?),
        };

        tracing::debug!(
            method = %request.method,
            url = %url,
            retry = request.is_retry(),
            "Sending HTTP request"
        );

        let response = builder.send().await.map_err(Self::map_send_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        if status.is_server_error() {
            tracing::error!(
                method = %request.method,
                url = %url,
                status = %status.as_u16(),
                "HTTP server error"
            );
        } else if status.is_client_error() {
            tracing::warn!(
                method = %request.method,
                url = %url,
                status = %status.as_u16(),
                "HTTP client error"
            );
        } else {
            tracing::debug!(
                method = %request.method,
                url = %url,
                status = %status.as_u16(),
                body_size = bytes.len(),
                "HTTP response received"
            );
        }

        Ok(TransportResponse::from_bytes(status, headers, &bytes))
    }
}
