//! Auth Service - 登录、注册、登出、续期
//!
//! 服务端通过 Set-Cookie 下发 access / refresh token，这里不捕获任何 token

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::error::GatewayError;
use crate::application::gateway::RequestGateway;
use crate::domain::{RequestBody, RequestOptions};

/// 登录凭证
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// OAuth 登录入口（浏览器跳转地址，不经过网关）
pub fn oauth_login_url(base_url: &str, provider: &str) -> String {
    format!("{}/oauth/login/{}", base_url.trim_end_matches('/'), provider)
}

pub struct AuthService {
    gateway: Arc<RequestGateway>,
}

impl AuthService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn signup(&self, user: Value) -> Result<Value, GatewayError> {
        self.gateway
            .post("/auth/signup", user, RequestOptions::new())
            .await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Value, GatewayError> {
        self.gateway
            .post("/auth/login", json!(credentials), RequestOptions::new())
            .await
    }

    pub async fn admin_login(&self, credentials: &Credentials) -> Result<Value, GatewayError> {
        self.gateway
            .post("/auth/admin/login", json!(credentials), RequestOptions::new())
            .await
    }

    pub async fn logout(&self) -> Result<(), GatewayError> {
        self.gateway
            .post("/auth/logout", RequestBody::Empty, RequestOptions::new())
            .await?;
        Ok(())
    }

    /// 主动续期
    pub async fn reissue(&self) -> Result<(), GatewayError> {
        let path = self.gateway.coordinator().reissue_path().to_string();
        self.gateway
            .post(&path, RequestBody::Empty, RequestOptions::new())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::ScriptedTransport;
    use http::StatusCode;

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/auth/login",
            StatusCode::OK,
            json!({"success": true, "data": {"role": "USER"}, "meta": {}}),
        );
        let service =
            AuthService::new(RequestGateway::with_default_config(transport.clone()).arc());

        let result = service
            .login(&Credentials::new("reader@example.com", "secret"))
            .await
            .unwrap();

        assert_eq!(result, json!({"role": "USER"}));
        assert_eq!(
            transport.requests()[0].body,
            RequestBody::Json(json!({"email": "reader@example.com", "password": "secret"}))
        );
    }

    #[tokio::test]
    async fn test_reissue_failure_is_not_refreshed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/auth/reissue", StatusCode::UNAUTHORIZED, Value::Null);
        let service =
            AuthService::new(RequestGateway::with_default_config(transport.clone()).arc());

        let err = service.reissue().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_oauth_login_url() {
        assert_eq!(
            oauth_login_url("http://localhost:8080/api/", "kakao"),
            "http://localhost:8080/api/oauth/login/kakao"
        );
    }
}
