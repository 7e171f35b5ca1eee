//! Auth Refresh Coordinator - 401 自动续期
//!
//! 单次调用的状态流转:
//!
//! ```text
//! INITIAL --401--> REFRESHING --ok--> REPLAYING --> RESOLVED
//!                       |
//!                       +--fail--> FAILED
//! ```
//!
//! - 只有 `retried == false` 的请求遇到 401 才会进入 REFRESHING
//! - 续期调用 `POST /auth/reissue` 不带请求体，只看 HTTP 状态码，不走信封解码
//! - 续期成功后原样重放一次；重放的结果（包括再次 401）即最终结果
//! - 续期失败直接返回 `ErrorKind::Refresh`，不重放、不重试续期

use http::Method;
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::envelope::decode_envelope;
use crate::application::error::{ErrorKind, GatewayError, REFRESH_FAILED_MESSAGE};
use crate::application::ports::{HttpTransportPort, TransportResponse};
use crate::domain::{EnvelopeMeta, PendingRequest};

/// 默认续期接口
pub const DEFAULT_REISSUE_PATH: &str = "/auth/reissue";

/// 并发 401 时的续期策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// 每个收到 401 的请求各自续期一次
    #[default]
    PerRequest,
    /// 合并并发续期：原始请求发出之后已有续期成功，则直接重放
    SingleFlight,
}

/// Auth Refresh Coordinator
pub struct AuthRefreshCoordinator {
    reissue_path: String,
    mode: RefreshMode,
    /// 成功续期次数
    generation: AtomicU64,
    refresh_lock: Mutex<()>,
}

impl AuthRefreshCoordinator {
    pub fn new(reissue_path: impl Into<String>, mode: RefreshMode) -> Self {
        Self {
            reissue_path: reissue_path.into(),
            mode,
            generation: AtomicU64::new(0),
            refresh_lock: Mutex::new(()),
        }
    }

    /// 续期接口路径
    pub fn reissue_path(&self) -> &str {
        &self.reissue_path
    }

    /// 已成功续期的次数
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// 发送请求，必要时续期并重放
    pub async fn execute(
        &self,
        transport: &dyn HttpTransportPort,
        request: PendingRequest,
    ) -> Result<Value, GatewayError> {
        let observed = self.generation();

        let response = transport
            .send(&request)
            .await
            .map_err(GatewayError::transport)?;

        if !self.should_refresh(&request, &response) {
            return decode_envelope(response);
        }

        tracing::warn!(
            method = %request.method,
            path = %request.path,
            request_id = ?request.request_id(),
            "Access credential rejected, reissuing"
        );

        let replay = request.into_replay();
        self.refresh(transport, observed).await?;

        tracing::debug!(
            method = %replay.method,
            path = %replay.path,
            request_id = ?replay.request_id(),
            "Replaying request after credential reissue"
        );

        let response = transport
            .send(&replay)
            .await
            .map_err(GatewayError::transport)?;

        if response.is_unauthorized() {
            tracing::warn!(
                method = %replay.method,
                path = %replay.path,
                "Replay rejected with 401, giving up"
            );
        }

        decode_envelope(response)
    }

    fn should_refresh(&self, request: &PendingRequest, response: &TransportResponse) -> bool {
        response.is_unauthorized() && !request.is_retry() && !self.targets_reissue(&request.path)
    }

    /// 请求是否指向续期接口本身（相对路径或带基础 URL 的绝对地址）
    fn targets_reissue(&self, path: &str) -> bool {
        let reissue = normalize_path(&self.reissue_path);
        match path.split_once("://") {
            Some((_, rest)) => {
                let path = rest.find('/').map_or("/", |idx| &rest[idx..]);
                normalize_path(path).ends_with(&reissue)
            }
            None => normalize_path(path) == reissue,
        }
    }

    async fn refresh(
        &self,
        transport: &dyn HttpTransportPort,
        observed: u64,
    ) -> Result<(), GatewayError> {
        match self.mode {
            RefreshMode::PerRequest => self.reissue(transport).await,
            RefreshMode::SingleFlight => {
                let _guard = self.refresh_lock.lock().await;
                if self.generation() != observed {
                    tracing::debug!("Credential already reissued by a concurrent request");
                    return Ok(());
                }
                self.reissue(transport).await
            }
        }
    }

    /// 调用续期接口
    async fn reissue(&self, transport: &dyn HttpTransportPort) -> Result<(), GatewayError> {
        let request = PendingRequest::new(Method::POST, self.reissue_path.as_str())
            .with_request_id()
            .into_replay();

        let response = match transport.send(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "Credential reissue failed");
                return Err(GatewayError::new(ErrorKind::Refresh, REFRESH_FAILED_MESSAGE)
                    .with_cause(err));
            }
        };

        if !response.is_success() {
            let meta = response
                .body
                .get("meta")
                .and_then(EnvelopeMeta::from_value)
                .unwrap_or_default();
            tracing::warn!(
                status = %response.status.as_u16(),
                error_code = ?meta.error_code(),
                "Credential reissue rejected"
            );
            return Err(GatewayError::new(
                ErrorKind::Refresh,
                meta.message().unwrap_or(REFRESH_FAILED_MESSAGE),
            )
            .with_code(meta.error_code().map(str::to_string))
            .with_status(response.status)
            .with_body(response.body));
        }

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::info!(generation, "Credential reissued");
        Ok(())
    }
}

/// 去掉查询串与末尾的 `/`，补齐开头的 `/`
fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_matches('/');
    format!("/{}", path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TransportError;
    use crate::infrastructure::adapters::ScriptedTransport;
    use http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn ok(data: Value) -> Value {
        json!({"success": true, "data": data, "meta": {}})
    }

    fn coordinator() -> AuthRefreshCoordinator {
        AuthRefreshCoordinator::new(DEFAULT_REISSUE_PATH, RefreshMode::PerRequest)
    }

    #[tokio::test]
    async fn test_no_refresh_on_success() {
        let transport = ScriptedTransport::new();
        transport.respond("/v2/books", StatusCode::OK, ok(json!([1, 2])));

        let result = coordinator()
            .execute(&transport, PendingRequest::new(Method::GET, "/v2/books"))
            .await
            .unwrap();

        assert_eq!(result, json!([1, 2]));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(transport.count(DEFAULT_REISSUE_PATH), 0);
    }

    #[tokio::test]
    async fn test_refresh_then_replay_once() {
        let transport = ScriptedTransport::new();
        transport
            .respond("/carts", StatusCode::UNAUTHORIZED, Value::Null)
            .respond(DEFAULT_REISSUE_PATH, StatusCode::OK, ok(Value::Null))
            .respond("/carts", StatusCode::OK, ok(json!({"items": []})));

        let coordinator = coordinator();
        let request = PendingRequest::new(Method::POST, "/carts")
            .with_body(json!({"items": [{"productId": 5, "quantity": 2}]}))
            .with_request_id();

        let result = coordinator.execute(&transport, request.clone()).await.unwrap();
        assert_eq!(result, json!({"items": []}));

        let sent = transport.requests();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].path, "/carts");
        assert_eq!(sent[1].path, DEFAULT_REISSUE_PATH);
        assert_eq!(sent[1].method, Method::POST);
        assert_eq!(sent[1].body, crate::domain::RequestBody::Empty);
        assert_eq!(sent[2], request.into_replay());
        assert!(!sent[0].is_retry());
        assert!(sent[2].is_retry());
        assert_eq!(coordinator.generation(), 1);
    }

    #[tokio::test]
    async fn test_replay_failure_is_not_retried() {
        let transport = ScriptedTransport::new();
        transport
            .respond("/v2/orders", StatusCode::UNAUTHORIZED, Value::Null)
            .respond(DEFAULT_REISSUE_PATH, StatusCode::OK, Value::Null)
            .respond(
                "/v2/orders",
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"meta": {"message": "서버 오류", "errorCode": "INTERNAL"}}),
            );

        let err = coordinator()
            .execute(&transport, PendingRequest::new(Method::GET, "/v2/orders"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Business);
        assert_eq!(err.message(), "서버 오류");
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_failure_is_terminal() {
        let transport = ScriptedTransport::new();
        transport
            .respond("/members/me", StatusCode::UNAUTHORIZED, Value::Null)
            .respond(
                DEFAULT_REISSUE_PATH,
                StatusCode::UNAUTHORIZED,
                json!({
                    "success": false,
                    "data": null,
                    "meta": {"message": "refresh token expired", "errorCode": "TOKEN_EXPIRED"}
                }),
            );

        let coordinator = coordinator();
        let err = coordinator
            .execute(&transport, PendingRequest::new(Method::GET, "/members/me"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Refresh);
        assert_eq!(err.message(), "refresh token expired");
        assert_eq!(err.code(), Some("TOKEN_EXPIRED"));
        assert!(err.must_reauthenticate());
        assert_eq!(transport.count("/members/me"), 1);
        assert_eq!(transport.count(DEFAULT_REISSUE_PATH), 1);
        assert_eq!(coordinator.generation(), 0);
    }

    #[tokio::test]
    async fn test_refresh_network_failure_is_terminal() {
        let transport = ScriptedTransport::new();
        transport
            .respond("/carts", StatusCode::UNAUTHORIZED, Value::Null)
            .fail(
                DEFAULT_REISSUE_PATH,
                TransportError::Connect("refused".into()),
            );

        let err = coordinator()
            .execute(&transport, PendingRequest::new(Method::GET, "/carts"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Refresh);
        assert_eq!(err.message(), REFRESH_FAILED_MESSAGE);
        assert!(matches!(err.cause(), Some(TransportError::Connect(_))));
        assert_eq!(transport.count("/carts"), 1);
    }

    #[tokio::test]
    async fn test_replay_401_does_not_refresh_again() {
        let transport = ScriptedTransport::new();
        transport
            .respond("/carts", StatusCode::UNAUTHORIZED, Value::Null)
            .respond(DEFAULT_REISSUE_PATH, StatusCode::OK, Value::Null)
            .respond("/carts", StatusCode::UNAUTHORIZED, Value::Null)
            // 若错误地再次续期，这两个响应会被消费
            .respond(DEFAULT_REISSUE_PATH, StatusCode::OK, Value::Null)
            .respond("/carts", StatusCode::OK, ok(json!({})));

        let err = coordinator()
            .execute(&transport, PendingRequest::new(Method::GET, "/carts"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.http_status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(transport.count("/carts"), 2);
        assert_eq!(transport.count(DEFAULT_REISSUE_PATH), 1);
        assert_eq!(transport.remaining(), 2);
    }

    #[tokio::test]
    async fn test_non_401_failure_bypasses_refresh() {
        let transport = ScriptedTransport::new();
        transport.respond("/admin/orders", StatusCode::FORBIDDEN, Value::Null);

        let err = coordinator()
            .execute(&transport, PendingRequest::new(Method::GET, "/admin/orders"))
            .await
            .unwrap_err();

        assert_eq!(err.http_status(), Some(StatusCode::FORBIDDEN));
        assert_eq!(transport.count(DEFAULT_REISSUE_PATH), 0);
    }

    #[tokio::test]
    async fn test_reissue_path_never_refreshes_itself() {
        let transport = ScriptedTransport::new();
        transport.respond(DEFAULT_REISSUE_PATH, StatusCode::UNAUTHORIZED, Value::Null);

        let err = coordinator()
            .execute(
                &transport,
                PendingRequest::new(Method::POST, DEFAULT_REISSUE_PATH),
            )
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(transport.count(DEFAULT_REISSUE_PATH), 1);
    }

    #[tokio::test]
    async fn test_reissue_path_variants_never_refresh() {
        for path in [
            "auth/reissue",
            "/auth/reissue/",
            "/auth/reissue?source=storefront",
            "http://localhost:8080/api/auth/reissue",
        ] {
            let transport = ScriptedTransport::new();
            transport.respond(path, StatusCode::UNAUTHORIZED, Value::Null);

            let err = coordinator()
                .execute(&transport, PendingRequest::new(Method::POST, path))
                .await
                .unwrap_err();

            assert!(err.is_unauthorized(), "{}", path);
            assert_eq!(transport.requests().len(), 1, "{}", path);
        }
    }

    #[test]
    fn test_targets_reissue_is_segment_aligned() {
        let coordinator = coordinator();
        assert!(coordinator.targets_reissue("/auth/reissue"));
        assert!(!coordinator.targets_reissue("/auth/reissue-history"));
        assert!(!coordinator.targets_reissue("/myauth/reissue"));
        assert!(!coordinator.targets_reissue("https://shop.example.com/myauth/reissue"));
        assert!(!coordinator.targets_reissue("/carts"));
    }

    #[tokio::test]
    async fn test_per_request_mode_refreshes_independently() {
        let transport = Arc::new(ScriptedTransport::new());
        let delay = Duration::from_millis(20);
        transport
            .respond_after("/carts", delay, StatusCode::UNAUTHORIZED, Value::Null)
            .respond_after("/v2/orders", delay, StatusCode::UNAUTHORIZED, Value::Null)
            .respond(DEFAULT_REISSUE_PATH, StatusCode::OK, Value::Null)
            .respond(DEFAULT_REISSUE_PATH, StatusCode::OK, Value::Null)
            .respond("/carts", StatusCode::OK, ok(json!("cart")))
            .respond("/v2/orders", StatusCode::OK, ok(json!("orders")));

        let coordinator = coordinator();
        let (cart, orders) = tokio::join!(
            coordinator.execute(transport.as_ref(), PendingRequest::new(Method::GET, "/carts")),
            coordinator.execute(transport.as_ref(), PendingRequest::new(Method::GET, "/v2/orders")),
        );

        assert_eq!(cart.unwrap(), json!("cart"));
        assert_eq!(orders.unwrap(), json!("orders"));
        assert_eq!(transport.count(DEFAULT_REISSUE_PATH), 2);
    }

    #[tokio::test]
    async fn test_single_flight_coalesces_concurrent_refreshes() {
        let transport = Arc::new(ScriptedTransport::new());
        let delay = Duration::from_millis(20);
        transport
            .respond_after("/carts", delay, StatusCode::UNAUTHORIZED, Value::Null)
            .respond_after("/v2/orders", delay, StatusCode::UNAUTHORIZED, Value::Null)
            .respond(DEFAULT_REISSUE_PATH, StatusCode::OK, Value::Null)
            .respond("/carts", StatusCode::OK, ok(json!("cart")))
            .respond("/v2/orders", StatusCode::OK, ok(json!("orders")));

        let coordinator =
            AuthRefreshCoordinator::new(DEFAULT_REISSUE_PATH, RefreshMode::SingleFlight);
        let (cart, orders) = tokio::join!(
            coordinator.execute(transport.as_ref(), PendingRequest::new(Method::GET, "/carts")),
            coordinator.execute(transport.as_ref(), PendingRequest::new(Method::GET, "/v2/orders")),
        );

        assert_eq!(cart.unwrap(), json!("cart"));
        assert_eq!(orders.unwrap(), json!("orders"));
        assert_eq!(transport.count(DEFAULT_REISSUE_PATH), 1);
        assert_eq!(coordinator.generation(), 1);
    }

    #[tokio::test]
    async fn test_single_flight_failed_refresh_is_not_shared() {
        let transport = Arc::new(ScriptedTransport::new());
        let delay = Duration::from_millis(20);
        transport
            .respond_after("/carts", delay, StatusCode::UNAUTHORIZED, Value::Null)
            .respond_after("/v2/orders", delay, StatusCode::UNAUTHORIZED, Value::Null)
            .respond(DEFAULT_REISSUE_PATH, StatusCode::UNAUTHORIZED, Value::Null)
            .respond(DEFAULT_REISSUE_PATH, StatusCode::UNAUTHORIZED, Value::Null);

        let coordinator =
            AuthRefreshCoordinator::new(DEFAULT_REISSUE_PATH, RefreshMode::SingleFlight);
        let (cart, orders) = tokio::join!(
            coordinator.execute(transport.as_ref(), PendingRequest::new(Method::GET, "/carts")),
            coordinator.execute(transport.as_ref(), PendingRequest::new(Method::GET, "/v2/orders")),
        );

        assert_eq!(cart.unwrap_err().kind(), ErrorKind::Refresh);
        assert_eq!(orders.unwrap_err().kind(), ErrorKind::Refresh);
        assert_eq!(transport.count(DEFAULT_REISSUE_PATH), 2);
        assert_eq!(transport.count("/carts"), 1);
        assert_eq!(transport.count("/v2/orders"), 1);
    }
}
