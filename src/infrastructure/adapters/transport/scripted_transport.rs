//! Scripted Transport - 用于测试的传输实现
//!
//! 按路径预置响应（先进先出），不发起任何网络请求，并记录收到的全部请求

use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::application::ports::{HttpTransportPort, TransportError, TransportResponse};
use crate::domain::PendingRequest;

/// 预置结果
enum Outcome {
    Respond(TransportResponse),
    Fail(TransportError),
}

struct Scripted {
    outcome: Outcome,
    delay: Option<Duration>,
}

/// Scripted Transport
///
/// 每个路径一个响应队列，每个预置响应只会被消费一次
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<PendingRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, path: &str, scripted: Scripted) {
        lock(&self.routes)
            .entry(path.to_string())
            .or_default()
            .push_back(scripted);
    }

    /// 预置一个响应
    pub fn respond(&self, path: &str, status: StatusCode, body: Value) -> &Self {
        self.push(
            path,
            Scripted {
                outcome: Outcome::Respond(TransportResponse::new(status, body)),
                delay: None,
            },
        );
        self
    }

    /// 预置一个延迟返回的响应
    pub fn respond_after(
        &self,
        path: &str,
        delay: Duration,
        status: StatusCode,
        body: Value,
    ) -> &Self {
        self.push(
            path,
            Scripted {
                outcome: Outcome::Respond(TransportResponse::new(status, body)),
                delay: Some(delay),
            },
        );
        self
    }

    /// 预置一个网络层失败
    pub fn fail(&self, path: &str, error: TransportError) -> &Self {
        self.push(
            path,
            Scripted {
                outcome: Outcome::Fail(error),
                delay: None,
            },
        );
        self
    }

    /// 已收到的全部请求（按发送顺序）
    pub fn requests(&self) -> Vec<PendingRequest> {
        lock(&self.requests).clone()
    }

    /// 某个路径收到的请求数
    pub fn count(&self, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    /// 尚未消费的预置响应数
    pub fn remaining(&self) -> usize {
        lock(&self.routes).values().map(VecDeque::len).sum()
    }
}

#[async_trait]
impl HttpTransportPort for ScriptedTransport {
    async fn send(&self, request: &PendingRequest) -> Result<TransportResponse, TransportError> {
        lock(&self.requests).push(request.clone());

        let scripted = lock(&self.routes)
            .get_mut(&request.path)
            .and_then(VecDeque::pop_front);

        let Some(scripted) = scripted else {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                "ScriptedTransport: no scripted response"
            );
            return Err(TransportError::Network(format!(
                "no scripted response for {} {}",
                request.method, request.path
            )));
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        match scripted.outcome {
            Outcome::Respond(response) => Ok(response),
            Outcome::Fail(error) => Err(error),
        }
    }
}
