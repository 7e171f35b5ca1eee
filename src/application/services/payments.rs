//! Payment Service - 支付请求与确认
//!
//! 支付窗口由外部支付 SDK 负责，这里只调用后端的两个接口

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::error::GatewayError;
use crate::application::gateway::RequestGateway;
use crate::domain::RequestOptions;

/// 支付确认（支付 SDK 回跳参数）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub payment_key: String,
    pub order_id: String,
    pub amount: u64,
}

pub struct PaymentService {
    gateway: Arc<RequestGateway>,
}

impl PaymentService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// 发起支付，返回 `{orderId, amount, ...}`
    pub async fn request(&self, order_id: u64, amount: u64) -> Result<Value, GatewayError> {
        self.gateway
            .post(
                "/v2/payments",
                json!({"orderId": order_id, "amount": amount}),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn confirm(&self, confirmation: &PaymentConfirmation) -> Result<Value, GatewayError> {
        self.gateway
            .post(
                "/v2/payments/confirm",
                json!(confirmation),
                RequestOptions::new(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestBody;
    use crate::infrastructure::adapters::ScriptedTransport;
    use http::StatusCode;

    #[tokio::test]
    async fn test_confirm_payment_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            "/v2/payments/confirm",
            StatusCode::OK,
            json!({"success": true, "data": {"status": "DONE"}}),
        );
        let service =
            PaymentService::new(RequestGateway::with_default_config(transport.clone()).arc());

        let result = service
            .confirm(&PaymentConfirmation {
                payment_key: "pk_123".into(),
                order_id: "77".into(),
                amount: 27000,
            })
            .await
            .unwrap();

        assert_eq!(result, json!({"status": "DONE"}));
        assert_eq!(
            transport.requests()[0].body,
            RequestBody::Json(json!({"paymentKey": "pk_123", "orderId": "77", "amount": 27000}))
        );
    }
}
