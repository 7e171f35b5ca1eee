//! Order Service - 下单、订单查询、取消 / 退货 / 确认收货
//!
//! 订单与售后状态机由服务端维护，这里只转发请求

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::error::GatewayError;
use crate::application::gateway::RequestGateway;
use crate::domain::{RequestBody, RequestOptions};

/// 下单条目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: u64,
    pub discount_amount: u64,
    pub price: u64,
    pub quantity: u32,
}

/// 下单请求
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub items: Vec<OrderItemRequest>,
    pub delivery_address_id: u64,
}

pub struct OrderService {
    gateway: Arc<RequestGateway>,
}

impl OrderService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// 下单，返回 `{orderId, paymentAmount}`
    pub async fn create(&self, order: &CreateOrder) -> Result<Value, GatewayError> {
        self.gateway
            .post("/v2/orders", json!(order), RequestOptions::new())
            .await
    }

    pub async fn list(&self) -> Result<Value, GatewayError> {
        self.gateway.get("/v2/orders", RequestOptions::new()).await
    }

    pub async fn detail(&self, order_id: u64) -> Result<Value, GatewayError> {
        self.gateway
            .get(&format!("/v2/orders/{}", order_id), RequestOptions::new())
            .await
    }

    /// 取消单个订单条目
    pub async fn cancel_item(
        &self,
        order_id: u64,
        order_item_id: u64,
        reason: &str,
        quantity: u32,
    ) -> Result<Value, GatewayError> {
        self.gateway
            .post(
                &item_path(order_id, order_item_id, "cancel"),
                json!({"cancelReason": reason, "cancelQuantity": quantity}),
                RequestOptions::new(),
            )
            .await
    }

    /// 申请退货
    pub async fn return_item(
        &self,
        order_id: u64,
        order_item_id: u64,
        reason: &str,
        quantity: u32,
    ) -> Result<Value, GatewayError> {
        self.gateway
            .post(
                &item_path(order_id, order_item_id, "return"),
                json!({"returnReason": reason, "returnQuantity": quantity}),
                RequestOptions::new(),
            )
            .await
    }

    /// 确认收货
    pub async fn confirm_item(
        &self,
        order_id: u64,
        order_item_id: u64,
    ) -> Result<Value, GatewayError> {
        self.gateway
            .post(
                &item_path(order_id, order_item_id, "confirm"),
                RequestBody::Empty,
                RequestOptions::new(),
            )
            .await
    }

    /// 整单取消（多个条目）
    pub async fn cancel(
        &self,
        order_id: u64,
        order_item_ids: &[u64],
        reason: &str,
    ) -> Result<Value, GatewayError> {
        self.gateway
            .post(
                &format!("/v2/orders/{}/cancel", order_id),
                json!({"orderItemIds": order_item_ids, "reason": reason}),
                RequestOptions::new(),
            )
            .await
    }
}

fn item_path(order_id: u64, order_item_id: u64, action: &str) -> String {
    format!("/v2/orders/{}/items/{}/{}", order_id, order_item_id, action)
}
