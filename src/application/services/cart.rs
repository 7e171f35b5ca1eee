//! Cart Service - 购物车

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::application::error::GatewayError;
use crate::application::gateway::RequestGateway;
use crate::domain::{RequestBody, RequestOptions};

/// 加入购物车条目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: u64,
    pub quantity: u32,
}

/// 购物车条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub cart_item_id: u64,
    pub product_id: u64,
    pub quantity: u32,
    pub price: u64,
    /// 其余展示字段（书名、封面等）原样保留
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 购物车
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

pub struct CartService {
    gateway: Arc<RequestGateway>,
}

impl CartService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn items(&self) -> Result<Cart, GatewayError> {
        self.gateway.get_as("/carts", RequestOptions::new()).await
    }

    pub async fn add(&self, items: &[CartItemRequest]) -> Result<Cart, GatewayError> {
        self.gateway
            .post_as("/carts", json!({ "items": items }), RequestOptions::new())
            .await
    }

    pub async fn remove(&self, cart_item_ids: &[u64]) -> Result<Value, GatewayError> {
        let body = RequestBody::Json(json!({ "cartItemIds": cart_item_ids }));
        self.gateway.delete("/carts", body, RequestOptions::new()).await
    }
}
