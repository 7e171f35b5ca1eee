//! Member Service - 个人信息、收货地址、心愿单

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::error::GatewayError;
use crate::application::gateway::RequestGateway;
use crate::domain::{RequestBody, RequestOptions};

/// 新收货地址
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub receiver: String,
    pub phone_number: String,
    pub zipcode: String,
    pub address: String,
    pub address_detail: String,
    pub is_default: bool,
}

pub struct MemberService {
    gateway: Arc<RequestGateway>,
}

impl MemberService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn profile(&self) -> Result<Value, GatewayError> {
        self.gateway.get("/members/me", RequestOptions::new()).await
    }

    pub async fn addresses(&self) -> Result<Value, GatewayError> {
        self.gateway
            .get("/delivery-address", RequestOptions::new())
            .await
    }

    pub async fn default_address(&self) -> Result<Value, GatewayError> {
        self.gateway
            .get("/delivery-address/default", RequestOptions::new())
            .await
    }

    pub async fn add_address(&self, address: &NewAddress) -> Result<Value, GatewayError> {
        self.gateway
            .post("/delivery-address", json!(address), RequestOptions::new())
            .await
    }

    pub async fn delete_address(&self, address_id: u64) -> Result<(), GatewayError> {
        self.gateway
            .delete(
                &format!("/delivery-address/{}", address_id),
                RequestBody::Empty,
                RequestOptions::new(),
            )
            .await?;
        Ok(())
    }

    pub async fn wishlist(&self) -> Result<Value, GatewayError> {
        self.gateway.get("/users/wishlist", RequestOptions::new()).await
    }
}
