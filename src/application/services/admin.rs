//! Admin Service - 管理后台：商品、订单、发货、售后
//!
//! 售后（取消 / 退货 / 换货）的流转由服务端负责，这里只列出与确认

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::error::GatewayError;
use crate::application::gateway::RequestGateway;
use crate::domain::{RequestBody, RequestOptions};

/// 发货信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDelivery {
    pub company: String,
    pub tracking_number: String,
}

/// 售后列表筛选
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// `CANCEL` / `RETURNS` / `EXCHANGE`；为空表示全部
    pub claim_type: Option<String>,
    pub status: Option<String>,
}

impl ClaimFilter {
    fn into_options(self) -> RequestOptions {
        RequestOptions::new()
            .param_opt("page", self.page)
            .param_opt("size", self.size)
            .param_opt("claimType", self.claim_type)
            .param_opt("status", self.status)
    }
}

pub struct AdminService {
    gateway: Arc<RequestGateway>,
}

impl AdminService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    // ------------------------------------------------------------------
    // 商品
    // ------------------------------------------------------------------

    pub async fn create_product(&self, product: Value) -> Result<Value, GatewayError> {
        self.gateway
            .post("/admin/products", product, RequestOptions::new())
            .await
    }

    pub async fn products(
        &self,
        page: u32,
        size: u32,
        product_type: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new()
            .param("page", page)
            .param("size", size)
            .param_opt("productType", product_type);
        self.gateway.get("/admin/products", options).await
    }

    pub async fn product(&self, product_id: u64) -> Result<Value, GatewayError> {
        self.gateway
            .get(
                &format!("/admin/products/{}", product_id),
                RequestOptions::new(),
            )
            .await
    }

    pub async fn update_product(
        &self,
        product_id: u64,
        product: Value,
    ) -> Result<Value, GatewayError> {
        self.gateway
            .put(
                &format!("/admin/products/{}", product_id),
                product,
                RequestOptions::new(),
            )
            .await
    }

    pub async fn search_authors(&self, name: &str) -> Result<Value, GatewayError> {
        self.gateway
            .get("/admin/authors", RequestOptions::new().param("name", name))
            .await
    }

    pub async fn search_publishers(&self, name: &str) -> Result<Value, GatewayError> {
        self.gateway
            .get("/admin/publishers", RequestOptions::new().param("name", name))
            .await
    }

    // ------------------------------------------------------------------
    // 订单与发货
    // ------------------------------------------------------------------

    pub async fn orders(
        &self,
        page: u32,
        size: u32,
        status: Option<&str>,
    ) -> Result<Value, GatewayError> {
        let options = RequestOptions::new()
            .param("page", page)
            .param("size", size)
            .param_opt("status", status);
        self.gateway.get("/admin/orders", options).await
    }

    pub async fn order(&self, order_id: u64) -> Result<Value, GatewayError> {
        self.gateway
            .get(&format!("/admin/orders/{}", order_id), RequestOptions::new())
            .await
    }

    pub async fn create_delivery(
        &self,
        order_id: u64,
        order_item_id: u64,
        delivery: &NewDelivery,
    ) -> Result<Value, GatewayError> {
        self.gateway
            .post(
                &format!(
                    "/admin/orders/{}/items/{}/deliveries",
                    order_id, order_item_id
                ),
                json!(delivery),
                RequestOptions::new(),
            )
            .await
    }

    // ------------------------------------------------------------------
    // 售后
    // ------------------------------------------------------------------

    pub async fn claims(&self, filter: ClaimFilter) -> Result<Value, GatewayError> {
        self.gateway
            .get("/admin/orders/claims", filter.into_options())
            .await
    }

    pub async fn confirm_claim(&self, claim_id: u64) -> Result<Value, GatewayError> {
        self.gateway
            .post(
                &format!("/admin/orders/claims/{}/confirm", claim_id),
                RequestBody::Empty,
                RequestOptions::new(),
            )
            .await
    }
}
