//! Catalog Service - 图书、分类、评论

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::application::error::GatewayError;
use crate::application::gateway::RequestGateway;
use crate::domain::{FormPart, RequestOptions};

/// 评论附件
#[derive(Debug, Clone)]
pub struct ReviewFile {
    pub file_name: String,
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

/// 新评论
///
/// 以 multipart 提交：`data` 字段为 JSON，`files` 字段可重复
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub order_id: u64,
    pub content: String,
    pub star: u8,
    #[serde(skip)]
    pub files: Vec<ReviewFile>,
}

impl NewReview {
    fn into_form(self) -> Vec<FormPart> {
        let mut parts = vec![FormPart::json("data", &json!(self))];
        parts.extend(
            self.files
                .into_iter()
                .map(|f| FormPart::file("files", f.file_name, f.mime, f.data)),
        );
        parts
    }
}

pub struct CatalogService {
    gateway: Arc<RequestGateway>,
}

impl CatalogService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// 图书列表；`sort` 为空时不传
    pub async fn list_books(
        &self,
        page: u32,
        size: u32,
        sort: &[String],
    ) -> Result<Value, GatewayError> {
        let options = sort.iter().fold(
            RequestOptions::new().param("page", page).param("size", size),
            |options, s| options.param("sort", s),
        );
        self.gateway.get("/v2/books", options).await
    }

    pub async fn book_detail(&self, book_id: u64) -> Result<Value, GatewayError> {
        self.gateway
            .get(&format!("/v2/books/{}", book_id), RequestOptions::new())
            .await
    }

    pub async fn categories(&self) -> Result<Value, GatewayError> {
        self.gateway.get("/categories", RequestOptions::new()).await
    }

    pub async fn reviews(&self, page: u32, size: u32) -> Result<Value, GatewayError> {
        self.gateway
            .get(
                "/reviews",
                RequestOptions::new().param("page", page).param("size", size),
            )
            .await
    }

    pub async fn create_review(&self, review: NewReview) -> Result<Value, GatewayError> {
        self.gateway
            .post("/reviews", review.into_form(), RequestOptions::new())
            .await
    }
}
