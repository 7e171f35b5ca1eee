//! Domain Layer - 领域层
//!
//! 包含两个上下文:
//! - Envelope Context: 响应信封
//! - Request Context: 可重放的出站请求

pub mod envelope;
pub mod request;

pub use envelope::{Envelope, EnvelopeMeta};
pub use request::{
    FormPart, FormPartContent, PendingRequest, RequestBody, RequestOptions, JSON_CONTENT_TYPE,
    REQUEST_ID_HEADER,
};
