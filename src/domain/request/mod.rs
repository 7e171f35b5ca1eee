//! Request Context - 出站请求描述
//!
//! 职责:
//! - 描述一次可重放的出站调用
//! - 请求体（JSON / multipart）与调用选项

mod value_objects;

pub use value_objects::{
    FormPart, FormPartContent, PendingRequest, RequestBody, RequestOptions, JSON_CONTENT_TYPE,
    REQUEST_ID_HEADER,
};
