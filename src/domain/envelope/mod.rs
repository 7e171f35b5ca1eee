//! Envelope Context - 统一响应信封
//!
//! 后端所有标准接口都以 `{success, data, meta}` 包装响应

mod value_objects;

pub use value_objects::{Envelope, EnvelopeMeta};
