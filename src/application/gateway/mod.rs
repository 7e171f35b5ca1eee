//! Gateway - 请求网关核心
//!
//! - envelope: 信封解码
//! - auth_refresh: 401 续期与重放
//! - request_gateway: 对外的 get / post / put / delete

mod auth_refresh;
mod envelope;
mod request_gateway;

pub use auth_refresh::{AuthRefreshCoordinator, RefreshMode, DEFAULT_REISSUE_PATH};
pub use envelope::decode_envelope;
pub use request_gateway::{decode_payload, GatewayConfig, RequestGateway};
