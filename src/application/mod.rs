//! 应用层 - 请求网关与业务接口封装
//!
//! 包含：
//! - ports: 六边形架构端口定义（HttpTransport）
//! - gateway: 信封解码、401 续期、请求网关
//! - services: 各业务接口（图书、购物车、订单、支付、后台……）
//! - error: 归一化错误

pub mod error;
pub mod gateway;
pub mod ports;
pub mod services;

pub use error::{ErrorKind, GatewayError};

pub use gateway::{
    decode_envelope, decode_payload, AuthRefreshCoordinator, GatewayConfig, RefreshMode,
    RequestGateway, DEFAULT_REISSUE_PATH,
};

pub use ports::{HttpTransportPort, TransportError, TransportResponse};

pub use services::{
    AdminService, AuthService, CartService, CatalogService, MemberService, OrderService,
    PaymentService,
};
