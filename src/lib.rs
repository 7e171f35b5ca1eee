//! Bookstore Gateway - 书店前台与管理后台的后端访问层
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Envelope Context: `{success, data, meta}` 响应信封
//! - Request Context: 可重放的出站请求描述
//!
//! 应用层 (application/):
//! - Ports: HttpTransportPort
//! - Gateway: 信封解码、401 续期与重放、请求网关
//! - Services: 图书、购物车、订单、支付、会员、后台接口
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: reqwest 传输（cookie 会话）、脚本化传输（测试用）

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use application::{GatewayError, RequestGateway};
pub use config::{load_config, AppConfig};
