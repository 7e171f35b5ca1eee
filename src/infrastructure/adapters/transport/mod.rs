//! Transport Adapter - HTTP 传输层实现

mod reqwest_transport;
mod scripted_transport;

pub use reqwest_transport::{ReqwestTransport, ReqwestTransportConfig};
pub use scripted_transport::ScriptedTransport;
