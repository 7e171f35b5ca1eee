//! Domain Services - 各业务接口的薄封装
//!
//! 只负责拼装路径与请求体，所有调用都经过 `RequestGateway`

mod admin;
mod auth;
mod catalog;
mod cart;
mod members;
mod orders;
mod payments;

pub use admin::{AdminService, ClaimFilter, NewDelivery};
pub use auth::{oauth_login_url, AuthService, Credentials};
pub use catalog::{CatalogService, NewReview, ReviewFile};
pub use cart::{Cart, CartItem, CartItemRequest, CartService};
pub use members::{MemberService, NewAddress};
pub use orders::{CreateOrder, OrderItemRequest, OrderService};
pub use payments::{PaymentConfirmation, PaymentService};
