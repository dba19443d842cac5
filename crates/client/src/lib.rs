//! `bazaar-client`: the REST client behind the admin and vendor dashboards.
//!
//! - [`MarketplaceApi`] is the seam between the dashboards and the backend,
//!   with an HTTP implementation ([`HttpMarketplaceApi`]) and an in-memory one
//!   ([`InMemoryMarketplace`]) that drives the domain aggregates directly.
//! - The services pre-check permissions, form input and the state machines
//!   before a request is sent.
//! - [`DashboardPoller`] keeps the admin summaries fresh in the background.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod envelope;
pub mod error;
pub mod http;
pub mod memory;
pub mod services;
pub mod token;

pub use api::{
    HealthStatus, MarketplaceApi, NewProduct, OrderQuery, OrderStatusUpdate, ProductQuery,
    UserQuery,
};
pub use config::{ClientConfig, ConfigError};
pub use dashboard::{DashboardHandle, DashboardPoller, DashboardSnapshot};
pub use envelope::{ApiEnvelope, Pagination};
pub use error::{ClientError, ClientResult, Notice, NoticeLevel};
pub use http::HttpMarketplaceApi;
pub use memory::InMemoryMarketplace;
pub use services::{OrderFulfillmentService, ProductApprovalService};
pub use token::{FileTokenStore, StaticToken, TokenSource};
