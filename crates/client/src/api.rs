//! The marketplace REST surface as seen by the dashboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_auth::{UserAccount, UserFilter, UserStatus};
use bazaar_core::{Page, PageRequest, UserId, VendorId};
use bazaar_orders::{
    AnalyticsSummary, FinancialSummary, OrderFilter, OrderId, OrderRecord, OrderStatus,
};
use bazaar_products::{ProductDetails, ProductFilter, ProductId, ProductRecord, ReviewDecision};

use crate::error::ClientResult;

/// Backend operations. One method per endpoint; every call is a single
/// request with no retries.
#[async_trait::async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// `GET /admin/products`
    async fn list_products(&self, query: &ProductQuery) -> ClientResult<Page<ProductRecord>>;

    /// `GET /admin/products/:id`
    async fn get_product(&self, id: ProductId) -> ClientResult<ProductRecord>;

    /// `POST /vendors/products`
    async fn create_product(&self, product: &NewProduct) -> ClientResult<ProductRecord>;

    /// `PUT /vendors/products/:id`
    async fn update_product(
        &self,
        id: ProductId,
        details: &ProductDetails,
    ) -> ClientResult<ProductRecord>;

    /// `POST /vendors/products/:id/submit`
    async fn submit_product(&self, id: ProductId) -> ClientResult<ProductRecord>;

    /// `PATCH /admin/products/:id/status`
    async fn review_product(
        &self,
        id: ProductId,
        decision: &ReviewDecision,
    ) -> ClientResult<ProductRecord>;

    /// `DELETE /products/:id`
    async fn delete_product(&self, id: ProductId) -> ClientResult<()>;

    /// `GET /orders`
    async fn list_orders(&self, query: &OrderQuery) -> ClientResult<Page<OrderRecord>>;

    /// `GET /orders/:id`
    async fn get_order(&self, id: OrderId) -> ClientResult<OrderRecord>;

    /// `PATCH /orders/:id/status`
    async fn update_order_status(
        &self,
        id: OrderId,
        update: &OrderStatusUpdate,
    ) -> ClientResult<OrderRecord>;

    /// `POST /orders/:id/refund`
    async fn refund_order(&self, id: OrderId) -> ClientResult<OrderRecord>;

    /// `GET /admin/users`
    async fn list_users(&self, query: &UserQuery) -> ClientResult<Page<UserAccount>>;

    /// `PATCH /admin/users/:id/status`
    async fn update_user_status(&self, id: UserId, status: UserStatus)
    -> ClientResult<UserAccount>;

    /// `GET /admin/financial`
    async fn financial_summary(&self) -> ClientResult<FinancialSummary>;

    /// `GET /admin/analytics`
    async fn analytics_summary(&self) -> ClientResult<AnalyticsSummary>;

    /// `GET /health`
    async fn health(&self) -> ClientResult<HealthStatus>;
}

/// Body of `POST /vendors/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub vendor_id: VendorId,
    #[serde(flatten)]
    pub details: ProductDetails,
    /// Create straight into PENDING instead of DRAFT.
    #[serde(default)]
    pub submit_for_review: bool,
}

/// Body of `PATCH /orders/:id/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Reject the update if the order moved on since it was loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<u64>,
}

impl OrderStatusUpdate {
    pub fn to(status: OrderStatus) -> Self {
        Self {
            status,
            tracking_number: None,
            reason: None,
            expected_version: None,
        }
    }

    pub fn with_tracking(mut self, tracking_number: Option<String>) -> Self {
        self.tracking_number = tracking_number;
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }

    pub fn expecting(mut self, version: Option<u64>) -> Self {
        self.expected_version = version;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub filter: OrderFilter,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub filter: UserFilter,
    pub page: PageRequest,
}

fn page_params(page: &PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.page.to_string()),
        ("limit", page.page_size.to_string()),
    ]
}

fn push_opt(params: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        params.push((key, value));
    }
}

impl ProductQuery {
    /// Query-string pairs for `GET /admin/products`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = page_params(&self.page);
        let f = &self.filter;
        push_opt(&mut params, "search", f.search.clone());
        push_opt(&mut params, "status", f.status.map(|s| s.as_str().to_string()));
        push_opt(&mut params, "category", f.category.clone());
        push_opt(&mut params, "vendorId", f.vendor_id.map(|v| v.to_string()));
        push_opt(&mut params, "sourcing", f.sourcing.map(|s| s.as_str().to_string()));
        params
    }
}

impl OrderQuery {
    /// Query-string pairs for `GET /orders`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = page_params(&self.page);
        let f = &self.filter;
        push_opt(&mut params, "search", f.search.clone());
        push_opt(&mut params, "status", f.status.map(|s| s.as_str().to_string()));
        push_opt(
            &mut params,
            "paymentStatus",
            f.payment_status.map(|s| s.as_str().to_string()),
        );
        push_opt(&mut params, "vendorId", f.vendor_id.map(|v| v.to_string()));
        params
    }
}

impl UserQuery {
    /// Query-string pairs for `GET /admin/users`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = page_params(&self.page);
        let f = &self.filter;
        push_opt(&mut params, "search", f.search.clone());
        push_opt(&mut params, "role", f.role.as_ref().map(|r| r.as_str().to_string()));
        push_opt(&mut params, "status", f.status.map(|s| s.as_str().to_string()));
        params
    }
}

/// `data` of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
