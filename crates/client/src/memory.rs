//! In-process [`MarketplaceApi`] backed by the domain aggregates.
//!
//! Behaves like the real backend from a dashboard's point of view: it
//! authorizes the session principal, runs every mutation through the
//! aggregate's `handle`/`apply`, and reports failures with the same HTTP
//! status codes the server uses. Used for tests and offline demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use bazaar_auth::{
    AuthzError, Permission, Principal, RolePolicy, UserAccount, UserStatus, change_user_status,
    ensure_vendor_scope,
};
use bazaar_core::{
    Aggregate, AggregateRoot, DomainError, ExpectedVersion, Filter, Money, Page, UserId,
};
use bazaar_orders::{
    AnalyticsSummary, CancelOrder, CommissionSchedule, FinancialSummary, Order, OrderCommand,
    OrderId, OrderRecord, OrderStatus, PlaceOrder, ProcessRefund, UpdateOrderStatus,
};
use bazaar_products::{
    DeleteProduct, Product, ProductCommand, ProductDetails, ProductId, ProductRecord,
    ReviewDecision, SubmitForReview, SubmitProduct, UpdateProduct,
};

use crate::api::{
    HealthStatus, MarketplaceApi, NewProduct, OrderQuery, OrderStatusUpdate, ProductQuery,
    UserQuery,
};
use crate::error::{ClientError, ClientResult};

/// HTTP status the server answers a domain error with.
fn status_of(err: &DomainError) -> u16 {
    match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => 400,
        DomainError::NotFound => 404,
        DomainError::Conflict(_) => 409,
        DomainError::InvariantViolation(_) => 422,
    }
}

fn rejected(err: DomainError) -> ClientError {
    ClientError::api(status_of(&err), err.to_string())
}

fn forbidden(err: AuthzError) -> ClientError {
    ClientError::api(403, err.to_string())
}

pub struct InMemoryMarketplace {
    session: RwLock<Principal>,
    policy: RolePolicy,
    schedule: CommissionSchedule,
    currency: String,
    products: RwLock<HashMap<ProductId, Product>>,
    orders: RwLock<HashMap<OrderId, Order>>,
    users: RwLock<Vec<UserAccount>>,
    requests: AtomicUsize,
    offline: AtomicBool,
}

impl InMemoryMarketplace {
    /// A marketplace acting on behalf of `session`.
    pub fn new(session: Principal) -> Self {
        Self {
            session: RwLock::new(session),
            policy: RolePolicy::default(),
            schedule: CommissionSchedule::default(),
            currency: Money::DEFAULT_CURRENCY.to_string(),
            products: RwLock::new(HashMap::new()),
            orders: RwLock::new(HashMap::new()),
            users: RwLock::new(Vec::new()),
            requests: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }

    pub fn with_policy(mut self, policy: RolePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_schedule(mut self, schedule: CommissionSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Switch the signed-in principal.
    pub async fn sign_in(&self, session: Principal) {
        *self.session.write().await = session;
    }

    /// Number of API calls received so far (seeding is not counted).
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Simulate a lost connection: every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn seed_product(&self, cmd: SubmitProduct) -> ClientResult<ProductRecord> {
        let mut products = self.products.write().await;
        let product = products
            .entry(cmd.product_id)
            .or_insert_with(|| Product::empty(cmd.product_id));
        product
            .execute(&ProductCommand::SubmitProduct(cmd))
            .map_err(rejected)?;
        product.record().ok_or_else(|| rejected(DomainError::NotFound))
    }

    pub async fn seed_order(&self, cmd: PlaceOrder) -> ClientResult<OrderRecord> {
        let mut orders = self.orders.write().await;
        let order = orders
            .entry(cmd.order_id)
            .or_insert_with(|| Order::empty(cmd.order_id));
        order
            .execute(&OrderCommand::PlaceOrder(cmd))
            .map_err(rejected)?;
        order.record().ok_or_else(|| rejected(DomainError::NotFound))
    }

    pub async fn seed_user(&self, account: UserAccount) {
        self.users.write().await.push(account);
    }

    /// Apply a command outside the dashboard request path (payment capture,
    /// storefront actions).
    pub async fn apply_order_command(&self, cmd: OrderCommand) -> ClientResult<OrderRecord> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&cmd.order_id())
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        order.execute(&cmd).map_err(rejected)?;
        order.record().ok_or_else(|| rejected(DomainError::NotFound))
    }

    /// Same for products, e.g. the vendor visibility toggle.
    pub async fn apply_product_command(&self, cmd: ProductCommand) -> ClientResult<ProductRecord> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&cmd.product_id())
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        product.execute(&cmd).map_err(rejected)?;
        product.record().ok_or_else(|| rejected(DomainError::NotFound))
    }

    /// Count the call, fail if offline, and return the acting principal.
    async fn begin(&self) -> ClientResult<Principal> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Network("connection refused".to_string()));
        }
        Ok(self.session.read().await.clone())
    }

    fn authorize(&self, principal: &Principal, permission: &Permission) -> ClientResult<()> {
        self.policy.authorize(principal, permission).map_err(forbidden)
    }

    async fn mutate_product(
        &self,
        principal: &Principal,
        cmd: ProductCommand,
    ) -> ClientResult<ProductRecord> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&cmd.product_id())
            .filter(|p| p.exists())
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        if let Some(owner) = product.vendor_id() {
            ensure_vendor_scope(principal, owner).map_err(forbidden)?;
        }
        product.execute(&cmd).map_err(rejected)?;
        product.record().ok_or_else(|| rejected(DomainError::NotFound))
    }

    async fn mutate_order(
        &self,
        principal: &Principal,
        cmd: OrderCommand,
        expected: ExpectedVersion,
    ) -> ClientResult<OrderRecord> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&cmd.order_id())
            .filter(|o| o.exists())
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        if let Some(owner) = order.vendor_id() {
            ensure_vendor_scope(principal, owner).map_err(forbidden)?;
        }
        expected.check(order.version()).map_err(rejected)?;
        order.execute(&cmd).map_err(rejected)?;
        order.record().ok_or_else(|| rejected(DomainError::NotFound))
    }

    async fn order_records(&self) -> Vec<OrderRecord> {
        let orders = self.orders.read().await;
        let mut records: Vec<_> = orders.values().filter_map(Order::record).collect();
        records.sort_by(|a, b| {
            b.placed_at
                .cmp(&a.placed_at)
                .then_with(|| a.order_number.cmp(&b.order_number))
        });
        records
    }
}

#[async_trait::async_trait]
impl MarketplaceApi for InMemoryMarketplace {
    async fn list_products(&self, query: &ProductQuery) -> ClientResult<Page<ProductRecord>> {
        let principal = self.begin().await?;
        let mut filter = query.filter.clone();
        let can_review = self
            .policy
            .authorize(&principal, &Permission::PRODUCTS_REVIEW)
            .is_ok();
        if !can_review {
            filter.vendor_id = Some(principal.vendor_id.ok_or_else(|| {
                forbidden(AuthzError::Forbidden(Permission::PRODUCTS_REVIEW.as_str().to_string()))
            })?);
        }

        let products = self.products.read().await;
        let mut records: Vec<_> = products.values().filter_map(Product::record).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(query.page.paginate(filter.select(&records)))
    }

    async fn get_product(&self, id: ProductId) -> ClientResult<ProductRecord> {
        let principal = self.begin().await?;
        let products = self.products.read().await;
        let record = products
            .get(&id)
            .and_then(Product::record)
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        if self
            .policy
            .authorize(&principal, &Permission::PRODUCTS_REVIEW)
            .is_err()
        {
            ensure_vendor_scope(&principal, record.vendor_id).map_err(forbidden)?;
        }
        Ok(record)
    }

    async fn create_product(&self, product: &NewProduct) -> ClientResult<ProductRecord> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::PRODUCTS_SUBMIT)?;
        ensure_vendor_scope(&principal, product.vendor_id).map_err(forbidden)?;

        let product_id = ProductId::generate();
        let mut products = self.products.write().await;
        let mut aggregate = Product::empty(product_id);
        aggregate
            .execute(&ProductCommand::SubmitProduct(SubmitProduct {
                product_id,
                vendor_id: product.vendor_id,
                details: product.details.clone(),
                submit_for_review: product.submit_for_review,
                occurred_at: Utc::now(),
            }))
            .map_err(rejected)?;
        let record = aggregate
            .record()
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        products.insert(product_id, aggregate);
        tracing::info!(product_id = %product_id, status = %record.status, "product created");
        Ok(record)
    }

    async fn update_product(
        &self,
        id: ProductId,
        details: &ProductDetails,
    ) -> ClientResult<ProductRecord> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::PRODUCTS_SUBMIT)?;
        self.mutate_product(
            &principal,
            ProductCommand::UpdateProduct(UpdateProduct {
                product_id: id,
                details: details.clone(),
                occurred_at: Utc::now(),
            }),
        )
        .await
    }

    async fn submit_product(&self, id: ProductId) -> ClientResult<ProductRecord> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::PRODUCTS_SUBMIT)?;
        self.mutate_product(
            &principal,
            ProductCommand::SubmitForReview(SubmitForReview {
                product_id: id,
                occurred_at: Utc::now(),
            }),
        )
        .await
    }

    async fn review_product(
        &self,
        id: ProductId,
        decision: &ReviewDecision,
    ) -> ClientResult<ProductRecord> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::PRODUCTS_REVIEW)?;
        decision.validate().map_err(rejected)?;
        let record = self
            .mutate_product(&principal, decision.clone().into_command(id, Utc::now()))
            .await?;
        tracing::info!(product_id = %id, status = %record.status, "product reviewed");
        Ok(record)
    }

    async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::PRODUCTS_DELETE)?;
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .filter(|p| p.exists())
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        if let Some(owner) = product.vendor_id() {
            ensure_vendor_scope(&principal, owner).map_err(forbidden)?;
        }
        product
            .execute(&ProductCommand::DeleteProduct(DeleteProduct {
                product_id: id,
                occurred_at: Utc::now(),
            }))
            .map_err(rejected)?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    async fn list_orders(&self, query: &OrderQuery) -> ClientResult<Page<OrderRecord>> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::ORDERS_FULFIL)?;
        let mut filter = query.filter.clone();
        if !principal.is_admin() {
            filter.vendor_id = principal.vendor_id;
        }
        let records = self.order_records().await;
        Ok(query.page.paginate(filter.select(&records)))
    }

    async fn get_order(&self, id: OrderId) -> ClientResult<OrderRecord> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::ORDERS_FULFIL)?;
        let orders = self.orders.read().await;
        let record = orders
            .get(&id)
            .and_then(Order::record)
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        ensure_vendor_scope(&principal, record.vendor_id).map_err(forbidden)?;
        Ok(record)
    }

    async fn update_order_status(
        &self,
        id: OrderId,
        update: &OrderStatusUpdate,
    ) -> ClientResult<OrderRecord> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::ORDERS_FULFIL)?;

        let occurred_at = Utc::now();
        let cmd = match update.status {
            OrderStatus::Cancelled => OrderCommand::CancelOrder(CancelOrder {
                order_id: id,
                reason: update.reason.clone(),
                occurred_at,
            }),
            status => OrderCommand::UpdateOrderStatus(UpdateOrderStatus {
                order_id: id,
                status,
                tracking_number: update.tracking_number.clone(),
                occurred_at,
            }),
        };
        let record = self
            .mutate_order(&principal, cmd, ExpectedVersion::from(update.expected_version))
            .await?;
        tracing::info!(order_id = %id, status = %record.status, "order status updated");
        Ok(record)
    }

    async fn refund_order(&self, id: OrderId) -> ClientResult<OrderRecord> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::ORDERS_REFUND)?;
        let record = self
            .mutate_order(
                &principal,
                OrderCommand::ProcessRefund(ProcessRefund {
                    order_id: id,
                    occurred_at: Utc::now(),
                }),
                ExpectedVersion::Any,
            )
            .await?;
        tracing::info!(order_id = %id, "order refunded");
        Ok(record)
    }

    async fn list_users(&self, query: &UserQuery) -> ClientResult<Page<UserAccount>> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::USERS_MANAGE)?;
        let users = self.users.read().await;
        Ok(query.page.paginate(query.filter.select(users.iter())))
    }

    async fn update_user_status(
        &self,
        id: UserId,
        status: UserStatus,
    ) -> ClientResult<UserAccount> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::USERS_MANAGE)?;
        let mut users = self.users.write().await;
        let account = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| rejected(DomainError::NotFound))?;
        change_user_status(principal.user_id, account, status).map_err(rejected)?;
        tracing::info!(user_id = %id, %status, "user status updated");
        Ok(account.clone())
    }

    async fn financial_summary(&self) -> ClientResult<FinancialSummary> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::FINANCE_READ)?;
        let records = self.order_records().await;
        FinancialSummary::compute(&records, &self.schedule, &self.currency).map_err(rejected)
    }

    async fn analytics_summary(&self) -> ClientResult<AnalyticsSummary> {
        let principal = self.begin().await?;
        self.authorize(&principal, &Permission::FINANCE_READ)?;
        let records = self.order_records().await;
        AnalyticsSummary::compute(&records, &self.currency).map_err(rejected)
    }

    async fn health(&self) -> ClientResult<HealthStatus> {
        self.begin().await?;
        Ok(HealthStatus {
            status: "ok".to_string(),
            service: "bazaar-in-memory".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use bazaar_auth::Role;
    use bazaar_core::{CustomerId, VendorId};
    use bazaar_orders::{OrderLine, PaymentStatus, ShippingAddress};

    use super::*;

    async fn paid_order(market: &InMemoryMarketplace, vendor_id: VendorId) -> OrderId {
        let order_id = OrderId::generate();
        market
            .seed_order(PlaceOrder {
                order_id,
                order_number: format!("ORD-{}", &order_id.to_string()[..8]),
                customer_id: CustomerId::new(),
                customer_name: "Lina Haddad".to_string(),
                vendor_id,
                lines: vec![OrderLine {
                    product_id: ProductId::generate(),
                    product_name: "Olive soap".to_string(),
                    category: "beauty".to_string(),
                    quantity: 3,
                    unit_price: Money::usd(800),
                }],
                shipping_address: ShippingAddress {
                    recipient: "Lina Haddad".to_string(),
                    line1: "12 Cedar Street".to_string(),
                    line2: None,
                    city: "Beirut".to_string(),
                    postal_code: "1100".to_string(),
                    country: "LB".to_string(),
                },
                payment_status: PaymentStatus::Paid,
                occurred_at: Utc::now(),
            })
            .await
            .unwrap();
        order_id
    }

    #[tokio::test]
    async fn refunds_stay_within_the_vendor_scope() {
        let vendor_id = VendorId::new();
        let vendor = Principal::vendor(UserId::new(), vendor_id);
        let policy = RolePolicy::empty()
            .grant(Role::VENDOR, Permission::ORDERS_FULFIL)
            .grant(Role::VENDOR, Permission::ORDERS_REFUND);
        let market = InMemoryMarketplace::new(vendor).with_policy(policy);
        let own = paid_order(&market, vendor_id).await;
        let foreign = paid_order(&market, VendorId::new()).await;

        let err = market.refund_order(foreign).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 403, .. }));
        let untouched = market.orders.read().await[&foreign].record().unwrap();
        assert_eq!(untouched.payment_status, PaymentStatus::Paid);

        let refunded = market.refund_order(own).await.unwrap();
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    }

    #[tokio::test]
    async fn status_codes_follow_the_domain_error() {
        let market = InMemoryMarketplace::new(Principal::admin(UserId::new()));
        let id = paid_order(&market, VendorId::new()).await;

        let missing = market.get_order(OrderId::generate()).await.unwrap_err();
        assert!(matches!(missing, ClientError::Api { status: 404, .. }));

        let illegal = OrderStatusUpdate::to(OrderStatus::Delivered);
        let err = market.update_order_status(id, &illegal).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 422, .. }));

        market.refund_order(id).await.unwrap();
        let again = market.refund_order(id).await.unwrap_err();
        assert!(matches!(again, ClientError::Api { status: 409, .. }));
    }
}
