use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Money, VendorId};
use bazaar_events::Event;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Product status lifecycle.
///
/// ```text
/// DRAFT ──submit──▶ PENDING ──approve──▶ APPROVED ◀─┐
///   ▲                 │  │                 │        │
///   │   request       │  └──reject──▶ REJECTED      │
///   └───changes───────┘                    │        │
///   └──────────── vendor edit ─────────────┘        │
///                         APPROVED|ACTIVE ─deactivate─▶ INACTIVE ─activate─▶ ACTIVE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "DRAFT",
            ProductStatus::Pending => "PENDING",
            ProductStatus::Approved => "APPROVED",
            ProductStatus::Rejected => "REJECTED",
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
        }
    }

    /// Customers only ever see approved products (ACTIVE is an approved
    /// product the vendor re-enabled after hiding it).
    pub fn is_customer_visible(&self) -> bool {
        matches!(self, ProductStatus::Approved | ProductStatus::Active)
    }

    /// Only pending products can be approved, rejected or sent back.
    pub fn is_reviewable(&self) -> bool {
        matches!(self, ProductStatus::Pending)
    }

    /// Vendors may edit drafts and rejected products.
    pub fn is_editable(&self) -> bool {
        matches!(self, ProductStatus::Draft | ProductStatus::Rejected)
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a product is self-manufactured or resold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sourcing {
    InHouse,
    Outsourced,
}

impl Sourcing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sourcing::InHouse => "IN_HOUSE",
            Sourcing::Outsourced => "OUTSOURCED",
        }
    }
}

/// Vendor-editable product fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: u32,
    pub category: String,
    pub sourcing: Sourcing,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ProductDetails {
    /// Required-field validation shared by the vendor form and the aggregate.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        if self.price.is_zero() {
            return Err(DomainError::validation("price must be positive"));
        }
        if self.price.currency.trim().is_empty() {
            return Err(DomainError::validation("price currency cannot be empty"));
        }
        Ok(())
    }
}

/// Aggregate root: Product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    vendor_id: Option<VendorId>,
    details: Option<ProductDetails>,
    status: ProductStatus,
    review_note: Option<String>,
    rejection_reason: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
    deleted: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            vendor_id: None,
            details: None,
            status: ProductStatus::Draft,
            review_note: None,
            rejection_reason: None,
            created_at: None,
            updated_at: None,
            version: 0,
            created: false,
            deleted: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor_id
    }

    pub fn details(&self) -> Option<&ProductDetails> {
        self.details.as_ref()
    }

    pub fn status(&self) -> ProductStatus {
        self.status
    }

    pub fn review_note(&self) -> Option<&str> {
        self.review_note.as_deref()
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn exists(&self) -> bool {
        self.created && !self.deleted
    }

    pub fn is_customer_visible(&self) -> bool {
        self.exists() && self.status.is_customer_visible()
    }

    /// Read-side snapshot for listings and the wire. `None` until created or
    /// once deleted.
    pub fn record(&self) -> Option<ProductRecord> {
        if !self.exists() {
            return None;
        }
        let details = self.details.clone()?;
        let vendor_id = self.vendor_id?;
        let created_at = self.created_at?;
        Some(ProductRecord {
            id: self.id,
            vendor_id,
            name: details.name,
            description: details.description,
            price: details.price,
            stock: details.stock,
            category: details.category,
            sourcing: details.sourcing,
            images: details.images,
            status: self.status,
            review_note: self.review_note.clone(),
            rejection_reason: self.rejection_reason.clone(),
            created_at,
            updated_at: self.updated_at,
            version: self.version,
        })
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Flat product row as listed by the dashboards and exchanged over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub vendor_id: VendorId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: u32,
    pub category: String,
    pub sourcing: Sourcing,
    #[serde(default)]
    pub images: Vec<String>,
    pub status: ProductStatus,
    #[serde(default)]
    pub review_note: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command: SubmitProduct (vendor creates a product as draft or straight into review).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitProduct {
    pub product_id: ProductId,
    pub vendor_id: VendorId,
    pub details: ProductDetails,
    pub submit_for_review: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateProduct (vendor edit of a draft or rejected product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub details: ProductDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SubmitForReview (DRAFT → PENDING).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitForReview {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApproveProduct (admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveProduct {
    pub product_id: ProductId,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectProduct (admin, reason required).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectProduct {
    pub product_id: ProductId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RequestChanges (admin sends a pending product back to draft).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestChanges {
    pub product_id: ProductId,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeactivateProduct (vendor hides an approved product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivateProduct {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ActivateProduct (vendor re-enables a hidden product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateProduct {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteProduct (irreversible).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProduct {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    SubmitProduct(SubmitProduct),
    UpdateProduct(UpdateProduct),
    SubmitForReview(SubmitForReview),
    ApproveProduct(ApproveProduct),
    RejectProduct(RejectProduct),
    RequestChanges(RequestChanges),
    DeactivateProduct(DeactivateProduct),
    ActivateProduct(ActivateProduct),
    DeleteProduct(DeleteProduct),
}

impl ProductCommand {
    pub fn product_id(&self) -> ProductId {
        match self {
            ProductCommand::SubmitProduct(c) => c.product_id,
            ProductCommand::UpdateProduct(c) => c.product_id,
            ProductCommand::SubmitForReview(c) => c.product_id,
            ProductCommand::ApproveProduct(c) => c.product_id,
            ProductCommand::RejectProduct(c) => c.product_id,
            ProductCommand::RequestChanges(c) => c.product_id,
            ProductCommand::DeactivateProduct(c) => c.product_id,
            ProductCommand::ActivateProduct(c) => c.product_id,
            ProductCommand::DeleteProduct(c) => c.product_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Event: ProductSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSubmitted {
    pub product_id: ProductId,
    pub vendor_id: VendorId,
    pub details: ProductDetails,
    /// DRAFT or PENDING.
    pub status: ProductStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated (product returns to DRAFT).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub details: ProductDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductSubmittedForReview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSubmittedForReview {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductApproved {
    pub product_id: ProductId,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRejected {
    pub product_id: ProductId,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ChangesRequested (product returns to DRAFT with a review note).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesRequested {
    pub product_id: ProductId,
    pub note: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductDeactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeactivated {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductActivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductActivated {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeleted {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductSubmitted(ProductSubmitted),
    ProductUpdated(ProductUpdated),
    ProductSubmittedForReview(ProductSubmittedForReview),
    ProductApproved(ProductApproved),
    ProductRejected(ProductRejected),
    ChangesRequested(ChangesRequested),
    ProductDeactivated(ProductDeactivated),
    ProductActivated(ProductActivated),
    ProductDeleted(ProductDeleted),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductSubmitted(_) => "products.product.submitted",
            ProductEvent::ProductUpdated(_) => "products.product.updated",
            ProductEvent::ProductSubmittedForReview(_) => "products.product.submitted_for_review",
            ProductEvent::ProductApproved(_) => "products.product.approved",
            ProductEvent::ProductRejected(_) => "products.product.rejected",
            ProductEvent::ChangesRequested(_) => "products.product.changes_requested",
            ProductEvent::ProductDeactivated(_) => "products.product.deactivated",
            ProductEvent::ProductActivated(_) => "products.product.activated",
            ProductEvent::ProductDeleted(_) => "products.product.deleted",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductSubmitted(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
            ProductEvent::ProductSubmittedForReview(e) => e.occurred_at,
            ProductEvent::ProductApproved(e) => e.occurred_at,
            ProductEvent::ProductRejected(e) => e.occurred_at,
            ProductEvent::ChangesRequested(e) => e.occurred_at,
            ProductEvent::ProductDeactivated(e) => e.occurred_at,
            ProductEvent::ProductActivated(e) => e.occurred_at,
            ProductEvent::ProductDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductSubmitted(e) => {
                self.id = e.product_id;
                self.vendor_id = Some(e.vendor_id);
                self.details = Some(e.details.clone());
                self.status = e.status;
                self.created_at = Some(e.occurred_at);
                self.created = true;
            }
            ProductEvent::ProductUpdated(e) => {
                self.details = Some(e.details.clone());
                self.status = ProductStatus::Draft;
                self.updated_at = Some(e.occurred_at);
            }
            ProductEvent::ProductSubmittedForReview(e) => {
                self.status = ProductStatus::Pending;
                self.updated_at = Some(e.occurred_at);
            }
            ProductEvent::ProductApproved(e) => {
                self.status = ProductStatus::Approved;
                self.review_note = e.note.clone();
                self.rejection_reason = None;
                self.updated_at = Some(e.occurred_at);
            }
            ProductEvent::ProductRejected(e) => {
                self.status = ProductStatus::Rejected;
                self.rejection_reason = Some(e.reason.clone());
                self.updated_at = Some(e.occurred_at);
            }
            ProductEvent::ChangesRequested(e) => {
                self.status = ProductStatus::Draft;
                self.review_note = Some(e.note.clone());
                self.updated_at = Some(e.occurred_at);
            }
            ProductEvent::ProductDeactivated(e) => {
                self.status = ProductStatus::Inactive;
                self.updated_at = Some(e.occurred_at);
            }
            ProductEvent::ProductActivated(e) => {
                self.status = ProductStatus::Active;
                self.updated_at = Some(e.occurred_at);
            }
            ProductEvent::ProductDeleted(e) => {
                self.deleted = true;
                self.updated_at = Some(e.occurred_at);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if let ProductCommand::SubmitProduct(cmd) = command {
            return self.handle_submit(cmd);
        }

        if !self.exists() {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(command.product_id())?;

        match command {
            ProductCommand::SubmitProduct(_) => {
                Err(DomainError::conflict("product already exists"))
            }
            ProductCommand::UpdateProduct(cmd) => self.handle_update(cmd),
            ProductCommand::SubmitForReview(cmd) => self.handle_submit_for_review(cmd),
            ProductCommand::ApproveProduct(cmd) => self.handle_approve(cmd),
            ProductCommand::RejectProduct(cmd) => self.handle_reject(cmd),
            ProductCommand::RequestChanges(cmd) => self.handle_request_changes(cmd),
            ProductCommand::DeactivateProduct(cmd) => self.handle_deactivate(cmd),
            ProductCommand::ActivateProduct(cmd) => self.handle_activate(cmd),
            ProductCommand::DeleteProduct(cmd) => {
                Ok(vec![ProductEvent::ProductDeleted(ProductDeleted {
                    product_id: cmd.product_id,
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

impl Product {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        Ok(())
    }

    /// Review decisions need a PENDING product. Approving an approved or
    /// rejecting a rejected product is a conflict.
    fn ensure_pending(
        &self,
        action: &str,
        target: Option<ProductStatus>,
    ) -> Result<(), DomainError> {
        if let Some(target) = target.filter(|t| *t == self.status) {
            return Err(DomainError::conflict(format!("product is already {target}")));
        }
        if !self.status.is_reviewable() {
            return Err(DomainError::invariant(format!(
                "only PENDING products can be {action} (current: {})",
                self.status
            )));
        }
        Ok(())
    }

    fn handle_submit(&self, cmd: &SubmitProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }
        cmd.details.validate()?;

        let status = if cmd.submit_for_review {
            ProductStatus::Pending
        } else {
            ProductStatus::Draft
        };

        Ok(vec![ProductEvent::ProductSubmitted(ProductSubmitted {
            product_id: cmd.product_id,
            vendor_id: cmd.vendor_id,
            details: cmd.details.clone(),
            status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.status.is_editable() {
            return Err(DomainError::invariant(format!(
                "only DRAFT or REJECTED products can be edited (current: {})",
                self.status
            )));
        }
        cmd.details.validate()?;

        Ok(vec![ProductEvent::ProductUpdated(ProductUpdated {
            product_id: cmd.product_id,
            details: cmd.details.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_submit_for_review(
        &self,
        cmd: &SubmitForReview,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        match self.status {
            ProductStatus::Draft => {}
            ProductStatus::Pending => {
                return Err(DomainError::conflict("product is already pending review"));
            }
            other => {
                return Err(DomainError::invariant(format!(
                    "only DRAFT products can be submitted for review (current: {other})"
                )));
            }
        }

        Ok(vec![ProductEvent::ProductSubmittedForReview(
            ProductSubmittedForReview {
                product_id: cmd.product_id,
                occurred_at: cmd.occurred_at,
            },
        )])
    }

    fn handle_approve(&self, cmd: &ApproveProduct) -> Result<Vec<ProductEvent>, DomainError> {
        self.ensure_pending("approved", Some(ProductStatus::Approved))?;

        let note = cmd
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(vec![ProductEvent::ProductApproved(ProductApproved {
            product_id: cmd.product_id,
            note,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reject(&self, cmd: &RejectProduct) -> Result<Vec<ProductEvent>, DomainError> {
        let reason = cmd.reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("rejection reason is required"));
        }
        self.ensure_pending("rejected", Some(ProductStatus::Rejected))?;

        Ok(vec![ProductEvent::ProductRejected(ProductRejected {
            product_id: cmd.product_id,
            reason: reason.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_request_changes(
        &self,
        cmd: &RequestChanges,
    ) -> Result<Vec<ProductEvent>, DomainError> {
        let note = cmd.note.trim();
        if note.is_empty() {
            return Err(DomainError::validation("a note describing the changes is required"));
        }
        self.ensure_pending("sent back for changes", None)?;

        Ok(vec![ProductEvent::ChangesRequested(ChangesRequested {
            product_id: cmd.product_id,
            note: note.to_string(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deactivate(&self, cmd: &DeactivateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        match self.status {
            ProductStatus::Approved | ProductStatus::Active => {}
            ProductStatus::Inactive => {
                return Err(DomainError::conflict("product is already inactive"));
            }
            other => {
                return Err(DomainError::invariant(format!(
                    "only approved products can be deactivated (current: {other})"
                )));
            }
        }

        Ok(vec![ProductEvent::ProductDeactivated(ProductDeactivated {
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_activate(&self, cmd: &ActivateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        match self.status {
            ProductStatus::Inactive => {}
            ProductStatus::Approved | ProductStatus::Active => {
                return Err(DomainError::conflict("product is already active"));
            }
            other => {
                return Err(DomainError::invariant(format!(
                    "only inactive products can be re-activated (current: {other})"
                )));
            }
        }

        Ok(vec![ProductEvent::ProductActivated(ProductActivated {
            product_id: cmd.product_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product_id() -> ProductId {
        ProductId::generate()
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn details() -> ProductDetails {
        ProductDetails {
            name: "Hand-woven basket".to_string(),
            description: "Seagrass basket, 40cm".to_string(),
            price: Money::usd(4_500),
            stock: 12,
            category: "home".to_string(),
            sourcing: Sourcing::InHouse,
            images: vec!["basket-1.jpg".to_string()],
        }
    }

    fn submitted(submit_for_review: bool) -> Product {
        let product_id = test_product_id();
        let mut product = Product::empty(product_id);
        product
            .execute(&ProductCommand::SubmitProduct(SubmitProduct {
                product_id,
                vendor_id: VendorId::new(),
                details: details(),
                submit_for_review,
                occurred_at: test_time(),
            }))
            .unwrap();
        product
    }

    fn approve(product: &Product) -> ProductCommand {
        ProductCommand::ApproveProduct(ApproveProduct {
            product_id: product.id_typed(),
            note: None,
            occurred_at: test_time(),
        })
    }

    fn reject(product: &Product, reason: &str) -> ProductCommand {
        ProductCommand::RejectProduct(RejectProduct {
            product_id: product.id_typed(),
            reason: reason.to_string(),
            occurred_at: test_time(),
        })
    }

    fn request_changes(product: &Product, note: &str) -> ProductCommand {
        ProductCommand::RequestChanges(RequestChanges {
            product_id: product.id_typed(),
            note: note.to_string(),
            occurred_at: test_time(),
        })
    }

    #[test]
    fn submit_creates_draft_or_pending() {
        assert_eq!(submitted(false).status(), ProductStatus::Draft);
        assert_eq!(submitted(true).status(), ProductStatus::Pending);
        assert_eq!(submitted(true).version(), 1);
    }

    #[test]
    fn submit_requires_every_field() {
        let product_id = test_product_id();
        let product = Product::empty(product_id);
        let mut missing_description = details();
        missing_description.description = "  ".to_string();
        let mut free = details();
        free.price = Money::usd(0);

        for bad in [missing_description, free] {
            let err = product
                .handle(&ProductCommand::SubmitProduct(SubmitProduct {
                    product_id,
                    vendor_id: VendorId::new(),
                    details: bad,
                    submit_for_review: true,
                    occurred_at: test_time(),
                }))
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn approve_makes_pending_product_visible() {
        let mut product = submitted(true);
        assert!(!product.is_customer_visible());

        product.execute(&approve(&product)).unwrap();
        assert_eq!(product.status(), ProductStatus::Approved);
        assert!(product.is_customer_visible());
    }

    #[test]
    fn reject_stores_reason() {
        let mut product = submitted(true);
        product.execute(&reject(&product, "Missing certification")).unwrap();

        assert_eq!(product.status(), ProductStatus::Rejected);
        assert_eq!(product.rejection_reason(), Some("Missing certification"));
        assert!(!product.is_customer_visible());
    }

    #[test]
    fn reject_requires_non_blank_reason() {
        let product = submitted(true);
        for reason in ["", "   ", "\t\n"] {
            let err = product.handle(&reject(&product, reason)).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn request_changes_returns_product_to_draft_with_note() {
        let mut product = submitted(true);
        product
            .execute(&request_changes(&product, "Add a size chart"))
            .unwrap();
        assert_eq!(product.status(), ProductStatus::Draft);
        assert_eq!(product.review_note(), Some("Add a size chart"));
    }

    #[test]
    fn review_actions_require_pending_status() {
        let draft = submitted(false);
        let mut approved = submitted(true);
        approved.execute(&approve(&approved)).unwrap();

        let cmds = [
            approve(&draft),
            reject(&draft, "nope"),
            request_changes(&draft, "fix it"),
        ];
        for cmd in cmds {
            let err = draft.handle(&cmd).unwrap_err();
            assert!(
                matches!(err, DomainError::InvariantViolation(_)),
                "expected invariant violation for {cmd:?}"
            );
        }
        for cmd in [reject(&approved, "nope"), request_changes(&approved, "fix it")] {
            let err = approved.handle(&cmd).unwrap_err();
            assert!(matches!(err, DomainError::InvariantViolation(_)));
        }
    }

    #[test]
    fn repeating_a_review_decision_is_a_conflict() {
        let mut approved = submitted(true);
        approved.execute(&approve(&approved)).unwrap();
        assert!(matches!(
            approved.handle(&approve(&approved)).unwrap_err(),
            DomainError::Conflict(_)
        ));

        let mut rejected = submitted(true);
        rejected.execute(&reject(&rejected, "Blurry photos")).unwrap();
        assert!(matches!(
            rejected.handle(&reject(&rejected, "Still blurry")).unwrap_err(),
            DomainError::Conflict(_)
        ));
        assert_eq!(rejected.rejection_reason(), Some("Blurry photos"));
    }

    #[test]
    fn vendor_edit_of_rejected_product_returns_it_to_draft() {
        let mut product = submitted(true);
        product.execute(&reject(&product, "Blurry photos")).unwrap();

        let mut fixed = details();
        fixed.images = vec!["basket-hd.jpg".to_string()];
        product
            .execute(&ProductCommand::UpdateProduct(UpdateProduct {
                product_id: product.id_typed(),
                details: fixed.clone(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(product.status(), ProductStatus::Draft);
        assert_eq!(product.details(), Some(&fixed));

        product
            .execute(&ProductCommand::SubmitForReview(SubmitForReview {
                product_id: product.id_typed(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(product.status(), ProductStatus::Pending);
    }

    #[test]
    fn pending_product_cannot_be_edited() {
        let product = submitted(true);
        let err = product
            .handle(&ProductCommand::UpdateProduct(UpdateProduct {
                product_id: product.id_typed(),
                details: details(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn visibility_toggle_keeps_product_approved() {
        let mut product = submitted(true);
        product.execute(&approve(&product)).unwrap();

        product
            .execute(&ProductCommand::DeactivateProduct(DeactivateProduct {
                product_id: product.id_typed(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(product.status(), ProductStatus::Inactive);
        assert!(!product.is_customer_visible());

        product
            .execute(&ProductCommand::ActivateProduct(ActivateProduct {
                product_id: product.id_typed(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert_eq!(product.status(), ProductStatus::Active);
        assert!(product.is_customer_visible());
    }

    #[test]
    fn deactivating_unapproved_product_is_rejected() {
        let product = submitted(true);
        let err = product
            .handle(&ProductCommand::DeactivateProduct(DeactivateProduct {
                product_id: product.id_typed(),
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn deleted_product_is_gone_for_good() {
        let mut product = submitted(true);
        product
            .execute(&ProductCommand::DeleteProduct(DeleteProduct {
                product_id: product.id_typed(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(product.is_deleted());
        assert!(product.record().is_none());

        let err = product.handle(&approve(&product)).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn command_for_another_product_is_rejected() {
        let product = submitted(true);
        let err = product
            .handle(&ProductCommand::ApproveProduct(ApproveProduct {
                product_id: test_product_id(),
                note: None,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let product = submitted(true);
        let before = product.clone();
        let events1 = product.handle(&approve(&product));
        assert_eq!(product, before);
        assert!(events1.is_ok());
    }

    #[test]
    fn record_serializes_with_wire_casing() {
        let product = submitted(true);
        let json = serde_json::to_value(product.record().unwrap()).unwrap();
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["sourcing"], "IN_HOUSE");
        assert!(json.get("vendorId").is_some());
        assert!(json.get("rejectionReason").is_some());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_status() -> impl Strategy<Value = ProductStatus> {
            prop_oneof![
                Just(ProductStatus::Draft),
                Just(ProductStatus::Pending),
                Just(ProductStatus::Approved),
                Just(ProductStatus::Rejected),
                Just(ProductStatus::Active),
                Just(ProductStatus::Inactive),
            ]
        }

        /// Drive a freshly submitted product into `status` through legal commands.
        fn product_in(status: ProductStatus) -> Product {
            let mut product = submitted(status != ProductStatus::Draft);
            let id = product.id_typed();
            let at = test_time();
            let deactivate = ProductCommand::DeactivateProduct(DeactivateProduct {
                product_id: id,
                occurred_at: at,
            });
            let activate = ProductCommand::ActivateProduct(ActivateProduct {
                product_id: id,
                occurred_at: at,
            });
            let steps: Vec<ProductCommand> = match status {
                ProductStatus::Draft | ProductStatus::Pending => vec![],
                ProductStatus::Approved => vec![approve(&product)],
                ProductStatus::Rejected => vec![reject(&product, "policy")],
                ProductStatus::Inactive => vec![approve(&product), deactivate],
                ProductStatus::Active => vec![approve(&product), deactivate, activate],
            };
            for step in steps {
                product.execute(&step).unwrap();
            }
            assert_eq!(product.status(), status);
            product
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: review actions succeed only from PENDING.
            #[test]
            fn review_actions_only_from_pending(
                status in arb_status(),
                note in "[A-Za-z][A-Za-z ]{0,30}",
            ) {
                let product = product_in(status);
                let outcomes = [
                    product.handle(&approve(&product)),
                    product.handle(&reject(&product, &note)),
                    product.handle(&request_changes(&product, &note)),
                ];
                for outcome in outcomes {
                    prop_assert_eq!(outcome.is_ok(), status == ProductStatus::Pending);
                }
            }

            /// Property: version increments by one per applied event.
            #[test]
            fn version_tracks_applied_events(status in arb_status()) {
                let product = product_in(status);
                let expected = match status {
                    ProductStatus::Draft | ProductStatus::Pending => 1,
                    ProductStatus::Approved | ProductStatus::Rejected => 2,
                    ProductStatus::Inactive => 3,
                    ProductStatus::Active => 4,
                };
                prop_assert_eq!(product.version(), expected);
            }
        }
    }
}
