use std::sync::Arc;

use bazaar_auth::{Permission, Principal, RolePolicy, ensure_vendor_scope};
use bazaar_products::{ProductDetails, ProductId, ProductRecord, ProductStatus, ReviewDecision};

use crate::api::{MarketplaceApi, NewProduct};
use crate::error::{ClientError, ClientResult};
use crate::services::logged;

/// Product review and vendor catalog actions.
pub struct ProductApprovalService {
    api: Arc<dyn MarketplaceApi>,
    principal: Principal,
    policy: RolePolicy,
}

impl ProductApprovalService {
    pub fn new(api: Arc<dyn MarketplaceApi>, principal: Principal) -> Self {
        Self {
            api,
            principal,
            policy: RolePolicy::default(),
        }
    }

    pub async fn approve(
        &self,
        id: ProductId,
        note: Option<String>,
    ) -> ClientResult<ProductRecord> {
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        logged(self.review(id, ReviewDecision::approve(note)).await, "approve product")
    }

    /// A blank reason is refused before anything is sent.
    pub async fn reject(&self, id: ProductId, reason: &str) -> ClientResult<ProductRecord> {
        logged(
            self.review(id, ReviewDecision::reject(reason.trim())).await,
            "reject product",
        )
    }

    /// Send the product back to DRAFT with a note for the vendor.
    pub async fn request_changes(&self, id: ProductId, note: &str) -> ClientResult<ProductRecord> {
        logged(
            self.review(id, ReviewDecision::request_changes(note.trim())).await,
            "request product changes",
        )
    }

    /// Vendor submission (`POST /vendors/products`).
    pub async fn submit(&self, product: NewProduct) -> ClientResult<ProductRecord> {
        let result: ClientResult<ProductRecord> = async {
            product.details.validate()?;
            self.policy
                .authorize(&self.principal, &Permission::PRODUCTS_SUBMIT)?;
            ensure_vendor_scope(&self.principal, product.vendor_id)?;
            self.api.create_product(&product).await
        }
        .await;
        if let Ok(record) = &result {
            tracing::info!(product_id = %record.id, status = %record.status, "product submitted");
        }
        logged(result, "submit product")
    }

    /// Vendor edit of a DRAFT or REJECTED product.
    pub async fn update(
        &self,
        id: ProductId,
        details: ProductDetails,
    ) -> ClientResult<ProductRecord> {
        let result: ClientResult<ProductRecord> = async {
            details.validate()?;
            self.policy
                .authorize(&self.principal, &Permission::PRODUCTS_SUBMIT)?;
            let current = self.api.get_product(id).await?;
            ensure_vendor_scope(&self.principal, current.vendor_id)?;
            if !current.status.is_editable() {
                return Err(ClientError::InvalidTransition(format!(
                    "{} products cannot be edited",
                    current.status
                )));
            }
            self.api.update_product(id, &details).await
        }
        .await;
        logged(result, "update product")
    }

    /// DRAFT → PENDING.
    pub async fn submit_for_review(&self, id: ProductId) -> ClientResult<ProductRecord> {
        let result: ClientResult<ProductRecord> = async {
            self.policy
                .authorize(&self.principal, &Permission::PRODUCTS_SUBMIT)?;
            let current = self.api.get_product(id).await?;
            ensure_vendor_scope(&self.principal, current.vendor_id)?;
            if current.status != ProductStatus::Draft {
                return Err(ClientError::InvalidTransition(format!(
                    "only DRAFT products can be submitted for review (current: {})",
                    current.status
                )));
            }
            self.api.submit_product(id).await
        }
        .await;
        logged(result, "submit product for review")
    }

    pub async fn delete(&self, id: ProductId) -> ClientResult<()> {
        let result: ClientResult<()> = async {
            self.policy
                .authorize(&self.principal, &Permission::PRODUCTS_DELETE)?;
            let current = self.api.get_product(id).await?;
            ensure_vendor_scope(&self.principal, current.vendor_id)?;
            self.api.delete_product(id).await
        }
        .await;
        if result.is_ok() {
            tracing::info!(product_id = %id, "product deleted");
        }
        logged(result, "delete product")
    }

    async fn review(&self, id: ProductId, decision: ReviewDecision) -> ClientResult<ProductRecord> {
        decision.validate()?;
        self.policy
            .authorize(&self.principal, &Permission::PRODUCTS_REVIEW)?;

        let current = self.api.get_product(id).await?;
        if !current.status.is_reviewable() {
            return Err(ClientError::InvalidTransition(format!(
                "only PENDING products can be reviewed (current: {})",
                current.status
            )));
        }

        let record = self.api.review_product(id, &decision).await?;
        tracing::info!(
            product_id = %id,
            from = %current.status,
            to = %record.status,
            "product reviewed"
        );
        Ok(record)
    }
}
