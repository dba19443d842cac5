//! Products domain module: catalog entries and the approval workflow.
//!
//! Vendors submit products; admins review them before they become visible to
//! customers. Everything here is deterministic domain logic (no IO, no HTTP).

pub mod filter;
pub mod product;
pub mod review;

pub use filter::ProductFilter;
pub use product::{
    ActivateProduct, ApproveProduct, DeactivateProduct, DeleteProduct, Product, ProductCommand,
    ProductDetails, ProductEvent, ProductId, ProductRecord, ProductStatus, RejectProduct,
    RequestChanges, Sourcing, SubmitForReview, SubmitProduct, UpdateProduct,
};
pub use review::ReviewDecision;
