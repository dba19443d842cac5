//! `bazaar-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, aggregate traits, money, and the
//! pagination/filter primitives used by every dashboard listing.

pub mod aggregate;
pub mod error;
pub mod id;
pub mod query;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, CustomerId, UserId, VendorId};
pub use query::{Filter, Page, PageRequest, matches_search, page_count};
pub use value_object::{Money, ValueObject};
