//! Core library of the inventory reporting API
//!
//! This crate provides:
//! - Query parameter parsing into typed filters
//! - Report models and the paged result envelope
//! - Data access over the document store
//! - Report services and spreadsheet rendering
//! - Health checks and observability

pub mod database;
pub mod error;
pub mod filter;
pub mod health;
pub mod models;
pub mod observability;
pub mod pagination;
pub mod render;
pub mod service;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use database::{Database, MongoDatabase};
pub use error::{ErrorKind, InventoryError, PartialFailure, Result};
pub use filter::{FilterError, QueryParams};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use observability::{ApiMetrics, StructuredLogger};
pub use pagination::{Page, PageRequest, PagingMetadata, SearchResult};
pub use render::{MediaType, RenderError};
pub use service::{InventoryService, ProfilesOutcome};
