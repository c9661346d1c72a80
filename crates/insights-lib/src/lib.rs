//! Realty insights library
//!
//! This crate provides the core functionality for:
//! - Predictive analytics over remote prediction, anomaly and
//!   recommendation backends
//! - AI-assisted SEO content optimization
//! - Persistence of optimization records
//! - Health checks and observability

pub mod audit;
pub mod cache;
pub mod client;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod seo;
pub mod storage;

pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{FacadeMetrics, StructuredLogger};
