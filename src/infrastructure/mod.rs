//! Infrastructure layer - External service implementations

pub mod context_cache;
pub mod logging;
pub mod observability;
pub mod services;
pub mod vertex;
