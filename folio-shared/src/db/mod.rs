//! Database layer: connection pools, role selection, and migrations.

pub mod migrations;
pub mod pool;
pub mod selector;

pub use migrations::run_migrations;
pub use pool::{create_pool, create_pool_with_retry, health_check, DatabaseConfig};
pub use selector::{Role, RolePools, Tier};
