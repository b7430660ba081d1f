//! # Folio Shared Library
//!
//! This crate contains the shared types and business logic used by the
//! folio API server: role-scoped database pools, the session authority,
//! domain models, pagination, and media storage helpers.
//!
//! ## Module Organization
//!
//! - `db`: Connection pools, role-to-pool selection, migrations
//! - `auth`: Password hashing, JWT claims, session authority
//! - `models`: Database models and queries
//! - `pagination`: Page/limit query handling and paged responses
//! - `storage`: Uploaded media naming, saving, and removal

pub mod auth;
pub mod db;
pub mod models;
pub mod pagination;
pub mod storage;

/// Current version of the folio shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
