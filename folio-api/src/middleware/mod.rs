/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Session authentication (cookie or bearer token)
/// - Basic-auth gating of the login endpoints
/// - Global rate limiting
/// - Request-id generation

pub mod auth;
pub mod rate_limit;
pub mod request_id;
