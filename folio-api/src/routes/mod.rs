/// API route handlers
///
/// Handlers stay thin: extract, validate, resolve the caller's pool through
/// the role selector, call into `folio_shared::models`, and map the result
/// into the response envelope.

pub mod auth;
pub mod certificates;
pub mod dictionary;
pub mod health;
pub mod practice;
pub mod projects;
pub mod quizzes;
pub mod skills;
