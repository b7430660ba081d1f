//! Database models and queries.
//!
//! Each model owns its SQL: static methods take a pool (or transaction)
//! resolved by the caller through the role selector, so no query here picks
//! its own privilege tier.

pub mod about;
pub mod certificate;
pub mod denied_token;
pub mod dictionary;
pub mod owner;
pub mod practice;
pub mod project;
pub mod quiz;
pub mod skill;
pub mod visitor;

pub use about::About;
pub use certificate::Certificate;
pub use denied_token::DeniedToken;
pub use dictionary::DictionaryEntry;
pub use owner::Owner;
pub use practice::{PracticeAttempt, PracticeQuestion, PracticeSet};
pub use project::{Project, ProjectImage};
pub use quiz::{QuizAttempt, QuizError, QuizModule, QuizOption, QuizQuestion};
pub use skill::Skill;
pub use visitor::Visitor;
