//! Read-only reference tables shared across validations.
//!
//! Built once by the caller, then passed by reference into every call.

pub mod contingency;
pub mod status;
pub mod vocabulary;

pub use contingency::{ContingencyMatrix, ContingencyRecord};
pub use status::StatusKind;
pub use vocabulary::TechnicalVocabulary;
