//! Notice Audit: validation engine for operator service notices.

pub mod catalog;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;
