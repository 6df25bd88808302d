//! Message validation pipeline.
//!
//! Every message flows through:
//! 1. `classifier::classify()`: message type, first matching rule wins
//! 2. `ComponentExtractor::extract()`: components A–F plus spelling findings
//! 3. `timing::analyze()`: lateness against the reference time
//! 4. `scoring::classify()` / `scoring::score()`: severity buckets and grades
//! 5. `ReportBuilder::build()`: the immutable report
//!
//! No stage keeps state between calls. The contingency matrix and technical
//! vocabulary are owned by the caller and only ever borrowed.

pub mod classifier;
pub mod consistency;
pub mod extractor;
pub mod processor;
pub mod report;
pub mod scoring;
pub mod spelling;
pub mod timing;
pub mod types;

pub use processor::MessageValidator;
pub use report::{Report, ReportBuilder};
pub use spelling::{DictionarySpellChecker, FormatAuditor, PatternSpellChecker, SpellChecker};
pub use types::Message;
