//! Scenario sources: text files describing either ELD simulation stages or
//! raw message batches, plus the built-in defaults used when no file is
//! given. Parsers skip and report malformed lines; only an unreadable or
//! empty file is fatal to the invoked action.
pub mod batch;
pub mod eld;
