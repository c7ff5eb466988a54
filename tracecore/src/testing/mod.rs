//! Utilities shared by this crate's own test suites, and by the test suites
//! of crates that depend on it, for exercising the tracing API without
//! pulling in an SDK.

#[cfg(feature = "trace")]
pub mod trace;
