//! Implements the vendor-neutral tracing API: the types and traits that
//! instrumented code and SDK implementations both compile against.
//!
//! *Compiler support: [requires `rustc` 1.64+][msrv]*
//!
//! [msrv]: #supported-rust-versions
//!
//! # Getting Started
//!
//! ```no_run
//! use tracecore::{global, trace::{TraceContextExt, Tracer}, Context};
//!
//! fn do_something() {
//!     let tracer = global::tracer("my_component");
//!     let _guard = Context::current_with_span(tracer.start("my_span")).attach();
//!     // do work tracked by the now current span
//! }
//! ```
//!
//! # Traces
//!
//! The [`trace`] module includes types for tracking the progression of a
//! single request while it is handled by services that make up an
//! application. A trace is a tree of [`Span`]s which are objects that
//! represent the work being done by individual services or components
//! involved in a request as it flows through a system.
//!
//! ### Creating and exporting spans
//!
//! ```
//! use tracecore::{global, trace::{Span, Tracer}, KeyValue};
//!
//! // get a tracer from a provider
//! let tracer = global::tracer("my_service");
//!
//! // start a new span
//! let mut span = tracer.start("my_span");
//!
//! // set some attributes
//! span.set_attribute(KeyValue::new("http.client_ip", "83.164.160.102"));
//!
//! // perform some more work...
//!
//! // end or drop the span to export
//! span.end();
//! ```
//!
//! See the [`trace`] module docs for more information on creating and
//! managing spans.
//!
//! [`Span`]: crate::trace::Span
//!
//! ## Related Crates
//!
//! - [`tracecore-sdk`] provides the SDK used to configure tracer providers,
//!   samplers, and span processors.
//! - [`tracecore-http`] provides an interface for injecting and extracting
//!   trace information from [`http`] headers.
//! - [`tracecore-propagator-jaeger`], [`tracecore-propagator-b3`],
//!   [`tracecore-propagator-aws-xray`] and [`tracecore-propagator-ot-tracer`]
//!   provide wire-format propagators for interop with other tracing
//!   ecosystems.
//!
//! [`http`]: https://crates.io/crates/http
//! [`tracecore-sdk`]: https://crates.io/crates/tracecore-sdk
//! [`tracecore-http`]: https://crates.io/crates/tracecore-http
//! [`tracecore-propagator-jaeger`]: https://crates.io/crates/tracecore-propagator-jaeger
//! [`tracecore-propagator-b3`]: https://crates.io/crates/tracecore-propagator-b3
//! [`tracecore-propagator-aws-xray`]: https://crates.io/crates/tracecore-propagator-aws-xray
//! [`tracecore-propagator-ot-tracer`]: https://crates.io/crates/tracecore-propagator-ot-tracer
//!
//! ## Supported Rust Versions
//!
//! This crate is built against the latest stable release. The minimum
//! supported version is 1.64. The current version is not guaranteed to
//! build on Rust versions earlier than the minimum supported version.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![allow(clippy::needless_doctest_main)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]
#![cfg_attr(test, deny(warnings))]

pub mod global;

mod context;

pub use context::{Context, ContextGuard};

mod common;

pub use common::{Array, ExportError, InstrumentationLibrary, Key, KeyValue, StringValue, Value};

pub mod propagation;

pub mod trace;

#[cfg(feature = "testing")]
#[doc(hidden)]
pub mod testing;

#[doc(hidden)]
pub mod time {
    use std::time::SystemTime;

    #[doc(hidden)]
    pub fn now() -> SystemTime {
        SystemTime::now()
    }
}
