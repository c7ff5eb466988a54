//! *Compiler support: [requires `rustc` 1.65+][msrv]*
//!
//! [B3 Propagation Docs]: https://github.com/openzipkin/b3-propagation
//! [msrv]: #supported-rust-versions
//!
//! # Supported Rust Versions
//!
//! TraceCore is built against the latest stable release. The minimum
//! supported version is 1.65. The current TraceCore version is not
//! guaranteed to build on Rust versions earlier than the minimum supported
//! version.
//!
//! The current stable Rust compiler and the three most recent minor versions
//! before it will always be supported. For example, if the current stable
//! compiler version is 1.65, the minimum supported version will not be
//! increased past 1.62, three minor versions prior. Increasing the minimum
//! supported compiler version is not considered a semver breaking change as
//! long as doing so complies with this policy.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/open-telemetry/tracecore-rust/main/assets/logo.svg"
)]
#![cfg_attr(test, deny(warnings))]

/// The B3 propagator propagates span contexts in [B3 propagation format],
/// supporting both the single `b3` header and the `X-B3-*` multiple-header
/// encoding.
///
/// ## Examples
/// ```
/// # use tracecore::{global, trace::{Tracer, TraceContextExt}, Context};
/// # use tracecore_propagator_b3::propagator::Propagator as B3Propagator;
/// # fn send_request() {
/// // setup B3 propagator
/// global::set_text_map_propagator(B3Propagator::new());
/// // or explicitly choose an encoding
/// // global::set_text_map_propagator(B3Propagator::with_encoding(tracecore_propagator_b3::propagator::B3Encoding::SingleHeader));
///
/// // before sending requests to downstream services.
/// let mut headers = std::collections::HashMap::new(); // replace by http header of the outgoing request
/// let caller_span = global::tracer("caller").start("say hello");
/// let cx = Context::current_with_span(caller_span);
/// global::get_text_map_propagator(|propagator| {
///     propagator.inject_context(&cx, &mut headers); // propagator serialize the tracing context
/// });
/// // Send the request..
/// # }
/// ```
///
/// [B3 propagation format]: https://github.com/openzipkin/b3-propagation
pub mod propagator;

pub use propagator::{B3Encoding, Propagator};
