//! OT-Tracer (Lightstep) propagator for TraceCore.
//!
//! Historically used by the Lightstep Go and Java tracers, this format spreads
//! a `SpanContext` across three independent headers rather than one combined
//! value like the W3C or B3 single-header formats.
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
#![cfg_attr(test, deny(warnings))]

#[cfg(feature = "trace")]
pub mod trace {
    use once_cell::sync::Lazy;
    use tracecore::{
        propagation::{text_map_propagator::FieldIter, Extractor, Injector, TextMapPropagator},
        trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState},
        Context,
    };

    const TRACE_ID_HEADER: &str = "ot-tracer-traceid";
    const SPAN_ID_HEADER: &str = "ot-tracer-spanid";
    const SAMPLED_HEADER: &str = "ot-tracer-sampled";

    const SAMPLED_TRUE: &str = "true";
    const SAMPLED_FALSE: &str = "false";

    static HEADER_FIELDS: Lazy<[String; 3]> = Lazy::new(|| {
        [
            TRACE_ID_HEADER.to_owned(),
            SPAN_ID_HEADER.to_owned(),
            SAMPLED_HEADER.to_owned(),
        ]
    });

    /// Extracts and injects `SpanContext`s into `Extractor`s or `Injector`s using the
    /// OT-Tracer (Lightstep) header format: `ot-tracer-traceid`, `ot-tracer-spanid`
    /// and `ot-tracer-sampled`.
    ///
    /// A short, 16-character trace id is zero-padded on the left, mirroring the
    /// B3 propagator's tolerance for 64-bit trace ids.
    ///
    /// ## Example
    ///
    /// ```
    /// use tracecore::global;
    /// use tracecore_propagator_ot_tracer::trace::OtTracerPropagator;
    ///
    /// global::set_text_map_propagator(OtTracerPropagator::new());
    /// ```
    #[derive(Clone, Debug, Default)]
    pub struct OtTracerPropagator {
        _private: (),
    }

    impl OtTracerPropagator {
        /// Creates a new `OtTracerPropagator`.
        pub fn new() -> Self {
            OtTracerPropagator::default()
        }

        fn extract_span_context(&self, extractor: &dyn Extractor) -> Result<SpanContext, ()> {
            let trace_id = extractor.get(TRACE_ID_HEADER).ok_or(())?;
            let span_id = extractor.get(SPAN_ID_HEADER).ok_or(())?;

            let trace_id = extend_to_128_bits(trace_id);
            let trace_id = TraceId::from_hex(&trace_id).map_err(|_| ())?;
            let span_id = SpanId::from_hex(span_id).map_err(|_| ())?;

            if trace_id == TraceId::INVALID || span_id == SpanId::INVALID {
                return Err(());
            }

            let sampled = match extractor.get(SAMPLED_HEADER) {
                Some(SAMPLED_TRUE) => TraceFlags::SAMPLED,
                _ => TraceFlags::default(),
            };

            Ok(SpanContext::new(
                trace_id,
                span_id,
                sampled,
                true,
                TraceState::default(),
            ))
        }
    }

    /// Left-pads a trace id string shorter than 32 hex characters with zeros,
    /// leaving longer (or already 32-character) values untouched.
    fn extend_to_128_bits(trace_id: &str) -> String {
        if trace_id.len() >= 32 {
            trace_id.to_owned()
        } else {
            format!("{:0>32}", trace_id)
        }
    }

    impl TextMapPropagator for OtTracerPropagator {
        fn inject_context(&self, cx: &Context, injector: &mut dyn Injector) {
            let span_context = cx.span().span_context().clone();
            if span_context.is_valid() {
                injector.set(TRACE_ID_HEADER, span_context.trace_id().to_string());
                injector.set(SPAN_ID_HEADER, span_context.span_id().to_string());
                injector.set(
                    SAMPLED_HEADER,
                    if span_context.is_sampled() {
                        SAMPLED_TRUE.to_string()
                    } else {
                        SAMPLED_FALSE.to_string()
                    },
                );
            }
        }

        fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context {
            let extracted = self
                .extract_span_context(extractor)
                .unwrap_or_else(|_| SpanContext::empty_context());

            cx.with_remote_span_context(extracted)
        }

        fn fields(&self) -> FieldIter<'_> {
            FieldIter::new(HEADER_FIELDS.as_ref())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use tracecore::testing::trace::TestSpan;
        use std::collections::HashMap;

        fn valid_context() -> SpanContext {
            SpanContext::new(
                TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
                SpanId::from_hex("00f067aa0ba902b7").unwrap(),
                TraceFlags::SAMPLED,
                true,
                TraceState::default(),
            )
        }

        #[test]
        fn inject_valid_context() {
            let propagator = OtTracerPropagator::new();
            let mut injector: HashMap<String, String> = HashMap::new();
            propagator.inject_context(
                &Context::current_with_span(TestSpan(valid_context())),
                &mut injector,
            );

            assert_eq!(
                injector.get(TRACE_ID_HEADER).map(String::as_str),
                Some("4bf92f3577b34da6a3ce929d0e0e4736")
            );
            assert_eq!(
                injector.get(SPAN_ID_HEADER).map(String::as_str),
                Some("00f067aa0ba902b7")
            );
            assert_eq!(
                injector.get(SAMPLED_HEADER).map(String::as_str),
                Some(SAMPLED_TRUE)
            );
        }

        #[test]
        fn inject_invalid_context_is_noop() {
            let propagator = OtTracerPropagator::new();
            let mut injector: HashMap<String, String> = HashMap::new();
            propagator.inject_context(
                &Context::current_with_span(TestSpan(SpanContext::empty_context())),
                &mut injector,
            );

            assert!(injector.get(TRACE_ID_HEADER).is_none());
        }

        #[test]
        fn extract_valid_headers() {
            let mut carrier = HashMap::new();
            carrier.insert(
                TRACE_ID_HEADER.to_string(),
                "4bf92f3577b34da6a3ce929d0e0e4736".to_string(),
            );
            carrier.insert(SPAN_ID_HEADER.to_string(), "00f067aa0ba902b7".to_string());
            carrier.insert(SAMPLED_HEADER.to_string(), "true".to_string());

            let propagator = OtTracerPropagator::new();
            let context = propagator.extract(&carrier);
            assert_eq!(context.span().span_context(), &valid_context());
        }

        #[test]
        fn extract_short_trace_id_is_zero_padded() {
            let mut carrier = HashMap::new();
            carrier.insert(
                TRACE_ID_HEADER.to_string(),
                "a3ce929d0e0e4736".to_string(),
            );
            carrier.insert(SPAN_ID_HEADER.to_string(), "00f067aa0ba902b7".to_string());
            carrier.insert(SAMPLED_HEADER.to_string(), "false".to_string());

            let propagator = OtTracerPropagator::new();
            let context = propagator.extract(&carrier);
            assert_eq!(
                context.span().span_context().trace_id(),
                TraceId::from_hex("0000000000000000a3ce929d0e0e4736").unwrap()
            );
            assert!(!context.span().span_context().is_sampled());
        }

        #[test]
        fn extract_missing_header_yields_invalid_context() {
            let carrier: HashMap<String, String> = HashMap::new();
            let propagator = OtTracerPropagator::new();
            let context = propagator.extract(&carrier);
            assert_eq!(
                context.span().span_context(),
                &SpanContext::empty_context()
            );
        }

        #[test]
        fn extract_malformed_trace_id_yields_invalid_context() {
            let mut carrier = HashMap::new();
            carrier.insert(TRACE_ID_HEADER.to_string(), "not-hex".to_string());
            carrier.insert(SPAN_ID_HEADER.to_string(), "00f067aa0ba902b7".to_string());

            let propagator = OtTracerPropagator::new();
            let context = propagator.extract(&carrier);
            assert_eq!(
                context.span().span_context(),
                &SpanContext::empty_context()
            );
        }
    }
}

#[cfg(feature = "trace")]
pub use trace::OtTracerPropagator;
