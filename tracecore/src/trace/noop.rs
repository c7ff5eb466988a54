//! # No-op TraceCore Trace Implementation
//!
//! This implementation is returned as the global tracer if no `Tracer`
//! has been set. It is also useful for testing purposes as it is intended
//! to have minimal resource utilization and runtime impact.
use crate::{
    propagation::{text_map_propagator::FieldIter, Extractor, Injector, TextMapPropagator},
    trace::{
        Link, Span, SpanBuilder, SpanContext, SpanId, SpanKind, Status, TraceContextExt,
        TraceFlags, TraceId, TraceState, Tracer, TracerProvider,
    },
    Context, InstrumentationLibrary, KeyValue,
};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::SystemTime;

/// A no-op instance of a [`TracerProvider`].
#[derive(Debug, Default)]
pub struct NoopTracerProvider {
    _private: (),
}

impl NoopTracerProvider {
    /// Create a new no-op tracer provider
    pub fn new() -> Self {
        NoopTracerProvider { _private: () }
    }
}

impl TracerProvider for NoopTracerProvider {
    type Tracer = NoopTracer;

    fn library_tracer(&self, _library: Arc<InstrumentationLibrary>) -> Self::Tracer {
        NoopTracer::new()
    }
}

/// A no-op instance of a [`Span`].
#[derive(Debug)]
pub struct NoopSpan {
    span_context: SpanContext,
}

impl Default for NoopSpan {
    fn default() -> Self {
        NoopSpan::new()
    }
}

impl NoopSpan {
    /// Creates a new `NoopSpan` instance.
    pub fn new() -> Self {
        NoopSpan {
            span_context: SpanContext::NONE,
        }
    }

    /// Creates a new `NoopSpan` that carries the given span context forward
    /// without recording anything.
    pub fn new_with_context(span_context: SpanContext) -> Self {
        NoopSpan { span_context }
    }
}

impl Span for NoopSpan {
    fn add_event_with_timestamp<T>(
        &mut self,
        _name: T,
        _timestamp: SystemTime,
        _attributes: Vec<KeyValue>,
    ) where
        T: Into<Cow<'static, str>>,
    {
    }

    fn span_context(&self) -> &SpanContext {
        &self.span_context
    }

    fn is_recording(&self) -> bool {
        false
    }

    fn set_attribute(&mut self, _attribute: KeyValue) {}

    fn set_status(&mut self, _status: Status) {}

    fn update_name<T>(&mut self, _new_name: T)
    where
        T: Into<Cow<'static, str>>,
    {
    }

    fn add_link(&mut self, _span_context: SpanContext, _attributes: Vec<KeyValue>) {}

    fn end_with_timestamp(&mut self, _timestamp: SystemTime) {}
}

/// A no-op instance of a [`Tracer`].
#[derive(Debug, Default)]
pub struct NoopTracer {
    _private: (),
}

impl NoopTracer {
    /// Create a new no-op tracer
    pub fn new() -> Self {
        NoopTracer { _private: () }
    }
}

impl Tracer for NoopTracer {
    type Span = NoopSpan;

    /// Builds a `NoopSpan`, propagating the parent's [`SpanContext`] if it is
    /// valid so downstream code that inspects `span_context()` still sees a
    /// consistent trace, while recording nothing.
    fn build_with_context(&self, _builder: SpanBuilder, parent_cx: &Context) -> Self::Span {
        let parent_span_context = if parent_cx.has_active_span() {
            Some(parent_cx.span().span_context().clone())
        } else {
            None
        };

        match parent_span_context {
            Some(span_context) if span_context.is_valid() => {
                NoopSpan::new_with_context(span_context)
            }
            _ => NoopSpan::new(),
        }
    }
}

/// A no-op instance of a [`TextMapPropagator`].
#[derive(Debug, Default)]
pub struct NoopTextMapPropagator {
    _private: (),
}

impl NoopTextMapPropagator {
    /// Create a new no-op text map propagator.
    pub fn new() -> Self {
        NoopTextMapPropagator { _private: () }
    }
}

impl TextMapPropagator for NoopTextMapPropagator {
    fn inject_context(&self, _cx: &Context, _injector: &mut dyn Injector) {}

    fn extract_with_context(&self, cx: &Context, _extractor: &dyn Extractor) -> Context {
        cx.clone()
    }

    fn fields(&self) -> FieldIter<'_> {
        FieldIter::new(&[])
    }
}
