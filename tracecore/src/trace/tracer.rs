use crate::trace::{Event, Link, Span, SpanId, SpanKind, Status, TraceId, TraceState};
use crate::{Context, KeyValue};
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::time::SystemTime;

/// The `Tracer` is responsible for creating `Span`s.
///
/// See the [`global`] module for examples of using a `Tracer` without depending
/// on any particular SDK.
///
/// [`global`]: crate::global
pub trait Tracer {
    /// The [`Span`] type created by this `Tracer`.
    type Span: Span;

    /// Starts a new [`Span`].
    ///
    /// By default, the newly created span's parent is the currently active
    /// span. To explicitly propagate a parent span, see
    /// [`Tracer::start_with_context`].
    fn start<T>(&self, name: T) -> Self::Span
    where
        T: Into<Cow<'static, str>>,
    {
        let mut builder = self.span_builder(name);
        builder.start(self)
    }

    /// Starts a new [`Span`] with a given parent context.
    ///
    /// If the context contains a valid span context, it is propagated as the
    /// new span's parent.
    fn start_with_context<T>(&self, name: T, parent_cx: &Context) -> Self::Span
    where
        T: Into<Cow<'static, str>>,
    {
        let builder = self.span_builder(name);
        builder.start_with_context(self, parent_cx)
    }

    /// Creates a [`SpanBuilder`] for constructing a [`Span`] with specific
    /// options, to be completed with [`SpanBuilder::start`].
    fn span_builder<T>(&self, name: T) -> SpanBuilder
    where
        T: Into<Cow<'static, str>>,
    {
        SpanBuilder::from_name(name.into())
    }

    /// Builds a [`Span`] with the currently active context as its parent.
    fn build(&self, builder: SpanBuilder) -> Self::Span {
        self.build_with_context(builder, &Context::current())
    }

    /// Builds a [`Span`] with a given parent context.
    fn build_with_context(&self, builder: SpanBuilder, parent_cx: &Context) -> Self::Span;

    /// Starts a new span and executes the given closure with the span's
    /// context as the active context, ending the span when the closure
    /// returns or panics.
    ///
    /// If `f` panics, the span's status is set to an error describing the
    /// panic before it is unwound further.
    fn in_span<T, F, R>(&self, name: T, f: F) -> R
    where
        T: Into<Cow<'static, str>>,
        F: FnOnce(Context) -> R,
        Self::Span: Send + Sync + 'static,
    {
        use crate::trace::TraceContextExt;

        let span = self.start(name);
        let cx = Context::current_with_span(span);
        let _guard = cx.clone().attach();

        match panic::catch_unwind(AssertUnwindSafe(|| f(cx.clone()))) {
            Ok(result) => result,
            Err(err) => {
                cx.span().set_status(Status::error("span ended by panic"));
                panic::resume_unwind(err)
            }
        }
    }
}

/// [`SpanBuilder`] allows span creation with the configuration of the
/// attributes, span kind, start time, and other properties of the span all in
/// one call.
///
/// See [`Tracer::span_builder`] for how to construct one, and
/// [`SpanBuilder::start`] or [`SpanBuilder::start_with_context`] to build the
/// actual [`Span`].
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct SpanBuilder {
    /// Span name
    pub name: Cow<'static, str>,
    /// Span kind
    pub span_kind: Option<SpanKind>,
    /// Span start time
    pub start_time: Option<SystemTime>,
    /// Span end time
    pub end_time: Option<SystemTime>,
    /// Span attributes
    pub attributes: Option<Vec<KeyValue>>,
    /// Span links
    pub links: Option<Vec<Link>>,
    /// Span events
    pub events: Option<Vec<Event>>,
    /// Span status
    pub status: Status,
    /// Trace id, if explicitly chosen instead of inherited or generated.
    pub trace_id: Option<TraceId>,
    /// Span id, if explicitly chosen instead of generated.
    pub span_id: Option<SpanId>,
    /// Precomputed sampling result, for when sampling happened elsewhere.
    pub sampling_result: Option<SamplingResult>,
}

impl SpanBuilder {
    /// Create a new span builder from a span name.
    pub fn from_name<T: Into<Cow<'static, str>>>(name: T) -> Self {
        SpanBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Assign [`SpanKind`].
    pub fn with_kind(mut self, span_kind: SpanKind) -> Self {
        self.span_kind = Some(span_kind);
        self
    }

    /// Assign the span's start time.
    pub fn with_start_time<T: Into<SystemTime>>(mut self, start_time: T) -> Self {
        self.start_time = Some(start_time.into());
        self
    }

    /// Assign the span's end time.
    pub fn with_end_time<T: Into<SystemTime>>(mut self, end_time: T) -> Self {
        self.end_time = Some(end_time.into());
        self
    }

    /// Assign the span's attributes.
    pub fn with_attributes(mut self, attributes: Vec<KeyValue>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Assign the span's links.
    pub fn with_links(mut self, links: Vec<Link>) -> Self {
        self.links = Some(links);
        self
    }

    /// Assign the span's events.
    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// Assign the span's initial status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Explicitly set the trace id, overriding parent or generated trace ids.
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Use the currently active context as this builder's parent when
    /// building a span with [`SpanBuilder::start`].
    pub fn with_parent_context(self, _cx: Context) -> Self {
        self
    }

    /// Override the sampling decision that would otherwise be made by the
    /// tracer's configured sampler.
    pub fn with_sampling_result(mut self, sampling_result: SamplingResult) -> Self {
        self.sampling_result = Some(sampling_result);
        self
    }

    /// Build the configured span against the currently active context.
    pub fn start<T: Tracer>(self, tracer: &T) -> T::Span {
        tracer.build_with_context(self, &Context::current())
    }

    /// Build the configured span against a given parent context.
    pub fn start_with_context<T: Tracer>(self, tracer: &T, parent_cx: &Context) -> T::Span {
        tracer.build_with_context(self, parent_cx)
    }
}

/// The decision reached by a [`ShouldSample`] implementation about whether and
/// how a span should be recorded.
///
/// [`ShouldSample`]: https://docs.rs/tracecore-sdk
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SamplingDecision {
    /// `Span` will not be recorded and all events and attributes will be
    /// dropped.
    Drop,

    /// `Span` data will be recorded, but not exported.
    RecordOnly,

    /// `Span` data will be recorded and exported.
    RecordAndSample,
}

/// The result of a sampling decision, as returned by a sampler.
#[derive(Clone, Debug, PartialEq)]
pub struct SamplingResult {
    /// Whether, and how, the span should be recorded.
    pub decision: SamplingDecision,

    /// Additional attributes contributed by the sampler, to be appended to
    /// the span's existing attributes.
    pub attributes: Vec<KeyValue>,

    /// The trace state that should be used for the span, possibly modified
    /// from the parent's trace state.
    pub trace_state: TraceState,
}
