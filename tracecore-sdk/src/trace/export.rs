//! Interfaces for span exporters: the plugin point where finished spans leave the SDK.

use crate::error::OTelSdkResult;
use crate::trace::{SpanEvents, SpanLinks};
use crate::Resource;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tracecore::trace::{SpanContext, SpanId, SpanKind, Status};
use tracecore::{InstrumentationLibrary, KeyValue};
use std::borrow::Cow;
use std::fmt;
use std::time::SystemTime;

/// A finished span, ready to be serialized and exported by a [`SpanExporter`].
///
/// Unlike the mutable [`Span`] that instrumented code interacts with, `SpanData`
/// is an immutable, append-only snapshot taken once a span ends.
///
/// [`Span`]: crate::trace::Span
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct SpanData {
    /// Span context
    pub span_context: SpanContext,
    /// Span parent id
    pub parent_span_id: SpanId,
    /// Span kind
    pub span_kind: SpanKind,
    /// Span name
    pub name: Cow<'static, str>,
    /// Span start time
    pub start_time: SystemTime,
    /// Span end time
    pub end_time: SystemTime,
    /// Span attributes
    pub attributes: Vec<KeyValue>,
    /// The total number of attributes set on this span, including those
    /// later overwritten or dropped for exceeding the configured limit.
    pub total_attribute_count: u32,
    /// The number of attributes that were above the configured limit, and thus dropped
    pub dropped_attributes_count: u32,
    /// Span events
    pub events: SpanEvents,
    /// Span Links
    pub links: SpanLinks,
    /// Span status
    pub status: Status,
    /// The resource of this span's tracer provider
    pub resource: Cow<'static, Resource>,
    /// Instrumentation scope that produced this span
    pub instrumentation_lib: InstrumentationLibrary,
}

/// `SpanExporter` defines the interface that protocol-specific exporters must
/// implement so that they can be plugged into the SDK's span processing
/// pipeline.
///
/// Concrete exporters live outside this crate (an OTLP exporter, a Jaeger
/// collector client, a stdout printer for debugging, ...); this trait is the
/// seam between them and [`SimpleSpanProcessor`]/[`BatchSpanProcessor`].
///
/// [`SimpleSpanProcessor`]: crate::trace::SimpleSpanProcessor
/// [`BatchSpanProcessor`]: crate::trace::BatchSpanProcessor
#[async_trait]
pub trait SpanExporter: fmt::Debug + Send + Sync {
    /// Exports a batch of finished spans.
    ///
    /// This future must not be cancelled once polled; the processor only
    /// moves on once it resolves.
    async fn export(&self, batch: Vec<SpanData>) -> OTelSdkResult;

    /// Flush any pending spans and report back completion.
    ///
    /// The default implementation does nothing, which is appropriate for
    /// exporters that already export synchronously.
    fn force_flush(&mut self) -> BoxFuture<'static, OTelSdkResult> {
        Box::pin(std::future::ready(Ok(())))
    }

    /// Shuts down the exporter. Called once, after all pending exports have
    /// finished. Exporters should release any held resources here.
    fn shutdown(&mut self) -> OTelSdkResult {
        Ok(())
    }

    /// Set the resource for the exporter.
    fn set_resource(&mut self, _resource: &Resource) {}
}
