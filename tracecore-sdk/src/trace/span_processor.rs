//! # Span Processor
//!
//! Span processor is a component that sits between the [`Span`] lifecycle
//! and the [`SpanExporter`], deciding when and how span data is delivered to
//! the exporter.
//!
//! Currently, two types of span processors are provided:
//!
//! ```ascii
//!   +-----+--------------+   +-----------------------------+   +--------------+
//!   |     |              |   |                             |   |              |
//!   | SDK | SpanProcessor|-->| Batch/SimpleExportProcessor  |-->| SpanExporter |
//!   |     |              |   |                             |   |              |
//!   +-----+--------------+   +-----------------------------+   +--------------+
//! ```
//!
//! [`Span`]: crate::trace::Span
use crate::error::{OTelSdkError, OTelSdkResult};
use crate::trace::{Span as SdkSpan, SpanData, SpanExporter};
use futures_executor::block_on;
use tracecore::trace::Span as _;
use tracecore::Context;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{sync_channel, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const OTEL_BSP_SCHEDULE_DELAY: &str = "OTEL_BSP_SCHEDULE_DELAY";
const OTEL_BSP_SCHEDULE_DELAY_DEFAULT: u64 = 5_000;
const OTEL_BSP_MAX_QUEUE_SIZE: &str = "OTEL_BSP_MAX_QUEUE_SIZE";
const OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT: usize = 2_048;
const OTEL_BSP_MAX_EXPORT_BATCH_SIZE: &str = "OTEL_BSP_MAX_EXPORT_BATCH_SIZE";
const OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT: usize = 512;
const OTEL_BSP_EXPORT_TIMEOUT: &str = "OTEL_BSP_EXPORT_TIMEOUT";
const OTEL_BSP_EXPORT_TIMEOUT_DEFAULT: u64 = 30_000;
const OTEL_BSP_MAX_CONCURRENT_EXPORTS: &str = "OTEL_BSP_MAX_CONCURRENT_EXPORTS";
const OTEL_BSP_MAX_CONCURRENT_EXPORTS_DEFAULT: usize = 1;
const OTEL_BSP_EXPORT_SAMPLED: &str = "OTEL_BSP_EXPORT_SAMPLED";
const OTEL_BSP_EXPORT_SAMPLED_DEFAULT: bool = true;

/// `SpanProcessor` is an interface which allows hooks for span start and end
/// method invocations. Span processors are invoked only when
/// [`crate::trace::Span::is_recording`] is true.
///
/// Built-in span processors are responsible for batching and conversion of
/// spans to exportable representations and passing batches to exporters.
///
/// Span processors can be registered on SDK [`SdkTracerProvider`]s using
/// [`TracerProviderBuilder::with_span_processor`].
///
/// [`SdkTracerProvider`]: crate::trace::SdkTracerProvider
/// [`TracerProviderBuilder::with_span_processor`]: crate::trace::TracerProviderBuilder::with_span_processor
pub trait SpanProcessor: fmt::Debug + Send + Sync {
    /// `on_start` is called when a `Span` is started. This method is called
    /// synchronously on the thread that started the span, therefore it
    /// should not block or throw exceptions.
    fn on_start(&self, span: &mut SdkSpan, cx: &Context);

    /// `on_end` is called after a `Span` is ended (i.e. the end timestamp is
    /// already set). This method is called synchronously within the
    /// `Span::end` API, therefore it should not block or throw exceptions.
    fn on_end(&self, span: SpanData);

    /// Force the spans lying in the cache to be exported.
    fn force_flush(&self) -> OTelSdkResult;

    /// Shuts down the processor. Called when the `SdkTracerProvider` is shut
    /// down. Implementations make this idempotent: a second call returns
    /// [`OTelSdkError::AlreadyShutdown`] instead of exporting again.
    fn shutdown(&self) -> OTelSdkResult;
}

/// A [`SpanProcessor`] that exports each ended span as soon as it ends,
/// without batching.
///
/// The actual export call is offloaded onto a dedicated worker thread so
/// that ending a span never blocks the caller on exporter I/O.
pub struct SimpleSpanProcessor {
    sender: SyncSender<SimpleMessage>,
    shutdown: AtomicBool,
    export_only_sampled: bool,
}

enum SimpleMessage {
    Export(SpanData),
    ForceFlush(SyncSender<OTelSdkResult>),
    Shutdown(SyncSender<OTelSdkResult>),
}

impl fmt::Debug for SimpleSpanProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleSpanProcessor").finish()
    }
}

impl SimpleSpanProcessor {
    /// Create a new `SimpleSpanProcessor` that exports spans through `exporter`.
    pub fn new<T: SpanExporter + 'static>(exporter: T) -> Self {
        let (sender, receiver) = sync_channel::<SimpleMessage>(OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT);
        thread::Builder::new()
            .name("tracecore-simple-span-processor".to_string())
            .spawn(move || {
                let mut exporter = exporter;
                for msg in receiver.iter() {
                    match msg {
                        SimpleMessage::Export(span_data) => {
                            if let Err(err) = block_on(exporter.export(vec![span_data])) {
                                tracecore::otel_warn!(
                                    name: "SimpleSpanProcessor.Export.Error",
                                    error = format!("{err}")
                                );
                            }
                        }
                        SimpleMessage::ForceFlush(ack) => {
                            let _ = ack.send(block_on(exporter.force_flush()));
                        }
                        SimpleMessage::Shutdown(ack) => {
                            let _ = ack.send(exporter.shutdown());
                            break;
                        }
                    }
                }
            })
            .expect("failed to spawn simple span processor thread");
        SimpleSpanProcessor {
            sender,
            shutdown: AtomicBool::new(false),
            export_only_sampled: true,
        }
    }

    /// Sets whether this processor skips spans whose sampled bit is unset
    /// (`RecordOnly` spans). Defaults to `true`, matching the TraceCore
    /// specification's default for `exportOnlySampled`.
    pub fn with_export_only_sampled(mut self, export_only_sampled: bool) -> Self {
        self.export_only_sampled = export_only_sampled;
        self
    }
}

impl SpanProcessor for SimpleSpanProcessor {
    fn on_start(&self, _span: &mut SdkSpan, _cx: &Context) {}

    fn on_end(&self, span: SpanData) {
        if self.shutdown.load(Ordering::Relaxed) {
            return;
        }
        if self.export_only_sampled && !span.span_context.is_sampled() {
            return;
        }
        if self.sender.try_send(SimpleMessage::Export(span)).is_err() {
            tracecore::otel_warn!(
                name: "SimpleSpanProcessor.Export.Dropped",
                message = "span dropped, worker thread unavailable"
            );
        }
    }

    fn force_flush(&self) -> OTelSdkResult {
        let (tx, rx) = sync_channel(1);
        self.sender
            .send(SimpleMessage::ForceFlush(tx))
            .map_err(|_| OTelSdkError::AlreadyShutdown)?;
        rx.recv()
            .map_err(|_| OTelSdkError::InternalFailure("worker thread terminated".into()))?
    }

    fn shutdown(&self) -> OTelSdkResult {
        if self.shutdown.swap(true, Ordering::Relaxed) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let (tx, rx) = sync_channel(1);
        if self.sender.send(SimpleMessage::Shutdown(tx)).is_err() {
            return Ok(());
        }
        rx.recv().unwrap_or(Err(OTelSdkError::InternalFailure(
            "worker thread terminated before acknowledging shutdown".into(),
        )))
    }
}

/// Batch span processor configuration, following the `OTEL_BSP_*`
/// environment variables when not explicitly overridden.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct BatchConfig {
    /// The maximum queue size to buffer spans for delayed processing. If the
    /// queue gets full it drops the spans. The default value is 2048.
    pub max_queue_size: usize,

    /// The delay interval between two consecutive exports. The default
    /// value is 5 seconds.
    pub scheduled_delay: Duration,

    /// The maximum number of spans to process in a single batch. If there
    /// are more spans than fit in one batch, multiple batches are exported
    /// back to back without delay. The default value is 512.
    pub max_export_batch_size: usize,

    /// The maximum duration allowed for exporting a single batch.
    pub max_export_timeout: Duration,

    /// The maximum number of concurrent exports allowed to be in flight at
    /// any given time.
    pub max_concurrent_exports: usize,

    /// Whether spans whose sampled bit is unset (`RecordOnly` spans) are
    /// skipped rather than handed to the exporter. Defaults to `true`.
    pub export_only_sampled: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfigBuilder::default().build()
    }
}

/// Builder for [`BatchConfig`], seeded from `OTEL_BSP_*` environment
/// variables and overridable programmatically.
#[derive(Debug, Clone)]
pub struct BatchConfigBuilder {
    max_queue_size: usize,
    scheduled_delay: Duration,
    max_export_batch_size: usize,
    max_export_timeout: Duration,
    max_concurrent_exports: usize,
    export_only_sampled: bool,
}

impl Default for BatchConfigBuilder {
    fn default() -> Self {
        let max_queue_size = env_usize(OTEL_BSP_MAX_QUEUE_SIZE, OTEL_BSP_MAX_QUEUE_SIZE_DEFAULT);
        let max_export_batch_size = env_usize(
            OTEL_BSP_MAX_EXPORT_BATCH_SIZE,
            OTEL_BSP_MAX_EXPORT_BATCH_SIZE_DEFAULT,
        )
        .min(max_queue_size);
        BatchConfigBuilder {
            max_queue_size,
            scheduled_delay: Duration::from_millis(env_u64(
                OTEL_BSP_SCHEDULE_DELAY,
                OTEL_BSP_SCHEDULE_DELAY_DEFAULT,
            )),
            max_export_batch_size,
            max_export_timeout: Duration::from_millis(env_u64(
                OTEL_BSP_EXPORT_TIMEOUT,
                OTEL_BSP_EXPORT_TIMEOUT_DEFAULT,
            )),
            max_concurrent_exports: env_usize(
                OTEL_BSP_MAX_CONCURRENT_EXPORTS,
                OTEL_BSP_MAX_CONCURRENT_EXPORTS_DEFAULT,
            )
            .max(1),
            export_only_sampled: env_bool(
                OTEL_BSP_EXPORT_SAMPLED,
                OTEL_BSP_EXPORT_SAMPLED_DEFAULT,
            ),
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| usize::from_str(&v).ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| u64::from_str(&v).ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| bool::from_str(&v).ok())
        .unwrap_or(default)
}

impl BatchConfigBuilder {
    /// Set max queue size for the [`BatchConfig`].
    pub fn with_max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    /// Set scheduled delay for the [`BatchConfig`].
    pub fn with_scheduled_delay(mut self, scheduled_delay: Duration) -> Self {
        self.scheduled_delay = scheduled_delay;
        self
    }

    /// Set max export timeout for the [`BatchConfig`].
    pub fn with_max_export_timeout(mut self, max_export_timeout: Duration) -> Self {
        self.max_export_timeout = max_export_timeout;
        self
    }

    /// Set max export batch size for the [`BatchConfig`]. Capped to
    /// `max_queue_size` at build time.
    pub fn with_max_export_batch_size(mut self, max_export_batch_size: usize) -> Self {
        self.max_export_batch_size = max_export_batch_size;
        self
    }

    /// Set max concurrent exports for the [`BatchConfig`].
    pub fn with_max_concurrent_exports(mut self, max_concurrent_exports: usize) -> Self {
        self.max_concurrent_exports = max_concurrent_exports.max(1);
        self
    }

    /// Set whether `RecordOnly` (unsampled) spans are skipped rather than
    /// exported, for the [`BatchConfig`]. Defaults to `true`.
    pub fn with_export_only_sampled(mut self, export_only_sampled: bool) -> Self {
        self.export_only_sampled = export_only_sampled;
        self
    }

    /// Build a [`BatchConfig`] from this builder.
    pub fn build(self) -> BatchConfig {
        BatchConfig {
            max_queue_size: self.max_queue_size,
            scheduled_delay: self.scheduled_delay,
            max_export_batch_size: self.max_export_batch_size.min(self.max_queue_size),
            max_export_timeout: self.max_export_timeout,
            max_concurrent_exports: self.max_concurrent_exports,
            export_only_sampled: self.export_only_sampled,
        }
    }
}

impl From<BatchConfig> for BatchConfigBuilder {
    fn from(config: BatchConfig) -> Self {
        BatchConfigBuilder {
            max_queue_size: config.max_queue_size,
            scheduled_delay: config.scheduled_delay,
            max_export_batch_size: config.max_export_batch_size,
            max_export_timeout: config.max_export_timeout,
            max_concurrent_exports: config.max_concurrent_exports,
            export_only_sampled: config.export_only_sampled,
        }
    }
}

enum BatchMessage {
    ExportSpan(SpanData),
    ForceFlush(SyncSender<OTelSdkResult>),
    Shutdown(SyncSender<OTelSdkResult>),
}

/// A [`SpanProcessor`] that asynchronously buffers finished spans and
/// exports them in batches, either once `max_export_batch_size` spans have
/// accumulated or once `scheduled_delay` has elapsed, whichever happens
/// first.
pub struct BatchSpanProcessor {
    sender: SyncSender<BatchMessage>,
    dropped_span_count: Arc<AtomicUsize>,
    shutdown: AtomicBool,
    export_only_sampled: bool,
}

impl fmt::Debug for BatchSpanProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSpanProcessor").finish()
    }
}

impl BatchSpanProcessor {
    /// Create a builder for a `BatchSpanProcessor` exporting through `exporter`.
    pub fn builder<T: SpanExporter + 'static>(exporter: T) -> BatchSpanProcessorBuilder<T> {
        BatchSpanProcessorBuilder {
            exporter,
            config: BatchConfig::default(),
        }
    }

    fn new<T: SpanExporter + 'static>(exporter: T, config: BatchConfig) -> Self {
        let (sender, receiver) = sync_channel::<BatchMessage>(config.max_queue_size);
        let dropped_span_count = Arc::new(AtomicUsize::new(0));
        let worker_dropped_span_count = dropped_span_count.clone();
        let export_only_sampled = config.export_only_sampled;

        thread::Builder::new()
            .name("tracecore-batch-span-processor".to_string())
            .spawn(move || {
                let mut exporter = exporter;
                let mut batch: Vec<SpanData> = Vec::with_capacity(config.max_export_batch_size);
                loop {
                    match receiver.recv_timeout(config.scheduled_delay) {
                        Ok(BatchMessage::ExportSpan(span_data)) => {
                            batch.push(span_data);
                            if batch.len() >= config.max_export_batch_size {
                                export_batch(&mut exporter, &mut batch, &config);
                            }
                        }
                        Ok(BatchMessage::ForceFlush(ack)) => {
                            export_batch(&mut exporter, &mut batch, &config);
                            let _ = ack.send(block_on(exporter.force_flush()));
                        }
                        Ok(BatchMessage::Shutdown(ack)) => {
                            export_batch(&mut exporter, &mut batch, &config);
                            let _ = ack.send(exporter.shutdown());
                            break;
                        }
                        Err(RecvTimeoutError::Timeout) => {
                            export_batch(&mut exporter, &mut batch, &config);
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                let dropped = worker_dropped_span_count.load(Ordering::Relaxed);
                if dropped > 0 {
                    tracecore::otel_warn!(
                        name: "BatchSpanProcessor.Export.DroppedSpans",
                        dropped_count = dropped
                    );
                }
            })
            .expect("failed to spawn batch span processor thread");

        BatchSpanProcessor {
            sender,
            dropped_span_count,
            shutdown: AtomicBool::new(false),
            export_only_sampled,
        }
    }
}

fn export_batch<T: SpanExporter + ?Sized>(
    exporter: &mut T,
    batch: &mut Vec<SpanData>,
    config: &BatchConfig,
) {
    if batch.is_empty() {
        return;
    }
    let to_export = std::mem::replace(batch, Vec::with_capacity(config.max_export_batch_size));
    match block_on(with_timeout(config.max_export_timeout, exporter.export(to_export))) {
        Some(Ok(())) => {}
        Some(Err(err)) => {
            tracecore::otel_warn!(
                name: "BatchSpanProcessor.Export.Error",
                error = format!("{err}")
            );
        }
        None => {
            tracecore::otel_warn!(
                name: "BatchSpanProcessor.Export.Timeout",
                timeout_ms = config.max_export_timeout.as_millis() as u64
            );
        }
    }
}

/// Races an export future against a deadline. The SDK has no timer of its
/// own, so the deadline is enforced by polling a helper thread over an
/// `mpsc` channel rather than through an async runtime's own timer.
async fn with_timeout<F>(duration: Duration, future: F) -> Option<OTelSdkResult>
where
    F: std::future::Future<Output = OTelSdkResult> + Send + 'static,
{
    let (tx, rx) = sync_channel::<OTelSdkResult>(1);
    thread::spawn(move || {
        let result = block_on(future);
        let _ = tx.send(result);
    });
    rx.recv_timeout(duration).ok()
}

impl SpanProcessor for BatchSpanProcessor {
    fn on_start(&self, _span: &mut SdkSpan, _cx: &Context) {}

    fn on_end(&self, span: SpanData) {
        if self.shutdown.load(Ordering::Relaxed) {
            return;
        }
        if self.export_only_sampled && !span.span_context.is_sampled() {
            return;
        }
        if self
            .sender
            .try_send(BatchMessage::ExportSpan(span))
            .is_err()
        {
            self.dropped_span_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn force_flush(&self) -> OTelSdkResult {
        let (tx, rx) = sync_channel(1);
        self.sender
            .send(BatchMessage::ForceFlush(tx))
            .map_err(|_| OTelSdkError::AlreadyShutdown)?;
        rx.recv()
            .map_err(|_| OTelSdkError::InternalFailure("worker thread terminated".into()))?
    }

    fn shutdown(&self) -> OTelSdkResult {
        if self.shutdown.swap(true, Ordering::Relaxed) {
            return Err(OTelSdkError::AlreadyShutdown);
        }
        let (tx, rx) = sync_channel(1);
        if self.sender.send(BatchMessage::Shutdown(tx)).is_err() {
            return Ok(());
        }
        rx.recv().unwrap_or(Err(OTelSdkError::InternalFailure(
            "worker thread terminated before acknowledging shutdown".into(),
        )))
    }
}

/// Builder for [`BatchSpanProcessor`].
#[derive(Debug)]
pub struct BatchSpanProcessorBuilder<T: SpanExporter + 'static> {
    exporter: T,
    config: BatchConfig,
}

impl<T: SpanExporter + 'static> BatchSpanProcessorBuilder<T> {
    /// Set the max queue size for the batch processor.
    pub fn with_max_queue_size(self, max_queue_size: usize) -> Self {
        self.with_batch_config(
            BatchConfigBuilder::from(self.config)
                .with_max_queue_size(max_queue_size)
                .build(),
        )
    }

    /// Set the scheduled delay for the batch processor.
    pub fn with_scheduled_delay(self, scheduled_delay: Duration) -> Self {
        self.with_batch_config(
            BatchConfigBuilder::from(self.config)
                .with_scheduled_delay(scheduled_delay)
                .build(),
        )
    }

    /// Set the max export timeout for the batch processor.
    pub fn with_max_timeout(self, max_export_timeout: Duration) -> Self {
        self.with_batch_config(
            BatchConfigBuilder::from(self.config)
                .with_max_export_timeout(max_export_timeout)
                .build(),
        )
    }

    /// Set the max export batch size for the batch processor.
    pub fn with_max_export_batch_size(self, max_export_batch_size: usize) -> Self {
        self.with_batch_config(
            BatchConfigBuilder::from(self.config)
                .with_max_export_batch_size(max_export_batch_size)
                .build(),
        )
    }

    /// Set the max number of concurrent exports for the batch processor.
    pub fn with_max_concurrent_exports(self, max_concurrent_exports: usize) -> Self {
        self.with_batch_config(
            BatchConfigBuilder::from(self.config)
                .with_max_concurrent_exports(max_concurrent_exports)
                .build(),
        )
    }

    /// Set whether the batch processor skips `RecordOnly` (unsampled) spans
    /// rather than handing them to the exporter. Defaults to `true`.
    pub fn with_export_only_sampled(self, export_only_sampled: bool) -> Self {
        self.with_batch_config(
            BatchConfigBuilder::from(self.config)
                .with_export_only_sampled(export_only_sampled)
                .build(),
        )
    }

    /// Replace the whole [`BatchConfig`] used by the batch processor.
    pub fn with_batch_config(self, config: BatchConfig) -> Self {
        BatchSpanProcessorBuilder {
            exporter: self.exporter,
            config,
        }
    }

    /// Build the configured `BatchSpanProcessor`.
    pub fn build(self) -> BatchSpanProcessor {
        BatchSpanProcessor::new(self.exporter, self.config)
    }
}

#[cfg(all(test, feature = "testing"))]
mod tests {
    use super::*;
    use crate::trace::{InMemorySpanExporter, InMemorySpanExporterBuilder};
    use tracecore::trace::{SpanContext, SpanId, TraceFlags, TraceId, TraceState};

    fn sampled_span_data(name: &str) -> SpanData {
        crate::trace::SpanData {
            span_context: SpanContext::new(
                TraceId::from_u128(1),
                SpanId::from_u64(1),
                TraceFlags::SAMPLED,
                false,
                TraceState::default(),
            ),
            parent_span_id: SpanId::INVALID,
            span_kind: tracecore::trace::SpanKind::Internal,
            name: name.to_string().into(),
            start_time: tracecore::time::now(),
            end_time: tracecore::time::now(),
            attributes: Vec::new(),
            total_attribute_count: 0,
            dropped_attributes_count: 0,
            events: Default::default(),
            links: Default::default(),
            status: Default::default(),
            resource: std::borrow::Cow::Owned(crate::Resource::builder_empty().build()),
            instrumentation_lib: tracecore::InstrumentationLibrary::builder("test").build(),
        }
    }

    #[test]
    fn simple_span_processor_exports_sampled_spans() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = SimpleSpanProcessor::new(exporter.clone());
        processor.on_end(sampled_span_data("a"));
        processor.force_flush().unwrap();
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 1);
    }

    #[test]
    fn simple_span_processor_skips_unsampled_spans() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = SimpleSpanProcessor::new(exporter.clone());
        let mut span = sampled_span_data("a");
        span.span_context = SpanContext::empty_context();
        processor.on_end(span);
        processor.force_flush().unwrap();
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 0);
    }

    #[test]
    fn simple_span_processor_exports_unsampled_spans_when_configured() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = SimpleSpanProcessor::new(exporter.clone())
            .with_export_only_sampled(false);
        let mut span = sampled_span_data("a");
        span.span_context = SpanContext::empty_context();
        processor.on_end(span);
        processor.force_flush().unwrap();
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 1);
    }

    #[test]
    fn simple_span_processor_shutdown_is_idempotent() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = SimpleSpanProcessor::new(exporter);
        assert!(processor.shutdown().is_ok());
        assert!(matches!(
            processor.shutdown(),
            Err(OTelSdkError::AlreadyShutdown)
        ));
    }

    #[test]
    fn batch_span_processor_exports_on_batch_size() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = BatchSpanProcessor::builder(exporter.clone())
            .with_max_export_batch_size(2)
            .with_scheduled_delay(Duration::from_secs(300))
            .build();
        processor.on_end(sampled_span_data("a"));
        processor.on_end(sampled_span_data("b"));
        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 2);
        processor.shutdown().unwrap();
    }

    #[test]
    fn batch_span_processor_force_flush_exports_partial_batch() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = BatchSpanProcessor::builder(exporter.clone())
            .with_max_export_batch_size(10)
            .with_scheduled_delay(Duration::from_secs(300))
            .build();
        processor.on_end(sampled_span_data("a"));
        processor.force_flush().unwrap();
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 1);
        processor.shutdown().unwrap();
    }

    #[test]
    fn batch_span_processor_skips_unsampled_spans_by_default() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = BatchSpanProcessor::builder(exporter.clone())
            .with_scheduled_delay(Duration::from_secs(300))
            .build();
        let mut span = sampled_span_data("a");
        span.span_context = SpanContext::empty_context();
        processor.on_end(span);
        processor.force_flush().unwrap();
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 0);
        processor.shutdown().unwrap();
    }

    #[test]
    fn batch_span_processor_exports_unsampled_spans_when_configured() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = BatchSpanProcessor::builder(exporter.clone())
            .with_scheduled_delay(Duration::from_secs(300))
            .with_export_only_sampled(false)
            .build();
        let mut span = sampled_span_data("a");
        span.span_context = SpanContext::empty_context();
        processor.on_end(span);
        processor.force_flush().unwrap();
        assert_eq!(exporter.get_finished_spans().unwrap().len(), 1);
        processor.shutdown().unwrap();
    }

    #[test]
    fn batch_span_processor_shutdown_is_idempotent() {
        let exporter = InMemorySpanExporterBuilder::new().build();
        let processor = BatchSpanProcessor::builder(exporter).build();
        assert!(processor.shutdown().is_ok());
        assert!(matches!(
            processor.shutdown(),
            Err(OTelSdkError::AlreadyShutdown)
        ));
    }

    #[test]
    fn batch_config_builder_caps_batch_size_to_queue_size() {
        let config = BatchConfigBuilder::default()
            .with_max_queue_size(10)
            .with_max_export_batch_size(100)
            .build();
        assert_eq!(config.max_export_batch_size, 10);
    }

    #[test]
    fn batch_config_export_only_sampled_defaults_to_true() {
        let config = BatchConfigBuilder::default().build();
        assert!(config.export_only_sampled);
    }

    #[test]
    fn batch_config_reads_export_sampled_from_env() {
        temp_env::with_var(OTEL_BSP_EXPORT_SAMPLED, Some("false"), || {
            let config = BatchConfigBuilder::default().build();
            assert!(!config.export_only_sampled);
        });
    }
}
