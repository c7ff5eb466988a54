//! # Trace Provider SDK
//!
//! ## Tracer Creation
//!
//! New [`SdkTracer`] instances are always created through a
//! [`SdkTracerProvider`].
//!
//! All configuration objects and extension points (span processors, sampler,
//! span limits, resource) live on the [`SdkTracerProvider`]. [`SdkTracer`]
//! instances hold only a weak reference back to it, so different tracers
//! obtained from the same provider always observe the same configuration.
use crate::error::OTelSdkResult;
use crate::trace::{
    BatchSpanProcessor, Config, SdkTracer, SimpleSpanProcessor, SpanExporter, SpanProcessor,
};
use crate::{InstrumentationLibrary, Resource};
use once_cell::sync::OnceCell;
use tracecore::global;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, RwLock};

static PROVIDER_RESOURCE: OnceCell<Resource> = OnceCell::new();

/// `TracerProvider` inner type
pub(crate) struct TracerProviderInner {
    processors: Vec<Box<dyn SpanProcessor>>,
    /// The active [`Config`], held behind a lock so
    /// [`SdkTracerProvider::update_active_trace_config`] can publish a new
    /// value without invalidating limits already resolved by in-flight spans:
    /// a span reads the `Arc<Config>` once at start and keeps using that
    /// snapshot for its whole lifetime.
    config: RwLock<Arc<Config>>,
}

impl fmt::Debug for TracerProviderInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracerProviderInner")
            .field("processors", &self.processors)
            .field("config", &self.config.read().expect("RwLock poisoned"))
            .finish()
    }
}

impl Drop for TracerProviderInner {
    fn drop(&mut self) {
        for processor in &self.processors {
            if let Err(err) = processor.shutdown() {
                global::handle_error(err);
            }
        }
    }
}

/// Creator and registry of named [`SdkTracer`] instances.
#[derive(Clone, Debug)]
pub struct SdkTracerProvider {
    inner: Arc<TracerProviderInner>,
}

impl Default for SdkTracerProvider {
    fn default() -> Self {
        SdkTracerProvider::builder().build()
    }
}

impl SdkTracerProvider {
    pub(crate) fn new(inner: Arc<TracerProviderInner>) -> Self {
        SdkTracerProvider { inner }
    }

    /// Create a new [`SdkTracerProvider`] builder.
    pub fn builder() -> TracerProviderBuilder {
        TracerProviderBuilder::default()
    }

    /// Span processors associated with this provider.
    pub fn span_processors(&self) -> &[Box<dyn SpanProcessor>] {
        &self.inner.processors
    }

    /// Returns the currently active [`Config`].
    ///
    /// This is a cheap, reference-counted snapshot: readers observe one
    /// coherent `Config` per call, even while
    /// [`update_active_trace_config`](Self::update_active_trace_config) is
    /// concurrently publishing a new one.
    pub fn config(&self) -> Arc<Config> {
        self.inner.config.read().expect("RwLock poisoned").clone()
    }

    /// Atomically replaces the active [`Config`] with `config`.
    ///
    /// Spans that already resolved their limits at `start_span()` time keep
    /// using those limits; only spans started after this call observe the
    /// new config.
    pub fn update_active_trace_config(&self, config: Config) {
        *self.inner.config.write().expect("RwLock poisoned") = Arc::new(config);
    }

    /// Returns a new tracer with the given owned instrumentation scope.
    ///
    /// Prefer [`tracecore::trace::TracerProvider::tracer`] or
    /// [`tracecore::trace::TracerProvider::tracer_builder`] unless the
    /// instrumentation scope was already built elsewhere.
    pub fn tracer_with_scope(&self, library: InstrumentationLibrary) -> SdkTracer {
        SdkTracer::new(library, Arc::downgrade(&self.inner))
    }

    /// Force flush all remaining spans in span processors and return the
    /// first error encountered, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use tracecore::global;
    /// use tracecore_sdk::trace::SdkTracerProvider;
    ///
    /// fn init_tracing() -> SdkTracerProvider {
    ///     let provider = SdkTracerProvider::default();
    ///     let _ = global::set_tracer_provider(provider.clone());
    ///     provider
    /// }
    ///
    /// fn main() {
    ///     let provider = init_tracing();
    ///
    ///     // create spans..
    ///
    ///     if let Err(err) = provider.force_flush() {
    ///         // .. handle flush error
    ///         let _ = err;
    ///     }
    ///
    ///     // dropping the provider shuts down all span processors, exporting
    ///     // any remaining spans.
    ///     drop(provider);
    /// }
    /// ```
    pub fn force_flush(&self) -> OTelSdkResult {
        for processor in self.span_processors() {
            processor.force_flush()?;
        }
        Ok(())
    }

    /// Shut down all span processors associated with this provider.
    pub fn shutdown(&self) -> OTelSdkResult {
        for processor in self.span_processors() {
            processor.shutdown()?;
        }
        Ok(())
    }
}

impl tracecore::trace::TracerProvider for SdkTracerProvider {
    type Tracer = SdkTracer;

    fn library_tracer(&self, library: Arc<InstrumentationLibrary>) -> Self::Tracer {
        SdkTracer::new((*library).clone(), Arc::downgrade(&self.inner))
    }
}

/// Builder for provider attributes.
#[derive(Debug, Default)]
pub struct TracerProviderBuilder {
    processors: Vec<Box<dyn SpanProcessor>>,
    config: Config,
}

impl TracerProviderBuilder {
    /// Adds a [`SimpleSpanProcessor`] exporting through `exporter`.
    pub fn with_simple_exporter<T: SpanExporter + 'static>(mut self, exporter: T) -> Self {
        self.processors
            .push(Box::new(SimpleSpanProcessor::new(exporter)));
        self
    }

    /// Adds a [`BatchSpanProcessor`], configured with defaults, exporting
    /// through `exporter`.
    pub fn with_batch_exporter<T: SpanExporter + 'static>(self, exporter: T) -> Self {
        let batch = BatchSpanProcessor::builder(exporter).build();
        self.with_span_processor(batch)
    }

    /// Adds an arbitrary [`SpanProcessor`] to this provider.
    pub fn with_span_processor<T: SpanProcessor + 'static>(mut self, processor: T) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Sets the [`Config`] that this provider will use.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the sampler that this provider will use.
    pub fn with_sampler<T: crate::trace::ShouldSample + 'static>(mut self, sampler: T) -> Self {
        self.config.sampler = Box::new(sampler);
        self
    }

    /// Sets the id generator that this provider will use.
    pub fn with_id_generator<T: crate::trace::IdGenerator + 'static>(
        mut self,
        id_generator: T,
    ) -> Self {
        self.config.id_generator = Box::new(id_generator);
        self
    }

    /// Sets the resource that this provider will use.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.config.resource = Cow::Owned(resource);
        self
    }

    /// Create a new provider from this configuration.
    pub fn build(self) -> SdkTracerProvider {
        let mut config = self.config;

        // `Config` owns its `Resource` by default (sdk default, or env/user
        // supplied); upgrade it to a `'static` reference so per-span clones
        // of the resource are cheap. Providers sharing an identical resource
        // converge on the same static allocation.
        if matches!(config.resource, Cow::Owned(_)) {
            config.resource = match PROVIDER_RESOURCE.try_insert(config.resource.into_owned()) {
                Ok(static_resource) => Cow::Borrowed(static_resource),
                Err((prev, new)) => {
                    if prev == &new {
                        Cow::Borrowed(prev)
                    } else {
                        Cow::Owned(new)
                    }
                }
            }
        }

        SdkTracerProvider::new(Arc::new(TracerProviderInner {
            processors: self.processors,
            config: RwLock::new(Arc::new(config)),
        }))
    }
}
