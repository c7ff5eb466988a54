//! Internal utilities

/// Strategy for blocking on async futures from synchronous contexts.
///
/// Used by [`SimpleSpanProcessor`] and the batch worker thread to drive an
/// exporter's async `export` future to completion without requiring callers
/// to bring their own async runtime.
///
/// [`SimpleSpanProcessor`]: crate::trace::SimpleSpanProcessor
#[derive(Clone, Debug, Default)]
pub(crate) struct BlockingStrategy {
    _private: (),
}

impl BlockingStrategy {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }

    pub(crate) fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        futures_executor::block_on(future)
    }
}
