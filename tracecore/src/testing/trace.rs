//! Minimal [`Span`] implementation for exercising context propagation and
//! propagators in tests, without depending on an SDK.
use crate::trace::{Span, SpanContext, Status};
use crate::KeyValue;
use std::borrow::Cow;
use std::time::SystemTime;

/// A [`Span`] that only ever carries a fixed [`SpanContext`] and otherwise
/// ignores everything recorded on it.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSpan(pub SpanContext);

impl Span for TestSpan {
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
        &self.0
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
