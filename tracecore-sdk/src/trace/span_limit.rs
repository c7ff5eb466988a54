//! Span cardinality limits

use crate::error::{OTelSdkError, OTelSdkResult};
use tracecore::{Array, StringValue, Value};

pub(crate) const DEFAULT_MAX_ATTRIBUTES_PER_SPAN: u32 = 32;
pub(crate) const DEFAULT_MAX_EVENT_PER_SPAN: u32 = 128;
pub(crate) const DEFAULT_MAX_LINKS_PER_SPAN: u32 = 32;
pub(crate) const DEFAULT_MAX_ATTRIBUTES_PER_EVENT: u32 = 32;
pub(crate) const DEFAULT_MAX_ATTRIBUTES_PER_LINK: u32 = 32;
/// -1 means unlimited.
pub(crate) const DEFAULT_MAX_ATTRIBUTE_VALUE_LENGTH: i32 = -1;

/// Limits applied to a span's attributes, events and links, plus attribute
/// count limits on each individual event and link.
///
/// Defaults are the ones recommended by the TraceCore specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct SpanLimits {
    /// The max number of attributes that can be recorded on a span.
    pub max_attributes_per_span: u32,
    /// The max number of events that can be recorded on a span.
    pub max_events_per_span: u32,
    /// The max number of links that can be recorded on a span.
    pub max_links_per_span: u32,
    /// The max number of attributes that can be recorded on a single event.
    pub max_attributes_per_event: u32,
    /// The max number of attributes that can be recorded on a single link.
    pub max_attributes_per_link: u32,
    /// The max length of an attribute value (string, or each element of an
    /// array value). `-1` means unlimited, which is the default.
    pub max_attribute_value_length: i32,
}

impl Default for SpanLimits {
    fn default() -> Self {
        SpanLimits {
            max_attributes_per_span: DEFAULT_MAX_ATTRIBUTES_PER_SPAN,
            max_events_per_span: DEFAULT_MAX_EVENT_PER_SPAN,
            max_links_per_span: DEFAULT_MAX_LINKS_PER_SPAN,
            max_attributes_per_event: DEFAULT_MAX_ATTRIBUTES_PER_EVENT,
            max_attributes_per_link: DEFAULT_MAX_ATTRIBUTES_PER_LINK,
            max_attribute_value_length: DEFAULT_MAX_ATTRIBUTE_VALUE_LENGTH,
        }
    }
}

impl SpanLimits {
    /// Builds a [`SpanLimits`], rejecting non-positive count limits and a
    /// value-length limit that is neither positive nor `-1` (unlimited).
    pub fn new(
        max_attributes_per_span: u32,
        max_events_per_span: u32,
        max_links_per_span: u32,
        max_attributes_per_event: u32,
        max_attributes_per_link: u32,
        max_attribute_value_length: i32,
    ) -> Result<Self, OTelSdkError> {
        let limits = SpanLimits {
            max_attributes_per_span,
            max_events_per_span,
            max_links_per_span,
            max_attributes_per_event,
            max_attributes_per_link,
            max_attribute_value_length,
        };
        limits.validate()?;
        Ok(limits)
    }

    /// Validates that every count limit is positive and that the value
    /// length is either positive or `-1` (unlimited).
    ///
    /// Mirrors the validation the TraceCore SDK applies to a `TraceConfig`
    /// before it is installed: all limits must be positive, and the value
    /// length may additionally be `-1`.
    pub(crate) fn validate(self) -> OTelSdkResult {
        let counts = [
            self.max_attributes_per_span,
            self.max_events_per_span,
            self.max_links_per_span,
            self.max_attributes_per_event,
            self.max_attributes_per_link,
        ];
        if counts.iter().any(|count| *count == 0) {
            return Err(OTelSdkError::InternalFailure(
                "span limits must be positive".into(),
            ));
        }
        if self.max_attribute_value_length == 0 || self.max_attribute_value_length < -1 {
            return Err(OTelSdkError::InternalFailure(
                "max_attribute_value_length must be positive or -1 for unlimited".into(),
            ));
        }
        Ok(())
    }
}

fn truncate_str(s: &str, max_len: usize) -> StringValue {
    match s.char_indices().nth(max_len) {
        Some((byte_idx, _)) => s[..byte_idx].to_string().into(),
        None => s.to_string().into(),
    }
}

/// Truncates a string value, or each string element of an array value, to
/// `max_len` unicode scalar values. A negative `max_len` disables truncation.
pub(crate) fn truncate_value(value: Value, max_len: i32) -> Value {
    let Ok(max_len) = usize::try_from(max_len) else {
        return value;
    };
    match value {
        Value::String(s) if s.as_str().chars().count() > max_len => {
            Value::String(truncate_str(s.as_str(), max_len))
        }
        Value::Array(Array::String(values)) => Value::Array(Array::String(
            values
                .into_iter()
                .map(|s| {
                    if s.as_str().chars().count() > max_len {
                        truncate_str(s.as_str(), max_len)
                    } else {
                        s
                    }
                })
                .collect(),
        )),
        other => other,
    }
}
