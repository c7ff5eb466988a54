//! # Span Events

use std::ops::Deref;

use tracecore::trace::Event;
/// Stores span events along with dropped count.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct SpanEvents {
    /// The events stored as a vector. Could be empty if there are no events.
    pub events: Vec<Event>,
    /// The number of Events dropped from the span.
    pub dropped_count: u32,
}

impl Deref for SpanEvents {
    type Target = [Event];

    fn deref(&self) -> &Self::Target {
        &self.events
    }
}

impl IntoIterator for SpanEvents {
    type Item = Event;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl SpanEvents {
    /// Adds an event, evicting the oldest recorded event once `capacity` is
    /// reached so the most recent events are always retained.
    pub(crate) fn add_event(&mut self, event: Event, capacity: usize) {
        if capacity == 0 {
            self.dropped_count += 1;
            return;
        }
        if self.events.len() >= capacity {
            self.events.remove(0);
            self.dropped_count += 1;
        }
        self.events.push(event);
    }
}
