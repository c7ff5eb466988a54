use crate::propagation::{Extractor, Injector};
use crate::Context;
use std::fmt::Debug;

/// Methods to inject and extract a value as text using the [`TextMapPropagator`].
pub trait TextMapPropagator: Debug {
    /// Properly encodes the values of the [`Context`] and injects them into the [`Injector`].
    fn inject_context(&self, cx: &Context, injector: &mut dyn Injector);

    /// Properly decodes the values from the [`Extractor`] into a [`Context`] derived from the
    /// passed parent [`Context`].
    fn extract_with_context(&self, cx: &Context, extractor: &dyn Extractor) -> Context;

    /// Injects the values of the current [`Context`] into the [`Injector`].
    fn inject(&self, injector: &mut dyn Injector) {
        self.inject_context(&Context::current(), injector)
    }

    /// Properly decodes the values from the [`Extractor`] into a current [`Context`].
    fn extract(&self, extractor: &dyn Extractor) -> Context {
        self.extract_with_context(&Context::current(), extractor)
    }

    /// The keys the propagator would read from or write to an injector/extractor.
    fn fields(&self) -> FieldIter<'_>;
}

/// An iterator over the keys, and optionally the values, of a [`TextMapPropagator`].
#[derive(Debug)]
pub struct FieldIter<'a>(std::slice::Iter<'a, String>);

impl<'a> FieldIter<'a> {
    /// Create a new [`FieldIter`] from a slice of field names.
    pub fn new(fields: &'a [String]) -> Self {
        FieldIter(fields.iter())
    }
}

impl<'a> Iterator for FieldIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(String::as_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}
