use alloc::vec::Vec;
use parking_lot::Mutex;
use tracing::error;

use crate::errors::ModuleErrorKind;

/// Receives service module failures. Reporting never fails and never stops a scan.
pub trait DiagnosticSink {
    fn report(&self, failure: ModuleErrorKind);
}

impl<T> DiagnosticSink for &T
where
    T: DiagnosticSink + ?Sized,
{
    #[inline]
    fn report(&self, failure: ModuleErrorKind) {
        (**self).report(failure);
    }
}

/// Sink that calls `F` for every failure.
#[derive(Clone, Copy)]
pub struct SinkFn<F> {
    f: F,
}

impl<F> DiagnosticSink for SinkFn<F>
where
    F: Fn(ModuleErrorKind),
{
    #[inline]
    fn report(&self, failure: ModuleErrorKind) {
        (self.f)(failure);
    }
}

#[inline]
#[must_use]
pub const fn sink_fn<F>(f: F) -> SinkFn<F>
where
    F: Fn(ModuleErrorKind),
{
    SinkFn { f }
}

/// Logs failures with [`tracing::error!`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    #[inline]
    fn report(&self, failure: ModuleErrorKind) {
        error!(module = failure.module(), "{}", failure);
    }
}

/// Keeps failures in memory until they are taken.
#[derive(Debug, Default)]
pub struct CollectingSink {
    failures: Mutex<Vec<ModuleErrorKind>>,
}

impl CollectingSink {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            failures: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }

    /// Drains collected failures in report order.
    #[inline]
    #[must_use]
    pub fn take(&self) -> Vec<ModuleErrorKind> {
        core::mem::take(&mut *self.failures.lock())
    }
}

impl DiagnosticSink for CollectingSink {
    #[inline]
    fn report(&self, failure: ModuleErrorKind) {
        self.failures.lock().push(failure);
    }
}
