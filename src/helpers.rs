//! Shared helpers for tolerant extraction.
//!
//! - `safe_float`: free-text numeric coercion with a caller-supplied default.
//! - `BestEffort`: collector that keeps successes and counts skipped records,
//!   so one broken row never fails a whole page.

/// Coerce free text such as `"32.4°C"` or `"12.5 mm"` into a float.
///
/// Every character except ASCII digits, `.` and `-` is dropped before parsing.
/// Returns `default` when nothing parseable remains.
pub(crate) fn safe_float(value: &str, default: f64) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(default)
}

/// Accumulates extracted records and counts the ones that had to be skipped.
#[derive(Debug)]
pub(crate) struct BestEffort<T> {
    context: &'static str,
    items: Vec<T>,
    skipped: usize,
}

impl<T> BestEffort<T> {
    pub(crate) fn new(context: &'static str) -> Self {
        Self {
            context,
            items: Vec::new(),
            skipped: 0,
        }
    }

    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Record a skipped entry. Skips are traced, never raised.
    pub(crate) fn skip(&mut self, reason: impl std::fmt::Display) {
        self.skipped += 1;
        tracing::debug!("{}: skipped entry ({})", self.context, reason);
    }

    /// Push `Ok` values, skip `Err` values.
    pub(crate) fn collect<E: std::fmt::Display>(&mut self, result: Result<T, E>) {
        match result {
            Ok(item) => self.push(item),
            Err(e) => self.skip(e),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn skipped(&self) -> usize {
        self.skipped
    }

    pub(crate) fn into_parts(self) -> (Vec<T>, usize) {
        (self.items, self.skipped)
    }
}
