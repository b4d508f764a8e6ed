//! # Clock
//!
//! Access to "today" goes through [`Clock`] so the ledgers never read the
//! system time directly and stay deterministic in tests.

use chrono::{Local, NaiveDate};
use std::fmt;
use std::sync::Arc;

/// Source of the current calendar day.
pub trait Clock: Send + Sync {
    /// Returns the current local date.
    fn today(&self) -> NaiveDate;
}

/// Real clock backed by the local system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Shared clock handle held by the ledgers.
#[derive(Clone)]
pub struct SharedClock(Arc<dyn Clock>);

impl SharedClock {
    pub fn new(clock: impl Clock + 'static) -> Self {
        SharedClock(Arc::new(clock))
    }

    /// Shorthand for a [`FixedClock`].
    pub fn fixed(day: NaiveDate) -> Self {
        SharedClock::new(FixedClock(day))
    }

    #[inline]
    pub fn today(&self) -> NaiveDate {
        self.0.today()
    }
}

impl Default for SharedClock {
    fn default() -> Self {
        SharedClock::new(SystemClock)
    }
}

impl fmt::Debug for SharedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedClock").field(&self.today()).finish()
    }
}
