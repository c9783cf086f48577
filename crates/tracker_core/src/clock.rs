use std::cell::Cell;
use time::{Date, OffsetDateTime, UtcOffset};

/// Source of the current calendar date.
pub trait DateProvider {
    fn today(&self) -> Date;
}

/// Local calendar date from the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl DateProvider for SystemClock {
    fn today(&self) -> Date {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        OffsetDateTime::now_utc().to_offset(offset).date()
    }
}

/// A date that only moves when told to. Share it by reference to advance
/// the day under a store that borrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedClock(Cell<Date>);

impl FixedClock {
    pub fn new(date: Date) -> Self {
        Self(Cell::new(date))
    }

    pub fn set(&self, date: Date) {
        self.0.set(date);
    }
}

impl DateProvider for FixedClock {
    fn today(&self) -> Date {
        self.0.get()
    }
}

impl<T: DateProvider + ?Sized> DateProvider for &T {
    fn today(&self) -> Date {
        (**self).today()
    }
}

impl<T: DateProvider + ?Sized> DateProvider for Box<T> {
    fn today(&self) -> Date {
        (**self).today()
    }
}
