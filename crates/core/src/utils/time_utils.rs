use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current time for lifecycle operations.
///
/// Absoluteness depends on the date an operation runs, so services read the
/// clock at the moment of each call instead of caching a date.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The reference date the absolute-state guard evaluates against.
    ///
    /// This is the UTC calendar date of [`Clock::now`], not the host's local
    /// date. Near midnight the two differ, and a trade dated on the local
    /// "today" can already be absolute. Lifecycle operations derive the date
    /// from the same `now()` reading they stamp on the recorded action.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant. Useful for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// A clock at midday UTC of `date`.
    pub fn on(date: NaiveDate) -> Self {
        let midday = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self(midday)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
