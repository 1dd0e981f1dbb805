use chrono::{DateTime, NaiveDate, Utc};

/// Time source; "today" decides the lookahead window, "now" stamps snapshots.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    fn today(&self) -> NaiveDate;
}
