use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::domain::ports::Clock;

/// Wall clock; "today" is the local calendar date of the device.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
