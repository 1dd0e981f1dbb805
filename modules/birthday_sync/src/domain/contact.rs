use chrono::NaiveDate;

use crate::domain::occurrence::{next_occurrence, MonthDay};

/// A value the remote record offers, possibly flagged as the preferred one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<T> {
    pub value: T,
    pub primary: bool,
}

impl<T> Candidate<T> {
    pub fn new(value: T, primary: bool) -> Self {
        Self { value, primary }
    }
}

/// Primary candidate if any, otherwise the first one.
pub fn preferred<T>(candidates: &[Candidate<T>]) -> Option<&T> {
    candidates
        .iter()
        .find(|c| c.primary)
        .or_else(|| candidates.first())
        .map(|c| &c.value)
}

/// A birthday as the directory reports it; any part may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BirthdayParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

/// One connection from the directory, alive for a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRecord {
    /// Opaque remote resource name; never empty.
    pub resource_name: String,
    pub names: Vec<Candidate<String>>,
    pub birthdays: Vec<BirthdayParts>,
    pub photos: Vec<Candidate<String>>,
}

impl ContactRecord {
    pub fn display_name(&self) -> Option<&str> {
        preferred(&self.names).map(String::as_str)
    }

    pub fn photo_url(&self) -> Option<&str> {
        preferred(&self.photos).map(String::as_str)
    }

    /// Earliest upcoming occurrence over all birthday candidates.
    pub fn next_birthday(&self, reference: NaiveDate) -> Option<NaiveDate> {
        self.birthdays
            .iter()
            .filter_map(|b| MonthDay::from_parts(b.month, b.day))
            .filter_map(|md| next_occurrence(md, reference))
            .min()
    }
}
