pub mod client;
pub mod error;
pub mod model;

pub use client::BirthdaySyncApi;
pub use error::BirthdaySyncError;
pub use model::{Snapshot, SyncOutcome, UpcomingBirthday};
