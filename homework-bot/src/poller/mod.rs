//! Poll loop: fetch, translate, dedup, notify, sleep.

pub mod cursor;
pub mod service;

pub use cursor::{CursorPolicy, PollCursor};
pub use service::{CycleOutcome, CycleReport, HomeworkPoller};
