//! Practicum homework API: request, response validation and status messages.

pub mod client;
pub mod status;
pub mod validator;

pub use client::{HomeworkApi, PracticumClient};
pub use status::{HomeworkStatus, Locale, parse_status};
pub use validator::check_response;
