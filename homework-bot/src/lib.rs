//! homework-bot library crate.
//!
//! Polls the Practicum homework status API and reports review status
//! changes to a Telegram chat.

pub mod config;
pub mod error;
pub mod logging;
pub mod notification;
pub mod poller;
pub mod practicum;
pub mod utils;

pub use config::{Config, Credentials};
pub use error::{Error, Result};
