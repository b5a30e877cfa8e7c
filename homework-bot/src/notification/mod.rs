//! Outgoing chat notifications.
//!
//! Delivery is best effort: [`send_message`] logs failures and never returns
//! them, so a broken chat transport cannot stop the poller.

mod telegram;

pub use telegram::TelegramNotifier;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::Result;

/// Destination for notification text.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the configured chat.
    async fn send(&self, text: &str) -> Result<()>;
}

/// Send `message` through `notifier`, logging instead of propagating failures.
///
/// Returns whether the transport reported success.
pub async fn send_message(notifier: &dyn Notifier, message: &str) -> bool {
    match notifier.send(message).await {
        Ok(()) => {
            debug!(message = %message, "Message sent");
            true
        }
        Err(e) => {
            error!(message = %message, error = %e, "Failed to send message");
            false
        }
    }
}
