//! Runtime configuration.
//!
//! Everything is read from the process environment once at startup (after an
//! optional `.env` file has been loaded) and handed to the components by
//! reference. Only the three credentials are required.

use std::fmt;
use std::time::Duration;

use tracing::error;
use url::Url;

use crate::poller::CursorPolicy;
use crate::practicum::Locale;
use crate::{Error, Result};

/// Practicum homework status endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";

/// Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org/";

/// Pause between two polls.
pub const DEFAULT_RETRY_PERIOD: Duration = Duration::from_secs(600);

/// HTTP timeout applied to every outbound request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One synthetic month, subtracted from "now" to build the first cursor.
pub const UNIX_MONTH: i64 = 2_629_743;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Secrets required to run. Tokens are redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl Credentials {
    /// Read the three credentials through `lookup`.
    ///
    /// Empty values count as missing. The failure is logged before the error
    /// is returned so it is visible even if the caller drops it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let practicum_token = read(PRACTICUM_TOKEN);
        let telegram_token = read(TELEGRAM_TOKEN);
        let telegram_chat_id = read(TELEGRAM_CHAT_ID);

        match (practicum_token, telegram_token, telegram_chat_id) {
            (Some(practicum_token), Some(telegram_token), Some(telegram_chat_id)) => Ok(Self {
                practicum_token,
                telegram_token,
                telegram_chat_id,
            }),
            (practicum, telegram, chat) => {
                let missing: Vec<&str> = [
                    (PRACTICUM_TOKEN, practicum.is_none()),
                    (TELEGRAM_TOKEN, telegram.is_none()),
                    (TELEGRAM_CHAT_ID, chat.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                let missing = missing.join(", ");

                error!(critical = true, missing = %missing, "Required environment variable is missing");
                Err(Error::config(format!(
                    "missing required environment variable(s): {missing}"
                )))
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Homework status endpoint.
    pub endpoint: Url,
    /// Telegram Bot API base URL.
    pub telegram_api_base: Url,
    /// Pause between two polls.
    pub retry_period: Duration,
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
    /// Seconds subtracted from "now" to build the first cursor.
    pub cursor_offset: i64,
    pub cursor_policy: CursorPolicy,
    pub locale: Locale,
}

impl Config {
    /// Build a configuration with default settings around `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoint: parse_url(DEFAULT_ENDPOINT, "HOMEWORK_ENDPOINT")
                .expect("default endpoint is a valid URL"),
            telegram_api_base: parse_url(DEFAULT_TELEGRAM_API_BASE, "TELEGRAM_API_BASE")
                .expect("default Telegram API base is a valid URL"),
            retry_period: DEFAULT_RETRY_PERIOD,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cursor_offset: UNIX_MONTH,
            cursor_policy: CursorPolicy::default(),
            locale: Locale::default(),
        }
    }

    /// Load `.env` (if any) and build the configuration from the environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::from_lookup(&lookup)?;
        let mut config = Self::new(credentials);

        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = optional("HOMEWORK_ENDPOINT") {
            config.endpoint = parse_url(&value, "HOMEWORK_ENDPOINT")?;
        }
        if let Some(value) = optional("TELEGRAM_API_BASE") {
            let mut base = parse_url(&value, "TELEGRAM_API_BASE")?;
            // Method paths are joined relative to the base.
            if !base.path().ends_with('/') {
                let path = format!("{}/", base.path());
                base.set_path(&path);
            }
            config.telegram_api_base = base;
        }
        if let Some(value) = optional("RETRY_PERIOD_SECS") {
            config.retry_period = parse_secs(&value, "RETRY_PERIOD_SECS")?;
        }
        if let Some(value) = optional("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_secs(&value, "REQUEST_TIMEOUT_SECS")?;
        }
        if let Some(value) = optional("CURSOR_POLICY") {
            config.cursor_policy = value
                .parse()
                .map_err(|e| Error::config(format!("CURSOR_POLICY: {e}")))?;
        }
        if let Some(value) = optional("MESSAGE_LOCALE") {
            config.locale = value
                .parse()
                .map_err(|e| Error::config(format!("MESSAGE_LOCALE: {e}")))?;
        }

        Ok(config)
    }
}

fn parse_url(value: &str, key: &str) -> Result<Url> {
    Url::parse(value.trim()).map_err(|e| Error::config(format!("{key}: invalid URL {value:?}: {e}")))
}

fn parse_secs(value: &str, key: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("{key}: expected whole seconds, got {value:?}: {e}")))?;
    if secs == 0 {
        return Err(Error::config(format!("{key}: must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}
