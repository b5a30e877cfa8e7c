//! Homework status codes and the notification text built from them.

use serde_json::Value;

use crate::{Error, Result};

/// Review status reported by the homework API.
///
/// The set is closed: any other code is a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the API status code. Codes are case-sensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approved" => Some(Self::Approved),
            "reviewing" => Some(Self::Reviewing),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Human-readable verdict for this status.
    pub fn verdict(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::English, Self::Approved) => {
                "The work has been reviewed: the reviewer liked everything. Hooray!"
            }
            (Locale::English, Self::Reviewing) => "The work has been taken for review.",
            (Locale::English, Self::Rejected) => {
                "The work has been reviewed: the reviewer has remarks."
            }
            (Locale::Russian, Self::Approved) => {
                "Работа проверена: ревьюеру всё понравилось. Ура!"
            }
            (Locale::Russian, Self::Reviewing) => "Работа взята на проверку ревьюером.",
            (Locale::Russian, Self::Rejected) => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HomeworkStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown homework status: {s}"))
    }
}

/// Language of outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    English,
    Russian,
}

impl Locale {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Self::English),
            "ru" | "russian" => Some(Self::Russian),
            _ => None,
        }
    }

    /// Prefix of the message sent when a poll cycle fails.
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Self::English => "Program failure",
            Self::Russian => "Сбой в работе программы",
        }
    }

    fn status_changed(&self, homework_name: &str, status: HomeworkStatus) -> String {
        let verdict = status.verdict(*self);
        match self {
            Self::English => {
                format!(r#"Changed status of review for "{homework_name}", {status}. {verdict}"#)
            }
            Self::Russian => {
                format!(r#"Изменился статус проверки работы "{homework_name}", {status}. {verdict}"#)
            }
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unsupported locale: {s}"))
    }
}

/// Compose the status-change notification for a homework record.
pub fn parse_status(homework: &Value, locale: Locale) -> Result<String> {
    let record = homework
        .as_object()
        .ok_or_else(|| Error::contract("homework record is not an object"))?;

    let status = record
        .get("status")
        .ok_or_else(|| Error::contract("homework record has no \"status\" key"))?;
    // Scalar names are rendered as text; containers and null are rejected.
    let homework_name = match record.get("homework_name") {
        Some(Value::String(name)) => name.clone(),
        Some(name @ (Value::Number(_) | Value::Bool(_))) => name.to_string(),
        Some(other) => {
            return Err(Error::contract(format!(
                "\"homework_name\" is not a scalar: {other}"
            )));
        }
        None => {
            return Err(Error::contract(
                "homework record has no \"homework_name\" key",
            ));
        }
    };

    let status = status
        .as_str()
        .and_then(HomeworkStatus::parse)
        .ok_or_else(|| Error::contract(format!("unknown homework status: {status}")))?;

    Ok(locale.status_changed(&homework_name, status))
}
