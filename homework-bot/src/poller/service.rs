//! Homework poller implementation.
//!
//! Each cycle fetches the latest homework, turns it into a message (or a
//! failure message), and notifies the chat only when the message differs
//! from the last one handled.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::Error;
use crate::config::Config;
use crate::notification::{Notifier, send_message};
use crate::practicum::validator::is_empty_homeworks;
use crate::practicum::{HomeworkApi, Locale, check_response, parse_status};

use super::cursor::{CursorPolicy, PollCursor};

/// Result of one poll.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A status message for the latest homework.
    Status(String),
    /// The cycle failed; reported as a failure message.
    Failure(Error),
    /// Nothing new since the last poll (advancing cursor only).
    Idle,
}

impl CycleOutcome {
    /// Text to deliver for this outcome, if any.
    pub fn message(&self, locale: Locale) -> Option<String> {
        match self {
            Self::Status(message) => Some(message.clone()),
            Self::Failure(error) => Some(format!("{}: {error}", locale.failure_prefix())),
            Self::Idle => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// What a cycle did.
#[derive(Debug)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Whether the notifier was invoked.
    pub notified: bool,
}

/// Polls the homework API and reports status changes.
pub struct HomeworkPoller<A: HomeworkApi, N: Notifier> {
    api: A,
    notifier: N,
    cursor: PollCursor,
    locale: Locale,
    retry_period: Duration,
    last_message: Option<String>,
}

impl<A: HomeworkApi, N: Notifier> HomeworkPoller<A, N> {
    /// Create a poller whose cursor starts `config.cursor_offset` seconds ago.
    pub fn new(config: &Config, api: A, notifier: N) -> Self {
        let cursor = PollCursor::new(
            Utc::now().timestamp(),
            config.cursor_offset,
            config.cursor_policy,
        );
        Self {
            api,
            notifier,
            cursor,
            locale: config.locale,
            retry_period: config.retry_period,
            last_message: None,
        }
    }

    pub fn cursor(&self) -> &PollCursor {
        &self.cursor
    }

    /// Last message handled by the dedup check.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Fetch, validate and translate the latest homework.
    pub async fn poll(&mut self) -> CycleOutcome {
        let requested_at = Utc::now().timestamp();

        let response = match self.api.homework_statuses(self.cursor.from_date()).await {
            Ok(response) => response,
            Err(e) => return CycleOutcome::Failure(e),
        };

        let outcome = match check_response(&response)
            .and_then(|homework| parse_status(homework, self.locale))
        {
            Ok(message) => CycleOutcome::Status(message),
            // With an advancing cursor an empty window just means no news.
            Err(_)
                if self.cursor.policy() == CursorPolicy::Advance
                    && is_empty_homeworks(&response) =>
            {
                CycleOutcome::Idle
            }
            Err(e) => CycleOutcome::Failure(e),
        };

        if !outcome.is_failure() {
            self.cursor.advance(requested_at);
        }
        outcome
    }

    /// Run one poll and notify the chat if the resulting message is new.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let outcome = self.poll().await;

        if let CycleOutcome::Failure(e) = &outcome {
            error!(error = %e, "Poll cycle failed");
        }

        let notified = match outcome.message(self.locale) {
            Some(message) if self.last_message.as_deref() != Some(message.as_str()) => {
                send_message(&self.notifier, &message).await;
                self.last_message = Some(message);
                true
            }
            Some(_) => {
                debug!("Message unchanged since last cycle, not sending");
                false
            }
            None => {
                debug!("No homework updates");
                false
            }
        };

        CycleReport { outcome, notified }
    }

    /// Poll forever, sleeping `retry_period` between cycles.
    pub async fn run(mut self) {
        info!(
            from_date = self.cursor.from_date(),
            cursor_policy = %self.cursor.policy(),
            retry_period = ?self.retry_period,
            "Homework poller started"
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.retry_period).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::config::{Credentials, UNIX_MONTH};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays queued responses; repeats the last one when the queue runs dry.
    #[derive(Clone, Default)]
    struct FakeApi {
        responses: Arc<Mutex<VecDeque<Result<Value>>>>,
        requests: Arc<Mutex<Vec<i64>>>,
    }

    impl FakeApi {
        fn with(responses: Vec<Result<Value>>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into())),
                requests: Arc::default(),
            }
        }

        fn requests(&self) -> Vec<i64> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HomeworkApi for FakeApi {
        async fn homework_statuses(&self, from_date: i64) -> Result<Value> {
            self.requests.lock().unwrap().push(from_date);
            let mut responses = self.responses.lock().unwrap();
            let next = if responses.len() > 1 {
                responses.pop_front()
            } else {
                None
            };
            match next {
                Some(response) => response,
                None => match responses.front() {
                    Some(Ok(value)) => Ok(value.clone()),
                    Some(Err(e)) => Err(replay(e)),
                    None => Err(Error::Transport("no response queued".into())),
                },
            }
        }
    }

    fn replay(error: &Error) -> Error {
        match error {
            Error::Configuration(s) => Error::Configuration(s.clone()),
            Error::Transport(s) => Error::Transport(s.clone()),
            Error::HttpStatus { status } => Error::HttpStatus { status: *status },
            Error::Shape(s) => Error::Shape(s.clone()),
            Error::ApiContract(s) => Error::ApiContract(s.clone()),
            Error::Notification(s) => Error::Notification(s.clone()),
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        sent: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(Error::notification("bot was blocked by the user"));
            }
            Ok(())
        }
    }

    fn config() -> Config {
        Config::new(Credentials {
            practicum_token: "practicum".into(),
            telegram_token: "123:telegram".into(),
            telegram_chat_id: "42".into(),
        })
    }

    fn homework(status: &str, name: &str) -> Value {
        json!({"homeworks": [{"status": status, "homework_name": name}]})
    }

    #[tokio::test]
    async fn test_status_change_is_notified() {
        let api = FakeApi::with(vec![Ok(homework("approved", "hw1"))]);
        let notifier = RecordingNotifier::default();
        let mut poller = HomeworkPoller::new(&config(), api, notifier.clone());

        let report = poller.run_cycle().await;

        assert!(report.notified);
        assert_eq!(
            notifier.sent(),
            vec![
                "Changed status of review for \"hw1\", approved. \
                 The work has been reviewed: the reviewer liked everything. Hooray!"
                    .to_string()
            ]
        );
        assert_eq!(poller.last_message(), Some(notifier.sent()[0].as_str()));
    }

    #[tokio::test]
    async fn test_identical_responses_notify_once() {
        let api = FakeApi::with(vec![Ok(homework("reviewing", "hw1"))]);
        let notifier = RecordingNotifier::default();
        let mut poller = HomeworkPoller::new(&config(), api.clone(), notifier.clone());

        assert!(poller.run_cycle().await.notified);
        assert!(!poller.run_cycle().await.notified);

        assert_eq!(api.requests().len(), 2);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_new_status_after_unchanged_cycles() {
        let api = FakeApi::with(vec![
            Ok(homework("reviewing", "hw1")),
            Ok(homework("reviewing", "hw1")),
            Ok(homework("rejected", "hw1")),
        ]);
        let notifier = RecordingNotifier::default();
        let mut poller = HomeworkPoller::new(&config(), api, notifier.clone());

        for _ in 0..3 {
            poller.run_cycle().await;
        }

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("reviewing"));
        assert!(sent[1].contains("rejected"));
    }

    #[tokio::test]
    async fn test_transport_error_becomes_failure_message() {
        let api = FakeApi::with(vec![
            Err(Error::Transport("connection refused".into())),
            Ok(homework("approved", "hw1")),
        ]);
        let notifier = RecordingNotifier::default();
        let mut poller = HomeworkPoller::new(&config(), api, notifier.clone());

        let report = poller.run_cycle().await;
        assert!(report.outcome.is_failure());
        assert!(report.notified);

        // The loop keeps going after a failure.
        let report = poller.run_cycle().await;
        assert!(matches!(report.outcome, CycleOutcome::Status(_)));

        let sent = notifier.sent();
        assert!(sent[0].starts_with("Program failure:"));
        assert!(sent[0].contains("connection refused"));
        assert!(sent[1].starts_with("Changed status of review"));
    }

    #[tokio::test]
    async fn test_repeated_failure_is_reported_once() {
        let api = FakeApi::with(vec![Err(Error::HttpStatus { status: 500 })]);
        let notifier = RecordingNotifier::default();
        let mut poller = HomeworkPoller::new(&config(), api.clone(), notifier.clone());

        for _ in 0..3 {
            poller.run_cycle().await;
        }

        assert_eq!(api.requests().len(), 3);
        assert_eq!(
            notifier.sent(),
            vec!["Program failure: Homework API returned status 500".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_homeworks_key_is_reported() {
        let api = FakeApi::with(vec![Ok(json!({"current_date": 0}))]);
        let notifier = RecordingNotifier::default();
        let mut poller = HomeworkPoller::new(&config(), api, notifier.clone());

        let report = poller.run_cycle().await;

        assert!(matches!(report.outcome, CycleOutcome::Failure(Error::Shape(_))));
        assert!(notifier.sent()[0].starts_with("Program failure:"));
    }

    #[tokio::test]
    async fn test_empty_homeworks_is_reported_with_fixed_cursor() {
        let api = FakeApi::with(vec![Ok(json!({"homeworks": []}))]);
        let notifier = RecordingNotifier::default();
        let mut poller = HomeworkPoller::new(&config(), api, notifier.clone());

        let report = poller.run_cycle().await;

        assert!(matches!(report.outcome, CycleOutcome::Failure(Error::Shape(_))));
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_status_is_reported() {
        let api = FakeApi::with(vec![Ok(homework("pending", "hw1"))]);
        let notifier = RecordingNotifier::default();
        let mut poller = HomeworkPoller::new(&config(), api, notifier.clone());

        let report = poller.run_cycle().await;

        assert!(matches!(
            report.outcome,
            CycleOutcome::Failure(Error::ApiContract(_))
        ));
        let sent = notifier.sent();
        assert!(sent[0].starts_with("Program failure:"));
        assert!(sent[0].contains("pending"));
    }

    #[tokio::test]
    async fn test_failed_delivery_still_updates_last_message() {
        let api = FakeApi::with(vec![Ok(homework("approved", "hw1"))]);
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let mut poller = HomeworkPoller::new(&config(), api, notifier.clone());

        assert!(poller.run_cycle().await.notified);
        assert!(!poller.run_cycle().await.notified);
        assert_eq!(notifier.sent().len(), 1);
        assert!(poller.last_message().is_some());
    }

    #[tokio::test]
    async fn test_fixed_cursor_reuses_startup_window() {
        let api = FakeApi::with(vec![Ok(homework("approved", "hw1"))]);
        let before = Utc::now().timestamp();
        let mut poller = HomeworkPoller::new(&config(), api.clone(), RecordingNotifier::default());
        let after = Utc::now().timestamp();

        poller.run_cycle().await;
        poller.run_cycle().await;

        let requests = api.requests();
        assert_eq!(requests[0], requests[1]);
        assert!(requests[0] >= before - UNIX_MONTH && requests[0] <= after - UNIX_MONTH);
    }

    #[tokio::test]
    async fn test_advancing_cursor_treats_empty_window_as_idle() {
        let api = FakeApi::with(vec![
            Ok(homework("reviewing", "hw1")),
            Ok(json!({"homeworks": []})),
        ]);
        let notifier = RecordingNotifier::default();
        let mut config = config();
        config.cursor_policy = CursorPolicy::Advance;
        let mut poller = HomeworkPoller::new(&config, api.clone(), notifier.clone());
        let start = poller.cursor().from_date();

        assert!(poller.run_cycle().await.notified);
        let report = poller.run_cycle().await;
        assert!(matches!(report.outcome, CycleOutcome::Idle));
        assert!(!report.notified);

        let requests = api.requests();
        assert_eq!(requests[0], start);
        assert!(requests[1] > start);
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_advancing_cursor_holds_on_failure() {
        let api = FakeApi::with(vec![Err(Error::Transport("timed out".into()))]);
        let mut config = config();
        config.cursor_policy = CursorPolicy::Advance;
        let mut poller = HomeworkPoller::new(&config, api, RecordingNotifier::default());
        let start = poller.cursor().from_date();

        poller.run_cycle().await;
        assert_eq!(poller.cursor().from_date(), start);
    }

    #[tokio::test]
    async fn test_russian_failure_prefix() {
        let api = FakeApi::with(vec![Err(Error::Transport("timed out".into()))]);
        let notifier = RecordingNotifier::default();
        let mut config = config();
        config.locale = Locale::Russian;
        let mut poller = HomeworkPoller::new(&config, api, notifier.clone());

        poller.run_cycle().await;
        assert!(notifier.sent()[0].starts_with("Сбой в работе программы: "));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_between_cycles_and_survives_failures() {
        let api = FakeApi::with(vec![Err(Error::Transport("connection reset".into()))]);
        let notifier = RecordingNotifier::default();
        let poller = HomeworkPoller::new(&config(), api.clone(), notifier.clone());

        let handle = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_secs(1300)).await;
        handle.abort();

        assert_eq!(api.requests().len(), 3);
        assert_eq!(notifier.sent().len(), 1);
    }
}
