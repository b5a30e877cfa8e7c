//! The `from_date` cursor sent with every homework query.

/// How the cursor evolves between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorPolicy {
    /// Keep the startup cursor forever; every poll re-queries the same window.
    #[default]
    Fixed,
    /// Move the cursor to the request time after every successful poll.
    Advance,
}

impl CursorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Advance => "advance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fixed" => Some(Self::Fixed),
            "advance" => Some(Self::Advance),
            _ => None,
        }
    }
}

impl std::fmt::Display for CursorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CursorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid cursor policy: {s}"))
    }
}

/// Lower bound (Unix seconds) for the next homework query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCursor {
    from_date: i64,
    policy: CursorPolicy,
}

impl PollCursor {
    /// Start the cursor `offset` seconds before `now`.
    pub fn new(now: i64, offset: i64, policy: CursorPolicy) -> Self {
        Self {
            from_date: now - offset,
            policy,
        }
    }

    pub fn from_date(&self) -> i64 {
        self.from_date
    }

    pub fn policy(&self) -> CursorPolicy {
        self.policy
    }

    /// Record a successful poll issued at `requested_at`.
    pub fn advance(&mut self, requested_at: i64) {
        if self.policy == CursorPolicy::Advance && requested_at > self.from_date {
            self.from_date = requested_at;
        }
    }
}
