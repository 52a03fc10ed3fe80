use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) const MAX_RECENT: usize = 5;

/// A selectable instance. `display_name` and `address` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) id: String,
    pub(crate) display_name: String,
    pub(crate) address: String,
}

impl Candidate {
    pub(crate) fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            address: address.into(),
        }
    }

    pub(crate) fn label(&self) -> String {
        if self.display_name.trim().is_empty() {
            self.id.clone()
        } else {
            format!("{} {}", self.display_name, self.id)
        }
    }

    pub(crate) fn search_text(&self) -> String {
        format!("{} {} {}", self.id, self.display_name, self.address).to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct HistoryEntry {
    pub(crate) instance_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) name: String,
    pub(crate) last_used: DateTime<Utc>,
}

/// Most-recent-first list of connected instances, deduplicated and capped at
/// [`MAX_RECENT`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct RecencyList {
    #[serde(default)]
    pub(crate) recent: Vec<HistoryEntry>,
}

impl RecencyList {
    pub(crate) fn touch(&mut self, instance_id: &str, name: &str, now: DateTime<Utc>) {
        self.recent.retain(|entry| entry.instance_id != instance_id);
        self.recent.insert(
            0,
            HistoryEntry {
                instance_id: instance_id.to_string(),
                name: name.to_string(),
                last_used: now,
            },
        );
        self.recent.truncate(MAX_RECENT);
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        self.recent
            .iter()
            .map(|entry| entry.instance_id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandStatus {
    Pending,
    InProgress,
    Delayed,
    Success,
    Failed,
    TimedOut,
    Cancelled,
    Cancelling,
    Other(String),
}

impl CommandStatus {
    pub(crate) fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => Self::Pending,
            "InProgress" => Self::InProgress,
            "Delayed" => Self::Delayed,
            "Success" => Self::Success,
            "Failed" => Self::Failed,
            "TimedOut" => Self::TimedOut,
            "Cancelled" => Self::Cancelled,
            "Cancelling" => Self::Cancelling,
            other => Self::Other(other.to_string()),
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failed | Self::TimedOut | Self::Cancelled
        )
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Pending => "Pending",
            Self::InProgress => "InProgress",
            Self::Delayed => "Delayed",
            Self::Success => "Success",
            Self::Failed => "Failed",
            Self::TimedOut => "TimedOut",
            Self::Cancelled => "Cancelled",
            Self::Cancelling => "Cancelling",
            Self::Other(raw) => raw.as_str(),
        };
        f.write_str(text)
    }
}

/// One status report for a submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) status: CommandStatus,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommandOutput {
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollPolicy {
    pub(crate) initial: Duration,
    pub(crate) ceiling: Duration,
    pub(crate) max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            ceiling: Duration::from_secs(5),
            max_wait: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct SettingsFile {
    pub(crate) profile: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) history: Option<bool>,
    pub(crate) poll: PollSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct PollSettings {
    pub(crate) initial_ms: u64,
    pub(crate) max_ms: u64,
    pub(crate) max_wait_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_ms: 500,
            max_ms: 5_000,
            max_wait_secs: 600,
        }
    }
}

impl PollSettings {
    pub(crate) fn policy(&self) -> PollPolicy {
        let initial = Duration::from_millis(self.initial_ms.max(1));
        PollPolicy {
            initial,
            ceiling: Duration::from_millis(self.max_ms).max(initial),
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }
}

/// Effective settings after merging the config file, flags and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) profile: Option<String>,
    pub(crate) region: Option<String>,
    pub(crate) debug: bool,
    pub(crate) record_history: bool,
    pub(crate) poll: PollPolicy,
}
