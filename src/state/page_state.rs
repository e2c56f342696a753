//! Page state definitions for tracking crawl progress
//!
//! Every URL the frontier admits ends the crawl in exactly one terminal state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    // ===== Active States =====
    /// Page is admitted and waiting to be fetched
    Queued,

    /// Page is currently being fetched
    Fetching,

    // ===== Terminal Success States =====
    /// Page was fetched and its records extracted
    Processed,

    // ===== Terminal Skip States =====
    /// Response body was larger than the configured page size limit
    Oversized,

    /// Page Content-Type is not HTML
    ContentMismatch,

    /// robots.txt disallows the page for our agent
    RobotsDenied,

    // ===== Terminal Error States =====
    /// Page returned HTTP 404 or 410
    DeadLink,

    /// Page fetch failed permanently (non-retryable status or fault)
    Failed,

    /// Transient failures persisted through every allowed attempt
    RetriesExhausted,

    /// Fetch was in flight when the crawl was cancelled
    Abandoned,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if this is an active state (page may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Queued | Self::Fetching)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if the page was fetched or considered but deliberately not extracted
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::Oversized | Self::ContentMismatch | Self::RobotsDenied
        )
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::DeadLink | Self::Failed | Self::RetriesExhausted | Self::Abandoned
        )
    }

    /// Stable snake_case name, shared with the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Processed => "processed",
            Self::Oversized => "oversized",
            Self::ContentMismatch => "content_mismatch",
            Self::RobotsDenied => "robots_denied",
            Self::DeadLink => "dead_link",
            Self::Failed => "failed",
            Self::RetriesExhausted => "retries_exhausted",
            Self::Abandoned => "abandoned",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> [Self; 10] {
        [
            Self::Queued,
            Self::Fetching,
            Self::Processed,
            Self::Oversized,
            Self::ContentMismatch,
            Self::RobotsDenied,
            Self::DeadLink,
            Self::Failed,
            Self::RetriesExhausted,
            Self::Abandoned,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
