//! Campaign record and lifecycle types.
//!
//! The campaign record is the single source of truth for a dispatch run:
//! its `status` field carries both lifecycle state and externally issued
//! control signals (pause/stop), while the cursor and counters track
//! durable progress through the audience.

use core::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a campaign.
///
/// The engine is the sole writer of `InProgress`, `Completed`, and
/// `Failed`. External operators may write `Paused` and `Stopped` at any
/// time; the engine observes those before each send and honors them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CampaignStatus {
    Pending,
    InProgress,
    Paused,
    Stopped,
    Failed,
    Completed,
}

impl CampaignStatus {
    /// Checks whether this state is terminal for the engine's own logic.
    ///
    /// Terminal states are never left once entered by the engine, though
    /// `Stopped` and `Failed` can also be injected externally mid-flight.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }

    /// Checks whether an external operator is allowed to write this state.
    #[must_use]
    pub const fn is_control_signal(self) -> bool {
        matches!(self, Self::Paused | Self::Stopped)
    }
}

impl Default for CampaignStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Display for CampaignStatus {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        let name = match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
            Self::Completed => "completed",
        };
        write!(fmt, "{name}")
    }
}

/// Errors raised when a campaign fails pre-dispatch validation.
///
/// These are configuration errors: terminal, recorded as `Failed` before
/// any send attempt, and recoverable only by a human recreating the
/// campaign with corrected fields.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Delivery credentials are missing or empty.
    #[error("Missing delivery credentials (page_id/access_token)")]
    MissingCredentials,

    /// Neither message text nor image attachment is present.
    #[error("Campaign has neither message text nor image attachment")]
    EmptyContent,
}

/// Content of one outbound message, derived from the campaign record.
///
/// At least one of the two fields is always present; both may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent {
    /// Plain text body.
    pub text: Option<String>,
    /// URL of an image attachment.
    pub image_url: Option<String>,
}

/// A campaign document as held by the persistent store.
///
/// Created by an external actor in `Pending` state with a populated
/// audience and credentials. The engine mutates content fields only
/// through store transactions; external operators mutate `status` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecord {
    /// Lifecycle state and control-signal channel.
    #[serde(default)]
    pub status: CampaignStatus,

    /// Ordered recipient identifiers, fixed at creation.
    #[serde(default)]
    pub audience: Vec<String>,

    /// Optional text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Optional image attachment URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Pacing interval applied after every send attempt, in seconds.
    #[serde(default)]
    pub delay_secs: u64,

    /// Delivery-channel page identifier.
    #[serde(default)]
    pub page_id: String,

    /// Delivery-channel access token.
    #[serde(default)]
    pub access_token: String,

    /// Next unsent audience position (0-based cursor). Advances only
    /// inside the transaction that records the corresponding outcome.
    #[serde(default)]
    pub current_index: usize,

    /// Number of recipients delivered successfully.
    #[serde(default)]
    pub success_count: u64,

    /// Number of recipients whose delivery permanently failed.
    #[serde(default)]
    pub failure_count: u64,

    /// Timestamp of the last engine write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_processed: Option<DateTime<Utc>>,

    /// Recipient of the most recent attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_recipient: Option<String>,

    /// Failure message of the most recent attempt; cleared on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Default for CampaignRecord {
    fn default() -> Self {
        Self {
            status: CampaignStatus::Pending,
            audience: Vec::new(),
            message: None,
            image_url: None,
            delay_secs: 0,
            page_id: String::new(),
            access_token: String::new(),
            current_index: 0,
            success_count: 0,
            failure_count: 0,
            last_processed: None,
            last_recipient: None,
            last_error: None,
        }
    }
}

impl CampaignRecord {
    /// Validates the fields required before any send attempt.
    ///
    /// # Errors
    /// Returns the first configuration error found: missing credentials,
    /// or a record with neither message text nor image attachment.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_id.trim().is_empty() || self.access_token.trim().is_empty() {
            return Err(ValidationError::MissingCredentials);
        }

        if self.content().is_none() {
            return Err(ValidationError::EmptyContent);
        }

        Ok(())
    }

    /// Builds the outbound message content, if any is present.
    ///
    /// Returns `None` when both `message` and `image_url` are absent or
    /// blank, which makes the campaign invalid.
    #[must_use]
    pub fn content(&self) -> Option<MessageContent> {
        let text = self
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned);
        let image_url = self
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_owned);

        if text.is_none() && image_url.is_none() {
            None
        } else {
            Some(MessageContent { text, image_url })
        }
    }

    /// Clamps a persisted cursor that points past the end of the audience.
    ///
    /// Resumption always starts from persisted state; a cursor beyond the
    /// audience length would otherwise panic the dispatch loop on index.
    pub fn clamp_cursor(&mut self) {
        if self.current_index > self.audience.len() {
            self.current_index = self.audience.len();
        }
    }

    /// Number of audience elements not yet processed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.audience.len().saturating_sub(self.current_index)
    }
}
