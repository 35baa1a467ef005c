//! Wire types and outcome classification for the delivery API

use herald_common::MessageContent;
use serde::Serialize;

/// Delivery-channel credentials, borrowed from the campaign snapshot.
#[derive(Debug, Clone, Copy)]
pub struct PageCredentials<'a> {
    pub page_id: &'a str,
    pub access_token: &'a str,
}

/// Classified result of a single send attempt.
///
/// The delivery client never raises: every attempt resolves to exactly
/// one of these, and the retry controller decides what happens next.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// 2xx response with no embedded application error.
    Delivered(serde_json::Value),
    /// Rate limit or server error; eligible for backoff retry.
    Transient(String),
    /// Any other rejection; retrying cannot help.
    Permanent(String),
}

impl SendOutcome {
    /// Returns `true` for a successful delivery.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// JSON body of one send request.
///
/// ```json
/// {
///   "messaging_type": "RESPONSE",
///   "recipient": { "id": "..." },
///   "message": { "text": "...", "attachment": { ... } }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    messaging_type: &'static str,
    recipient: Recipient<'a>,
    message: MessageBody<'a>,
}

#[derive(Debug, Serialize)]
struct Recipient<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<Attachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
    r#type: &'static str,
    payload: AttachmentPayload<'a>,
}

#[derive(Debug, Serialize)]
struct AttachmentPayload<'a> {
    url: &'a str,
    is_reusable: bool,
}

impl<'a> SendRequest<'a> {
    /// Build the request body for one recipient.
    ///
    /// Text and image may both be present; the campaign validator
    /// guarantees at least one is.
    #[must_use]
    pub fn new(recipient: &'a str, content: &'a MessageContent) -> Self {
        Self {
            messaging_type: "RESPONSE",
            recipient: Recipient { id: recipient },
            message: MessageBody {
                text: content.text.as_deref(),
                attachment: content.image_url.as_deref().map(|url| Attachment {
                    r#type: "image",
                    payload: AttachmentPayload {
                        url,
                        is_reusable: true,
                    },
                }),
            },
        }
    }
}
