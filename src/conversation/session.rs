use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::message::MessageId;
use super::refine::RefineMenu;
use crate::events::Mode;
use crate::image::ImagePayload;

/// Per-request loading indicators; independent of one another
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingFlags {
    pub chat: bool,
    pub image_generation: bool,
    pub analysis: bool,
}

impl LoadingFlags {
    pub fn any(&self) -> bool {
        self.chat || self.image_generation || self.analysis
    }
}

/// Transient informational message that disappears on its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    pub shown_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shown_at: Utc::now(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.shown_at >= ttl
    }
}

/// Everything about the current chat besides the message log. Reset by "new chat".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub input: String,
    pub mode: Mode,
    pub editing_id: Option<MessageId>,
    pub refine: Option<RefineMenu>,
    pub attached_image: Option<ImagePayload>,
    pub loading: LoadingFlags,
    pub notice: Option<Notice>,
}

impl SessionState {
    pub fn show_refine_menu(&self) -> bool {
        self.refine.is_some()
    }

    pub fn refine_target(&self) -> Option<MessageId> {
        self.refine.as_ref().map(|menu| menu.target)
    }

    pub fn notice_text(&self) -> Option<&str> {
        self.notice.as_ref().map(|notice| notice.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_ttl() {
        let notice = Notice::new("Message copied!");
        let ttl = Duration::seconds(3);
        assert!(!notice.is_expired(notice.shown_at + Duration::seconds(2), ttl));
        assert!(notice.is_expired(notice.shown_at + Duration::seconds(3), ttl));
    }

    #[test]
    fn session_state_serializes() {
        let state = SessionState {
            input: "draft".into(),
            mode: Mode::Image,
            editing_id: Some(MessageId(7)),
            ..Default::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"mode\":\"image\""));
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
