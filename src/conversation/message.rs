//! Conversation log: the ordered message sequence and its id allocator.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::Sender;
use crate::image::ImagePayload;

/// Session-unique message identifier. Allocated from a counter that never rewinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single entry in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub text: String,
    pub image: Option<ImagePayload>,
    pub timestamp: DateTime<Local>,
    /// User message that triggered this AI reply. Lookup only; may dangle.
    pub original_prompt_id: Option<MessageId>,
    /// Prompt an AI image was generated from; set only on AI image messages.
    pub original_image_prompt: Option<String>,
    pub refined: bool,
}

impl Message {
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn is_ai_image(&self) -> bool {
        self.sender == Sender::Ai && self.original_image_prompt.is_some()
    }

    /// Header timestamp, e.g. `14:03:27`
    pub fn display_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Ordered, append/update message sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
    next_id: u64,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLog {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> MessageId {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a user message and return its id
    pub fn push_user(&mut self, text: String, image: Option<ImagePayload>) -> MessageId {
        let id = self.allocate_id();
        self.messages.push(Message {
            id,
            sender: Sender::User,
            text,
            image,
            timestamp: Local::now(),
            original_prompt_id: None,
            original_image_prompt: None,
            refined: false,
        });
        id
    }

    /// Append an AI text message
    pub fn push_ai_text(&mut self, text: String, original_prompt_id: Option<MessageId>) -> MessageId {
        let id = self.allocate_id();
        self.messages.push(Message {
            id,
            sender: Sender::Ai,
            text,
            image: None,
            timestamp: Local::now(),
            original_prompt_id,
            original_image_prompt: None,
            refined: false,
        });
        id
    }

    /// Append an AI image message, remembering the prompt for later refinement
    pub fn push_ai_image(&mut self, image: ImagePayload, text: String, prompt: String) -> MessageId {
        let id = self.allocate_id();
        self.messages.push(Message {
            id,
            sender: Sender::Ai,
            text,
            image: Some(image),
            timestamp: Local::now(),
            original_prompt_id: None,
            original_image_prompt: Some(prompt),
            refined: false,
        });
        id
    }

    /// Replace a user message's content in place, keeping its id.
    /// Returns `false` when the id is unknown.
    pub fn replace_user(&mut self, id: MessageId, text: String, image: Option<ImagePayload>) -> bool {
        let Some(message) = self.get_mut(id) else {
            return false;
        };
        message.text = text;
        message.image = image;
        message.timestamp = Local::now();
        true
    }

    /// Rewrite an AI message's text after a refinement.
    /// Returns `false` when the id is unknown or names a user message.
    pub fn refine_text(&mut self, id: MessageId, text: String) -> bool {
        let Some(message) = self.get_ai_mut(id) else {
            return false;
        };
        message.text = text;
        message.timestamp = Local::now();
        message.refined = true;
        true
    }

    /// Swap an AI message's image and caption after a refinement.
    /// Returns `false` when the id is unknown or names a user message.
    pub fn refine_image(&mut self, id: MessageId, image: ImagePayload, text: String) -> bool {
        let Some(message) = self.get_ai_mut(id) else {
            return false;
        };
        message.image = Some(image);
        message.text = text;
        message.timestamp = Local::now();
        message.refined = true;
        true
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|message| message.id == id)
    }

    fn get_ai_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.get_mut(id).filter(|message| message.sender == Sender::Ai)
    }

    pub fn position(&self, id: MessageId) -> Option<usize> {
        self.messages.iter().position(|message| message.id == id)
    }

    /// Messages strictly before `id`, or the whole log when `id` is unknown
    pub fn before(&self, id: MessageId) -> &[Message] {
        match self.position(id) {
            Some(index) => &self.messages[..index],
            None => &self.messages,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message. The id counter keeps counting so ids are never reused.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
