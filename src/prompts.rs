use crate::events::Mode;

/// Starter prompts offered for a given mode
pub fn suggestions(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Chat => CHAT_SUGGESTIONS,
        Mode::Image => IMAGE_SUGGESTIONS,
    }
}

const CHAT_SUGGESTIONS: &[&str] = &[
    "Tell me a joke.",
    "Give me a good dessert recipe.",
    "Provide a riddle.",
];

const IMAGE_SUGGESTIONS: &[&str] = &[
    "A dog eating vanilla ice cream with dog treats.",
    "Homer Simpson bowling in a bowling alley.",
    "School of fish swimming in a coral reef.",
];

/// Composer placeholder for a given mode
pub fn placeholder(mode: Mode) -> &'static str {
    match mode {
        Mode::Chat => "Type your message... (/help for commands)",
        Mode::Image => "Describe the image you want to generate...",
    }
}

pub const CHAT_FALLBACK: &str = "Oops! Something went wrong getting a response.";
pub const ANALYSIS_FALLBACK: &str = "Oops! Failed to analyze the image.";

pub const NOTICE_NEW_CHAT: &str = "New chat started!";
pub const NOTICE_COPIED: &str = "Message copied!";
pub const NOTICE_COPY_FAILED: &str = "Could not copy message.";
pub const NOTICE_REPLY: &str = "Input prepared for reply.";
pub const NOTICE_EDITING: &str = "Editing message. Send to confirm.";
pub const NOTICE_IMAGE_ATTACHED: &str = "Image uploaded for analysis. Type your prompt and send.";
pub const NOTICE_IMAGE_DETACHED: &str = "Attached image removed.";
pub const NOTICE_NO_IMAGE_OPTION: &str = "Please select at least one image refinement option.";
pub const NOTICE_NO_TEXT_OPTION: &str = "No refinement options selected.";
pub const NOTICE_TARGET_GONE: &str = "That message no longer exists.";
pub const NOTICE_NO_SUCH_MESSAGE: &str = "No message with that id.";
pub const NOTICE_NOT_EDITABLE: &str = "Only your own messages can be edited.";
pub const NOTICE_NOT_REFINABLE: &str = "Only AI responses can be refined.";
pub const NOTICE_BUSY: &str = "Please wait for the current response.";
pub const NOTICE_NO_SUGGESTION: &str = "No suggestion with that number.";

/// Number of characters quoted when replying
pub const REPLY_EXCERPT_CHARS: usize = 50;

/// Input seeded by a reply: a quoted excerpt of the first characters of `text`
pub fn reply_prefix(text: &str, excerpt_chars: usize) -> String {
    let excerpt: String = text.chars().take(excerpt_chars).collect();
    format!("Replying to: \"{excerpt}...\"\n")
}
