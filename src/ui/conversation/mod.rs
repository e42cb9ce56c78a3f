//! Conversation UI components for the chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod manager;
pub mod refine_menu;
pub mod status;

pub use commands::{get_help_text, ParsedCommand, SlashCommand};
pub use composer::{Composer, ComposerResult};
pub use history::ConversationHistory;
pub use manager::{ConversationAction, ConversationManager};
pub use refine_menu::RefineMenuView;
pub use status::StatusLine;
