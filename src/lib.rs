//! Sparkle: a terminal chat client for Gemini with image generation, image
//! analysis, and in-place refinement of earlier answers.

pub mod clipboard;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod image;
pub mod logging;
pub mod prompts;
pub mod service;
pub mod ui;

pub use config::Config;
pub use conversation::{ConversationController, Message, MessageId, Request, Submission};
pub use error::{ServiceError, ServiceResult};
pub use events::{Mode, Sender};
pub use image::ImagePayload;
pub use service::{AiService, GeminiClient, Role, Turn};
