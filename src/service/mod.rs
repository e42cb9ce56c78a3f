//! AI service client interface and the glue that runs controller requests against it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::conversation::{Completion, Message, Request};
use crate::error::ServiceResult;
use crate::events::Sender;
use crate::image::ImagePayload;

mod gemini;

pub use gemini::GeminiClient;

/// Speaker of a turn as the text-generation service sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One entry of the user/model exchange sent for text generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

impl From<&Message> for Turn {
    fn from(message: &Message) -> Self {
        let role = match message.sender {
            Sender::User => Role::User,
            Sender::Ai => Role::Model,
        };
        Turn {
            role,
            text: message.text.clone(),
        }
    }
}

/// The three operations the conversation depends on.
///
/// Implementations report transport failures, bad statuses, and malformed or
/// empty payloads as `Err`; callers treat every error the same way.
#[async_trait]
pub trait AiService: Send + Sync {
    async fn generate_text(&self, turns: &[Turn]) -> ServiceResult<String>;

    async fn analyze_image(&self, prompt: &str, image: &ImagePayload) -> ServiceResult<String>;

    async fn generate_image(&self, prompt: &str) -> ServiceResult<ImagePayload>;
}

/// Perform `request` and package the outcome for `ConversationController::complete`
pub async fn execute(service: &dyn AiService, request: Request) -> Completion {
    let kind = request.kind();
    let completion = match request {
        Request::Chat { turns, reply_to } => Completion::Chat {
            result: service.generate_text(&turns).await,
            reply_to,
        },
        Request::AnalyzeImage { prompt, image } => Completion::Analysis {
            result: service.analyze_image(&prompt, &image).await,
        },
        Request::GenerateImage { prompt } => Completion::Image {
            result: service.generate_image(&prompt).await,
            prompt,
            refinement: None,
        },
        Request::RefineText { turns, target } => Completion::TextRefinement {
            result: service.generate_text(&turns).await,
            target,
        },
        Request::RefineImage { prompt, refinement } => Completion::Image {
            result: service.generate_image(&prompt).await,
            prompt,
            refinement: Some(refinement),
        },
    };
    tracing::debug!(kind, "request finished");
    completion
}
