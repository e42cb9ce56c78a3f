//! Outbound work produced by the controller and the results fed back into it.

use super::message::MessageId;
use crate::error::ServiceResult;
use crate::image::ImagePayload;
use crate::service::Turn;

/// Where a regenerated image goes and what its caption becomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRefinement {
    pub target: MessageId,
    pub caption: String,
}

/// A single call the caller must make against the AI service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Text completion seeded with history; the reply links to `reply_to`
    Chat { turns: Vec<Turn>, reply_to: MessageId },
    /// Single-turn image analysis, no history
    AnalyzeImage { prompt: String, image: ImagePayload },
    /// Fresh image from the prompt alone
    GenerateImage { prompt: String },
    /// Rewrite of an existing AI message's text
    RefineText { turns: Vec<Turn>, target: MessageId },
    /// Regeneration of an existing AI image with a refined prompt
    RefineImage { prompt: String, refinement: ImageRefinement },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Chat { .. } => "chat",
            Request::AnalyzeImage { .. } => "analyze_image",
            Request::GenerateImage { .. } => "generate_image",
            Request::RefineText { .. } => "refine_text",
            Request::RefineImage { .. } => "refine_image",
        }
    }
}

/// Outcome of a [`Request`], carrying what the controller needs to merge it back
#[derive(Debug)]
pub enum Completion {
    Chat {
        result: ServiceResult<String>,
        reply_to: MessageId,
    },
    Analysis {
        result: ServiceResult<String>,
    },
    Image {
        result: ServiceResult<ImagePayload>,
        prompt: String,
        refinement: Option<ImageRefinement>,
    },
    TextRefinement {
        result: ServiceResult<String>,
        target: MessageId,
    },
}
