use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::conversation::Completion;

/// Internal application events for coordinating between the UI loop and request tasks
#[derive(Debug)]
pub enum AppEvent {
    /// An outbound request finished (successfully or not)
    Completed(Completion),

    /// Request to exit the application
    ExitRequest,
}

/// Interaction mode chosen by the user
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
    Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mode {
    /// Text chat; an attached image switches the request to analysis
    #[default]
    Chat,
    /// Image generation from the prompt text
    Image,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Chat => "Chat",
            Mode::Image => "Image",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Mode::Chat => "Ask anything, or attach an image to have it analyzed",
            Mode::Image => "Describe an image to generate",
        }
    }

    pub fn toggled(&self) -> Mode {
        match self {
            Mode::Chat => Mode::Image,
            Mode::Image => Mode::Chat,
        }
    }
}

/// Author of a message in the conversation log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}
