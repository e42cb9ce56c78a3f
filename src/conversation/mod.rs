//! Conversation state machine: the message log, session state, and the
//! controller that maps user actions to AI requests and merges results back.

pub mod controller;
pub mod message;
pub mod refine;
pub mod request;
pub mod session;

pub use controller::{ConversationController, Submission};
pub use message::{Message, MessageId, MessageLog};
pub use refine::{Blur, Clarity, Length, RefineKind, RefineMenu, RefineOption, RefineSelections, Style, Tone};
pub use request::{Completion, ImageRefinement, Request};
pub use session::{LoadingFlags, Notice, SessionState};
