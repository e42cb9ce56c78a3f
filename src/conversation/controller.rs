use chrono::{DateTime, Utc};

use super::message::{Message, MessageId, MessageLog};
use super::refine::{
    generated_image_caption, text_refinement_prompt, Blur, Clarity, Length, RefineKind, RefineMenu,
    RefineOption, RefineSelections, Style, Tone,
};
use super::request::{Completion, ImageRefinement, Request};
use super::session::{Notice, SessionState};
use crate::clipboard::Clipboard;
use crate::config::UiConfig;
use crate::error::ServiceResult;
use crate::events::{Mode, Sender};
use crate::image::ImagePayload;
use crate::prompts;
use crate::service::{self, AiService, Turn};

/// A user submission as the presentation layer hands it over
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    pub image: Option<ImagePayload>,
    pub mode: Mode,
    pub editing_id: Option<MessageId>,
}

/// Owns the message log and session state, and decides how user actions turn
/// into AI requests and how results are merged back.
///
/// No I/O happens here: operations that need the AI service return a
/// [`Request`], and its [`Completion`] is applied with [`Self::complete`].
#[derive(Debug, Clone)]
pub struct ConversationController {
    messages: MessageLog,
    session: SessionState,
    notice_ttl: chrono::Duration,
    reply_excerpt_chars: usize,
    session_id: uuid::Uuid,
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new(&UiConfig::default())
    }
}

impl ConversationController {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            messages: MessageLog::new(),
            session: SessionState::default(),
            notice_ttl: ui.notice_ttl(),
            reply_excerpt_chars: ui.reply_excerpt_chars,
            session_id: uuid::Uuid::new_v4(),
        }
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    // ----- input -----

    pub fn input(&self) -> &str {
        &self.session.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.session.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.session.input = text.into();
    }

    /// Switch mode. An actual change drops the refine menu, the edit target,
    /// the input and any attached image.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.session.mode == mode {
            return;
        }
        tracing::debug!(%mode, "mode switched");
        self.session.mode = mode;
        self.cancel_refine();
        self.session.editing_id = None;
        self.session.input.clear();
        self.session.attached_image = None;
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.session.mode.toggled());
    }

    /// Attach an image to be analyzed with the next chat submission
    pub fn attach_image(&mut self, image: ImagePayload) {
        self.session.attached_image = Some(image);
        self.show_notice(prompts::NOTICE_IMAGE_ATTACHED);
    }

    pub fn detach_image(&mut self) -> bool {
        let had_image = self.session.attached_image.take().is_some();
        if had_image {
            self.show_notice(prompts::NOTICE_IMAGE_DETACHED);
        }
        had_image
    }

    /// Put the `index`th suggestion for the current mode into the input
    pub fn apply_suggestion(&mut self, index: usize) -> bool {
        match prompts::suggestions(self.session.mode).get(index) {
            Some(suggestion) => {
                self.session.input = (*suggestion).to_string();
                true
            }
            None => false,
        }
    }

    // ----- notices -----

    /// Show a transient message in the status line
    pub fn show_notice(&mut self, text: &str) {
        self.session.notice = Some(Notice::new(text));
    }

    /// Drop the notice once it has been visible for the configured time
    pub fn expire_notice(&mut self, now: DateTime<Utc>) -> bool {
        let expired = self
            .session
            .notice
            .as_ref()
            .is_some_and(|notice| notice.is_expired(now, self.notice_ttl));
        if expired {
            self.session.notice = None;
        }
        expired
    }

    // ----- submission -----

    /// Send whatever the session currently holds (input, attachment, mode, edit target).
    /// Nothing is sent while a request is still pending.
    pub fn submit(&mut self) -> Option<Request> {
        if self.session.loading.any() {
            self.show_notice(prompts::NOTICE_BUSY);
            return None;
        }
        let submission = Submission {
            text: self.session.input.clone(),
            image: self.session.attached_image.clone(),
            mode: self.session.mode,
            editing_id: self.session.editing_id,
        };
        self.submit_input(submission)
    }

    /// Record a user message (appended, or replaced in place when editing) and
    /// return the single request it triggers. Blank text without an image is a no-op.
    pub fn submit_input(&mut self, submission: Submission) -> Option<Request> {
        let Submission {
            text,
            image,
            mode,
            editing_id,
        } = submission;

        if text.trim().is_empty() && image.is_none() {
            return None;
        }

        let user_id = match editing_id {
            Some(id) if self.messages.replace_user(id, text.clone(), image.clone()) => {
                tracing::info!(message = %id, "user message edited");
                id
            }
            Some(id) => {
                tracing::warn!(message = %id, "edited message no longer exists; appending instead");
                self.messages.push_user(text.clone(), image.clone())
            }
            None => self.messages.push_user(text.clone(), image.clone()),
        };

        if editing_id.is_some() {
            self.session.editing_id = None;
        }
        self.session.input.clear();
        self.session.attached_image = None;

        let request = match (mode, image) {
            (Mode::Chat, None) => {
                let mut turns: Vec<Turn> = self.messages.before(user_id).iter().map(Turn::from).collect();
                turns.push(Turn::user(text));
                self.session.loading.chat = true;
                Request::Chat {
                    turns,
                    reply_to: user_id,
                }
            }
            (Mode::Chat, Some(image)) => {
                self.session.loading.analysis = true;
                Request::AnalyzeImage {
                    prompt: text,
                    image,
                }
            }
            (Mode::Image, _) => {
                self.session.loading.image_generation = true;
                Request::GenerateImage { prompt: text }
            }
        };

        tracing::info!(
            session = %self.session_id,
            message = %user_id,
            kind = request.kind(),
            "request dispatched"
        );
        Some(request)
    }

    // ----- completions -----

    /// Merge any completion back into the conversation
    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Chat { result, reply_to } => self.complete_chat_turn(result, reply_to),
            Completion::Analysis { result } => self.complete_image_analysis(result),
            Completion::Image {
                result,
                prompt,
                refinement,
            } => self.complete_image_generation(result, &prompt, refinement),
            Completion::TextRefinement { result, target } => {
                self.complete_text_refinement(result, target)
            }
        }
    }

    pub fn complete_chat_turn(&mut self, result: ServiceResult<String>, linked_user_id: MessageId) {
        match result {
            Ok(text) => {
                self.messages.push_ai_text(text, Some(linked_user_id));
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat request failed");
                self.messages.push_ai_text(prompts::CHAT_FALLBACK.to_string(), None);
            }
        }
        self.session.loading.chat = false;
    }

    pub fn complete_image_analysis(&mut self, result: ServiceResult<String>) {
        let text = result.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "image analysis failed");
            prompts::ANALYSIS_FALLBACK.to_string()
        });
        self.messages.push_ai_text(text, None);
        self.session.loading.analysis = false;
    }

    /// Append a generated image, or swap it into the refinement target.
    /// Failures fall back to the placeholder image.
    pub fn complete_image_generation(
        &mut self,
        result: ServiceResult<ImagePayload>,
        prompt: &str,
        refinement: Option<ImageRefinement>,
    ) {
        let image = result.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "image generation failed");
            ImagePayload::placeholder()
        });

        match refinement {
            Some(ImageRefinement { target, caption }) => {
                if !self.messages.refine_image(target, image.clone(), caption) {
                    tracing::warn!(message = %target, "refined image target is gone or not an AI message");
                    self.messages
                        .push_ai_image(image, generated_image_caption(prompt), prompt.to_string());
                }
            }
            None => {
                self.messages
                    .push_ai_image(image, generated_image_caption(prompt), prompt.to_string());
            }
        }

        self.session.loading.image_generation = false;
        self.cancel_refine();
    }

    /// Rewrite the target's text in place. Failures leave it untouched and append the fallback.
    pub fn complete_text_refinement(&mut self, result: ServiceResult<String>, target: MessageId) {
        match result {
            Ok(text) => {
                if !self.messages.refine_text(target, text.clone()) {
                    tracing::warn!(message = %target, "refined text target is gone or not an AI message");
                    self.messages.push_ai_text(text, None);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, message = %target, "text refinement failed");
                self.messages.push_ai_text(prompts::CHAT_FALLBACK.to_string(), None);
            }
        }
        self.session.loading.chat = false;
    }

    // ----- refinement -----

    /// Open the refine menu on AI message `id`. Returns `false` for unknown ids
    /// and user messages.
    pub fn open_refine(&mut self, id: MessageId) -> bool {
        let Some(message) = self.messages.get(id) else {
            return false;
        };
        if message.sender != Sender::Ai {
            return false;
        }

        let kind = if message.has_image() {
            RefineKind::Image
        } else {
            RefineKind::Text
        };

        let mut selections = self
            .session
            .refine
            .take()
            .map(|menu| menu.selections)
            .unwrap_or_default();
        match kind {
            RefineKind::Image => selections.reset_image(),
            RefineKind::Text => selections.reset_text(),
        }

        self.session.refine = Some(RefineMenu {
            target: id,
            kind,
            selections,
        });
        true
    }

    fn selections_mut(&mut self) -> Option<&mut RefineSelections> {
        self.session.refine.as_mut().map(|menu| &mut menu.selections)
    }

    pub fn select_length(&mut self, length: Option<Length>) {
        if let Some(selections) = self.selections_mut() {
            selections.length = length;
        }
    }

    pub fn select_clarity(&mut self, clarity: Option<Clarity>) {
        if let Some(selections) = self.selections_mut() {
            selections.clarity = clarity;
        }
    }

    pub fn select_tone(&mut self, tone: Option<Tone>) {
        if let Some(selections) = self.selections_mut() {
            selections.tone = tone;
        }
    }

    pub fn select_style(&mut self, style: Option<Style>) {
        if let Some(selections) = self.selections_mut() {
            selections.style = style;
        }
    }

    pub fn select_blur(&mut self, blur: Option<Blur>) {
        if let Some(selections) = self.selections_mut() {
            selections.blur = blur;
        }
    }

    /// Toggle the `index`th entry of the open menu
    pub fn toggle_option(&mut self, index: usize) -> bool {
        let Some(menu) = self.session.refine.as_mut() else {
            return false;
        };
        match RefineOption::entries(menu.kind).get(index) {
            Some(option) => {
                option.toggle(&mut menu.selections);
                true
            }
            None => false,
        }
    }

    /// Turn the open menu into a request. The menu is closed and all selections
    /// reset regardless of the outcome.
    pub fn confirm_refine(&mut self) -> Option<Request> {
        let menu = self.session.refine.clone()?;
        if self.session.loading.any() {
            self.cancel_refine();
            self.show_notice(prompts::NOTICE_BUSY);
            return None;
        }
        let request = self.build_refine_request(&menu);
        self.cancel_refine();

        if let Some(request) = &request {
            tracing::info!(
                session = %self.session_id,
                message = %menu.target,
                kind = request.kind(),
                "refinement dispatched"
            );
        }
        request
    }

    fn build_refine_request(&mut self, menu: &RefineMenu) -> Option<Request> {
        let Some(target) = self.messages.get(menu.target) else {
            self.show_notice(prompts::NOTICE_TARGET_GONE);
            return None;
        };
        if target.sender != Sender::Ai {
            self.show_notice(prompts::NOTICE_NOT_REFINABLE);
            return None;
        }
        let selections = menu.selections;

        if let Some(base_prompt) = target.original_image_prompt.clone() {
            if !selections.has_image_choice() {
                self.show_notice(prompts::NOTICE_NO_IMAGE_OPTION);
                return None;
            }
            let request = Request::RefineImage {
                prompt: format!("{base_prompt}{}", selections.image_suffix()),
                refinement: ImageRefinement {
                    target: target.id,
                    caption: selections.image_caption(&base_prompt),
                },
            };
            self.session.loading.image_generation = true;
            Some(request)
        } else {
            let Some(instruction) = selections.text_instruction() else {
                self.show_notice(prompts::NOTICE_NO_TEXT_OPTION);
                return None;
            };
            let mut turns: Vec<Turn> = self.messages.iter().map(Turn::from).collect();
            turns.push(Turn::user(text_refinement_prompt(&instruction, &target.text)));
            let request = Request::RefineText {
                turns,
                target: target.id,
            };
            self.session.loading.chat = true;
            Some(request)
        }
    }

    /// Close the refine menu and forget every selection
    pub fn cancel_refine(&mut self) {
        self.session.refine = None;
    }

    // ----- side-channel actions -----

    /// Load a user message into the input for editing
    pub fn edit_message(&mut self, id: MessageId) -> bool {
        let Some(message) = self.messages.get(id) else {
            return false;
        };
        if message.sender != Sender::User {
            return false;
        }
        self.session.input = message.text.clone();
        self.session.editing_id = Some(id);
        self.show_notice(prompts::NOTICE_EDITING);
        true
    }

    pub fn cancel_edit(&mut self) {
        if self.session.editing_id.take().is_some() {
            self.session.input.clear();
        }
    }

    /// Seed the input with a quoted excerpt of message `id`
    pub fn reply_to(&mut self, id: MessageId) -> bool {
        let Some(text) = self.messages.get(id).map(|message| message.text.clone()) else {
            return false;
        };
        self.reply_to_text(&text);
        true
    }

    pub fn reply_to_text(&mut self, text: &str) {
        self.session.input = prompts::reply_prefix(text, self.reply_excerpt_chars);
        self.show_notice(prompts::NOTICE_REPLY);
    }

    /// Hand message `id`'s text to the clipboard
    pub fn copy_text(&mut self, id: MessageId, clipboard: &mut dyn Clipboard) -> bool {
        let Some(text) = self.messages.get(id).map(|message| message.text.clone()) else {
            return false;
        };
        match clipboard.set_text(&text) {
            Ok(()) => self.show_notice(prompts::NOTICE_COPIED),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard write failed");
                self.show_notice(prompts::NOTICE_COPY_FAILED);
            }
        }
        true
    }

    /// Clear the conversation and reset every piece of session state
    pub fn start_new_chat(&mut self) {
        self.messages.clear();
        self.session = SessionState::default();
        self.session_id = uuid::Uuid::new_v4();
        self.show_notice(prompts::NOTICE_NEW_CHAT);
        tracing::info!(session = %self.session_id, "new chat started");
    }

    // ----- driving requests -----

    /// Execute `request` against `service` and merge the result
    pub async fn run(&mut self, service: &dyn AiService, request: Request) {
        let completion = service::execute(service, request).await;
        self.complete(completion);
    }

    /// `submit` followed by `run` when a request is produced
    pub async fn submit_and_wait(&mut self, service: &dyn AiService) -> bool {
        match self.submit() {
            Some(request) => {
                self.run(service, request).await;
                true
            }
            None => false,
        }
    }
}
