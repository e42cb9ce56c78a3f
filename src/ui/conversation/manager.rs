use crate::clipboard::{Clipboard, Osc52Clipboard};
use crate::config::Config;
use crate::conversation::{Completion, ConversationController, MessageId, Request};
use crate::image::ImagePayload;
use crate::prompts;
use crate::ui::conversation::{
    get_help_text, Composer, ComposerResult, ConversationHistory, ParsedCommand, RefineMenuView,
    SlashCommand, StatusLine,
};
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Widget},
};
use std::path::PathBuf;

/// Actions that can be requested by the conversation manager
#[derive(Debug, PartialEq)]
pub enum ConversationAction {
    None,
    /// Send this request to the AI service in the background
    Dispatch(Request),
    Exit,
}

/// Glue between terminal input and the conversation controller
pub struct ConversationManager {
    controller: ConversationController,
    composer: Composer,
    clipboard: Box<dyn Clipboard>,
    show_help: bool,
    scroll_offset: usize,
}

impl ConversationManager {
    pub fn new(config: &Config) -> Self {
        Self::with_clipboard(config, Box::new(Osc52Clipboard::stdout()))
    }

    pub fn with_clipboard(config: &Config, clipboard: Box<dyn Clipboard>) -> Self {
        Self {
            controller: ConversationController::new(&config.ui),
            composer: Composer::new(),
            clipboard,
            show_help: false,
            scroll_offset: 0,
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    /// Merge a finished request back into the conversation
    pub fn complete(&mut self, completion: Completion) {
        self.controller.complete(completion);
        self.scroll_offset = 0;
    }

    /// Periodic housekeeping; returns whether anything visible changed
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        self.controller.expire_notice(now) || self.controller.session().loading.any()
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.controller.session().show_refine_menu() {
            return;
        }
        let composer = &mut self.composer;
        composer.paste(self.controller.input_mut(), text);
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return ConversationAction::Exit,
                KeyCode::Char('t') => {
                    self.controller.toggle_mode();
                    self.composer.move_to_end(self.controller.input());
                    return ConversationAction::None;
                }
                KeyCode::Char('n') => {
                    self.new_chat();
                    return ConversationAction::None;
                }
                _ => {}
            }
        }

        if self.show_help {
            self.show_help = false;
            return ConversationAction::None;
        }

        if self.controller.session().show_refine_menu() {
            return self.handle_refine_key(key);
        }

        match key.code {
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_add(5);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(5);
                return ConversationAction::None;
            }
            KeyCode::Esc if self.controller.session().editing_id.is_some() && !self.composer.is_palette_open() => {
                self.controller.cancel_edit();
                self.composer.move_to_end(self.controller.input());
                return ConversationAction::None;
            }
            _ => {}
        }

        let result = {
            let composer = &mut self.composer;
            composer.handle_key(key, self.controller.input_mut())
        };

        match result {
            ComposerResult::Submit => match self.controller.submit() {
                Some(request) => {
                    self.scroll_offset = 0;
                    ConversationAction::Dispatch(request)
                }
                None => {
                    self.composer.move_to_end(self.controller.input());
                    ConversationAction::None
                }
            },
            ComposerResult::Command(command) => self.handle_slash_command(command),
            ComposerResult::None => ConversationAction::None,
        }
    }

    fn handle_refine_key(&mut self, key: KeyEvent) -> ConversationAction {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                let index = c as usize - '1' as usize;
                self.controller.toggle_option(index);
                ConversationAction::None
            }
            KeyCode::Enter => match self.controller.confirm_refine() {
                Some(request) => ConversationAction::Dispatch(request),
                None => ConversationAction::None,
            },
            KeyCode::Esc => {
                self.controller.cancel_refine();
                ConversationAction::None
            }
            _ => ConversationAction::None,
        }
    }

    fn new_chat(&mut self) {
        self.controller.start_new_chat();
        self.composer.move_to_end(self.controller.input());
        self.scroll_offset = 0;
    }

    /// Resolve a message id argument, reporting bad input as a notice
    fn message_argument(&mut self, command: &ParsedCommand) -> Option<MessageId> {
        let Some(id) = command.message_id() else {
            self.controller
                .show_notice(&format!("Usage: /{} <id>", command.command.command()));
            return None;
        };
        if self.controller.message(id).is_none() {
            self.controller.show_notice(prompts::NOTICE_NO_SUCH_MESSAGE);
            return None;
        }
        Some(id)
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        tracing::debug!(command = command.command.command(), "slash command");

        match command.command {
            SlashCommand::Mode => match command.mode_target() {
                Some(mode) => self.controller.set_mode(mode),
                None => self.controller.toggle_mode(),
            },
            SlashCommand::New => self.new_chat(),
            SlashCommand::Edit => {
                if let Some(id) = self.message_argument(&command) {
                    if !self.controller.edit_message(id) {
                        self.controller.show_notice(prompts::NOTICE_NOT_EDITABLE);
                    }
                }
            }
            SlashCommand::Reply => {
                if let Some(id) = self.message_argument(&command) {
                    self.controller.reply_to(id);
                }
            }
            SlashCommand::Copy => {
                if let Some(id) = self.message_argument(&command) {
                    self.controller.copy_text(id, self.clipboard.as_mut());
                }
            }
            SlashCommand::Refine => {
                if let Some(id) = self.message_argument(&command) {
                    if !self.controller.open_refine(id) {
                        self.controller.show_notice(prompts::NOTICE_NOT_REFINABLE);
                    }
                }
            }
            SlashCommand::Upload => match command.argument() {
                Some(path) => self.upload(path),
                None => self.controller.show_notice("Usage: /upload <path>"),
            },
            SlashCommand::Detach => {
                self.controller.detach_image();
            }
            SlashCommand::Suggest => {
                let applied = command
                    .suggestion_index()
                    .is_some_and(|index| self.controller.apply_suggestion(index));
                if !applied {
                    self.controller.show_notice(prompts::NOTICE_NO_SUGGESTION);
                }
            }
            SlashCommand::Help => self.show_help = true,
            SlashCommand::Quit => return ConversationAction::Exit,
        }

        self.composer.move_to_end(self.controller.input());
        ConversationAction::None
    }

    fn upload(&mut self, path: &str) {
        let path = expand_home(path);
        match ImagePayload::from_path(&path) {
            Ok(image) => {
                tracing::info!(path = %path.display(), "image attached");
                self.controller.attach_image(image);
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "image upload failed");
                self.controller.show_notice(&format!("Upload failed: {err}"));
            }
        }
    }

    /// Render the conversation UI components
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let session = self.controller.session();
        let composer_height = Composer::desired_height(self.controller.input());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(composer_height),
            ])
            .split(area);

        ConversationHistory::new(self.controller.messages(), session.mode)
            .scroll_offset(self.scroll_offset)
            .render(chunks[0], buf);
        StatusLine::new(session).render(chunks[1], buf);
        self.composer.render(
            self.controller.input(),
            session.mode,
            session.editing_id.is_some(),
            chunks[2],
            buf,
        );

        if let Some(menu) = &session.refine {
            let view = RefineMenuView::new(menu);
            let popup = popup_area(chunks[0], 48, view.desired_height());
            view.render(popup, buf);
        }

        if self.show_help {
            render_help(chunks[0], buf);
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Centered rectangle of at most `width` x `height` inside `area`
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_help(area: Rect, buf: &mut Buffer) {
    let help = get_help_text();
    let lines: Vec<Line> = help.lines().map(Line::from).collect();
    let popup = popup_area(area, 100, lines.len() as u16 + 3);

    Clear.render(popup, buf);
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Help · any key to close")
        .style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    block.render(popup, buf);

    for (i, line) in lines.iter().enumerate().take(inner.height as usize) {
        buf.set_line(inner.x + 1, inner.y + i as u16, line, inner.width.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Mode, Sender};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedClipboard(Arc<Mutex<Vec<String>>>);

    impl Clipboard for SharedClipboard {
        fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn manager() -> (ConversationManager, SharedClipboard) {
        let clipboard = SharedClipboard::default();
        let config = Config::default();
        (ConversationManager::with_clipboard(&config, Box::new(clipboard.clone())), clipboard)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn is_user(manager: &ConversationManager, id: MessageId) -> bool {
        manager
            .controller()
            .message(id)
            .is_some_and(|message| message.sender == Sender::User)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_line(manager: &mut ConversationManager, text: &str) -> ConversationAction {
        for c in text.chars() {
            manager.handle_key(key(KeyCode::Char(c)));
        }
        manager.handle_key(key(KeyCode::Enter))
    }

    fn answer_first_chat(manager: &mut ConversationManager) -> MessageId {
        let ConversationAction::Dispatch(Request::Chat { reply_to, .. }) = type_line(manager, "hello") else {
            panic!("expected chat dispatch");
        };
        manager.complete(Completion::Chat {
            result: Ok("hi there".into()),
            reply_to,
        });
        reply_to
    }

    #[test]
    fn enter_dispatches_chat_request() {
        let (mut manager, _) = manager();
        let user = answer_first_chat(&mut manager);
        assert!(is_user(&manager, user));
        assert_eq!(manager.controller().messages().len(), 2);
        assert!(manager.controller().input().is_empty());
    }

    #[test]
    fn control_keys_toggle_mode_and_exit() {
        let (mut manager, _) = manager();
        manager.handle_key(ctrl('t'));
        assert_eq!(manager.controller().session().mode, Mode::Image);
        assert_eq!(manager.handle_key(ctrl('c')), ConversationAction::Exit);
        assert_eq!(type_line(&mut manager, "/bye"), ConversationAction::Exit);
    }

    #[test]
    fn copy_command_uses_clipboard() {
        let (mut manager, clipboard) = manager();
        answer_first_chat(&mut manager);
        type_line(&mut manager, "/copy #2");
        assert_eq!(clipboard.0.lock().unwrap().as_slice(), ["hi there".to_string()]);
        assert_eq!(manager.controller().session().notice_text(), Some(prompts::NOTICE_COPIED));
    }

    #[test]
    fn unknown_ids_produce_notices() {
        let (mut manager, _) = manager();
        type_line(&mut manager, "/reply 42");
        assert_eq!(
            manager.controller().session().notice_text(),
            Some(prompts::NOTICE_NO_SUCH_MESSAGE)
        );
        type_line(&mut manager, "/edit last");
        assert_eq!(manager.controller().session().notice_text(), Some("Usage: /edit <id>"));
    }

    #[test]
    fn editing_ai_message_is_refused() {
        let (mut manager, _) = manager();
        answer_first_chat(&mut manager);
        type_line(&mut manager, "/edit 2");
        assert!(manager.controller().session().editing_id.is_none());
        assert_eq!(manager.controller().session().notice_text(), Some(prompts::NOTICE_NOT_EDITABLE));
    }

    #[test]
    fn refine_menu_keys_drive_refinement() {
        let (mut manager, _) = manager();
        answer_first_chat(&mut manager);
        type_line(&mut manager, "/refine 2");
        assert!(manager.controller().session().show_refine_menu());

        manager.handle_key(key(KeyCode::Char('2')));
        let action = manager.handle_key(key(KeyCode::Enter));
        let ConversationAction::Dispatch(Request::RefineText { target, turns }) = action else {
            panic!("expected text refinement");
        };
        assert_eq!(target, MessageId(2));
        assert!(turns.last().unwrap().text.contains("make it longer."));
        assert!(!manager.controller().session().show_refine_menu());
    }

    #[test]
    fn refining_own_message_is_refused() {
        let (mut manager, _) = manager();
        let user = answer_first_chat(&mut manager);
        type_line(&mut manager, &format!("/refine {}", user.0));
        assert!(!manager.controller().session().show_refine_menu());
        assert_eq!(manager.controller().session().notice_text(), Some(prompts::NOTICE_NOT_REFINABLE));
    }

    #[test]
    fn second_send_waits_for_pending_reply() {
        let (mut manager, _) = manager();
        let first = type_line(&mut manager, "one");
        let ConversationAction::Dispatch(Request::Chat { reply_to, .. }) = first else {
            panic!("expected chat dispatch");
        };

        assert_eq!(type_line(&mut manager, "two"), ConversationAction::None);
        assert_eq!(manager.controller().messages().len(), 1);
        assert_eq!(manager.controller().input(), "two");
        assert_eq!(manager.composer.cursor(), 3);
        assert_eq!(manager.controller().session().notice_text(), Some(prompts::NOTICE_BUSY));

        manager.complete(Completion::Chat {
            result: Ok("first reply".into()),
            reply_to,
        });
        assert!(!manager.controller().session().loading.any());
        assert!(matches!(
            manager.handle_key(key(KeyCode::Enter)),
            ConversationAction::Dispatch(Request::Chat { .. })
        ));
        assert_eq!(manager.controller().messages().len(), 3);
    }

    #[test]
    fn escape_closes_refine_menu() {
        let (mut manager, _) = manager();
        answer_first_chat(&mut manager);
        type_line(&mut manager, "/refine 2");
        manager.handle_key(key(KeyCode::Esc));
        assert!(!manager.controller().session().show_refine_menu());
    }

    #[test]
    fn upload_attaches_image_and_switches_request_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nfake").unwrap();

        let (mut manager, _) = manager();
        type_line(&mut manager, &format!("/upload {}", path.display()));
        assert!(manager.controller().session().attached_image.is_some());

        let action = type_line(&mut manager, "what is this?");
        assert!(matches!(action, ConversationAction::Dispatch(Request::AnalyzeImage { .. })));
        assert!(manager.controller().session().attached_image.is_none());
    }

    #[test]
    fn failed_upload_reports_notice() {
        let (mut manager, _) = manager();
        type_line(&mut manager, "/upload /definitely/not/here.png");
        assert!(manager.controller().session().attached_image.is_none());
        assert!(manager
            .controller()
            .session()
            .notice_text()
            .is_some_and(|text| text.starts_with("Upload failed")));
    }

    #[test]
    fn suggest_fills_input() {
        let (mut manager, _) = manager();
        type_line(&mut manager, "/suggest 1");
        assert_eq!(manager.controller().input(), prompts::suggestions(Mode::Chat)[0]);
        type_line(&mut manager, "/suggest 9");
        assert_eq!(manager.controller().session().notice_text(), Some(prompts::NOTICE_NO_SUGGESTION));
    }

    #[test]
    fn help_popup_closes_on_any_key() {
        let (mut manager, _) = manager();
        type_line(&mut manager, "/help");
        assert!(manager.show_help);
        manager.handle_key(key(KeyCode::Char('x')));
        assert!(!manager.show_help);
        assert!(manager.controller().input().is_empty());
    }

    #[test]
    fn renders_without_panicking_on_small_areas() {
        let (mut manager, _) = manager();
        answer_first_chat(&mut manager);
        type_line(&mut manager, "/refine 2");
        for (w, h) in [(80, 24), (20, 8), (10, 6)] {
            let area = Rect::new(0, 0, w, h);
            let mut buf = Buffer::empty(area);
            manager.render(area, &mut buf);
        }
    }
}
