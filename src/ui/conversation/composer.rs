use crate::events::Mode;
use crate::ui::conversation::commands::{command_entries, parse_slash_command, CommandEntry, ParsedCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    /// Enter on non-command input: send the session input as is
    Submit,
    /// Enter on a slash command; the input has been cleared
    Command(ParsedCommand),
    None,
}

/// Input line editor. The text itself lives in the session state; the
/// composer keeps the cursor (a char index) and the command palette.
#[derive(Debug, Clone)]
pub struct Composer {
    cursor: usize,
    command_entries: Vec<CommandEntry>,
    filtered_commands: Vec<CommandEntry>,
    show_command_palette: bool,
    selected_command: Option<usize>,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// A typed command that can run as is, without completing from the palette
fn is_complete_command(input: &str) -> bool {
    parse_slash_command(input)
        .is_some_and(|parsed| parsed.argument.is_some() || !parsed.command.requires_argument())
}

impl Composer {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            command_entries: command_entries(),
            filtered_commands: Vec::new(),
            show_command_palette: false,
            selected_command: None,
        }
    }

    /// Handle key input, editing `input` in place
    pub fn handle_key(&mut self, key: KeyEvent, input: &mut String) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }
        self.clamp(input);

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.contains(KeyModifiers::SHIFT) || key.modifiers.contains(KeyModifiers::ALT) {
                    self.insert_char(input, '\n');
                } else if self.show_command_palette
                    && !input.contains(char::is_whitespace)
                    && !is_complete_command(input)
                {
                    if self.apply_selected_command(input) {
                        return ComposerResult::None;
                    }
                } else {
                    self.close_command_palette();
                    if let Some(command) = parse_slash_command(input) {
                        input.clear();
                        self.cursor = 0;
                        return ComposerResult::Command(command);
                    }
                    self.cursor = 0;
                    return ComposerResult::Submit;
                }
            }
            KeyCode::Up => {
                if self.show_command_palette {
                    self.move_command_selection(-1);
                }
            }
            KeyCode::Down => {
                if self.show_command_palette {
                    self.move_command_selection(1);
                }
            }
            KeyCode::Esc => {
                if self.show_command_palette {
                    self.close_command_palette();
                }
            }
            KeyCode::Tab => {
                if self.show_command_palette {
                    self.apply_selected_command(input);
                }
            }
            KeyCode::Char(c) => {
                self.insert_char(input, c);
                self.refresh_palette_after_edit(input);
            }
            KeyCode::Backspace => {
                if self.backspace(input) {
                    self.refresh_palette_after_edit(input);
                }
            }
            KeyCode::Delete => {
                if self.delete(input) {
                    self.refresh_palette_after_edit(input);
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor < input.chars().count() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = input.chars().count();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert pasted text at the cursor
    pub fn paste(&mut self, input: &mut String, text: &str) {
        self.clamp(input);
        let at = byte_index(input, self.cursor);
        input.insert_str(at, text);
        self.cursor += text.chars().count();
    }

    /// Move the cursor to the end, e.g. after the input was replaced by an edit or reply
    pub fn move_to_end(&mut self, input: &str) {
        self.cursor = input.chars().count();
        self.close_command_palette();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_palette_open(&self) -> bool {
        self.show_command_palette
    }

    fn clamp(&mut self, input: &str) {
        self.cursor = self.cursor.min(input.chars().count());
    }

    fn insert_char(&mut self, input: &mut String, c: char) {
        let at = byte_index(input, self.cursor);
        input.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    fn backspace(&mut self, input: &mut String) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = byte_index(input, self.cursor);
        input.remove(at);
        true
    }

    /// Delete character at cursor
    fn delete(&mut self, input: &mut String) -> bool {
        if self.cursor >= input.chars().count() {
            return false;
        }
        let at = byte_index(input, self.cursor);
        input.remove(at);
        true
    }

    fn refresh_palette_after_edit(&mut self, input: &str) {
        let typing_command = input.starts_with('/') && !input.contains(char::is_whitespace);
        if typing_command {
            if !self.show_command_palette {
                self.show_command_palette = true;
                self.selected_command = Some(0);
            }
            self.refresh_command_palette(input);
        } else {
            self.close_command_palette();
        }
    }

    fn close_command_palette(&mut self) {
        self.show_command_palette = false;
        self.filtered_commands.clear();
        self.selected_command = None;
    }

    fn refresh_command_palette(&mut self, input: &str) {
        let query = input.trim_start_matches('/').to_lowercase();
        self.filtered_commands = self
            .command_entries
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .copied()
            .collect();

        if self.filtered_commands.is_empty() {
            self.selected_command = None;
        } else {
            let index = self.selected_command.unwrap_or(0);
            self.selected_command = Some(index.min(self.filtered_commands.len() - 1));
        }
    }

    fn move_command_selection(&mut self, delta: isize) {
        if self.filtered_commands.is_empty() {
            self.selected_command = None;
            return;
        }

        let current = self.selected_command.unwrap_or(0) as isize;
        let len = self.filtered_commands.len() as isize;
        let next = (current + delta).rem_euclid(len);
        self.selected_command = Some(next as usize);
    }

    fn apply_selected_command(&mut self, input: &mut String) -> bool {
        let Some(entry) = self
            .selected_command
            .and_then(|index| self.filtered_commands.get(index))
            .copied()
        else {
            return false;
        };

        *input = if entry.command.requires_argument() {
            format!("/{} ", entry.keyword)
        } else {
            format!("/{}", entry.keyword)
        };
        self.cursor = input.chars().count();
        self.close_command_palette();
        true
    }

    /// Height the composer wants for `input`, borders included
    pub fn desired_height(input: &str) -> u16 {
        let lines = input.split('\n').count().clamp(1, 6) as u16;
        lines + 2
    }

    pub fn render(&self, input: &str, mode: Mode, editing: bool, area: Rect, buf: &mut Buffer) {
        let title = match (editing, mode) {
            (true, _) => "✏️  Editing message - Enter to resend, Esc to cancel".to_string(),
            (false, Mode::Chat) => "💬 Chat".to_string(),
            (false, Mode::Image) => "🎨 Image".to_string(),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(Color::Green));

        let inner_area = block.inner(area);
        block.render(area, buf);

        if input.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                crate::prompts::placeholder(mode),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content = input.to_string();
            content.insert(byte_index(input, self.cursor.min(input.chars().count())), '▌');

            let lines: Vec<&str> = content.split('\n').collect();
            let height = inner_area.height as usize;
            let start = lines.len().saturating_sub(height);
            for (i, line_text) in lines[start..].iter().enumerate() {
                let line = Line::from(vec![Span::styled(*line_text, Style::default().fg(Color::White))]);
                buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
            }
        }

        if self.show_command_palette && !self.filtered_commands.is_empty() {
            self.render_palette(area, buf);
        }
    }

    fn render_palette(&self, composer_area: Rect, buf: &mut Buffer) {
        let palette_height = (self.filtered_commands.len().min(6) + 2) as u16;
        let palette_area = Rect {
            x: composer_area.x,
            y: composer_area.y.saturating_sub(palette_height),
            width: composer_area.width,
            height: palette_height.min(composer_area.y),
        };
        if palette_area.height < 3 {
            return;
        }

        Clear.render(palette_area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Commands")
            .style(Style::default().fg(Color::Blue));
        let inner = block.inner(palette_area);
        block.render(palette_area, buf);

        for (index, entry) in self.filtered_commands.iter().enumerate() {
            if index >= inner.height as usize {
                break;
            }

            let style = if self.selected_command == Some(index) {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let line = Line::from(vec![
                Span::styled(format!("/{}", entry.keyword), style),
                Span::styled(" — ", Style::default().fg(Color::DarkGray)),
                Span::styled(entry.description, Style::default().fg(Color::Gray)),
            ]);

            buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
        }
    }
}
