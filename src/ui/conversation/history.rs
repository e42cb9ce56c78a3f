//! Conversation history display component

use crate::conversation::{Message, MessageLog};
use crate::events::{Mode, Sender};
use crate::prompts;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};

/// Read-only view over the message log
pub struct ConversationHistory<'a> {
    messages: &'a MessageLog,
    mode: Mode,
    /// Lines scrolled up from the bottom
    scroll_offset: usize,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(messages: &'a MessageLog, mode: Mode) -> Self {
        Self {
            messages,
            mode,
            scroll_offset: 0,
        }
    }

    pub fn scroll_offset(mut self, offset: usize) -> Self {
        self.scroll_offset = offset;
        self
    }

    fn welcome_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(vec![Span::styled("Welcome to Sparkle! ✨", Style::default().fg(Color::Green))]),
            Line::from(""),
            Line::from(vec![Span::styled(
                self.mode.description(),
                Style::default().fg(Color::Gray),
            )]),
            Line::from(""),
            Line::from(vec![Span::styled("Try one of these (/suggest <n>):", Style::default().fg(Color::Gray))]),
        ];

        for (i, suggestion) in prompts::suggestions(self.mode).iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}. ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(*suggestion, Style::default().fg(Color::White)),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            "Enter to send, Shift+Enter for a new line, /help for commands.",
            Style::default().fg(Color::DarkGray),
        )]));
        lines
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("✨ Sparkle · {} mode", self.mode.display_name()));

        let inner_area = block.inner(area);
        block.render(area, buf);

        let all_lines = if self.messages.is_empty() {
            self.welcome_lines()
        } else {
            let mut lines = Vec::new();
            for message in self.messages.iter() {
                lines.extend(render_message(message, inner_area.width));
                lines.push(Line::from(""));
            }
            lines
        };

        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_offset = total.saturating_sub(height);
        let offset = self.scroll_offset.min(max_offset);
        let start = max_offset - offset;

        for (i, line) in all_lines.iter().skip(start).take(height).enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        if total > height {
            let mut state = ScrollbarState::new(max_offset).position(start);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(area, buf, &mut state);
        }
    }
}

/// Header plus wrapped body for one message
fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let icon = match message.sender {
        Sender::User => "👤",
        Sender::Ai => "🤖",
    };

    let mut header = vec![
        Span::styled(format!("#{} ", message.id.0), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{icon} {} ", message.display_time()), Style::default().fg(Color::DarkGray)),
    ];
    if message.refined {
        header.push(Span::styled(
            "(refined) ",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC),
        ));
    }
    header.push(Span::styled("─".repeat(20), Style::default().fg(Color::DarkGray)));
    lines.push(Line::from(header));

    if let Some(image) = &message.image {
        let (label, color) = if image.is_placeholder() {
            ("🖼  image unavailable".to_string(), Color::Red)
        } else {
            (format!("🖼  {}", image.summary()), Color::Magenta)
        };
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(label, Style::default().fg(color)),
        ]));
    }

    if !message.text.is_empty() {
        for content_line in wrap_text(&message.text, width.saturating_sub(3) as usize) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(content_line, content_style(message.sender)),
            ]));
        }
    }

    lines
}

/// Word-wrap `text`, keeping explicit line breaks
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.chars().count();
            if current_width > 0 && current_width + word_width + 1 > width {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            if current_width > 0 {
                current_line.push(' ');
                current_width += 1;
            }
            current_line.push_str(word);
            current_width += word_width;
        }

        lines.push(current_line);
    }

    lines
}

fn content_style(sender: Sender) -> Style {
    match sender {
        Sender::User => Style::default().fg(Color::Blue),
        Sender::Ai => Style::default().fg(Color::Green),
    }
}
