use crate::conversation::SessionState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// One-line status bar: pending requests, the current notice, and any attachment
pub struct StatusLine<'a> {
    session: &'a SessionState,
}

impl<'a> StatusLine<'a> {
    pub fn new(session: &'a SessionState) -> Self {
        Self { session }
    }

    fn loading_label(&self) -> Option<&'static str> {
        let loading = self.session.loading;
        if loading.image_generation {
            Some("Sparkle is painting")
        } else if loading.analysis {
            Some("Sparkle is looking at your image")
        } else if loading.chat {
            Some("Sparkle is thinking")
        } else {
            None
        }
    }
}

fn animated_dots() -> &'static str {
    let ticks = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / 300;
    match ticks % 4 {
        0 => ".",
        1 => "..",
        2 => "...",
        _ => "   ",
    }
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut spans = Vec::new();

        if let Some(label) = self.loading_label() {
            spans.push(Span::styled(format!("✨ {label}"), Style::default().fg(Color::Green)));
            spans.push(Span::styled(animated_dots(), Style::default().fg(Color::Yellow)));
            spans.push(Span::raw("  "));
        }

        if let Some(image) = &self.session.attached_image {
            spans.push(Span::styled(
                format!("📎 {}", image.summary()),
                Style::default().fg(Color::Magenta),
            ));
            spans.push(Span::raw("  "));
        }

        if let Some(id) = self.session.editing_id {
            spans.push(Span::styled(format!("✏️  editing {id}"), Style::default().fg(Color::Yellow)));
            spans.push(Span::raw("  "));
        }

        if let Some(notice) = self.session.notice_text() {
            spans.push(Span::styled(
                notice.to_string(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ));
        }

        if spans.is_empty() {
            spans.push(Span::styled(
                "/help for commands · Ctrl+T switch mode · Ctrl+C quit",
                Style::default().fg(Color::DarkGray),
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
