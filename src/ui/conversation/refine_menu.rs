use crate::conversation::{RefineKind, RefineMenu, RefineOption};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

/// Popup listing the numbered refinement options for the targeted message
pub struct RefineMenuView<'a> {
    menu: &'a RefineMenu,
}

impl<'a> RefineMenuView<'a> {
    pub fn new(menu: &'a RefineMenu) -> Self {
        Self { menu }
    }

    /// Rows needed to show every option plus header, footer and borders
    pub fn desired_height(&self) -> u16 {
        RefineOption::entries(self.menu.kind).len() as u16 + 5
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let mut previous_category = "";

        for (index, option) in RefineOption::entries(self.menu.kind).iter().enumerate() {
            let selected = option.is_selected(&self.menu.selections);
            let category = if option.category() != previous_category {
                previous_category = option.category();
                format!("{:<8}", option.category())
            } else {
                " ".repeat(8)
            };

            let marker = if selected { "[x]" } else { "[ ]" };
            let style = if selected {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            lines.push(Line::from(vec![
                Span::styled(category, Style::default().fg(Color::Gray)),
                Span::styled(format!(" {} ", index + 1), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{marker} {}", option.label()), style),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            "1-9 toggle · Enter refine · Esc cancel",
            Style::default().fg(Color::DarkGray),
        )]));
        lines
    }
}

impl Widget for RefineMenuView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.menu.kind {
            RefineKind::Text => format!("🪄 Refine text {}", self.menu.target),
            RefineKind::Image => format!("🪄 Refine image {}", self.menu.target),
        };

        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().fg(Color::Magenta));
        let inner = block.inner(area);
        block.render(area, buf);

        for (i, line) in self.lines().iter().enumerate() {
            if i >= inner.height as usize {
                break;
            }
            buf.set_line(inner.x + 1, inner.y + i as u16, line, inner.width.saturating_sub(1));
        }
    }
}
