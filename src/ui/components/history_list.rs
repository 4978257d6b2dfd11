use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use skillmate::content::ContentPayload;
use skillmate::session::History;

use crate::ui::theme::Theme;

pub struct HistoryList<'a> {
    pub history: &'a History,
    pub selected: usize,
    /// Entries with the same skill are marked active.
    pub current: Option<&'a ContentPayload>,
    pub theme: &'a Theme,
}

impl Widget for HistoryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Recent Searches ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.history.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  No searches yet. Generate some content first.",
                Style::default().fg(colors.text_muted()),
            )))
            .render(inner, buf);
            return;
        }

        let mut lines = vec![Line::from("")];
        for (i, entry) in self.history.iter().enumerate() {
            let is_selected = i == self.selected;
            let is_active = self.current.is_some_and(|c| c.same_skill(entry));
            let indicator = if is_selected { ">" } else { " " };
            let active = if is_active { " *" } else { "" };

            let skill = entry.meta.skill.as_deref().unwrap_or("Unknown");
            let label = format!(" {indicator} {skill} ({}){active}", entry.difficulty_label());
            let when = entry
                .searched_at
                .map(|t| {
                    t.with_timezone(&chrono::Local)
                        .format("  %Y-%m-%d %H:%M")
                        .to_string()
                })
                .unwrap_or_default();

            let mut style = Style::default().fg(if is_active {
                colors.accent()
            } else {
                colors.fg()
            });
            if is_selected {
                style = style.bg(colors.selected_bg()).add_modifier(Modifier::BOLD);
            }
            lines.push(Line::from(vec![
                Span::styled(label, style),
                Span::styled(when, Style::default().fg(colors.text_muted())),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
