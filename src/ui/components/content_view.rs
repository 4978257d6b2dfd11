use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Tabs, Widget, Wrap};

use skillmate::content::ContentPayload;
use skillmate::session::QuizState;

use crate::app::Section;
use crate::ui::components::quiz_view::QuizView;
use crate::ui::theme::Theme;

pub struct ContentView<'a> {
    pub content: &'a ContentPayload,
    pub quiz: &'a QuizState,
    pub sections: &'a [Section],
    pub section: Section,
    pub selected_question: usize,
    pub scroll: u16,
    pub theme: &'a Theme,
}

impl ContentView<'_> {
    fn meta_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut details = vec![Span::styled(
            format!("Level: {}", self.content.difficulty_label()),
            Style::default().fg(colors.text_muted()),
        )];
        if let Some(generated) = self.content.generated_at_display() {
            details.push(Span::styled(
                format!("   Generated: {generated}"),
                Style::default().fg(colors.text_muted()),
            ));
        }
        vec![
            Line::from(Span::styled(
                format!("Learning: {}", self.content.skill_label()),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(details),
        ]
    }

    fn numbered(items: &[String]) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(items.len() * 2);
        for (i, item) in items.iter().enumerate() {
            lines.push(Line::from(format!("{}. {item}", i + 1)));
            lines.push(Line::from(""));
        }
        lines
    }

    fn body_lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        match self.section {
            Section::Lessons => Self::numbered(&self.content.micro_lessons),
            Section::Exercises => Self::numbered(&self.content.exercises),
            Section::Takeaways => self
                .content
                .key_takeaways
                .iter()
                .map(|item| Line::from(format!("  * {item}")))
                .collect(),
            Section::Videos => {
                let mut lines = Vec::new();
                for video in &self.content.videos {
                    lines.push(Line::from(Span::styled(
                        video.title.clone(),
                        Style::default()
                            .fg(colors.fg())
                            .add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(Span::styled(
                        format!("  {}", video.url),
                        Style::default()
                            .fg(colors.accent())
                            .add_modifier(Modifier::UNDERLINED),
                    )));
                    if !video.description.is_empty() {
                        lines.push(Line::from(Span::styled(
                            format!("  {}", video.description),
                            Style::default().fg(colors.text_muted()),
                        )));
                    }
                    lines.push(Line::from(""));
                }
                lines
            }
            // Rendered by QuizView.
            Section::Quiz => Vec::new(),
        }
    }
}

impl Widget for ContentView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(3),
            ])
            .split(area);

        Paragraph::new(self.meta_lines())
            .style(Style::default().bg(colors.bg()))
            .render(layout[0], buf);

        let titles: Vec<&str> = self.sections.iter().map(|s| s.tab_label()).collect();
        let selected = self
            .sections
            .iter()
            .position(|s| *s == self.section)
            .unwrap_or(0);
        Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(colors.text_muted()))
            .highlight_style(
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )
            .render(layout[1], buf);

        let block = Block::bordered()
            .title(format!(" {} ", self.section.title()))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()).fg(colors.fg()));
        let inner = block.inner(layout[2]);
        block.render(layout[2], buf);

        if self.section == Section::Quiz {
            QuizView {
                mcqs: &self.content.mcqs,
                quiz: self.quiz,
                selected: self.selected_question,
                theme: self.theme,
            }
            .render(inner, buf);
        } else {
            Paragraph::new(self.body_lines())
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0))
                .render(inner, buf);
        }
    }
}
