use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use skillmate::content::Difficulty;

use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub struct SearchForm<'a> {
    pub input: &'a LineInput,
    pub difficulty: Difficulty,
    pub loading: bool,
    pub tick: u64,
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
    pub recent_count: usize,
    pub theme: &'a Theme,
}

impl Widget for SearchForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let title = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "SkillMate AI",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Micro lessons and quizzes for any skill",
                Style::default().fg(colors.fg()),
            )),
        ])
        .alignment(Alignment::Center);
        title.render(layout[0], buf);

        let input_style = if self.loading {
            Style::default().fg(colors.text_muted())
        } else {
            Style::default().fg(colors.fg())
        };
        let (before, cursor, after) = self.input.render_parts();
        let mut spans = vec![Span::styled(before, input_style)];
        if !self.loading {
            let cursor_text = cursor.map(String::from).unwrap_or_else(|| " ".to_string());
            spans.push(Span::styled(
                cursor_text,
                Style::default().fg(colors.bg()).bg(colors.accent()),
            ));
        } else if let Some(ch) = cursor {
            spans.push(Span::styled(ch.to_string(), input_style));
        }
        spans.push(Span::styled(after, input_style));
        if self.input.value().is_empty() {
            spans.push(Span::styled(
                "Enter a skill (e.g., Python, Calculus)",
                Style::default().fg(colors.text_muted()),
            ));
        }
        let input_block = Block::bordered()
            .title(" Skill to learn ")
            .border_style(Style::default().fg(if self.loading {
                colors.border()
            } else {
                colors.border_focused()
            }));
        Paragraph::new(Line::from(spans))
            .block(input_block)
            .render(layout[1], buf);

        let mut level_spans = vec![Span::styled(
            " Level: ",
            Style::default().fg(colors.fg()),
        )];
        for level in Difficulty::ALL {
            let style = if level == self.difficulty {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text_muted())
            };
            let marker = if level == self.difficulty { ">" } else { " " };
            level_spans.push(Span::styled(format!("{marker}{} ", level.label()), style));
        }
        Paragraph::new(Line::from(level_spans))
            .block(Block::bordered().border_style(Style::default().fg(colors.border())))
            .render(layout[2], buf);

        let status = if self.loading {
            let frame = SPINNER[(self.tick % SPINNER.len() as u64) as usize];
            Line::from(Span::styled(
                format!(" {frame} Generating..."),
                Style::default().fg(colors.warning()),
            ))
        } else if let Some(err) = self.error {
            Line::from(Span::styled(
                format!(" {err}"),
                Style::default().fg(colors.error()),
            ))
        } else if let Some(notice) = self.notice {
            Line::from(Span::styled(
                format!(" {notice}"),
                Style::default().fg(colors.warning()),
            ))
        } else if self.recent_count > 0 {
            Line::from(Span::styled(
                format!(" {} recent searches saved", self.recent_count),
                Style::default().fg(colors.text_muted()),
            ))
        } else {
            Line::from("")
        };
        Paragraph::new(status)
            .wrap(Wrap { trim: true })
            .render(layout[3], buf);
    }
}
