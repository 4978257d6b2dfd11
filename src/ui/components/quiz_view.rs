use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget, Wrap};

use skillmate::content::Mcq;
use skillmate::session::{QuestionStatus, QuizState};

use crate::ui::layout::wrapped_line_count;
use crate::ui::theme::Theme;

pub struct QuizView<'a> {
    pub mcqs: &'a [Mcq],
    pub quiz: &'a QuizState,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl QuizView<'_> {
    fn question_lines(&self, index: usize, mcq: &Mcq) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let status = self.quiz.status(index, mcq);
        let chosen = self.quiz.answers.get(&index).copied();
        let is_selected = index == self.selected && !self.quiz.submitted;

        let question_color = match status {
            QuestionStatus::Correct => colors.correct(),
            QuestionStatus::Incorrect => colors.incorrect(),
            QuestionStatus::Unanswered if is_selected => colors.accent(),
            QuestionStatus::Unanswered => colors.fg(),
        };
        let indicator = if is_selected { ">" } else { " " };

        let mut lines = vec![Line::from(Span::styled(
            format!("{indicator} {}. {}", index + 1, mcq.question),
            Style::default()
                .fg(question_color)
                .add_modifier(Modifier::BOLD),
        ))];

        for (opt_idx, option) in mcq.options.iter().enumerate() {
            let radio = if chosen == Some(opt_idx) { "(*)" } else { "( )" };
            let is_answer = self.quiz.submitted && opt_idx == mcq.answer;
            let style = if is_answer {
                Style::default()
                    .fg(colors.correct())
                    .add_modifier(Modifier::BOLD)
            } else if self.quiz.submitted && chosen == Some(opt_idx) {
                Style::default().fg(colors.incorrect())
            } else {
                Style::default().fg(colors.fg())
            };
            lines.push(Line::from(Span::styled(
                format!("     {radio} {}. {option}", opt_idx + 1),
                style,
            )));
        }

        if self.quiz.submitted {
            let answer_text = mcq.correct_option().unwrap_or("?");
            let (text, color) = match (status, chosen) {
                (QuestionStatus::Correct, _) => ("     Correct!".to_string(), colors.correct()),
                (_, Some(_)) => (
                    format!("     Incorrect. The correct answer is: {answer_text}"),
                    colors.incorrect(),
                ),
                (_, None) => (
                    format!("     Correct answer: {answer_text}"),
                    colors.text_muted(),
                ),
            };
            lines.push(Line::from(Span::styled(text, Style::default().fg(color))));
        }

        lines.push(Line::from(""));
        lines
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(area);
        let body = layout[0];

        let mut lines: Vec<Line> = Vec::new();
        let mut selected_top = 0usize;
        let mut selected_height = 0usize;
        let width = body.width as usize;
        for (i, mcq) in self.mcqs.iter().enumerate() {
            let q_lines = self.question_lines(i, mcq);
            let height: usize = q_lines
                .iter()
                .map(|l| wrapped_line_count(&l.to_string(), width))
                .sum();
            if i == self.selected {
                selected_top = lines
                    .iter()
                    .map(|l| wrapped_line_count(&l.to_string(), width))
                    .sum();
                selected_height = height;
            }
            lines.extend(q_lines);
        }

        // Keep the highlighted question on screen.
        let visible = body.height as usize;
        let scroll = if selected_top + selected_height > visible {
            (selected_top + selected_height - visible).min(selected_top)
        } else {
            0
        };

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll as u16, 0))
            .render(body, buf);

        let summary = if self.quiz.submitted {
            let message = self.quiz.band().map(|b| b.message()).unwrap_or_default();
            Line::from(vec![
                Span::styled(
                    format!(" Your Score: {}%  ", self.quiz.score),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(message, Style::default().fg(colors.fg())),
            ])
        } else {
            Line::from(Span::styled(
                format!(
                    " {}/{} answered",
                    self.quiz.answers.len().min(self.mcqs.len()),
                    self.mcqs.len()
                ),
                Style::default().fg(colors.text_muted()),
            ))
        };
        Paragraph::new(summary).render(layout[1], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillmate::config::Config;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn mcqs() -> Vec<Mcq> {
        vec![
            Mcq {
                question: "Which keyword declares a binding?".to_string(),
                options: vec!["let".to_string(), "var".to_string()],
                answer: 0,
            },
            Mcq {
                question: "Which macro prints?".to_string(),
                options: vec!["echo!".to_string(), "println!".to_string()],
                answer: 1,
            },
        ]
    }

    #[test]
    fn shows_feedback_and_score_after_submit() {
        let theme = Theme::for_mode(&Config::default(), true);
        let mcqs = mcqs();
        let mut quiz = QuizState::new();
        quiz.select(0, 0);
        quiz.select(1, 0);
        quiz.submit(&mcqs);

        let view = QuizView {
            mcqs: &mcqs,
            quiz: &quiz,
            selected: 0,
            theme: &theme,
        };
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("Correct!"));
        assert!(text.contains("The correct answer is: println!"));
        assert!(text.contains("Your Score: 50%"));
        assert!(text.contains("Keep practicing!"));
    }

    #[test]
    fn shows_progress_before_submit() {
        let theme = Theme::for_mode(&Config::default(), false);
        let mcqs = mcqs();
        let mut quiz = QuizState::new();
        quiz.select(1, 1);

        let view = QuizView {
            mcqs: &mcqs,
            quiz: &quiz,
            selected: 1,
            theme: &theme,
        };
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("1/2 answered"));
        assert!(text.contains("> 2. Which macro prints?"));
        assert!(!text.contains("Your Score"));
    }
}
