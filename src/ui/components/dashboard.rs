use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::practice::PracticeMode;
use crate::session::result::SessionResult;
use crate::ui::theme::Theme;

pub struct Dashboard<'a> {
    pub result: &'a SessionResult,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(result: &'a SessionResult, theme: &'a Theme) -> Self {
        Self { result, theme }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let title = if self.result.completed {
            t!("result.title")
        } else {
            t!("result.title_incomplete")
        };
        let block = Block::bordered()
            .title(title.to_string())
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(2),
                Constraint::Length(1),
            ])
            .split(inner);

        let mode = match self.result.mode {
            PracticeMode::Dictation => t!("mode.dictation"),
            PracticeMode::Translation => t!("mode.translation"),
        };
        let heading = format!("{mode} \u{00b7} {}", self.result.deck);
        Paragraph::new(Line::from(Span::styled(
            heading,
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let words_line = Line::from(vec![
            Span::styled(
                format!("  {}", t!("result.words")),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                format!("{}/{}", self.result.solved, self.result.total),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(words_line).render(layout[1], buf);

        let acc_color = if self.result.accuracy >= 90.0 {
            colors.success()
        } else if self.result.accuracy >= 70.0 {
            colors.warning()
        } else {
            colors.error()
        };
        let acc_line = Line::from(vec![
            Span::styled(
                format!("  {}", t!("result.accuracy")),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                format!("{:.1}%", self.result.accuracy),
                Style::default().fg(acc_color).add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(acc_line).render(layout[2], buf);

        let attempts_line = Line::from(vec![
            Span::styled(
                format!("  {}", t!("result.attempts")),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                self.result.attempts.to_string(),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                format!("  (-{})", self.result.misses),
                Style::default().fg(if self.result.misses == 0 {
                    colors.success()
                } else {
                    colors.error()
                }),
            ),
        ]);
        Paragraph::new(attempts_line).render(layout[3], buf);

        let time_line = Line::from(vec![
            Span::styled(
                format!("  {}", t!("result.time")),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(
                format!("{:.1}s", self.result.elapsed_secs),
                Style::default().fg(colors.fg()),
            ),
        ]);
        Paragraph::new(time_line).render(layout[4], buf);

        let hardest = if self.result.hardest.is_empty() {
            t!("result.none").to_string()
        } else {
            self.result.hardest.join(", ")
        };
        let hardest_line = Line::from(vec![
            Span::styled(
                format!("  {}", t!("result.hardest")),
                Style::default().fg(colors.fg()),
            ),
            Span::styled(hardest, Style::default().fg(colors.warning())),
        ]);
        Paragraph::new(hardest_line)
            .wrap(Wrap { trim: false })
            .render(layout[5], buf);

        Paragraph::new(Line::from(Span::styled(
            t!("result.footer").to_string(),
            Style::default().fg(colors.accent()),
        )))
        .render(layout[6], buf);
    }
}
