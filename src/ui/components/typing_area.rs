use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};
use rust_i18n::t;

use crate::session::display::{SlotKind, masked_slots};
use crate::session::practice::{PracticeMode, PracticeSession};
use crate::ui::theme::Theme;

pub struct TypingArea<'a> {
    session: &'a PracticeSession,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(session: &'a PracticeSession, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    /// The English prompt line, or None when the learner asked to hide it.
    /// Translation drills always show the word in the falling gauge instead.
    fn prompt(&self) -> Option<String> {
        let target = self.session.target()?;
        let config = self.session.config();
        match config.mode {
            PracticeMode::Dictation if config.show_translation_hint => {
                Some(format!("{}  ({})", t!("practice.listen"), target.english))
            }
            PracticeMode::Dictation => Some(t!("practice.listen").to_string()),
            PracticeMode::Translation => Some(t!("practice.translate").to_string()),
        }
    }
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(target) = self.session.target() else {
            return;
        };
        let revealed = self.session.is_revealed();

        let mut lines: Vec<Line> = Vec::new();
        if let Some(prompt) = self.prompt() {
            lines.push(Line::from(Span::styled(
                prompt,
                Style::default().fg(colors.text_pending()),
            )));
        }
        lines.push(Line::from(""));

        // Letters are spaced out so the blanks read as separate slots
        let mut spans: Vec<Span> = Vec::new();
        for slot in masked_slots(&target.french, self.session.typed()) {
            let style = match slot.kind {
                SlotKind::Space => Style::default(),
                SlotKind::Typed if revealed => Style::default()
                    .fg(colors.text_revealed())
                    .add_modifier(Modifier::BOLD),
                SlotKind::Typed => Style::default()
                    .fg(colors.fg())
                    .add_modifier(Modifier::BOLD),
                SlotKind::Pending => Style::default().fg(colors.text_pending()),
            };
            let text = if slot.kind == SlotKind::Space {
                "   ".to_string()
            } else {
                format!("{} ", slot.ch)
            };
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));

        if revealed {
            lines.push(Line::from(Span::styled(
                t!("practice.answer", answer = target.french.as_str()).to_string(),
                Style::default().fg(colors.text_incorrect()),
            )));
            if !self.session.config().show_translation_hint
                || self.session.config().mode == PracticeMode::Translation
            {
                lines.push(Line::from(Span::styled(
                    target.english.clone(),
                    Style::default().fg(colors.text_pending()),
                )));
            }
            let continue_line = if self.session.feedback_pending() {
                t!("practice.waiting").to_string()
            } else {
                t!("practice.continue").to_string()
            };
            lines.push(Line::from(Span::styled(
                continue_line,
                Style::default().fg(colors.accent()),
            )));
        } else if self.session.feedback_pending() {
            lines.push(Line::from(Span::styled(
                t!("practice.waiting").to_string(),
                Style::default().fg(colors.text_pending()),
            )));
        }

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
