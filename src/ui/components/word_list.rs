use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::ui::theme::Theme;
use crate::vocab::VocabularyItem;

/// The words of the chosen deck with a checkbox each. Only checked words are
/// practiced.
pub struct WordList<'a> {
    items: &'a [VocabularyItem],
    checked: &'a [bool],
    cursor: usize,
    theme: &'a Theme,
}

impl<'a> WordList<'a> {
    pub fn new(
        items: &'a [VocabularyItem],
        checked: &'a [bool],
        cursor: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            items,
            checked,
            cursor,
            theme,
        }
    }
}

impl Widget for WordList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let selected = self.checked.iter().filter(|&&c| c).count();

        let block = Block::bordered()
            .title(format!(
                " {} ",
                t!("words.title", selected = selected, total = self.items.len())
            ))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                t!("words.empty").to_string(),
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let visible = inner.height as usize;
        if visible == 0 {
            return;
        }
        let offset = self.cursor.saturating_sub(visible - 1);
        let french_width = self
            .items
            .iter()
            .map(|i| i.french.chars().count())
            .max()
            .unwrap_or(0);

        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, item)| {
                let is_cursor = i == self.cursor;
                let is_checked = self.checked.get(i).copied().unwrap_or(false);
                let indicator = if is_cursor { ">" } else { " " };
                let mark = if is_checked { "[x]" } else { "[ ]" };

                let french_style = match (is_cursor, is_checked) {
                    (true, _) => Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                    (false, true) => Style::default().fg(colors.fg()),
                    (false, false) => Style::default().fg(colors.text_pending()),
                };
                Line::from(vec![
                    Span::styled(format!("{indicator} {mark} "), french_style),
                    Span::styled(format!("{:<french_width$}  ", item.french), french_style),
                    Span::styled(
                        item.english.clone(),
                        Style::default().fg(colors.text_pending()),
                    ),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
