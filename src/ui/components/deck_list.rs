use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::ui::theme::Theme;
use crate::vocab::{FilterCriteria, UnitClass};

/// Flattens a class listing into selectable rows. The first row always
/// selects every word the source has.
pub fn deck_entries(classes: &[UnitClass]) -> Vec<FilterCriteria> {
    let mut entries = vec![FilterCriteria::default()];
    for class in classes {
        entries.push(FilterCriteria::new(Some(class.class.clone()), None));
        for unit in &class.units {
            entries.push(FilterCriteria::new(
                Some(class.class.clone()),
                Some(unit.clone()),
            ));
        }
    }
    entries
}

pub struct DeckList<'a> {
    entries: &'a [FilterCriteria],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> DeckList<'a> {
    pub fn new(entries: &'a [FilterCriteria], selected: usize, theme: &'a Theme) -> Self {
        Self {
            entries,
            selected,
            theme,
        }
    }
}

impl Widget for DeckList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", t!("deck.title")))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.entries.len() <= 1 {
            Paragraph::new(Line::from(Span::styled(
                t!("deck.empty").to_string(),
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let visible = inner.height as usize;
        if visible == 0 {
            return;
        }
        let offset = self.selected.saturating_sub(visible.saturating_sub(1));

        let lines: Vec<Line> = self
            .entries
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, entry)| {
                let label = match (&entry.class, &entry.unit) {
                    (None, _) => t!("deck.all").to_string(),
                    (Some(class), None) => class.clone(),
                    (Some(_), Some(unit)) => format!("    {unit}"),
                };
                let is_selected = i == self.selected;
                let indicator = if is_selected { "> " } else { "  " };
                let style = if is_selected {
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD)
                } else if entry.unit.is_none() {
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(format!("{indicator}{label}"), style))
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_start_with_everything_then_classes_and_units() {
        let classes = vec![
            UnitClass {
                class: "beginner".into(),
                units: vec!["animals".into(), "food".into()],
            },
            UnitClass {
                class: "travel".into(),
                units: vec!["transport".into()],
            },
        ];
        let entries = deck_entries(&classes);
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0], FilterCriteria::default());
        assert_eq!(entries[1], FilterCriteria::new(Some("beginner".into()), None));
        assert_eq!(
            entries[3],
            FilterCriteria::new(Some("beginner".into()), Some("food".into()))
        );
        assert_eq!(entries[4].label(), "travel");
    }
}
