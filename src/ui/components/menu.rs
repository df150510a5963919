use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Dictation,
    Translation,
    ChooseDeck,
    ChooseWords,
    Settings,
}

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme, deck: &str) -> Self {
        let mut menu = Self {
            items: Vec::new(),
            selected: 0,
            theme,
        };
        menu.refresh(deck);
        menu
    }

    /// Rebuild the labels after the locale or the chosen deck changes.
    pub fn refresh(&mut self, deck: &str) {
        self.items = vec![
            MenuItem {
                key: "1".to_string(),
                label: t!("menu.dictation").to_string(),
                description: t!("menu.dictation_desc").to_string(),
                action: MenuAction::Dictation,
            },
            MenuItem {
                key: "2".to_string(),
                label: t!("menu.translation").to_string(),
                description: t!("menu.translation_desc").to_string(),
                action: MenuAction::Translation,
            },
            MenuItem {
                key: "d".to_string(),
                label: t!("menu.deck").to_string(),
                description: t!("menu.deck_desc", deck = deck).to_string(),
                action: MenuAction::ChooseDeck,
            },
            MenuItem {
                key: "w".to_string(),
                label: t!("menu.words").to_string(),
                description: t!("menu.words_desc").to_string(),
                action: MenuAction::ChooseWords,
            },
            MenuItem {
                key: "c".to_string(),
                label: t!("menu.settings").to_string(),
                description: t!("menu.settings_desc").to_string(),
                action: MenuAction::Settings,
            },
        ];
        self.selected = self.selected.min(self.items.len() - 1);
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|item| item.action)
    }
}

impl Widget for &Menu<'_> {
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
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                t!("app.title").to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                t!("app.subtitle").to_string(),
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{}] {}", item.key, item.label);
            let desc_text = format!("     {}", item.description);

            let label_style = if is_selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.fg())
            };
            let lines = vec![
                Line::from(Span::styled(label_text, label_style)),
                Line::from(Span::styled(
                    desc_text,
                    Style::default().fg(colors.text_pending()),
                )),
            ];

            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }
    }
}
