use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// The English word of a translation drill falling toward the bottom edge.
/// The word reaches the last row when the countdown runs out.
pub struct CountdownBar<'a> {
    word: &'a str,
    fraction: f64,
    remaining_secs: f64,
    theme: &'a Theme,
}

impl<'a> CountdownBar<'a> {
    pub fn new(word: &'a str, fraction: f64, remaining_secs: f64, theme: &'a Theme) -> Self {
        Self {
            word,
            fraction: fraction.clamp(0.0, 1.0),
            remaining_secs,
            theme,
        }
    }

    fn word_row(&self, height: u16) -> u16 {
        if height == 0 {
            return 0;
        }
        ((height - 1) as f64 * self.fraction).round() as u16
    }
}

impl Widget for CountdownBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {:.1}s ", self.remaining_secs))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let color = if self.fraction < 0.6 {
            colors.accent()
        } else if self.fraction < 0.85 {
            colors.warning()
        } else {
            colors.error()
        };

        let y = inner.y + self.word_row(inner.height);
        let width = self.word.chars().count() as u16;
        let x = inner.x + inner.width.saturating_sub(width) / 2;
        buf.set_stringn(
            x,
            y,
            self.word,
            inner.width as usize,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );

        let ground = inner.y + inner.height - 1;
        if y != ground {
            let ground_style = Style::default().fg(colors.bar_empty());
            for gx in inner.x..inner.x + inner.width {
                buf[(gx, ground)]
                    .set_symbol("\u{2581}")
                    .set_style(ground_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_falls_from_top_to_bottom() {
        let theme = Theme::default();
        assert_eq!(CountdownBar::new("cat", 0.0, 5.0, &theme).word_row(10), 0);
        assert_eq!(CountdownBar::new("cat", 1.0, 0.0, &theme).word_row(10), 9);
        assert_eq!(CountdownBar::new("cat", 0.5, 2.5, &theme).word_row(11), 5);
    }

    #[test]
    fn renders_word_into_buffer() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 20, 6);
        let mut buf = Buffer::empty(area);
        CountdownBar::new("dog", 0.0, 5.0, &theme).render(area, &mut buf);
        let row: String = (0..20).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("dog"));
    }
}
