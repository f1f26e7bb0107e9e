use crate::cards::Card;
use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;

/// Area inside a one-cell border.
pub(super) fn inner(area: Rect) -> Rect {
    area.inner(Margin::new(1, 1))
}

pub(super) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(r);
    let [_, area, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    area
}

/// A card as a coloured span, red suits in red.
pub(super) fn card_span(card: Card) -> Span<'static> {
    let color = if card.suit().is_red() { Color::Red } else { Color::White };
    let text = format!("{}{}", card.rank().label(), card.suit().symbol());
    Span::styled(text, Style::default().fg(color))
}
