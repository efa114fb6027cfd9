use api_types::Amount;
use expenses::view::format_amount;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
};

use crate::ui::theme::Theme;

/// A rupee amount in the regular text color.
#[must_use]
pub fn styled_amount(amount: Amount, theme: &Theme) -> Span<'static> {
    Span::styled(format_amount(amount), Style::default().fg(theme.text))
}

/// Bold accent for headline totals.
#[must_use]
pub fn styled_amount_bold(amount: Amount, theme: &Theme) -> Span<'static> {
    Span::styled(
        format_amount(amount),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    )
}

/// Share of `part` in `whole` as a 0..=1 ratio for gauges.
pub fn ratio(part: Amount, whole: Amount) -> f64 {
    if !whole.is_positive() {
        return 0.0;
    }
    (part.minor() as f64 / whole.minor() as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_clamped() {
        let whole = Amount::from_minor(10_000);
        assert_eq!(ratio(Amount::from_minor(2_500), whole), 0.25);
        assert_eq!(ratio(Amount::from_minor(20_000), whole), 1.0);
        assert_eq!(ratio(Amount::from_minor(100), Amount::ZERO), 0.0);
    }

    #[test]
    fn amounts_carry_the_currency_symbol() {
        let span = styled_amount(Amount::from_minor(5_000), &Theme::default());
        assert_eq!(span.content, "₹50.00");
    }
}
