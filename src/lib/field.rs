//! State of an amount input field
//!
//! The field keeps the text exactly as typed while it has focus, so that a
//! pending separator (`"1234,"`) is not lost between keystrokes. The value of
//! record is always the canonical amount recomputed from that text.

use crate::lib::amount::{self, Amount, Style};

#[derive(Debug, Clone)]
pub struct AmountField {
    style: Style,
    raw: String,
    value: String,
    focused: bool,
}

impl AmountField {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            raw: String::new(),
            value: String::new(),
            focused: false,
        }
    }

    /// Handle a text-change event, returns the new canonical value
    pub fn on_change(&mut self, raw: &str) -> &str {
        self.raw = raw.to_string();
        self.value = amount::sanitize(raw);
        log::trace!("field input {:?} -> {:?}", self.raw, self.value);
        &self.value
    }

    /// Start editing: the displayed text becomes the canonical value
    pub fn focus(&mut self) {
        if !self.focused {
            self.raw = self.value.clone();
            self.focused = true;
        }
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// What the field currently shows
    pub fn text(&self) -> String {
        if self.focused {
            self.raw.clone()
        } else {
            amount::format_with(&self.value, &self.style)
        }
    }

    /// Canonical value, `""` if nothing was entered
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn number(&self) -> f64 {
        amount::to_number(&self.value)
    }

    pub fn amount(&self) -> Option<Amount> {
        Amount::parse(&self.value)
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.value.clear();
    }
}

impl Default for AmountField {
    fn default() -> Self {
        Self::new(Style::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn typing_keeps_pending_separator() {
        let mut field = AmountField::default();
        field.focus();
        let mut typed = String::new();
        for c in "1234,5".chars() {
            typed.push(c);
            field.on_change(&typed);
        }
        assert_eq!(field.value(), "1234.5");
        assert_eq!(field.text(), "1234,5");
        field.on_change("1234,");
        assert_eq!(field.value(), "1234");
        assert_eq!(field.text(), "1234,");
    }

    #[test]
    fn blur_shows_formatted() {
        let mut field = AmountField::default();
        field.focus();
        field.on_change("₡1.000.000");
        field.blur();
        assert_eq!(field.text(), "₡1.000.000");
        assert_eq!(field.value(), "1000000");
        field.focus();
        assert_eq!(field.text(), "1000000");
    }

    #[test]
    fn numeric_views() {
        let mut field = AmountField::new(Style::en_us());
        assert!(field.number().is_nan());
        assert_eq!(field.amount(), None);
        assert_eq!(field.text(), "");
        field.on_change("1,234.56");
        assert_eq!(field.number(), 1234.56);
        assert_eq!(field.amount(), Some(Amount::from_cents(123456)));
        assert_eq!(field.text(), "$1,234.56");
        field.clear();
        assert_eq!(field.value(), "");
        assert!(field.number().is_nan());
    }
}
