//! Keystroke-by-keystroke trace of an amount field

use crate::cli::table::Table;
use crate::lib::{amount::Style, field::AmountField};

/// Type `text` one character at a time into a focused field, then leave it
///
/// Each row shows what the field holds after a keystroke: the raw text,
/// the canonical value and the value the form would submit.
pub fn replay(text: &str, style: &Style) -> Table {
    let mut field = AmountField::new(style.clone());
    let mut table = Table::with_columns(&[
        ("Typed", false),
        ("Value", false),
        ("Number", true),
    ])
    .with_title(format!("Typing '{}'", text));
    field.focus();
    let mut typed = String::new();
    for c in text.chars() {
        typed.push(c);
        field.on_change(&typed);
        table.push_row(vec![field.text(), field.value().to_string(), number(&field)]);
    }
    field.blur();
    table.push_row(vec![field.text(), field.value().to_string(), number(&field)]);
    table
}

fn number(field: &AmountField) -> String {
    let n = field.number();
    if n.is_nan() {
        String::from("-")
    } else {
        n.to_string()
    }
}
