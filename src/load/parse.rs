//! Convert the contents of a session file into a stream of items
//! (opening balances and operations)

#![allow(clippy::upper_case_acronyms)]

use chrono::NaiveDate;
use pest::Parser;
use pest_derive::*;

/// Wrapper around Pest's `Pair`
type Pair<'i> = pest::iterators::Pair<'i, Rule>;
/// Wrapper around Pest's `Pairs`
type Pairs<'i> = pest::iterators::Pairs<'i, Rule>;

use crate::lib::{
    amount::{self, Amount},
    flow::{Flow, Operation},
};
use crate::load::error::{self, Loc};

/// Pest-generated parser
#[derive(Parser)]
#[grammar = "load/monto.pest"]
pub struct MontoParser;

/// Each item of the file
#[derive(Debug)]
pub enum Item<'i> {
    /// `balance "...";`
    Opening(Amount, Loc<'i>),
    /// `DATE FORM "TARGET" "AMOUNT";`
    Operation(Operation, Loc<'i>),
}

/// Get the items of `contents`, read from file `path`
///
/// Items that fail validation are left out, so the caller should check
/// `errs.is_fatal()` rather than rely on the return value.
pub fn extract<'i>(path: &'i str, errs: &mut error::Record, contents: &'i str) -> Vec<Item<'i>> {
    match MontoParser::parse(Rule::program, contents) {
        Ok(pairs) => validate(path, errs, pairs),
        Err(e) => {
            errs.make("Parsing failure").from(e.with_path(path));
            Vec::new()
        }
    }
}

// extract contents of wrapper rule
macro_rules! subrule {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No subrule"));
        if items.next().is_some() {
            panic!("Several subrules");
        }
        fst
    }};
}

// extract four-element inner
macro_rules! quadruplet {
    ( $node:expr ) => {{
        let mut items = $node.into_inner();
        let fst = items.next().unwrap_or_else(|| panic!("No 1st"));
        let snd = items.next().unwrap_or_else(|| panic!("No 2nd"));
        let thr = items.next().unwrap_or_else(|| panic!("No 3rd"));
        let fth = items.next().unwrap_or_else(|| panic!("No 4th"));
        assert!(items.next().is_none());
        (fst, snd, thr, fth)
    }};
}

/// Check all items
///
/// Each failing item is recorded in `errs` and skipped, the rest of the file
/// is still validated.
fn validate<'i>(path: &'i str, errs: &mut error::Record, pairs: Pairs<'i>) -> Vec<Item<'i>> {
    let mut items = Vec::new();
    for pair in pairs {
        let loc = (path, pair.as_span());
        match pair.as_rule() {
            Rule::opening => {
                if let Some(balance) = validate_opening(path, errs, pair) {
                    items.push(Item::Opening(balance, loc));
                }
            }
            Rule::operation => {
                if let Some(op) = validate_operation(path, errs, pair) {
                    items.push(Item::Operation(op, loc));
                }
            }
            Rule::EOI => break,
            _ => unreachable!("{:?}", pair),
        }
    }
    items
}

/// Read the quoted text of a `quoted` pair
///
/// Grammar ensures this cannot fail
fn read_quoted(pair: Pair) -> (&str, pest::Span) {
    assert_eq!(pair.as_rule(), Rule::quoted);
    let inner = subrule!(pair);
    (inner.as_str(), inner.as_span())
}

/// Separators that neither mark decimals nor group digits by three
///
/// `"1.234.56"` reads as `"123456"`, which is probably not what was meant.
fn loose_separators(text: &str) -> bool {
    let filtered = text
        .chars()
        .filter(|&c| c.is_ascii_digit() || c == '.' || c == ',')
        .collect::<String>();
    amount::decimal_separator(&filtered).is_none()
        && filtered
            .split(|c: char| c == '.' || c == ',')
            .skip(1)
            .any(|group| group.len() != 3)
}

/// Normalize a typed amount, warning if its separators look misplaced
fn read_amount(path: &str, errs: &mut error::Record, text: &str, span: pest::Span) -> String {
    let canonical = amount::sanitize(text);
    if loose_separators(text) {
        errs.make("Ambiguous separators")
            .nonfatal()
            .span(&(path, span), format!("read as '{}'", canonical))
            .text("Separators are ignored unless they group three digits or close 1 or 2 decimals")
            .hint("check which separator marks the decimals");
    }
    canonical
}

/// Parse the opening balance
///
/// Text without digits is an error, but a zero balance is allowed
fn validate_opening(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Amount> {
    let (text, span) = read_quoted(subrule!(pair));
    let canonical = read_amount(path, errs, text, span.clone());
    if canonical.is_empty() && text.chars().any(|c| c.is_ascii_digit()) {
        // only zeros were typed
        return Some(Amount::ZERO);
    }
    match Amount::parse(&canonical) {
        Some(balance) => Some(balance),
        None if canonical.is_empty() => {
            errs.make("Invalid opening balance")
                .span(&(path, span), "provided here")
                .text(format!("'{}' contains no digits", text))
                .hint("write the balance as in 'balance \"₡1.500.000,00\";'");
            None
        }
        None => {
            errs.make("Opening balance too large")
                .span(&(path, span), format!("read as '{}'", canonical))
                .text("Balances are limited to what fits in a 64-bit count of cents")
                .hint("check for extra digits");
            None
        }
    }
}

/// Parse an operation
///
/// Date and form name are checked here, the amount is only normalized:
/// whether it is acceptable depends on the balance at that point.
fn validate_operation(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Operation> {
    let (date, flow, target, value) = quadruplet!(pair);
    assert_eq!(date.as_rule(), Rule::date);
    assert_eq!(flow.as_rule(), Rule::flow);
    let date = validate_date(path, errs, date)?;
    let flow = validate_flow(path, errs, flow)?;
    let (target, _) = read_quoted(target);
    let (text, span) = read_quoted(value);
    let amount = read_amount(path, errs, text, span);
    Some(Operation {
        date,
        flow,
        target: target.to_string(),
        amount,
    })
}

fn validate_date(path: &str, errs: &mut error::Record, pair: Pair) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(pair.as_str(), "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            let loc = (path, pair.as_span());
            errs.make("Invalid date")
                .span(&loc, "provided here")
                .text(format!("'{}': {}", pair.as_str(), e))
                .hint("choose a date that exists");
            None
        }
    }
}

fn validate_flow(path: &str, errs: &mut error::Record, pair: Pair) -> Option<Flow> {
    match pair.as_str().parse::<Flow>() {
        Ok(flow) => Some(flow),
        Err(()) => {
            let loc = (path, pair.as_span());
            errs.make("Invalid form")
                .span(&loc, "provided here")
                .text(format!("'{}' is not a known form", pair.as_str()))
                .hint("use one of transfer, recharge, goal");
            None
        }
    }
}
