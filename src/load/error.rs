//! Diagnostics for session files
//!
//! Errors are built incrementally and rendered with the source excerpt that
//! `pest` produces for a span, plus colors, notes and hints.
//!
//! # Example
//!
//! ```rust
//! errs.make("Operation rejected")
//!     .nonfatal()
//!     .span(&loc, "submitted here")
//!     .text("₡50.000,00 exceeds the available balance of ₡12.000,00")
//!     .hint("enter at most ₡12.000,00")
//! ```
//!
//! ```txt
//! --> Warning: Operation rejected
//!  |   --> session.mto:4:1
//!  |    |
//!  |  4 | 2024-03-07 transfer "Ana" "50.000";
//!  |    | ^---------------------------------^
//!  |    |
//!  |    = submitted here
//!  |  ₡50.000,00 exceeds the available balance of ₡12.000,00
//!  |      ? hint: enter at most ₡12.000,00
//! ```

use std::fmt;

use crate::load::parse::Rule;

/// Location of an error: file name and span within its contents
pub type Loc<'i> = (&'i str, pest::Span<'i>);

/// Report for a single error
///
/// All messages should fit in a single line, use several `text` or `hint`
/// calls rather than embedded newlines.
#[must_use]
#[derive(Debug)]
pub struct Error {
    /// warning or error, yellow or red
    fatal: bool,
    label: String,
    items: Vec<Item>,
}

#[derive(Debug)]
enum Item {
    /// source excerpt
    Block(pest::error::Error<Rule>),
    Text(String),
    Hint(String),
}

/// All diagnostics emitted while reading one session
#[must_use]
#[derive(Debug, Default)]
pub struct Record {
    contents: Vec<Error>,
}

impl Error {
    pub fn new<S>(msg: S) -> Self
    where
        S: ToString,
    {
        Self {
            fatal: true,
            label: msg.to_string(),
            items: Vec::new(),
        }
    }

    /// Add a parsing failure reported by pest
    pub fn from(&mut self, err: pest::error::Error<Rule>) -> &mut Self {
        self.items.push(Item::Block(err.renamed_rules(rule_rename)));
        self
    }

    /// Mark as a warning rather that a fatal error
    pub fn nonfatal(&mut self) -> &mut Self {
        self.fatal = false;
        self
    }

    /// Add a code block and its associated message
    pub fn span<S>(&mut self, loc: &Loc, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Block(
            pest::error::Error::new_from_span(
                pest::error::ErrorVariant::CustomError {
                    message: msg.to_string(),
                },
                loc.1.clone(),
            )
            .with_path(loc.0),
        ));
        self
    }

    pub fn text<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Text(msg.to_string()));
        self
    }

    pub fn hint<S>(&mut self, msg: S) -> &mut Self
    where
        S: ToString,
    {
        self.items.push(Item::Hint(msg.to_string()));
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fatal(&self) -> bool {
        self.contents.iter().any(Error::is_fatal)
    }

    pub fn count_errors(&self) -> usize {
        self.contents.iter().filter(|e| e.fatal).count()
    }

    pub fn count_warnings(&self) -> usize {
        self.contents.len() - self.count_errors()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.contents.iter()
    }

    /// Add a new error to the pool, fatal until told otherwise
    pub fn make<S>(&mut self, msg: S) -> &mut Error
    where
        S: ToString,
    {
        log::debug!("diagnostic: {}", msg.to_string());
        let len = self.contents.len();
        self.contents.push(Error::new(msg));
        &mut self.contents[len]
    }
}

const RED: &str = "\x1b[0;91;1m";
const YELLOW: &str = "\x1b[0;93;1m";
const BLUE: &str = "\x1b[0;96;1m";
const WHITE: &str = "\x1b[0;1m";
const NONE: &str = "\x1b[0m";

/// Maximum number of diagnostics printed
const TRUNCATE: usize = 10;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (color, header) = if self.fatal {
            (RED, "--> Error")
        } else {
            (YELLOW, "--> Warning")
        };
        writeln!(f, "{}{}:{} {}{}", color, header, WHITE, self.label, NONE)?;
        for item in &self.items {
            match item {
                Item::Block(err) => {
                    // pest marks line endings inside spans with '␊'
                    let excerpt = err.to_string().replace('␊', "");
                    let caret = format!("{}^{}", color, BLUE);
                    for line in excerpt.lines() {
                        writeln!(f, " {}|  {}{}{}", color, BLUE, line.replace('^', &caret), NONE)?;
                    }
                }
                Item::Text(txt) => {
                    writeln!(f, " {}|  {}{}{}", color, WHITE, txt, NONE)?;
                }
                Item::Hint(txt) => {
                    writeln!(f, " {}|      {}? hint: {}{}", color, BLUE, NONE, txt)?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.contents.is_empty() {
            return Ok(());
        }
        let fatal = self.is_fatal();
        let count = if fatal {
            self.count_errors()
        } else {
            self.count_warnings()
        };
        let color = if fatal { RED } else { YELLOW };
        // only print errors with the maximum fatality
        for err in self
            .contents
            .iter()
            .filter(|err| err.fatal == fatal)
            .take(TRUNCATE)
        {
            writeln!(f, "{}", err)?;
        }
        if count > TRUNCATE {
            writeln!(f, "{} And {} more.", color, count - TRUNCATE)?;
        }
        let plural = if count > 1 { "s" } else { "" };
        if fatal {
            writeln!(
                f,
                "{}Fatal: {}{} error{} emitted{}",
                color, WHITE, count, plural, NONE
            )
        } else {
            writeln!(
                f,
                "{}Nonfatal: {}{} warning{} emitted{}",
                color, WHITE, count, plural, NONE
            )
        }
    }
}

#[allow(unreachable_patterns)]
fn rule_rename(r: &Rule) -> String {
    String::from(match r {
        Rule::EOI => "EOF",
        Rule::WHITESPACE => "whitespace",
        Rule::COMMENT => "a comment",
        Rule::semicolon => "a semicolon (';') separator",
        Rule::digit => "a digit (0..9)",
        Rule::date => "a date YYYY-MM-DD",
        Rule::flow => "a form name (transfer, recharge, goal)",
        Rule::string => "a string of non-'\"' characters",
        Rule::quoted => "a quoted string ('\"foo\"')",
        Rule::opening => "an opening balance ('balance \"...\";')",
        Rule::operation => "an operation ('DATE FORM \"TARGET\" \"AMOUNT\";')",
        Rule::item => "an opening balance or an operation",
        Rule::program => "a sequence of operations",
        _ => "a token",
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn counts() {
        let mut errs = Record::new();
        assert!(!errs.is_fatal());
        assert!(errs.is_empty());
        errs.make("Something odd").nonfatal().text("but harmless");
        assert!(!errs.is_fatal());
        assert_eq!(errs.count_warnings(), 1);
        errs.make("Something wrong").hint("fix it");
        errs.make("Something else").nonfatal();
        assert!(errs.is_fatal());
        assert_eq!(errs.count_errors(), 1);
        assert_eq!(errs.count_warnings(), 2);
        let printed = format!("{}", errs);
        assert!(printed.contains("Something wrong"));
        assert!(!printed.contains("Something odd"));
        assert!(printed.contains("1 error emitted"));
    }

    #[test]
    fn source_excerpt() {
        let contents = "balance \"x\";\n";
        let loc = ("session.mto", pest::Span::new(contents, 8, 11).unwrap());
        let mut errs = Record::new();
        errs.make("Invalid opening balance")
            .span(&loc, "provided here")
            .hint("write digits");
        let printed = format!("{}", errs);
        assert!(printed.contains("session.mto:1:9"));
        assert!(printed.contains("balance \"x\";"));
        assert!(printed.contains("provided here"));
        assert!(printed.contains("? hint: "));
    }

    #[test]
    fn warnings_only() {
        let mut errs = Record::new();
        errs.make("Ambiguous separators").nonfatal();
        errs.make("Out of order").nonfatal();
        let printed = format!("{}", errs);
        assert!(printed.contains("Ambiguous separators"));
        assert!(printed.contains("2 warnings emitted"));
    }
}
