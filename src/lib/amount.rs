//! Colón amounts as they are typed into a form field
//!
//! Raw text is reduced to a canonical decimal string (`"1234.56"`), which is
//! the only representation that is ever parsed into a number. Display strings
//! (`"₡1.234,56"`) are produced from the canonical form and never read back.
//!
//! The decimal separator of raw text is guessed: a `,` or a `.` counts as the
//! decimal mark only if it is the last separator and is followed by one or two
//! digits. Every other separator is grouping noise.
//!
//! ```txt
//! "1.234,56"  -> "1234.56"  -> "₡1.234,56"
//! "1,234.56"  -> "1234.56"  -> "₡1.234,56"
//! "12.345"    -> "12345"    -> "₡12.345"
//! "0025"      -> "25"       -> "₡25"
//! ```

use std::fmt;
use std::ops;
use std::str::FromStr;

/// Integer digits kept by `sanitize`, further digits are dropped
///
/// Any run of 308 digits still parses to a finite `f64`.
pub const MAX_INTEGER_DIGITS: usize = 308;

/// Decimal digits kept by `sanitize`, further digits are truncated
pub const MAX_DECIMALS: usize = 2;

fn is_separator(c: char) -> bool {
    c == '.' || c == ','
}

/// Checks that the last `sep` is followed by 1 or 2 digits and nothing else
fn closes_decimals(filtered: &str, sep: char) -> bool {
    match filtered.rfind(sep) {
        Some(idx) => {
            let tail = &filtered[idx + sep.len_utf8()..];
            (1..=MAX_DECIMALS).contains(&tail.len()) && tail.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Find which symbol acts as the decimal separator
///
/// `filtered` is expected to contain only ascii digits, `'.'` and `','`.
/// A symbol that appears several times on its own is always grouping.
/// When both symbols appear, the rightmost one that closes 1 or 2 decimals wins.
pub fn decimal_separator(filtered: &str) -> Option<char> {
    let dots = filtered.matches('.').count();
    let commas = filtered.matches(',').count();
    match (dots, commas) {
        (0, 1) if closes_decimals(filtered, ',') => Some(','),
        (1, 0) if closes_decimals(filtered, '.') => Some('.'),
        (0, _) | (_, 0) => None,
        _ => ['.', ',']
            .iter()
            .copied()
            .filter(|&sep| closes_decimals(filtered, sep))
            .max_by_key(|&sep| filtered.rfind(sep)),
    }
}

/// Reduce raw field text to a canonical amount
///
/// Never fails: text without digits becomes `""`, and stray characters
/// are dropped. Applying it to its own output returns the same string.
pub fn sanitize(raw: &str) -> String {
    let filtered = raw
        .chars()
        .filter(|&c| c.is_ascii_digit() || is_separator(c))
        .collect::<String>();
    let decimal = decimal_separator(&filtered);
    log::trace!("decimal separator of {:?}: {:?}", filtered, decimal);
    let (integer, decimals) = match decimal.and_then(|sep| filtered.rfind(sep)) {
        Some(idx) => (&filtered[..idx], &filtered[idx + 1..]),
        None => (&filtered[..], ""),
    };
    let integer = integer
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|&c| c == '0')
        .take(MAX_INTEGER_DIGITS)
        .collect::<String>();
    let decimals = decimals
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DECIMALS)
        .collect::<String>();
    match (integer.is_empty(), decimals.is_empty()) {
        (true, true) => String::new(),
        (_, true) => integer,
        (true, false) => format!("0.{}", decimals),
        (false, false) => format!("{}.{}", integer, decimals),
    }
}

/// Display a canonical amount in the es-CR style (`₡1.234,5`)
pub fn format(canonical: &str) -> String {
    format_with(canonical, &Style::default())
}

/// Display a canonical amount in any style
///
/// Decimals are reattached exactly as they appear, without padding.
pub fn format_with(canonical: &str, style: &Style) -> String {
    if canonical.is_empty() {
        return String::new();
    }
    let (integer, decimals) = match canonical.split_once('.') {
        Some((integer, decimals)) => (integer, Some(decimals)),
        None => (canonical, None),
    };
    let integer = if integer.is_empty() { "0" } else { integer };
    let mut text = style.symbol.clone();
    text.push_str(&group(integer, style.group));
    if let Some(decimals) = decimals {
        text.push(style.decimal);
        text.push_str(decimals);
    }
    text
}

/// Insert `sep` every three digits starting from the right
fn group(digits: &str, sep: char) -> String {
    let len = digits.chars().count();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(sep);
        }
        grouped.push(c);
    }
    grouped
}

/// Numeric value of a canonical amount, `NaN` when there is none
pub fn to_number(canonical: &str) -> f64 {
    if canonical.is_empty() {
        return f64::NAN;
    }
    canonical.parse::<f64>().unwrap_or(f64::NAN)
}

/// How amounts are displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Style {
    /// prefixed currency symbol
    pub symbol: String,
    /// thousands separator
    pub group: char,
    /// decimal mark
    pub decimal: char,
}

impl Style {
    /// Costa Rican colones: `₡1.234,56`
    pub fn es_cr() -> Self {
        Self {
            symbol: String::from("₡"),
            group: '.',
            decimal: ',',
        }
    }

    /// US dollars: `$1,234.56`
    pub fn en_us() -> Self {
        Self {
            symbol: String::from("$"),
            group: ',',
            decimal: '.',
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::es_cr()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown display style '{0}', expected es-CR or en-US")]
pub struct StyleError(pub String);

impl FromStr for Style {
    type Err = StyleError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "es-cr" => Ok(Self::es_cr()),
            "en-us" => Ok(Self::en_us()),
            _ => Err(StyleError(s.to_string())),
        }
    }
}

/// A non-negative amount, counted in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Read a canonical amount
    ///
    /// Returns `None` for `""` (no value entered), for text that is not
    /// in canonical form, and for amounts whose cents overflow a `u64`.
    pub fn parse(canonical: &str) -> Option<Self> {
        let (integer, decimals) = match canonical.split_once('.') {
            Some((integer, decimals)) => (integer, decimals),
            None => (canonical, ""),
        };
        let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if canonical.is_empty() || !digits(integer) || !digits(decimals) {
            return None;
        }
        if decimals.len() > MAX_DECIMALS || canonical.ends_with('.') {
            return None;
        }
        let units = if integer.is_empty() {
            0
        } else {
            integer.parse::<u64>().ok()?
        };
        let cents = match decimals.len() {
            0 => 0,
            1 => decimals.parse::<u64>().ok()? * 10,
            _ => decimals.parse::<u64>().ok()?,
        };
        units.checked_mul(100)?.checked_add(cents).map(Self)
    }

    /// Shortest canonical string for this amount (`"12"`, `"12.5"`, `"12.05"`)
    pub fn canonical(self) -> String {
        let (units, cents) = (self.0 / 100, self.0 % 100);
        match cents {
            0 => units.to_string(),
            c if c % 10 == 0 => format!("{}.{}", units, c / 10),
            c => format!("{}.{:02}", units, c),
        }
    }

    /// Display with exactly two decimals, for aligned reports
    pub fn display(self, style: &Style) -> String {
        format_with(&format!("{}.{:02}", self.0 / 100, self.0 % 100), style)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display(&Style::default()))
    }
}

impl ops::Add for Amount {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl ops::AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl ops::SubAssign for Amount {
    /// Saturates at zero, use `checked_sub` to detect overdrafts
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}
