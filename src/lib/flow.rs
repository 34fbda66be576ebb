//! Transfers, recharges and goal contributions debited from an account
//!
//! Each flow receives the canonical amount of its input field and either
//! accepts it (the balance is debited) or rejects it with a `Rejection`
//! that can be shown to the user.

use chrono::NaiveDate;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;
use std::ops;
use std::str::FromStr;

use crate::lib::amount::Amount;

/// The forms that take an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, FromPrimitive)]
pub enum Flow {
    Transfer = 0,
    Recharge,
    Goal,
}

impl Flow {
    pub const COUNT: usize = 3;

    /// All flows in declaration order
    pub fn all() -> impl Iterator<Item = Flow> {
        (0..Self::COUNT).filter_map(Self::from_usize)
    }
}

impl FromStr for Flow {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Flow::*;
        Ok(match s {
            "transfer" => Transfer,
            "recharge" => Recharge,
            "goal" => Goal,
            _ => return Err(()),
        })
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Flow::*;
        write!(
            f,
            "{}",
            match self {
                Transfer => "transfer",
                Recharge => "recharge",
                Goal => "goal",
            }
        )
    }
}

/// Why an amount was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("no amount was entered")]
    Missing,
    #[error("the amount must be greater than zero")]
    NotPositive,
    #[error("the amount is too large to be processed")]
    TooLarge,
    #[error("{requested} exceeds the available balance of {available}")]
    InsufficientFunds { requested: Amount, available: Amount },
}

impl Rejection {
    /// Suggestion for the user
    pub fn fix_hint(&self) -> String {
        use Rejection::*;
        match self {
            Missing => String::from("type an amount such as 12.500,50"),
            NotPositive => String::from("enter an amount of at least ₡0,01"),
            TooLarge => String::from("check for extra digits"),
            InsufficientFunds { available, .. } => {
                format!("enter at most {}", available)
            }
        }
    }
}

/// Check the canonical value of a field against the available balance
///
/// A non-empty value that does not fit in `Amount` is `TooLarge`.
pub fn validate(canonical: &str, available: Amount) -> Result<Amount, Rejection> {
    if canonical.is_empty() {
        return Err(Rejection::Missing);
    }
    let requested = Amount::parse(canonical).ok_or(Rejection::TooLarge)?;
    if requested.is_zero() {
        return Err(Rejection::NotPositive);
    }
    if requested > available {
        return Err(Rejection::InsufficientFunds {
            requested,
            available,
        });
    }
    Ok(requested)
}

/// A submitted form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub date: NaiveDate,
    pub flow: Flow,
    /// recipient, phone number or goal name
    pub target: String,
    /// canonical amount
    pub amount: String,
}

/// An operation and what became of it
#[derive(Debug, Clone)]
pub struct Posting {
    pub operation: Operation,
    pub outcome: Result<Amount, Rejection>,
    /// balance after the operation
    pub balance: Amount,
}

/// Running balance and history of submitted operations
#[derive(Debug, Clone)]
pub struct Account {
    opening: Amount,
    balance: Amount,
    postings: Vec<Posting>,
}

impl Account {
    pub fn new(opening: Amount) -> Self {
        Self {
            opening,
            balance: opening,
            postings: Vec::new(),
        }
    }

    pub fn opening(&self) -> Amount {
        self.opening
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    /// Validate and debit, returns the new balance
    ///
    /// A rejected operation is still recorded but leaves the balance untouched.
    pub fn apply(&mut self, operation: Operation) -> Result<Amount, Rejection> {
        let outcome = validate(&operation.amount, self.balance);
        if let Ok(debit) = outcome {
            self.balance -= debit;
        }
        log::debug!(
            "{} {} to '{}': {:?}, balance {}",
            operation.date,
            operation.flow,
            operation.target,
            outcome,
            self.balance
        );
        self.postings.push(Posting {
            operation,
            outcome,
            balance: self.balance,
        });
        outcome.map(|_| self.balance)
    }

    pub fn summary(&self) -> Summary {
        let mut sum = Summary::new();
        for posting in &self.postings {
            sum += posting;
        }
        sum
    }
}

/// Totals per flow
#[derive(Debug, Clone, Default)]
pub struct Summary {
    totals: [Amount; Flow::COUNT],
    accepted: [usize; Flow::COUNT],
    rejected: [usize; Flow::COUNT],
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self, flow: Flow) -> Amount {
        self.totals[flow as usize]
    }

    pub fn accepted(&self, flow: Flow) -> usize {
        self.accepted[flow as usize]
    }

    pub fn rejected(&self, flow: Flow) -> usize {
        self.rejected[flow as usize]
    }

    /// Sum over all flows
    pub fn spent(&self) -> Amount {
        self.totals.iter().fold(Amount::ZERO, |acc, a| acc + *a)
    }
}

impl ops::AddAssign<&Posting> for Summary {
    fn add_assign(&mut self, posting: &Posting) {
        let idx = posting.operation.flow as usize;
        match posting.outcome {
            Ok(debit) => {
                self.totals[idx] += debit;
                self.accepted[idx] += 1;
            }
            Err(_) => self.rejected[idx] += 1,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! op {
        ( $flow:ident $target:expr, $amount:expr ) => {{
            Operation {
                date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                flow: Flow::$flow,
                target: String::from($target),
                amount: String::from($amount),
            }
        }};
    }

    fn cents(c: u64) -> Amount {
        Amount::from_cents(c)
    }

    #[test]
    fn validation() {
        assert_eq!(validate("", cents(100)), Err(Rejection::Missing));
        assert_eq!(validate("0.00", cents(100)), Err(Rejection::NotPositive));
        assert_eq!(validate("0.5", cents(100)), Ok(cents(50)));
        assert_eq!(validate("1", cents(100)), Ok(cents(100)));
        assert_eq!(validate("99999999999999999999", cents(100)), Err(Rejection::TooLarge));
        assert_eq!(
            validate("1.01", cents(100)),
            Err(Rejection::InsufficientFunds {
                requested: cents(101),
                available: cents(100),
            })
        );
    }

    #[test]
    fn flow_names() {
        assert_eq!("goal".parse::<Flow>(), Ok(Flow::Goal));
        assert_eq!("Goal".parse::<Flow>(), Err(()));
        assert_eq!(Flow::all().collect::<Vec<_>>(), vec![Flow::Transfer, Flow::Recharge, Flow::Goal]);
        assert_eq!(format!("{}", Flow::Recharge), "recharge");
    }

    #[test]
    fn account_debits() {
        let mut acc = Account::new(cents(100_000));
        assert_eq!(acc.apply(op!(Transfer "Ana", "250.5")), Ok(cents(74_950)));
        assert_eq!(acc.apply(op!(Recharge "8888-1234", "")), Err(Rejection::Missing));
        assert!(acc.apply(op!(Goal "Vacaciones", "1000")).is_err());
        assert_eq!(acc.apply(op!(Goal "Vacaciones", "749.5")), Ok(Amount::ZERO));
        assert_eq!(acc.balance(), Amount::ZERO);
        assert_eq!(acc.opening(), cents(100_000));
        assert_eq!(acc.postings().len(), 4);
        assert_eq!(acc.postings()[2].balance, cents(74_950));

        let sum = acc.summary();
        assert_eq!(sum.total(Flow::Transfer), cents(25_050));
        assert_eq!(sum.total(Flow::Goal), cents(74_950));
        assert_eq!(sum.total(Flow::Recharge), Amount::ZERO);
        assert_eq!(sum.accepted(Flow::Goal), 1);
        assert_eq!(sum.rejected(Flow::Goal), 1);
        assert_eq!(sum.rejected(Flow::Recharge), 1);
        assert_eq!(sum.spent(), cents(100_000));
    }
}
