//! Read a session file and replay its operations on an account

pub mod error;
pub mod parse;

use crate::lib::{amount::Amount, flow::Account};
use parse::Item;

/// Load `filename` and replay it
///
/// Diagnostics go to `errs`, the account is returned only if none of them
/// is fatal.
pub fn read_session(filename: &str, errs: &mut error::Record) -> Option<Account> {
    let contents = match std::fs::read_to_string(filename) {
        Ok(contents) => contents,
        Err(e) => {
            errs.make("File not found")
                .text(format!("Session file is '{}'", filename))
                .text(e)
                .hint("check the path or create the file");
            return None;
        }
    };
    log::debug!("read {} bytes from '{}'", contents.len(), filename);
    load(filename, errs, &contents)
}

/// Same as `read_session` on contents that are already in memory
pub fn load(path: &str, errs: &mut error::Record, contents: &str) -> Option<Account> {
    let items = parse::extract(path, errs, contents);
    if errs.is_fatal() {
        return None;
    }
    let account = replay(errs, items);
    if errs.is_fatal() {
        None
    } else {
        account
    }
}

/// Apply the operations in order
///
/// Exactly one opening balance is expected, before any operation.
/// Rejected operations are reported as warnings and do not stop the replay.
fn replay(errs: &mut error::Record, items: Vec<Item>) -> Option<Account> {
    let mut account: Option<Account> = None;
    let mut last_date = None;
    for item in items {
        match item {
            Item::Opening(balance, loc) => {
                if account.is_some() {
                    errs.make("Duplicate opening balance")
                        .span(&loc, "attempt to override the balance")
                        .text("The balance may only be set once")
                        .hint("remove one of the balance definitions");
                    continue;
                }
                log::debug!("opening balance {}", balance);
                account = Some(Account::new(balance));
            }
            Item::Operation(op, loc) => {
                let acc = match account.as_mut() {
                    Some(acc) => acc,
                    None => {
                        errs.make("Missing opening balance")
                            .span(&loc, "operation submitted before any balance")
                            .text("The session must start with its balance")
                            .hint(format!(
                                "add 'balance \"{}\";' at the top of the file",
                                Amount::ZERO.canonical()
                            ));
                        return None;
                    }
                };
                if let Some(prev) = last_date {
                    if op.date < prev {
                        errs.make("Operations out of order")
                            .nonfatal()
                            .span(&loc, format!("dated before {}", prev))
                            .text("Operations are replayed in the order of the file")
                            .hint("sort the operations by date");
                    }
                }
                last_date = Some(op.date);
                if let Err(rejection) = acc.apply(op) {
                    errs.make("Operation rejected")
                        .nonfatal()
                        .span(&loc, "submitted here")
                        .text(rejection)
                        .hint(rejection.fix_hint());
                }
            }
        }
    }
    if account.is_none() {
        errs.make("Missing opening balance")
            .text("The session has no 'balance' line")
            .hint("add 'balance \"...\";' at the top of the file");
    }
    account
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::flow::{Flow, Rejection};

    fn run(contents: &str) -> (Option<Account>, error::Record) {
        let mut errs = error::Record::new();
        let acc = load("test.mto", &mut errs, contents);
        (acc, errs)
    }

    macro_rules! labels {
        ( $errs:expr ) => {{
            $errs.iter().map(|e| e.label().to_string()).collect::<Vec<_>>()
        }};
    }

    #[test]
    fn full_session() {
        let (acc, errs) = run(
            r#"
            balance "₡100.000";
            2024-03-05 transfer "Ana Mora" "12.500,5";
            2024-03-06 recharge "8888-1234" "₡2.000";
            2024-03-07 goal "Vacaciones" "90.000";
            2024-03-08 goal "Vacaciones" "";
            2024-03-09 goal "Vacaciones" "85.499,50";
            "#,
        );
        let acc = acc.expect("session is valid");
        assert_eq!(labels!(errs), vec!["Operation rejected", "Operation rejected"]);
        assert_eq!(acc.balance(), Amount::ZERO);
        let outcomes = acc.postings().iter().map(|p| p.outcome).collect::<Vec<_>>();
        assert_eq!(outcomes[1], Ok(Amount::from_cents(200_000)));
        assert!(matches!(outcomes[2], Err(Rejection::InsufficientFunds { .. })));
        assert_eq!(outcomes[3], Err(Rejection::Missing));
        let sum = acc.summary();
        assert_eq!(sum.total(Flow::Goal), Amount::from_cents(8_549_950));
        assert_eq!(sum.rejected(Flow::Goal), 2);
    }

    #[test]
    fn balance_is_required_first() {
        let (acc, errs) = run(r#"2024-03-05 transfer "Ana" "1";"#);
        assert!(acc.is_none());
        assert_eq!(labels!(errs), vec!["Missing opening balance"]);

        let (acc, errs) = run("// nothing here\n");
        assert!(acc.is_none());
        assert!(errs.is_fatal());
    }

    #[test]
    fn zero_balance() {
        for contents in ["balance \"0\";\n", "balance \"₡0\";\n"] {
            let (acc, errs) = run(contents);
            assert!(errs.is_empty(), "{}", errs);
            assert_eq!(acc.map(|a| a.balance()), Some(Amount::ZERO));
        }
        let (acc, errs) = run(
            r#"
            balance "0";
            2024-03-05 transfer "Ana" "1";
            2024-03-06 transfer "Ana" "99999999999999999999";
            "#,
        );
        let acc = acc.expect("a zero balance is valid");
        assert_eq!(labels!(errs), vec!["Operation rejected", "Operation rejected"]);
        assert!(matches!(acc.postings()[0].outcome, Err(Rejection::InsufficientFunds { .. })));
        assert_eq!(acc.postings()[1].outcome, Err(Rejection::TooLarge));
    }

    #[test]
    fn duplicate_balance() {
        let (acc, errs) = run(r#"balance "1"; balance "2";"#);
        assert!(acc.is_none());
        assert_eq!(labels!(errs), vec!["Duplicate opening balance"]);
    }

    #[test]
    fn out_of_order() {
        let (acc, errs) = run(
            r#"
            balance "10";
            2024-03-05 transfer "Ana" "1";
            2024-03-01 transfer "Ana" "1";
            "#,
        );
        assert_eq!(acc.map(|a| a.balance()), Some(Amount::from_cents(800)));
        assert_eq!(labels!(errs), vec!["Operations out of order"]);
    }

    #[test]
    fn missing_file() {
        let mut errs = error::Record::new();
        assert!(read_session("/nonexistent/session.mto", &mut errs).is_none());
        assert_eq!(labels!(errs), vec!["File not found"]);
    }
}
