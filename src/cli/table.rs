//! Box-drawn tables for the terminal

use std::fmt;

use crate::lib::{
    amount::Style,
    flow::{Account, Flow},
};

/// A titled grid of text cells
pub struct Table {
    title: Option<String>,
    grid: GridFmt,
}

struct BoxFmt {
    width: usize,
    text: String,
}

struct ColFmt {
    width: usize,
    /// right-aligned contents
    right: bool,
    label: BoxFmt,
    boxes: Vec<BoxFmt>,
}

struct GridFmt {
    columns: Vec<ColFmt>,
}

impl Table {
    /// Empty table, `right` tells for each column whether it is right-aligned
    pub fn with_columns(labels: &[(&str, bool)]) -> Self {
        let columns = labels
            .iter()
            .map(|(label, right)| ColFmt::with_label(BoxFmt::from(label.to_string()), *right))
            .collect::<Vec<_>>();
        Self {
            title: None,
            grid: GridFmt { columns },
        }
    }

    pub fn with_title<S>(mut self, title: S) -> Self
    where
        S: ToString,
    {
        self.title = Some(title.to_string());
        self
    }

    /// Add a row, missing cells are left blank and extra cells are ignored
    pub fn push_row(&mut self, cells: Vec<String>) {
        let mut cells = cells.into_iter();
        for col in &mut self.grid.columns {
            col.push(BoxFmt::from(cells.next().unwrap_or_default()));
        }
    }

    pub fn len(&self) -> usize {
        self.grid.columns.first().map(ColFmt::len).unwrap_or(0)
    }

    /// One line per operation with the balance that results from it
    pub fn statement(account: &Account, style: &Style) -> Self {
        let mut table = Self::with_columns(&[
            ("Date", false),
            ("Form", false),
            ("To", false),
            ("Amount", true),
            ("Balance", true),
        ])
        .with_title("Statement");
        table.push_row(vec![
            String::new(),
            String::from("opening"),
            String::new(),
            String::new(),
            account.opening().display(style),
        ]);
        for posting in account.postings() {
            let op = &posting.operation;
            let amount = match posting.outcome {
                Ok(debit) => format!("-{}", debit.display(style)),
                Err(_) if op.amount.is_empty() => String::from("rejected"),
                Err(_) => format!("rejected {}", crate::lib::amount::format_with(&op.amount, style)),
            };
            table.push_row(vec![
                op.date.to_string(),
                op.flow.to_string(),
                op.target.clone(),
                amount,
                posting.balance.display(style),
            ]);
        }
        table
    }

    /// Totals per form
    pub fn summary(account: &Account, style: &Style) -> Self {
        let sum = account.summary();
        let mut table = Self::with_columns(&[
            ("Form", false),
            ("Accepted", true),
            ("Rejected", true),
            ("Total", true),
        ])
        .with_title("Summary");
        for flow in Flow::all() {
            table.push_row(vec![
                flow.to_string(),
                sum.accepted(flow).to_string(),
                sum.rejected(flow).to_string(),
                sum.total(flow).display(style),
            ]);
        }
        table.push_row(vec![
            String::from("all"),
            Flow::all().map(|f| sum.accepted(f)).sum::<usize>().to_string(),
            Flow::all().map(|f| sum.rejected(f)).sum::<usize>().to_string(),
            sum.spent().display(style),
        ]);
        table
    }
}

impl BoxFmt {
    fn from(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }
}

impl ColFmt {
    fn with_label(label: BoxFmt, right: bool) -> Self {
        Self {
            width: label.width,
            right,
            label,
            boxes: Vec::new(),
        }
    }

    fn push(&mut self, b: BoxFmt) {
        self.width = self.width.max(b.width);
        self.boxes.push(b);
    }

    fn len(&self) -> usize {
        self.boxes.len()
    }

    fn write_label(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.label.write(f, self.width, false)
    }

    fn write_item(&self, f: &mut fmt::Formatter, idx: usize) -> fmt::Result {
        self.boxes[idx].write(f, self.width, self.right)
    }

    fn hline(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", HLINE.repeat(self.width + 2))
    }
}

impl BoxFmt {
    fn write(&self, f: &mut fmt::Formatter, width: usize, right: bool) -> fmt::Result {
        let padding = " ".repeat(width.saturating_sub(self.width));
        if right {
            write!(f, " {}{} ", padding, self.text)
        } else {
            write!(f, " {}{} ", self.text, padding)
        }
    }
}

impl GridFmt {
    /// Draw a horizontal border with the given corners and joins
    fn border(&self, f: &mut fmt::Formatter, left: &str, join: &str, right: &str) -> fmt::Result {
        write!(f, "{}", left)?;
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", join)?;
            }
            c.hline(f)?;
        }
        writeln!(f, "{}", right)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, " {}", title)?;
        }
        write!(f, "{}", self.grid)
    }
}

impl fmt::Display for GridFmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // upper border
        self.border(f, ULCORNER, LOJOIN, URCORNER)?;
        // title line
        for c in &self.columns {
            write!(f, "{}", VLINE)?;
            c.write_label(f)?;
        }
        writeln!(f, "{}", VLINE)?;
        // separator
        self.border(f, RTJOIN, CROSS, LTJOIN)?;
        // main block
        let len = self.columns.first().map(ColFmt::len).unwrap_or(0);
        for idx in 0..len {
            for c in &self.columns {
                write!(f, "{}", VLINE)?;
                c.write_item(f, idx)?;
            }
            writeln!(f, "{}", VLINE)?;
        }
        // lower border
        self.border(f, DLCORNER, HIJOIN, DRCORNER)
    }
}

const HLINE: &str = "─";
const VLINE: &str = "│";
const ULCORNER: &str = "┌";
const URCORNER: &str = "┐";
const DLCORNER: &str = "└";
const DRCORNER: &str = "┘";
const LTJOIN: &str = "┤";
const RTJOIN: &str = "├";
const HIJOIN: &str = "┴";
const LOJOIN: &str = "┬";
const CROSS: &str = "┼";

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{amount::Amount, flow::Operation};
    use chrono::NaiveDate;

    #[test]
    fn layout() {
        let mut table = Table::with_columns(&[("a", false), ("b", true)]);
        table.push_row(vec![String::from("xyz"), String::from("1")]);
        table.push_row(vec![String::from("₡")]);
        assert_eq!(table.len(), 2);
        let expected = "\
┌─────┬───┐
│ a   │ b │
├─────┼───┤
│ xyz │ 1 │
│ ₡   │   │
└─────┴───┘
";
        assert_eq!(format!("{}", table), expected);
    }

    #[test]
    fn reports() {
        let mut acc = Account::new(Amount::from_cents(150_000));
        acc.apply(Operation {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            flow: Flow::Recharge,
            target: String::from("8888-1234"),
            amount: String::from("1000"),
        })
        .unwrap();
        let _ = acc.apply(Operation {
            date: NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
            flow: Flow::Transfer,
            target: String::from("Ana"),
            amount: String::from("1000"),
        });
        let style = Style::default();
        let statement = Table::statement(&acc, &style);
        assert_eq!(statement.len(), 3);
        let printed = format!("{}", statement);
        assert!(printed.contains("-₡1.000,00"));
        assert!(printed.contains("rejected ₡1.000"));
        assert!(printed.contains("₡500,00"));

        let summary = Table::summary(&acc, &style);
        assert_eq!(summary.len(), Flow::COUNT + 1);
        assert!(format!("{}", summary).contains("recharge"));
    }
}
