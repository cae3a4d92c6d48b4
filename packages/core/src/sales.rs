//! Sales tracking
//!
//! - **`entry`**: monthly goal rows, one per salesperson per channel
//! - **`ranking`**: per-channel ranking and totals derived from those rows
//! - **`ledger`**: manually entered individual sales and their summaries

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub mod entry;
pub mod ledger;
pub mod ranking;

pub use entry::{Channel, UserEntry};
pub use ledger::{LedgerFilter, LedgerSale, LedgerSummary, filter_sales, summarize};
pub use ranking::{
    CalculatedUser, ChannelRanking, ChannelTotals, RemainingPeriod, rank_channel, rank_entries,
    rank_entries_at, rank_entries_now,
};

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };

        match (
            NaiveDate::from_ymd_opt(self.year, self.month, 1),
            NaiveDate::from_ymd_opt(next_year, next_month, 1),
        ) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 30,
        }
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month (expected YYYY-MM): {s}"))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month: {s}"))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month number: {s}"))?;
        YearMonth::new(year, month).ok_or_else(|| format!("Month out of range: {s}"))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}
