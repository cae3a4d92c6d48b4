//! Per-channel sales ranking
//!
//! Derives the goal metrics for every salesperson of a channel, orders them
//! by how much of their goal they realized and sums the channel totals.
//! Everything here is pure; the only input besides the rows is the
//! reference date used for the remaining days/weeks projection.

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use super::YearMonth;
use super::entry::{Channel, UserEntry};

/// Days and weeks left in the reference month, the reference day included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingPeriod {
    pub reference_date: NaiveDate,
    pub days: u32,
    pub weeks: u32,
}

impl RemainingPeriod {
    pub fn at(date: NaiveDate) -> Self {
        let days_in_month = YearMonth::of(date).days_in_month() as i64;
        let days = (days_in_month - date.day() as i64 + 1).max(1) as u32;
        let weeks = days.div_ceil(7).max(1);
        Self {
            reference_date: date,
            days,
            weeks,
        }
    }

    /// Uses the local wall-clock date
    pub fn now() -> Self {
        Self::at(Local::now().date_naive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedUser {
    pub id: Option<String>,
    pub name: String,
    pub code: String,
    pub sector: Channel,
    pub monthly_goal: f64,
    pub realized_amount: f64,
    pub open_orders_amount: f64,
    pub percent_realized: f64,
    pub remaining_goal_amount: f64,
    pub per_day_amount: f64,
    pub per_week_amount: f64,
    pub invoiced_plus_open: f64,
    pub percent_of_goal_including_open_orders: f64,
}

impl CalculatedUser {
    pub fn derive(entry: &UserEntry, period: &RemainingPeriod) -> Self {
        let remaining_goal_amount = (entry.monthly_goal - entry.realized_amount).max(0.0);
        let invoiced_plus_open = entry.realized_amount + entry.open_orders_amount;

        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            code: entry.code.clone(),
            sector: entry.sector,
            monthly_goal: entry.monthly_goal,
            realized_amount: entry.realized_amount,
            open_orders_amount: entry.open_orders_amount,
            percent_realized: percent(entry.realized_amount, entry.monthly_goal),
            remaining_goal_amount,
            per_day_amount: remaining_goal_amount / period.days as f64,
            per_week_amount: remaining_goal_amount / period.weeks as f64,
            invoiced_plus_open,
            percent_of_goal_including_open_orders: percent(invoiced_plus_open, entry.monthly_goal),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTotals {
    pub meta_total: f64,
    pub realized_amount: f64,
    pub open_orders_amount: f64,
    pub remaining_goal_amount: f64,
    pub per_day_amount: f64,
    pub per_week_amount: f64,
    pub invoiced_plus_open: f64,
    /// From the summed goal and realized amounts, not an average of percentages
    pub percent_total: f64,
    pub percent_total_including_open_orders: f64,
}

impl ChannelTotals {
    pub fn sum(users: &[CalculatedUser]) -> Self {
        let mut totals = users.iter().fold(ChannelTotals::default(), |mut acc, user| {
            acc.meta_total += user.monthly_goal;
            acc.realized_amount += user.realized_amount;
            acc.open_orders_amount += user.open_orders_amount;
            acc.remaining_goal_amount += user.remaining_goal_amount;
            acc.per_day_amount += user.per_day_amount;
            acc.per_week_amount += user.per_week_amount;
            acc.invoiced_plus_open += user.invoiced_plus_open;
            acc
        });
        totals.percent_total = percent(totals.realized_amount, totals.meta_total);
        totals.percent_total_including_open_orders =
            percent(totals.invoiced_plus_open, totals.meta_total);
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRanking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<Channel>,
    pub period: RemainingPeriod,
    pub ranking: Vec<CalculatedUser>,
    pub totals: ChannelTotals,
}

/// Zero when there is no goal to measure against
fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole * 100.0 }
}

// NaN sorts last and -0.0 ties with 0.0
fn rank_key(value: f64) -> f64 {
    if value.is_nan() {
        f64::NEG_INFINITY
    } else {
        value + 0.0
    }
}

/// Ranks entries by descending `percent_realized`. Ties keep input order.
pub fn rank_entries(entries: &[UserEntry], period: RemainingPeriod) -> ChannelRanking {
    let mut ranking: Vec<CalculatedUser> = entries
        .iter()
        .map(|entry| CalculatedUser::derive(entry, &period))
        .collect();

    ranking.sort_by(|a, b| rank_key(b.percent_realized).total_cmp(&rank_key(a.percent_realized)));

    let totals = ChannelTotals::sum(&ranking);
    ChannelRanking {
        channel: None,
        period,
        ranking,
        totals,
    }
}

pub fn rank_entries_at(entries: &[UserEntry], today: NaiveDate) -> ChannelRanking {
    rank_entries(entries, RemainingPeriod::at(today))
}

pub fn rank_entries_now(entries: &[UserEntry]) -> ChannelRanking {
    rank_entries(entries, RemainingPeriod::now())
}

/// Ranks only the entries of one channel
pub fn rank_channel(
    entries: &[UserEntry],
    channel: Channel,
    period: RemainingPeriod,
) -> ChannelRanking {
    let in_channel: Vec<UserEntry> = entries
        .iter()
        .filter(|entry| entry.sector == channel)
        .cloned()
        .collect();

    ChannelRanking {
        channel: Some(channel),
        ..rank_entries(&in_channel, period)
    }
}
