use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vitrine_storage::EntityKind;
use vitrine_types::utils::fold_search_text;

use super::YearMonth;
use super::entry::Channel;
use crate::entity::{Entity, deserialize_opt_id};

/// One manually entered sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSale {
    #[serde(
        default,
        deserialize_with = "deserialize_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub date: NaiveDate,
    pub seller: String,
    #[serde(default)]
    pub customer: String,
    pub channel: Channel,
    pub amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Entity for LedgerSale {
    const KIND: EntityKind = EntityKind::SalesLedger;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerFilter {
    #[serde(default)]
    pub month: Option<YearMonth>,
    #[serde(default)]
    pub channel: Option<Channel>,
    /// Case- and accent-insensitive exact seller name
    #[serde(default)]
    pub seller: Option<String>,
}

impl LedgerFilter {
    pub fn matches(&self, sale: &LedgerSale) -> bool {
        if !self.month.is_none_or(|month| month.contains(sale.date)) {
            return false;
        }
        if !self.channel.is_none_or(|channel| sale.channel == channel) {
            return false;
        }
        match self.seller.as_deref().map(str::trim) {
            Some(seller) if !seller.is_empty() => {
                fold_search_text(seller) == fold_search_text(sale.seller.trim())
            }
            _ => true,
        }
    }
}

/// Matching sales, newest first. Same-day sales keep their stored order.
pub fn filter_sales(sales: Vec<LedgerSale>, filter: &LedgerFilter) -> Vec<LedgerSale> {
    let mut matching: Vec<LedgerSale> = sales.into_iter().filter(|s| filter.matches(s)).collect();
    matching.sort_by(|a, b| b.date.cmp(&a.date));
    matching
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerTotal {
    pub seller: String,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTotal {
    pub channel: Channel,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_amount: f64,
    pub count: usize,
    pub by_seller: Vec<SellerTotal>,
    pub by_channel: Vec<ChannelTotal>,
}

/// Totals over the given sales, grouped by seller and by channel.
///
/// Groups are ordered by descending amount, ties by name. Seller names are
/// grouped as written after trimming.
pub fn summarize(sales: &[LedgerSale]) -> LedgerSummary {
    let mut sellers: HashMap<&str, (f64, usize)> = HashMap::new();
    let mut channels: HashMap<Channel, (f64, usize)> = HashMap::new();
    let mut total_amount = 0.0;

    for sale in sales {
        total_amount += sale.amount;

        let seller = sellers.entry(sale.seller.trim()).or_default();
        seller.0 += sale.amount;
        seller.1 += 1;

        let channel = channels.entry(sale.channel).or_default();
        channel.0 += sale.amount;
        channel.1 += 1;
    }

    let mut by_seller: Vec<SellerTotal> = sellers
        .into_iter()
        .map(|(seller, (amount, count))| SellerTotal {
            seller: seller.to_string(),
            amount,
            count,
        })
        .collect();
    by_seller.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.seller.cmp(&b.seller))
    });

    let mut by_channel: Vec<ChannelTotal> = channels
        .into_iter()
        .map(|(channel, (amount, count))| ChannelTotal {
            channel,
            amount,
            count,
        })
        .collect();
    by_channel.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.channel.as_str().cmp(b.channel.as_str()))
    });

    LedgerSummary {
        total_amount,
        count: sales.len(),
        by_seller,
        by_channel,
    }
}
