//! Time-bucketed analytics over the synced feeds.
//!
//! A pure projection: timestamps in, period keys and counts out. Nothing
//! here mutates or subscribes; the console feeds it the current orders and
//! customers snapshots and re-derives on every change.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

use green_basket_core::{Order, Profile};

/// Bucketing granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Period {
    /// ISO weeks, Monday start.
    #[default]
    Week,
    Month,
    Quarter,
    Year,
}

impl Period {
    /// The period's wire/display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            _ => Err(format!("invalid period: {s}")),
        }
    }
}

/// The key of the bucket a timestamp falls into.
///
/// Keys sort lexicographically in chronological order within one period
/// kind: "2024-W02", "2024-01", "2024-Q1", "2024".
#[must_use]
pub fn period_key(timestamp: DateTime<Utc>, period: Period) -> String {
    match period {
        Period::Week => {
            let week = timestamp.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        Period::Month => format!("{:04}-{:02}", timestamp.year(), timestamp.month()),
        Period::Quarter => {
            let quarter = (timestamp.month() - 1) / 3 + 1;
            format!("{:04}-Q{quarter}", timestamp.year())
        }
        Period::Year => format!("{:04}", timestamp.year()),
    }
}

/// Bucketed counts, ascending by period key, with unresolvable timestamps
/// counted separately instead of skewing a real bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeriodCounts {
    /// `(period key, count)` pairs, ascending by key.
    pub buckets: Vec<(String, u64)>,
    /// Entries dropped for lacking a resolvable timestamp.
    pub dropped: usize,
}

impl PeriodCounts {
    /// The count in one bucket, zero when absent.
    #[must_use]
    pub fn count(&self, key: &str) -> u64 {
        self.buckets
            .iter()
            .find(|(bucket, _)| bucket == key)
            .map_or(0, |(_, count)| *count)
    }
}

/// Group timestamps into period buckets and count membership.
///
/// `None` timestamps (a server stamp that never resolved) are dropped and
/// surfaced via [`PeriodCounts::dropped`], never merged into a bucket.
pub fn count_by_period<I>(timestamps: I, period: Period) -> PeriodCounts
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    let mut dropped = 0usize;

    for timestamp in timestamps {
        match timestamp {
            Some(ts) => {
                *buckets.entry(period_key(ts, period)).or_insert(0) += 1;
            }
            None => dropped += 1,
        }
    }

    PeriodCounts {
        buckets: buckets.into_iter().collect(),
        dropped,
    }
}

/// Orders per period, from the orders feed's current snapshot.
#[must_use]
pub fn order_counts(orders: &[Order], period: Period) -> PeriodCounts {
    count_by_period(orders.iter().map(|order| order.created_at), period)
}

/// Customer signups per period, from the customers feed's current snapshot.
#[must_use]
pub fn customer_counts(profiles: &[Profile], period: Period) -> PeriodCounts {
    count_by_period(profiles.iter().map(|profile| profile.created_at), period)
}
