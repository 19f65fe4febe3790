// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Filtered, sorted views and aggregate analytics over the ledger.
//!
//! Queries never mutate the store. Every view filters first, sorts by
//! timestamp (string order equals chronological order for the fixed-width
//! format), then truncates, so the result is the true top-N for the
//! documented direction. Ties break on identifier for determinism.
//!
//! Aggregate date bounds are inclusive `[start, end]` date strings compared
//! against the timestamp's date prefix; an empty bound is unbounded on that
//! side.

use crate::entry::{EntryKind, EntryStatus, LedgerEntry};
use crate::ledger::Ledger;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Per-kind bucket returned by [`Ledger::daily_totals`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KindTotal {
    pub count: usize,
    pub amount: Decimal,
}

/// Store-wide counters from [`Ledger::statistics`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerStats {
    pub total_entries: usize,
    pub completed: usize,
    pub failed: usize,
    /// Net volume: sum of signed net amounts across the store.
    pub total_volume: Decimal,
    pub by_kind: BTreeMap<EntryKind, usize>,
}

impl Ledger {
    /// History for one account, newest first, truncated to `limit`.
    pub fn account_history(&self, account: &str, limit: usize) -> Vec<&LedgerEntry> {
        let entries = self
            .index
            .account_ids(account)
            .filter_map(|id| self.entries.get(id))
            .collect();
        newest_first(entries, limit)
    }

    /// History for one owner (customer), newest first, truncated to `limit`.
    pub fn owner_history(&self, owner: &str, limit: usize) -> Vec<&LedgerEntry> {
        let entries = self
            .index
            .owner_ids(owner)
            .filter_map(|id| self.entries.get(id))
            .collect();
        newest_first(entries, limit)
    }

    /// All entries of one kind, newest first, truncated to `limit`.
    pub fn entries_by_kind(&self, kind: EntryKind, limit: usize) -> Vec<&LedgerEntry> {
        let entries = self
            .entries
            .values()
            .filter(|entry| entry.kind() == kind)
            .collect();
        newest_first(entries, limit)
    }

    /// Entries whose date falls in the inclusive `[start, end]` range,
    /// newest first. An empty bound is unbounded on that side.
    pub fn entries_by_date_range(&self, start: &str, end: &str) -> Vec<&LedgerEntry> {
        let entries = self
            .index
            .date_range_ids(start, end)
            .filter_map(|id| self.entries.get(id))
            .collect();
        newest_first(entries, usize::MAX)
    }

    /// Entries whose signed net amount falls in `[min, max]`, ascending by
    /// net amount.
    pub fn entries_by_amount_range(&self, min: Decimal, max: Decimal) -> Vec<&LedgerEntry> {
        let mut entries: Vec<&LedgerEntry> = self
            .entries
            .values()
            .filter(|entry| {
                let net = entry.net_amount();
                net >= min && net <= max
            })
            .collect();
        entries.sort_by(|a, b| {
            a.net_amount()
                .cmp(&b.net_amount())
                .then_with(|| a.id().cmp(b.id()))
        });
        entries
    }

    /// Failed entries, newest first.
    pub fn failed_entries(&self) -> Vec<&LedgerEntry> {
        let entries = self
            .entries
            .values()
            .filter(|entry| entry.status() == EntryStatus::Failed)
            .collect();
        newest_first(entries, usize::MAX)
    }

    /// Pending entries, oldest first.
    pub fn pending_entries(&self) -> Vec<&LedgerEntry> {
        let mut entries: Vec<&LedgerEntry> = self
            .entries
            .values()
            .filter(|entry| entry.status() == EntryStatus::Pending)
            .collect();
        entries.sort_by(|a, b| {
            a.timestamp()
                .cmp(b.timestamp())
                .then_with(|| a.id().cmp(b.id()))
        });
        entries
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    /// Sum of deposit amounts for the account within the bounds.
    pub fn total_deposits(&self, account: &str, start_date: &str, end_date: &str) -> Decimal {
        self.sum_account(account, start_date, end_date, |entry| {
            entry.kind() == EntryKind::Deposit
        })
    }

    /// Sum of withdrawals plus outbound transfer legs for the account.
    pub fn total_withdrawals(&self, account: &str, start_date: &str, end_date: &str) -> Decimal {
        self.sum_account(account, start_date, end_date, |entry| {
            matches!(entry.kind(), EntryKind::Withdrawal | EntryKind::TransferOut)
        })
    }

    /// `total_deposits − total_withdrawals` over the same bounds.
    pub fn net_flow(&self, account: &str, start_date: &str, end_date: &str) -> Decimal {
        self.total_deposits(account, start_date, end_date)
            - self.total_withdrawals(account, start_date, end_date)
    }

    /// Number of the account's entries within the bounds.
    pub fn entry_count(&self, account: &str, start_date: &str, end_date: &str) -> usize {
        self.index
            .account_ids(account)
            .filter_map(|id| self.entries.get(id))
            .filter(|entry| in_date_range(entry.date(), start_date, end_date))
            .count()
    }

    /// Mean amount of the account's entries of `kind`; zero when there are
    /// none.
    pub fn average_amount(&self, account: &str, kind: EntryKind) -> Decimal {
        let mut total = Decimal::ZERO;
        let mut count = 0u32;
        for entry in self
            .index
            .account_ids(account)
            .filter_map(|id| self.entries.get(id))
        {
            if entry.kind() == kind {
                total += entry.amount();
                count += 1;
            }
        }
        if count == 0 {
            Decimal::ZERO
        } else {
            total / Decimal::from(count)
        }
    }

    /// Store-wide counters: entry count, completed/failed counts, net volume
    /// and per-kind breakdown.
    pub fn statistics(&self) -> LedgerStats {
        let mut stats = LedgerStats::default();
        for entry in self.entries.values() {
            stats.total_entries += 1;
            stats.total_volume += entry.net_amount();
            match entry.status() {
                EntryStatus::Completed => stats.completed += 1,
                EntryStatus::Failed => stats.failed += 1,
                _ => {}
            }
            *stats.by_kind.entry(entry.kind()).or_default() += 1;
        }
        stats
    }

    /// Per-kind count and amount totals for a single date.
    pub fn daily_totals(&self, date: &str) -> BTreeMap<EntryKind, KindTotal> {
        let mut totals: BTreeMap<EntryKind, KindTotal> = BTreeMap::new();
        for entry in self.entries_by_date_range(date, date) {
            let bucket = totals.entry(entry.kind()).or_default();
            bucket.count += 1;
            bucket.amount += entry.amount();
        }
        totals
    }

    /// Sum of signed net amounts across the whole store.
    pub fn total_volume(&self) -> Decimal {
        self.entries.values().map(LedgerEntry::net_amount).sum()
    }

    fn sum_account(
        &self,
        account: &str,
        start_date: &str,
        end_date: &str,
        keep: impl Fn(&LedgerEntry) -> bool,
    ) -> Decimal {
        self.index
            .account_ids(account)
            .filter_map(|id| self.entries.get(id))
            .filter(|entry| keep(entry) && in_date_range(entry.date(), start_date, end_date))
            .map(LedgerEntry::amount)
            .sum()
    }
}

fn newest_first(mut entries: Vec<&LedgerEntry>, limit: usize) -> Vec<&LedgerEntry> {
    entries.sort_by(|a, b| {
        b.timestamp()
            .cmp(a.timestamp())
            .then_with(|| b.id().cmp(a.id()))
    });
    entries.truncate(limit);
    entries
}

/// Inclusive date-prefix containment; an empty bound is unbounded.
fn in_date_range(date: &str, start: &str, end: &str) -> bool {
    (start.is_empty() || date >= start) && (end.is_empty() || date <= end)
}

#[cfg(test)]
mod tests {
    use super::in_date_range;

    #[test]
    fn date_range_bounds_are_inclusive() {
        assert!(in_date_range("2025-01-22", "2025-01-22", "2025-01-22"));
        assert!(in_date_range("2025-01-22", "2025-01-20", "2025-01-22"));
        assert!(!in_date_range("2025-01-23", "2025-01-20", "2025-01-22"));
        assert!(!in_date_range("2025-01-19", "2025-01-20", "2025-01-22"));
    }

    #[test]
    fn empty_bound_is_unbounded_on_that_side() {
        assert!(in_date_range("1999-12-31", "", "2025-01-22"));
        assert!(in_date_range("2099-01-01", "2025-01-20", ""));
        assert!(in_date_range("2025-01-21", "", ""));
    }
}
