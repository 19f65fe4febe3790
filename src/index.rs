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

//! Secondary indices over the entry arena.
//!
//! Three key-to-identifier-set lookups (account, owner, date) that must stay
//! exactly the projection of the primary map onto the respective key. The
//! indices hold identifiers only, never entries, so they cannot dangle.

use crate::base::EntryId;
use crate::entry::LedgerEntry;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

#[derive(Debug, Default)]
pub(crate) struct EntryIndex {
    by_account: BTreeMap<String, BTreeSet<EntryId>>,
    by_owner: BTreeMap<String, BTreeSet<EntryId>>,
    by_date: BTreeMap<String, BTreeSet<EntryId>>,
}

impl EntryIndex {
    pub fn insert(&mut self, entry: &LedgerEntry) {
        let id = entry.id();
        self.by_account
            .entry(entry.account().to_owned())
            .or_default()
            .insert(id.clone());
        self.by_owner
            .entry(entry.owner_raw().to_owned())
            .or_default()
            .insert(id.clone());
        self.by_date
            .entry(entry.date().to_owned())
            .or_default()
            .insert(id.clone());
    }

    /// Detaches exactly one identifier from each index; key sets left empty
    /// are dropped.
    pub fn remove(&mut self, entry: &LedgerEntry) {
        Self::detach(&mut self.by_account, entry.account(), entry.id());
        Self::detach(&mut self.by_owner, entry.owner_raw(), entry.id());
        Self::detach(&mut self.by_date, entry.date(), entry.id());
    }

    fn detach(map: &mut BTreeMap<String, BTreeSet<EntryId>>, key: &str, id: &EntryId) {
        if let Some(ids) = map.get_mut(key) {
            ids.remove(id);
            if ids.is_empty() {
                map.remove(key);
            }
        }
    }

    pub fn clear(&mut self) {
        self.by_account.clear();
        self.by_owner.clear();
        self.by_date.clear();
    }

    pub fn account_ids(&self, account: &str) -> impl Iterator<Item = &EntryId> {
        self.by_account.get(account).into_iter().flatten()
    }

    pub fn owner_ids(&self, owner: &str) -> impl Iterator<Item = &EntryId> {
        self.by_owner.get(owner).into_iter().flatten()
    }

    /// Identifiers whose date key falls in the inclusive `[start, end]`
    /// range; an empty bound is unbounded on that side. An inverted range
    /// matches nothing.
    pub fn date_range_ids<'a>(
        &'a self,
        start: &'a str,
        end: &'a str,
    ) -> impl Iterator<Item = &'a EntryId> {
        let (lower, upper) = if !start.is_empty() && !end.is_empty() && start > end {
            (Bound::Included(start), Bound::Excluded(start))
        } else {
            let lower = if start.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Included(start)
            };
            let upper = if end.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Included(end)
            };
            (lower, upper)
        };
        self.by_date.range::<str, _>((lower, upper)).flat_map(|(_, ids)| ids)
    }
}

#[cfg(test)]
mod tests {
    use super::EntryIndex;
    use crate::base::EntryId;
    use crate::entry::{EntryKind, LedgerEntry};
    use rust_decimal_macros::dec;

    fn entry(id: &str, account: &str, owner: &str, timestamp: &str) -> LedgerEntry {
        LedgerEntry::new(
            EntryId::from(id),
            account,
            EntryKind::Deposit,
            dec!(10.00),
            "",
            dec!(0.00),
            dec!(10.00),
            owner,
            timestamp,
        )
    }

    #[test]
    fn insert_projects_onto_all_three_keys() {
        let mut index = EntryIndex::default();
        let e = entry("TXN20250122001", "SAV001", "CUST001", "2025-01-22 10:00:00");
        index.insert(&e);

        assert_eq!(index.account_ids("SAV001").count(), 1);
        assert_eq!(index.owner_ids("CUST001").count(), 1);
        assert_eq!(index.date_range_ids("2025-01-22", "2025-01-22").count(), 1);
    }

    #[test]
    fn remove_detaches_only_the_given_id() {
        let mut index = EntryIndex::default();
        let first = entry("TXN20250122001", "SAV001", "CUST001", "2025-01-22 10:00:00");
        let second = entry("TXN20250122002", "SAV001", "CUST001", "2025-01-22 11:00:00");
        index.insert(&first);
        index.insert(&second);

        index.remove(&first);

        let remaining: Vec<_> = index.account_ids("SAV001").collect();
        assert_eq!(remaining, vec![second.id()]);
        assert_eq!(index.owner_ids("CUST001").count(), 1);
        assert_eq!(index.date_range_ids("2025-01-22", "2025-01-22").count(), 1);
    }

    #[test]
    fn date_range_is_inclusive_and_unbounded_on_empty() {
        let mut index = EntryIndex::default();
        index.insert(&entry("TXN20250120001", "A", "C", "2025-01-20 09:00:00"));
        index.insert(&entry("TXN20250121002", "A", "C", "2025-01-21 09:00:00"));
        index.insert(&entry("TXN20250122003", "A", "C", "2025-01-22 09:00:00"));

        assert_eq!(index.date_range_ids("2025-01-20", "2025-01-21").count(), 2);
        assert_eq!(index.date_range_ids("", "2025-01-21").count(), 2);
        assert_eq!(index.date_range_ids("2025-01-21", "").count(), 2);
        assert_eq!(index.date_range_ids("", "").count(), 3);
    }
}
